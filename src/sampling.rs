//! Monte-Carlo draws of particle positions from the component density laws.

use std::f64::consts::PI;
use ndarray::Array2;
use rand::Rng;
use rand::distr::Open01;
use crate::profiles::{Dehnen, ExponentialDisk};
use crate::roots;




/// Spheroids are sampled out to this many scale radii.
pub const SPHEROID_TRUNCATION: f64 = 200.0;




/**
 * Draw `count` Cartesian positions from a spherical Dehnen profile, truncated
 * at `SPHEROID_TRUNCATION` scale radii. Directions are isotropic.
 */
pub fn spheroid_positions<R: Rng + ?Sized>(model: &Dehnen, count: usize, rng: &mut R) -> Array2<f64> {
    let max_radius = SPHEROID_TRUNCATION * model.scale_radius;
    let mut positions = Array2::zeros((count, 3));

    for mut p in positions.outer_iter_mut() {
        let r = model.truncated_radius(rng.random::<f64>(), max_radius);
        let theta = (2.0 * rng.random::<f64>() - 1.0).acos();
        let phi = 2.0 * PI * rng.random::<f64>();
        p[0] = r * theta.sin() * phi.cos();
        p[1] = r * theta.sin() * phi.sin();
        p[2] = r * theta.cos();
    }
    positions
}




/**
 * Draw `count` Cartesian positions from an exponential disk with a sech^2
 * vertical profile. Heights are symmetric about the mid-plane.
 */
pub fn disk_positions<R: Rng + ?Sized>(disk: &ExponentialDisk, count: usize, rng: &mut R) -> Result<Array2<f64>, roots::Error> {
    let mut positions = Array2::zeros((count, 3));

    for mut p in positions.outer_iter_mut() {
        let rho = disk.inverse_radial_cumulative(rng.sample(Open01))?;
        let z = disk.inverse_height_cumulative(rng.sample(Open01))?;
        let phi = 2.0 * PI * rng.random::<f64>();
        p[0] = rho * phi.cos();
        p[1] = rho * phi.sin();
        p[2] = z;
    }
    Ok(positions)
}




// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;
    use crate::profiles::Slope;

    /**
     * Kolmogorov-Smirnov distance between a sample and a cumulative
     * distribution function
     */
    fn ks_distance<F: Fn(f64) -> f64>(mut sample: Vec<f64>, cdf: F) -> f64 {
        sample.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let n = sample.len() as f64;
        sample
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let f = cdf(x);
                (f - i as f64 / n).abs().max(((i + 1) as f64 / n - f).abs())
            })
            .fold(0.0, f64::max)
    }

    /// Critical value at roughly the 0.1% significance level.
    fn ks_critical(n: usize) -> f64 {
        1.95 / (n as f64).sqrt()
    }

    #[test]
    fn spheroid_radii_follow_the_truncated_mass_profile() {
        let mut rng = ChaChaRng::seed_from_u64(1);
        for &slope in &[Slope::Cusp, Slope::Core] {
            let model = Dehnen { mass: 1e5, scale_radius: 10.0, slope };
            let n = 4000;
            let positions = spheroid_positions(&model, n, &mut rng);
            let radii: Vec<f64> = positions.outer_iter().map(|p| (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt()).collect();
            let total = model.enclosed_fraction(SPHEROID_TRUNCATION * 10.0);

            assert!(radii.iter().all(|&r| r <= SPHEROID_TRUNCATION * 10.0 * (1.0 + 1e-12)));
            assert!(ks_distance(radii, |r| model.enclosed_fraction(r) / total) < ks_critical(n));
        }
    }

    #[test]
    fn spheroid_directions_are_isotropic() {
        let mut rng = ChaChaRng::seed_from_u64(2);
        let model = Dehnen { mass: 1.0, scale_radius: 1.0, slope: Slope::Cusp };
        let n = 4000;
        let positions = spheroid_positions(&model, n, &mut rng);
        let cos_theta: Vec<f64> = positions.outer_iter().map(|p| p[2] / (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt()).collect();
        assert!(ks_distance(cos_theta, |c| 0.5 * (c + 1.0)) < ks_critical(n));
    }

    #[test]
    fn disk_radii_and_heights_follow_their_profiles() {
        let mut rng = ChaChaRng::seed_from_u64(3);
        let disk = ExponentialDisk { mass: 5.0, scale_length: 3.5, scale_height: 0.7 };
        let n = 4000;
        let positions = disk_positions(&disk, n, &mut rng).unwrap();
        let radii: Vec<f64> = positions.outer_iter().map(|p| p[0].hypot(p[1])).collect();
        let heights: Vec<f64> = positions.column(2).to_vec();

        assert!(ks_distance(radii, |r| disk.radial_cumulative(r)) < ks_critical(n));
        assert!(ks_distance(heights, |z| 1.0 / (1.0 + (-2.0 * z / 0.7).exp())) < ks_critical(n));
    }

    #[test]
    fn zero_count_gives_an_empty_block() {
        let mut rng = ChaChaRng::seed_from_u64(4);
        let disk = ExponentialDisk { mass: 5.0, scale_length: 3.5, scale_height: 0.7 };
        assert_eq!(disk_positions(&disk, 0, &mut rng).unwrap().dim(), (0, 3));
    }
}
