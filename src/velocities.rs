use std::collections::HashMap;
use ndarray::Array2;
use rand::Rng;
use rand_distr::StandardNormal;
use crate::catalog::Component;
use crate::interp::{self, CubicSpline};
use crate::jeans::{DispersionFields, Dispersions};
use crate::mesh::Grid;
use crate::profiles::ExponentialDisk;
use crate::thermal::GasThermalFields;




/// An error type for failed velocity assignment
#[derive(thiserror::Error, Debug)]
pub enum Error {

    #[error("{component} velocity variance {value} at grid node ({rho_index}, {z_index}) is negative; refine the mesh")]
    NegativeVariance {
        component: Component,
        rho_index: usize,
        z_index: usize,
        value: f64,
    },

    #[error("circular velocity spline: {0}")]
    Spline(#[from] interp::Error),
}




/**
 * Radial force splines of the potential, one per height row, built on first
 * use. Each spline passes through the finite difference
 * (Phi[i, j] - Phi[i - 1, j]) / (R_i - R_{i-1}) at every radius node, the
 * first node repeating the second.
 */
pub struct CircularVelocityCache<'a> {
    grid: &'a Grid,
    phi: &'a Array2<f64>,
    splines: HashMap<usize, CubicSpline>,
}




/**
 * Draws particle velocities from the tabulated dispersion and temperature
 * fields
 */
pub struct VelocityAssigner<'a> {
    grid: &'a Grid,
    dispersions: &'a Dispersions,
    thermal: &'a GasThermalFields,
    gas: ExponentialDisk,
    cache: CircularVelocityCache<'a>,
    non_rotating: usize,
}




// ============================================================================
impl<'a> CircularVelocityCache<'a> {
    pub fn new(grid: &'a Grid, phi: &'a Array2<f64>) -> Self {
        Self { grid, phi, splines: HashMap::new() }
    }

    /**
     * dPhi/dR at radius `rho` along height row `z_index`
     */
    pub fn radial_force(&mut self, z_index: usize, rho: f64) -> Result<f64, interp::Error> {
        if !self.splines.contains_key(&z_index) {
            let spline = self.build(z_index)?;
            self.splines.insert(z_index, spline);
        }
        Ok(self.splines[&z_index].sample(rho))
    }

    pub fn len(&self) -> usize {
        self.splines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splines.is_empty()
    }

    fn build(&self, j: usize) -> Result<CubicSpline, interp::Error> {
        let rho = &self.grid.rho;
        let mut slope = vec![0.0; rho.len()];

        for i in 1..rho.len() {
            slope[i] = (self.phi[[i, j]] - self.phi[[i - 1, j]]) / (rho[i] - rho[i - 1]);
        }
        slope[0] = slope[1];
        CubicSpline::new(rho.to_vec(), slope)
    }
}




// ============================================================================
impl<'a> VelocityAssigner<'a> {

    pub fn new(grid: &'a Grid, phi: &'a Array2<f64>, dispersions: &'a Dispersions, thermal: &'a GasThermalFields, gas: ExponentialDisk) -> Self {
        Self {
            grid,
            dispersions,
            thermal,
            gas,
            cache: CircularVelocityCache::new(grid, phi),
            non_rotating: 0,
        }
    }

    /**
     * Number of particles so far whose squared rotation speed came out
     * negative, and which were given no rotation
     */
    pub fn non_rotating(&self) -> usize {
        self.non_rotating
    }

    /**
     * Number of height rows for which a radial force spline has been built
     */
    pub fn cached_rows(&self) -> usize {
        self.cache.len()
    }

    /**
     * Assign Cartesian velocities to the particles of one component. Per
     * collisionless particle the vertical, radial and azimuthal deviates are
     * drawn in that order. Gas particles are given pure rotation.
     */
    pub fn assign<R: Rng + ?Sized>(&mut self, component: Component, positions: &Array2<f64>, rng: &mut R) -> Result<Array2<f64>, Error> {
        let mut velocities = Array2::zeros((positions.nrows(), 3));

        for (p, mut v) in positions.outer_iter().zip(velocities.outer_iter_mut()) {
            let rho = p[0].hypot(p[1]);
            let z = p[2].abs();
            let azimuth = p[1].atan2(p[0]);

            let (v_z, v_r, v_phi) = match component {
                Component::Gas => (0.0, 0.0, self.gas_rotation(rho, z)?),
                Component::Halo => self.random_velocity(component, &self.dispersions.halo, rho, z, rng)?,
                Component::Bulge => self.random_velocity(component, &self.dispersions.bulge, rho, z, rng)?,
                Component::Disk => self.disk_velocity(rho, z, rng)?,
            };

            v[0] = v_r * azimuth.cos() - v_phi * azimuth.sin();
            v[1] = v_r * azimuth.sin() + v_phi * azimuth.cos();
            v[2] = v_z;
        }
        Ok(velocities)
    }

    fn random_velocity<R: Rng + ?Sized>(&self, component: Component, fields: &DispersionFields, rho: f64, z: f64, rng: &mut R) -> Result<(f64, f64, f64), Error> {
        let i = self.grid.locate_rho(rho);
        let j = self.grid.locate_z(z);
        self.draw(component, fields, i, j, rng)
    }

    fn disk_velocity<R: Rng + ?Sized>(&mut self, rho: f64, z: f64, rng: &mut R) -> Result<(f64, f64, f64), Error> {
        // The first row and column of the difference tables repeat their
        // neighbours, so disk particles read from index 1 at the least.
        let i = self.grid.locate_rho(rho).max(1);
        let j = self.grid.locate_z(z).max(1);
        let (v_z, v_r, v_phi) = self.draw(Component::Disk, &self.dispersions.disk, i, j, rng)?;

        let v_c2 = rho * self.cache.radial_force(j, rho)?;
        let streaming = if v_c2 >= 0.0 {
            v_c2.sqrt()
        } else {
            self.non_rotating += 1;
            0.0
        };
        Ok((v_z, v_r, v_phi + streaming))
    }

    /**
     * Rotation speed of gas from radial force balance including the gas
     * pressure gradient, v^2 = R (dPhi/dR + dP/dR / rho_gas)
     */
    fn gas_rotation(&mut self, rho: f64, z: f64) -> Result<f64, Error> {
        let j = self.grid.locate_z(z);
        let i = self.grid.locate_rho(rho).min(self.grid.rho.len() - 2);
        let force = self.cache.radial_force(j, rho)?;

        let (r0, r1) = (self.grid.rho[i], self.grid.rho[i + 1]);
        let t = &self.thermal.reduced_temperature;
        let d0 = self.gas.density(r0, z);
        let d1 = self.gas.density(r1, z);
        let pressure_term = if d0 > 0.0 {
            (d1 * t[[i + 1, j]] - d0 * t[[i, j]]) / (r1 - r0) / d0
        } else {
            0.0
        };

        let v2 = rho * (force + pressure_term);
        if v2 >= 0.0 {
            Ok(v2.sqrt())
        } else {
            self.non_rotating += 1;
            Ok(0.0)
        }
    }

    fn draw<R: Rng + ?Sized>(&self, component: Component, fields: &DispersionFields, i: usize, j: usize, rng: &mut R) -> Result<(f64, f64, f64), Error> {
        let sigma_z = standard_deviation(component, fields.sigma_z2[[i, j]], i, j)?;
        let sigma_phi = standard_deviation(component, fields.sigma_phi2[[i, j]], i, j)?;
        let v_z: f64 = rng.sample(StandardNormal);
        let v_r: f64 = rng.sample(StandardNormal);
        let v_phi: f64 = rng.sample(StandardNormal);
        Ok((v_z * sigma_z, v_r * sigma_z, v_phi * sigma_phi))
    }
}




// ============================================================================
fn standard_deviation(component: Component, variance: f64, rho_index: usize, z_index: usize) -> Result<f64, Error> {
    if variance >= 0.0 {
        Ok(variance.sqrt())
    } else {
        Err(Error::NegativeVariance { component, rho_index, z_index, value: variance })
    }
}




// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;
    use crate::mesh::Mesh;

    fn point_mass_grid() -> (Grid, Array2<f64>) {
        let grid = Mesh::default().grid(1.0);
        let phi = Array2::from_shape_fn(grid.shape(), |(i, j)| -1e4 / grid.rho[i].hypot(grid.z[j]));
        (grid, phi)
    }

    fn uniform_dispersions(grid: &Grid, sigma2: f64) -> Dispersions {
        let fields = DispersionFields {
            sigma_z2: Array2::from_elem(grid.shape(), sigma2),
            sigma_phi2: Array2::from_elem(grid.shape(), sigma2),
        };
        Dispersions { halo: fields.clone(), disk: fields.clone(), bulge: fields }
    }

    fn cold_gas(grid: &Grid) -> GasThermalFields {
        GasThermalFields {
            reduced_temperature: Array2::zeros(grid.shape()),
            internal_energy: Array2::zeros(grid.shape()),
        }
    }

    #[test]
    fn radial_force_matches_the_point_mass_law() {
        let (grid, phi) = point_mass_grid();
        let mut cache = CircularVelocityCache::new(&grid, &phi);
        let j = 0;
        let rho = 20.0;
        let exact = 1e4 * rho / (rho * rho + grid.z[j] * grid.z[j]).powf(1.5);
        let f = cache.radial_force(j, rho).unwrap();
        assert!((f / exact - 1.0).abs() < 0.1, "{} vs {}", f, exact);
        assert_eq!(cache.len(), 1);
        cache.radial_force(j, 30.0).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cold_gas_rotates_in_the_plane() {
        let (grid, phi) = point_mass_grid();
        let dispersions = uniform_dispersions(&grid, 1.0);
        let thermal = cold_gas(&grid);
        let gas = ExponentialDisk { mass: 1.0, scale_length: 3.0, scale_height: 0.3 };
        let mut assigner = VelocityAssigner::new(&grid, &phi, &dispersions, &thermal, gas);
        let mut rng = ChaChaRng::seed_from_u64(0);

        let positions = array![[0.0, 10.0, 0.0], [-10.0, 0.0, 0.0]];
        let v = assigner.assign(Component::Gas, &positions, &mut rng).unwrap();

        let speed = (1e4_f64 / 10.0).sqrt();
        assert!((v[[0, 0]] + speed).abs() < 0.1 * speed);
        assert!(v[[0, 1]].abs() < 1e-9 * speed);
        assert!((v[[1, 1]] + speed).abs() < 0.1 * speed);
        assert_eq!(v.column(2).to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn halo_velocities_have_the_tabulated_dispersion() {
        let (grid, phi) = point_mass_grid();
        let dispersions = uniform_dispersions(&grid, 4.0);
        let thermal = cold_gas(&grid);
        let gas = ExponentialDisk { mass: 1.0, scale_length: 3.0, scale_height: 0.3 };
        let mut assigner = VelocityAssigner::new(&grid, &phi, &dispersions, &thermal, gas);
        let mut rng = ChaChaRng::seed_from_u64(1);

        let positions = Array2::from_shape_fn((4000, 3), |(n, k)| [1.0 + n as f64 * 1e-3, 2.0, -0.5][k]);
        let v = assigner.assign(Component::Halo, &positions, &mut rng).unwrap();
        let variance = v.column(2).iter().map(|x| x * x).sum::<f64>() / 4000.0;
        assert!((variance - 4.0).abs() < 0.4, "variance = {}", variance);
        assert_eq!(assigner.cached_rows(), 0);
    }

    #[test]
    fn negative_variance_is_reported_with_its_location() {
        let (grid, phi) = point_mass_grid();
        let dispersions = uniform_dispersions(&grid, -1.0);
        let thermal = cold_gas(&grid);
        let gas = ExponentialDisk { mass: 1.0, scale_length: 3.0, scale_height: 0.3 };
        let mut assigner = VelocityAssigner::new(&grid, &phi, &dispersions, &thermal, gas);
        let mut rng = ChaChaRng::seed_from_u64(2);

        match assigner.assign(Component::Bulge, &array![[1.0, 0.0, 0.0]], &mut rng) {
            Err(Error::NegativeVariance { component, rho_index, .. }) => {
                assert_eq!(component, Component::Bulge);
                assert_eq!(rho_index, grid.locate_rho(1.0));
            }
            other => panic!("expected a negative variance error, got {:?}", other.map(|v| v.dim())),
        }
    }

    #[test]
    fn disk_particles_stream_with_the_circular_velocity() {
        let (grid, phi) = point_mass_grid();
        let dispersions = uniform_dispersions(&grid, 0.0);
        let thermal = cold_gas(&grid);
        let gas = ExponentialDisk { mass: 1.0, scale_length: 3.0, scale_height: 0.3 };
        let mut assigner = VelocityAssigner::new(&grid, &phi, &dispersions, &thermal, gas);
        let mut rng = ChaChaRng::seed_from_u64(3);

        let v = assigner.assign(Component::Disk, &array![[10.0, 0.0, 0.0]], &mut rng).unwrap();
        let speed = (1e4_f64 / 10.0).sqrt();
        assert!((v[[0, 1]] / speed - 1.0).abs() < 0.1);
        assert_eq!(assigner.non_rotating(), 0);
    }

    #[test]
    fn gas_rotation_includes_the_pressure_gradient() {
        let (grid, phi) = point_mass_grid();
        let dispersions = uniform_dispersions(&grid, 0.0);
        let thermal = GasThermalFields {
            reduced_temperature: Array2::from_shape_fn(grid.shape(), |(i, _)| 5.0 * grid.rho[i]),
            internal_energy: Array2::zeros(grid.shape()),
        };
        let gas = ExponentialDisk { mass: 1.0, scale_length: 1000.0, scale_height: 0.3 };
        let mut assigner = VelocityAssigner::new(&grid, &phi, &dispersions, &thermal, gas);
        let mut cache = CircularVelocityCache::new(&grid, &phi);
        let mut rng = ChaChaRng::seed_from_u64(4);
        let n = grid.rho.len();

        // The second radius lies past the last node, where the gradient is
        // taken between the last two nodes.
        for &rho in &[10.0, 300.0] {
            let i = grid.locate_rho(rho).min(n - 2);
            assert!(rho < 200.0 || i == n - 2);
            let (r0, r1) = (grid.rho[i], grid.rho[i + 1]);
            let (d0, d1) = (gas.density(r0, 0.0), gas.density(r1, 0.0));
            let (t0, t1) = (5.0 * r0, 5.0 * r1);
            let pressure_term = (d1 * t1 - d0 * t0) / ((r1 - r0) * d0);
            let v2 = rho * (cache.radial_force(0, rho).unwrap() + pressure_term);
            assert!(pressure_term > 0.0 && v2 > 0.0);

            let v = assigner.assign(Component::Gas, &array![[rho, 0.0, 0.0]], &mut rng).unwrap();
            assert_relative_eq!(v[[0, 1]], v2.sqrt(), max_relative = 1e-12);
        }
        assert_eq!(assigner.non_rotating(), 0);
    }

    #[test]
    fn disk_particles_never_read_the_first_row_or_column() {
        let (grid, phi) = point_mass_grid();
        let mut dispersions = uniform_dispersions(&grid, 0.0);
        dispersions.disk.sigma_z2.row_mut(0).fill(-1.0);
        dispersions.disk.sigma_z2.column_mut(0).fill(-1.0);
        let thermal = cold_gas(&grid);
        let gas = ExponentialDisk { mass: 1.0, scale_length: 3.0, scale_height: 0.3 };
        let mut assigner = VelocityAssigner::new(&grid, &phi, &dispersions, &thermal, gas);
        let mut cache = CircularVelocityCache::new(&grid, &phi);
        let mut rng = ChaChaRng::seed_from_u64(5);

        let rho = grid.rho[0];
        assert_eq!((grid.locate_rho(rho), grid.locate_z(0.0)), (0, 0));

        let v = assigner.assign(Component::Disk, &array![[rho, 0.0, 0.0]], &mut rng).unwrap();
        let streaming = (rho * cache.radial_force(1, rho).unwrap()).sqrt();
        assert_relative_eq!(v[[0, 1]], streaming, max_relative = 1e-12);
        assert_eq!(cache.len(), 1);
        assert_eq!(assigner.cached_rows(), 1);
    }
}
