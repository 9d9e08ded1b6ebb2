//! Velocity dispersions from the axisymmetric Jeans equations, following the
//! prescription of Springel & White (1999).

use ndarray::{Array1, Array2};
use crate::galaxy::GalaxyParameters;
use crate::mesh::Grid;
use crate::profiles::{Dehnen, ExponentialDisk};




/**
 * Squared vertical and azimuthal velocity dispersions of one component,
 * indexed by (radius index, height index)
 */
#[derive(Clone, Debug)]
pub struct DispersionFields {
    pub sigma_z2: Array2<f64>,
    pub sigma_phi2: Array2<f64>,
}




/**
 * Dispersion fields of the three collisionless components
 */
#[derive(Clone, Debug)]
pub struct Dispersions {
    pub halo: DispersionFields,
    pub disk: DispersionFields,
    pub bulge: DispersionFields,
}




/**
 * Density law of a collisionless component, in cylindrical coordinates
 */
#[derive(Clone, Copy)]
enum Population {
    Spheroid(Dehnen),
    Disk(ExponentialDisk),
}




// ============================================================================
impl Population {
    fn density(&self, rho: f64, z: f64) -> f64 {
        match self {
            Population::Spheroid(model) => model.density((rho * rho + z * z).sqrt()),
            Population::Disk(model) => model.density(rho, z),
        }
    }

    fn mass(&self) -> f64 {
        match self {
            Population::Spheroid(model) => model.mass,
            Population::Disk(model) => model.mass,
        }
    }
}




// ============================================================================
impl DispersionFields {
    fn zeros(shape: (usize, usize)) -> Self {
        Self {
            sigma_z2: Array2::zeros(shape),
            sigma_phi2: Array2::zeros(shape),
        }
    }

    /**
     * Number of entries, in either field, which are negative or not a number.
     * These cannot be used as Gaussian variances; they appear when the
     * asymmetric drift correction is evaluated on an under-resolved grid.
     */
    pub fn negative_entries(&self) -> usize {
        self.sigma_z2.iter().chain(self.sigma_phi2.iter()).filter(|v| !(**v >= 0.0)).count()
    }
}




// ============================================================================
/**
 * Integrate rho dPhi/dz from each height node out to the last one, at fixed
 * radius index `i`. The integrand uses backward differences between adjacent
 * rows; the first row, which has no row below it, copies the second. The
 * trapezoidal sums are accumulated from the outer edge inward, so the last
 * entry is zero.
 */
pub(crate) fn vertical_pressure<F>(grid: &Grid, phi: &Array2<f64>, i: usize, density: F) -> Array1<f64>
where
    F: Fn(f64, f64) -> f64
{
    let n_z = grid.z.len();
    let rho = grid.rho[i];
    let mut integrand = Array1::zeros(n_z);

    for j in 1..n_z {
        let dz = grid.z[j] - grid.z[j - 1];
        let dphi = phi[[i, j]] - phi[[i, j - 1]];
        integrand[j] = density(rho, grid.z[j]) * dphi / dz;
    }
    integrand[0] = integrand[1];

    let mut pressure = Array1::zeros(n_z);
    for j in (0..n_z - 1).rev() {
        let dz = grid.z[j + 1] - grid.z[j];
        pressure[j] = pressure[j + 1] + 0.5 * (integrand[j] + integrand[j + 1]) * dz;
    }
    pressure
}




/**
 * Vertical velocity dispersion (squared) of a population with the given
 * density law: the vertical pressure divided by the local density. The last
 * height row, which has no trapezoid beyond it, copies the one below. Nodes
 * where the density underflows to zero carry no mass and get zero.
 */
pub(crate) fn vertical_dispersion<F>(grid: &Grid, phi: &Array2<f64>, density: F) -> Array2<f64>
where
    F: Fn(f64, f64) -> f64
{
    let (n_rho, n_z) = grid.shape();
    let mut sigma2 = Array2::zeros((n_rho, n_z));

    for i in 0..n_rho {
        let pressure = vertical_pressure(grid, phi, i, &density);

        for j in 0..n_z - 1 {
            let d = density(grid.rho[i], grid.z[j]);
            sigma2[[i, j]] = if d > 0.0 { pressure[j] / d } else { 0.0 };
        }
        sigma2[[i, n_z - 1]] = sigma2[[i, n_z - 2]];
    }
    sigma2
}




/**
 * First and second radial derivatives of the potential at an interior node,
 * by central differences on the non-uniform radius axis
 */
fn radial_derivatives(grid: &Grid, phi: &Array2<f64>, i: usize, j: usize) -> (f64, f64) {
    let h_minus = grid.rho[i] - grid.rho[i - 1];
    let h_plus = grid.rho[i + 1] - grid.rho[i];
    let slope_minus = (phi[[i, j]] - phi[[i - 1, j]]) / h_minus;
    let slope_plus = (phi[[i + 1, j]] - phi[[i, j]]) / h_plus;

    let first = (phi[[i + 1, j]] - phi[[i - 1, j]]) / (h_plus + h_minus);
    let second = 2.0 * (slope_plus - slope_minus) / (h_plus + h_minus);
    (first, second)
}




fn solve_population(population: Population, grid: &Grid, phi: &Array2<f64>) -> DispersionFields {
    let (n_rho, n_z) = grid.shape();

    if population.mass() <= 0.0 {
        return DispersionFields::zeros((n_rho, n_z))
    }

    let sigma_z2 = vertical_dispersion(grid, phi, |rho, z| population.density(rho, z));
    let mut sigma_phi2 = Array2::zeros((n_rho, n_z));

    for i in 1..n_rho - 1 {
        let rho = grid.rho[i];
        let drho = grid.rho[i + 1] - rho;

        for j in 0..n_z {
            let (dphi, d2phi) = radial_derivatives(grid, phi, i, j);

            sigma_phi2[[i, j]] = match population {
                Population::Disk(_) => {
                    let kappa2 = 3.0 / rho * dphi + d2phi;
                    let gamma2 = 4.0 / (kappa2 * rho) * dphi;
                    sigma_z2[[i, j]] / gamma2
                }
                Population::Spheroid(_) => {
                    let d0 = population.density(rho, grid.z[j]);
                    let d1 = population.density(grid.rho[i + 1], grid.z[j]);
                    if d0 > 0.0 {
                        sigma_z2[[i, j]]
                            + rho / d0 * (d1 * sigma_z2[[i + 1, j]] - d0 * sigma_z2[[i, j]]) / drho
                            + rho * dphi
                    } else {
                        0.0
                    }
                }
            };
        }
    }

    for j in 0..n_z {
        sigma_phi2[[0, j]] = sigma_phi2[[1, j]];
        sigma_phi2[[n_rho - 1, j]] = sigma_phi2[[n_rho - 2, j]];
    }

    DispersionFields { sigma_z2, sigma_phi2 }
}




/**
 * Solve for the dispersion fields of halo, disk and bulge in the given
 * potential. Negative variances are kept as they are, and reported as a
 * warning.
 */
pub fn solve(params: &GalaxyParameters, grid: &Grid, phi: &Array2<f64>) -> Dispersions {
    let dispersions = Dispersions {
        halo:  solve_population(Population::Spheroid(params.halo()), grid, phi),
        disk:  solve_population(Population::Disk(params.disk()), grid, phi),
        bulge: solve_population(Population::Spheroid(params.bulge()), grid, phi),
    };

    for (name, fields) in &[("halo", &dispersions.halo), ("disk", &dispersions.disk), ("bulge", &dispersions.bulge)] {
        let negative = fields.negative_entries();
        if negative > 0 {
            log::warn!("{} dispersion fields have {} negative entries; the grid may be under-resolved", name, negative);
        }
    }
    dispersions
}
