use ndarray::{Array1, Array2};
use serde::{Serialize, Deserialize};
use crate::jeans::vertical_dispersion;
use crate::mesh::Grid;
use crate::profiles::ExponentialDisk;
use crate::traits::TemperatureConversion;
use crate::units::{self, MP_OVER_KB, IONIZATION_TEMPERATURE};




/**
 * Ideal gas with a fixed adiabatic index
 */
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdealGas {
    #[serde(default = "IdealGas::default_gamma")]
    pub gamma: f64,
}




/**
 * Gas temperature fields on the grid. `reduced_temperature` is the vertical
 * pressure integral divided by the gas density, i.e. kT/(mu m_p) in velocity
 * units squared; `internal_energy` is the specific internal energy at each
 * node.
 */
#[derive(Clone, Debug)]
pub struct GasThermalFields {
    pub reduced_temperature: Array2<f64>,
    pub internal_energy: Array2<f64>,
}




// ============================================================================
impl Default for IdealGas {
    fn default() -> Self {
        Self { gamma: Self::default_gamma() }
    }
}

impl IdealGas {
    fn default_gamma() -> f64 { units::GAMMA }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.gamma <= 1.0 {
            anyhow::bail!("ideal gas: gamma must exceed 1")
        }
        Ok(())
    }
}

impl TemperatureConversion for IdealGas {
    fn internal_energy(&self, temperature: f64, mean_molecular_weight: f64) -> f64 {
        temperature / ((self.gamma - 1.0) * mean_molecular_weight * MP_OVER_KB)
    }
}




// ============================================================================
impl GasThermalFields {

    /**
     * Solve for the temperature structure of a gas disk in hydrostatic
     * equilibrium with the potential `phi`. The temperature at each node is
     * first computed assuming the gas is ionized; nodes which come out below
     * the ionization temperature are recomputed as neutral gas.
     */
    pub fn solve<U: TemperatureConversion>(gas: &ExponentialDisk, grid: &Grid, phi: &Array2<f64>, conversion: &U) -> Self {
        let reduced_temperature = if gas.mass > 0.0 {
            vertical_dispersion(grid, phi, |rho, z| gas.density(rho, z))
        } else {
            Array2::zeros(grid.shape())
        };

        let mu_ionized = units::ionized_mean_weight();
        let mu_neutral = units::neutral_mean_weight();

        let internal_energy = reduced_temperature.mapv(|t_red| {
            let t_ionized = MP_OVER_KB * mu_ionized * t_red;
            if t_ionized > IONIZATION_TEMPERATURE {
                conversion.internal_energy(t_ionized, mu_ionized)
            } else {
                conversion.internal_energy(MP_OVER_KB * mu_neutral * t_red, mu_neutral)
            }
        });

        Self { reduced_temperature, internal_energy }
    }

    /**
     * Internal energy of every gas particle, read from the node whose cell
     * contains the particle
     */
    pub fn particle_internal_energy(&self, grid: &Grid, positions: &Array2<f64>) -> Array1<f64> {
        positions
            .outer_iter()
            .map(|p| {
                let i = grid.locate_rho(p[0].hypot(p[1]));
                let j = grid.locate_z(p[2]);
                self.internal_energy[[i, j]]
            })
            .collect()
    }
}




// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use crate::mesh::Mesh;

    #[test]
    fn ideal_gas_uses_the_given_mean_weight() {
        let gas = IdealGas::default();
        let neutral = gas.internal_energy(1.5e4, units::neutral_mean_weight());
        let ionized = gas.internal_energy(1.5e4, units::ionized_mean_weight());
        assert_relative_eq!(neutral, 1.5e4 / (2.0 / 3.0 * units::neutral_mean_weight() * MP_OVER_KB), max_relative = 1e-12);
        assert_relative_eq!(ionized, 1.5e4 / (2.0 / 3.0 * units::ionized_mean_weight() * MP_OVER_KB), max_relative = 1e-12);
    }

    #[test]
    fn internal_energy_follows_the_reduced_temperature_across_ionization() {
        // Whichever weight is chosen, u = T_red / (gamma - 1). Scale a linear
        // potential so the ionized temperature of one node lands on either
        // side of the threshold, including the band where the neutral
        // temperature already exceeds it.
        let grid = Mesh { num_zones: 8, ..Mesh::default() }.grid(1.0);
        let gas = ExponentialDisk { mass: 1.0, scale_length: 1.0, scale_height: 100.0 };
        let linear = |scale: f64| Array2::from_shape_fn(grid.shape(), |(_, j)| scale * grid.z[j]);
        let unit = GasThermalFields::solve(&gas, &grid, &linear(1.0), &IdealGas::default());
        let t_unit = MP_OVER_KB * units::ionized_mean_weight() * unit.reduced_temperature[[2, 0]];

        for &target in &[4.0e3, 8.0e3, 9.9e3, 1.01e4, 1.5e4] {
            let fields = GasThermalFields::solve(&gas, &grid, &linear(target / t_unit), &IdealGas::default());
            let t = fields.reduced_temperature[[2, 0]];
            assert_relative_eq!(fields.internal_energy[[2, 0]] * (units::GAMMA - 1.0) / t, 1.0, max_relative = 1e-9);
        }
    }

    #[test]
    fn hot_nodes_recover_the_reduced_temperature() {
        // For ionized gas u = kT / ((gamma - 1) mu m_p), which is the reduced
        // temperature over (gamma - 1) regardless of mu.
        let grid = Mesh { num_zones: 8, ..Mesh::default() }.grid(1.0);
        let gas = ExponentialDisk { mass: 1.0, scale_length: 1.0, scale_height: 100.0 };
        let phi = Array2::from_shape_fn(grid.shape(), |(_, j)| 1e5 * grid.z[j]);
        let fields = GasThermalFields::solve(&gas, &grid, &phi, &IdealGas::default());
        let t = fields.reduced_temperature[[2, 0]];
        assert!(MP_OVER_KB * units::ionized_mean_weight() * t > IONIZATION_TEMPERATURE);
        assert_relative_eq!(fields.internal_energy[[2, 0]], t / (units::GAMMA - 1.0), max_relative = 1e-12);
    }

    #[test]
    fn massless_gas_has_zero_internal_energy() {
        let grid = Mesh { num_zones: 8, ..Mesh::default() }.grid(1.0);
        let gas = ExponentialDisk { mass: 0.0, scale_length: 1.0, scale_height: 0.1 };
        let phi = Array2::from_shape_fn(grid.shape(), |(i, j)| -1.0 / (grid.rho[i] + grid.z[j]));
        let fields = GasThermalFields::solve(&gas, &grid, &phi, &IdealGas::default());
        assert!(fields.internal_energy.iter().all(|&u| u == 0.0));
    }

    #[test]
    fn particles_read_the_node_of_their_cell() {
        let grid = Mesh { num_zones: 8, ..Mesh::default() }.grid(1.0);
        let internal_energy = Array2::from_shape_fn(grid.shape(), |(i, j)| (10 * i + j) as f64);
        let fields = GasThermalFields { reduced_temperature: internal_energy.clone(), internal_energy };
        let positions = array![[0.0, 0.0, 0.0], [3.0, 4.0, -1e6]];
        let u = fields.particle_internal_energy(&grid, &positions);
        assert_eq!(u[0], 0.0);
        assert_eq!(u[1], (10 * grid.locate_rho(5.0) + 7) as f64);
    }
}
