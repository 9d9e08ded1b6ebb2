use ndarray::Array2;
use rand::Rng;
use serde::{Serialize, Deserialize};
use crate::catalog::{self, Component, GasProperties, ParticleCatalog, ParticleSet};
use crate::jeans::{self, Dispersions};
use crate::mesh::{Grid, Mesh};
use crate::potential::build_potential;
use crate::profiles::{Dehnen, ExponentialDisk, Slope};
use crate::roots;
use crate::sampling;
use crate::thermal::GasThermalFields;
use crate::traits::{DiskPotential, TemperatureConversion};
use crate::velocities::{self, VelocityAssigner};




// ============================================================================
#[derive(thiserror::Error, Debug)]
pub enum Error {

    #[error("position sampling: {0}")]
    Sampling(#[from] roots::Error),

    #[error("{0}")]
    Velocity(#[from] velocities::Error),

    #[error("catalog assembly: {0}")]
    Shape(#[from] ndarray::ShapeError),
}




/**
 * Physical parameters of a four-component galaxy: a Dehnen halo and bulge,
 * and exponential stellar and gas disks sharing one scale length and
 * height. Masses are in 10^10 Msun and lengths in kpc.
 */
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GalaxyParameters {
    pub m_halo: f64,
    pub m_disk: f64,
    pub m_bulge: f64,
    pub m_gas: f64,
    pub n_halo: usize,
    pub n_disk: usize,
    pub n_bulge: usize,
    pub n_gas: usize,

    /// Halo scale radius
    pub a_halo: f64,

    /// Bulge scale radius
    pub a_bulge: f64,

    /// Disk scale length
    pub rd: f64,

    /// Disk scale height
    pub z0: f64,

    #[serde(default)]
    pub halo_core: bool,

    #[serde(default)]
    pub bulge_core: bool,
}




/**
 * Tabulated fields on the grid which the particle velocities are drawn
 * from
 */
pub struct Equilibrium {
    pub grid: Grid,
    pub phi: Array2<f64>,
    pub dispersions: Dispersions,
    pub thermal: GasThermalFields,
}




// ============================================================================
impl GalaxyParameters {

    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, mass) in &[("m_halo", self.m_halo), ("m_disk", self.m_disk), ("m_bulge", self.m_bulge), ("m_gas", self.m_gas)] {
            if !(*mass >= 0.0) {
                anyhow::bail!("{} must be non-negative", name)
            }
        }
        for (name, length) in &[("a_halo", self.a_halo), ("a_bulge", self.a_bulge), ("rd", self.rd), ("z0", self.z0)] {
            if !(*length > 0.0) {
                anyhow::bail!("{} must be positive", name)
            }
        }
        for &c in &Component::ORDER {
            if self.count_of(c) > 0 && self.mass_of(c) <= 0.0 {
                anyhow::bail!("the {} has particles but no mass", c)
            }
        }
        Ok(())
    }

    pub fn n_total(&self) -> usize {
        self.n_halo + self.n_disk + self.n_bulge + self.n_gas
    }

    pub fn mass_of(&self, component: Component) -> f64 {
        match component {
            Component::Gas   => self.m_gas,
            Component::Halo  => self.m_halo,
            Component::Disk  => self.m_disk,
            Component::Bulge => self.m_bulge,
        }
    }

    pub fn count_of(&self, component: Component) -> usize {
        match component {
            Component::Gas   => self.n_gas,
            Component::Halo  => self.n_halo,
            Component::Disk  => self.n_disk,
            Component::Bulge => self.n_bulge,
        }
    }

    pub fn halo(&self) -> Dehnen {
        Dehnen { mass: self.m_halo, scale_radius: self.a_halo, slope: Slope::from_core_flag(self.halo_core) }
    }

    pub fn bulge(&self) -> Dehnen {
        Dehnen { mass: self.m_bulge, scale_radius: self.a_bulge, slope: Slope::from_core_flag(self.bulge_core) }
    }

    pub fn disk(&self) -> ExponentialDisk {
        ExponentialDisk { mass: self.m_disk, scale_length: self.rd, scale_height: self.z0 }
    }

    pub fn gas(&self) -> ExponentialDisk {
        ExponentialDisk { mass: self.m_gas, scale_length: self.rd, scale_height: self.z0 }
    }
}




// ============================================================================
impl Equilibrium {

    /**
     * Tabulate the potential and solve for the dispersion and gas temperature
     * fields
     */
    pub fn solve<K, U>(params: &GalaxyParameters, mesh: &Mesh, kernel: &K, conversion: &U) -> Self
    where
        K: DiskPotential,
        U: TemperatureConversion,
    {
        let grid = mesh.grid(params.a_halo);
        log::info!("tabulating the potential on a {} x {} grid", grid.rho.len(), grid.z.len());
        let phi = build_potential(params, &grid, kernel);
        log::info!("solving for the gas temperature");
        let thermal = GasThermalFields::solve(&params.gas(), &grid, &phi, conversion);
        log::info!("solving the Jeans equations");
        let dispersions = jeans::solve(params, &grid, &phi);
        Self { grid, phi, dispersions, thermal }
    }
}




/**
 * Sample positions for every component, in the order halo, disk, gas, bulge
 */
fn sample_positions<R: Rng + ?Sized>(params: &GalaxyParameters, rng: &mut R) -> Result<Vec<(Component, Array2<f64>)>, Error> {
    log::info!("sampling positions");
    let halo  = sampling::spheroid_positions(&params.halo(), params.n_halo, rng);
    let disk  = sampling::disk_positions(&params.disk(), params.n_disk, rng)?;
    let gas   = sampling::disk_positions(&params.gas(), params.n_gas, rng)?;
    let bulge = sampling::spheroid_positions(&params.bulge(), params.n_bulge, rng);
    Ok(vec![
        (Component::Gas, gas),
        (Component::Halo, halo),
        (Component::Disk, disk),
        (Component::Bulge, bulge),
    ])
}




/**
 * Generate a particle realization of the galaxy in equilibrium with its own
 * potential. All randomness is drawn from `rng`, so a seeded generator gives
 * reproducible output.
 */
pub fn generate<K, U, R>(params: &GalaxyParameters, mesh: &Mesh, kernel: &K, conversion: &U, rng: &mut R) -> Result<ParticleCatalog, Error>
where
    K: DiskPotential,
    U: TemperatureConversion,
    R: Rng + ?Sized,
{
    let positions = sample_positions(params, rng)?;
    let equilibrium = Equilibrium::solve(params, mesh, kernel, conversion);
    let Equilibrium { grid, phi, dispersions, thermal } = &equilibrium;
    let mut assigner = VelocityAssigner::new(grid, phi, dispersions, thermal, params.gas());
    let mut sets = Vec::new();

    log::info!("assigning velocities");

    for (component, positions) in positions {
        let velocities = assigner.assign(component, &positions, rng)?;
        sets.push(ParticleSet::new(component, positions, velocities, params.mass_of(component)));
    }
    if assigner.non_rotating() > 0 {
        log::warn!("{} particles had a negative squared rotation speed and were given none", assigner.non_rotating());
    }
    log::debug!("built radial force splines for {} height rows", assigner.cached_rows());

    let gas_positions = &sets[0].positions;
    let gas = GasProperties {
        internal_energy: thermal.particle_internal_energy(grid, gas_positions),
        density: catalog::gas_density(&params.gas(), gas_positions),
    };
    Ok(ParticleCatalog::new(sets, gas))
}
