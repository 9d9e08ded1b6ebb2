use std::collections::BTreeMap;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Serialize, Deserialize};
use crate::profiles::ExponentialDisk;




/**
 * The four particle families of a galaxy
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Gas,
    Halo,
    Disk,
    Bulge,
}




/**
 * Phase-space data and masses of the particles of one component
 */
#[derive(Clone, Debug)]
pub struct ParticleSet {
    pub component: Component,
    pub positions: Array2<f64>,
    pub velocities: Array2<f64>,
    pub masses: Array1<f64>,
}




/**
 * Quantities carried only by gas particles
 */
#[derive(Clone, Debug)]
pub struct GasProperties {
    pub internal_energy: Array1<f64>,
    pub density: Array1<f64>,
}




/**
 * All particles of a generated galaxy, kept per component until they are
 * assembled into a snapshot
 */
#[derive(Clone, Debug)]
pub struct ParticleCatalog {
    sets: BTreeMap<Component, ParticleSet>,
    gas: GasProperties,
}




/**
 * Header of an assembled snapshot. `num_particles` follows the six-slot
 * convention of cosmological snapshot formats: gas, halo, disk, bulge, and
 * two unused slots.
 */
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Header {
    pub num_particles: [usize; 6],
    pub attributes: BTreeMap<String, String>,
}




/**
 * A snapshot: per-particle arrays concatenated in the order gas, halo, disk,
 * bulge. The gas-only arrays have one entry per gas particle.
 */
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub header: Header,
    pub positions: Array2<f64>,
    pub velocities: Array2<f64>,
    pub ids: Array1<u64>,
    pub masses: Array1<f64>,
    pub internal_energy: Array1<f64>,
    pub density: Array1<f64>,
    pub smoothing_length: Array1<f64>,
}




// ============================================================================
impl Component {

    /// Order in which components are laid out in a snapshot.
    pub const ORDER: [Component; 4] = [Component::Gas, Component::Halo, Component::Disk, Component::Bulge];

    pub fn name(self) -> &'static str {
        match self {
            Component::Gas   => "gas",
            Component::Halo  => "halo",
            Component::Disk  => "disk",
            Component::Bulge => "bulge",
        }
    }

    /// Slot of this component in a snapshot header.
    pub fn slot(self) -> usize {
        match self {
            Component::Gas   => 0,
            Component::Halo  => 1,
            Component::Disk  => 2,
            Component::Bulge => 3,
        }
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.pad(self.name())
    }
}




// ============================================================================
impl ParticleSet {

    /**
     * Bundle positions and velocities of a component, giving each particle an
     * equal share of the component's total mass
     */
    pub fn new(component: Component, positions: Array2<f64>, velocities: Array2<f64>, total_mass: f64) -> Self {
        let count = positions.nrows();
        let masses = if count == 0 {
            Array1::zeros(0)
        } else {
            Array1::from_elem(count, total_mass / count as f64)
        };
        Self { component, positions, velocities, masses }
    }

    pub fn empty(component: Component) -> Self {
        Self::new(component, Array2::zeros((0, 3)), Array2::zeros((0, 3)), 0.0)
    }

    pub fn len(&self) -> usize {
        self.positions.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}




// ============================================================================
/**
 * Gas density at each position, from the analytic gas disk profile
 */
pub fn gas_density(gas: &ExponentialDisk, positions: &Array2<f64>) -> Array1<f64> {
    positions
        .outer_iter()
        .map(|p| gas.density(p[0].hypot(p[1]), p[2]))
        .collect()
}




// ============================================================================
impl ParticleCatalog {

    /**
     * Collect per-component particle sets. Components which are missing get
     * an empty set.
     */
    pub fn new(sets: Vec<ParticleSet>, gas: GasProperties) -> Self {
        let mut sets: BTreeMap<_, _> = sets.into_iter().map(|s| (s.component, s)).collect();

        for &c in &Component::ORDER {
            sets.entry(c).or_insert_with(|| ParticleSet::empty(c));
        }
        Self { sets, gas }
    }

    pub fn component(&self, component: Component) -> &ParticleSet {
        &self.sets[&component]
    }

    pub fn gas(&self) -> &GasProperties {
        &self.gas
    }

    pub fn num_particles(&self) -> [usize; 6] {
        let mut n = [0; 6];
        for set in self.sets.values() {
            n[set.component.slot()] = set.len();
        }
        n
    }

    pub fn len(&self) -> usize {
        self.sets.values().map(ParticleSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /**
     * Index range of a component's particles in the assembled snapshot
     */
    pub fn slice_of(&self, component: Component) -> std::ops::Range<usize> {
        let start: usize = Component::ORDER
            .iter()
            .take_while(|&&c| c != component)
            .map(|&c| self.component(c).len())
            .sum();
        start..start + self.component(component).len()
    }

    /**
     * Concatenate the components into a snapshot. Particle ids run from 1 to
     * the total particle count; smoothing lengths are zero and left for the
     * simulation code to compute.
     */
    pub fn assemble(&self, attributes: BTreeMap<String, String>) -> Result<Snapshot, ndarray::ShapeError> {
        let positions: Vec<ArrayView2<f64>> = Component::ORDER.iter().map(|&c| self.component(c).positions.view()).collect();
        let velocities: Vec<ArrayView2<f64>> = Component::ORDER.iter().map(|&c| self.component(c).velocities.view()).collect();
        let masses: Vec<f64> = Component::ORDER.iter().flat_map(|&c| self.component(c).masses.iter().cloned()).collect();
        let total = self.len();
        let n_gas = self.component(Component::Gas).len();

        Ok(Snapshot {
            header: Header { num_particles: self.num_particles(), attributes },
            positions: ndarray::concatenate(Axis(0), &positions)?,
            velocities: ndarray::concatenate(Axis(0), &velocities)?,
            ids: (1..=total as u64).collect(),
            masses: Array1::from(masses),
            internal_energy: self.gas.internal_energy.clone(),
            density: self.gas.density.clone(),
            smoothing_length: Array1::zeros(n_gas),
        })
    }
}
