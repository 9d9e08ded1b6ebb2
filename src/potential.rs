use ndarray::Array2;
use serde::{Serialize, Deserialize};
use crate::galaxy::GalaxyParameters;
use crate::mesh::Grid;
use crate::profiles::ExponentialDisk;
use crate::traits::{DiskField, DiskPotential};
use crate::units::G;




/**
 * Choice of disk potential kernel
 */
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
pub enum DiskKernel {

    /// Sum over coaxial rings of equal mass, placed at the midpoints of the
    /// disk's cumulative radial and vertical mass laws. Each ring is
    /// Plummer-softened by half the gap between its radial neighbours, so
    /// the sum has no logarithmic spikes near the rings.
    RingQuadrature {
        radial_nodes: usize,
        vertical_nodes: usize,
    },

    /// Closed-form Miyamoto-Nagai potential with a = Rd and b = z0; a cheap
    /// approximation
    MiyamotoNagai,
}




/**
 * Softened rings standing in for a disk. Every ring is mirrored about the
 * midplane and carries an equal share of the disk mass.
 */
#[derive(Clone, Debug)]
pub struct RingTable {
    mass_per_ring: f64,
    rings: Vec<Ring>,
}

#[derive(Clone, Copy, Debug)]
struct Ring {
    radius: f64,
    height: f64,
    softening: f64,
}




/**
 * Disk potential field produced by a `DiskKernel`
 */
#[derive(Clone, Debug)]
pub enum PreparedDisk {
    Rings(RingTable),
    MiyamotoNagai(ExponentialDisk),
}




// ============================================================================
impl Default for DiskKernel {
    fn default() -> Self {
        DiskKernel::RingQuadrature { radial_nodes: 64, vertical_nodes: 32 }
    }
}

impl DiskPotential for DiskKernel {
    type Field = PreparedDisk;

    fn validate(&self) -> anyhow::Result<()> {
        match self {
            DiskKernel::RingQuadrature { radial_nodes, vertical_nodes } => {
                if *radial_nodes == 0 || *vertical_nodes < 2 || vertical_nodes % 2 != 0 {
                    anyhow::bail!("ring_quadrature: radial_nodes must be > 0 and vertical_nodes a positive even number")
                }
                Ok(())
            }
            DiskKernel::MiyamotoNagai => Ok(()),
        }
    }

    fn field(&self, disk: &ExponentialDisk) -> PreparedDisk {
        match self {
            DiskKernel::RingQuadrature { radial_nodes, vertical_nodes } => {
                PreparedDisk::Rings(RingTable::new(disk, *radial_nodes, *vertical_nodes))
            }
            DiskKernel::MiyamotoNagai => PreparedDisk::MiyamotoNagai(*disk),
        }
    }
}

impl DiskField for PreparedDisk {
    fn potential(&self, rho: f64, z: f64) -> f64 {
        match self {
            PreparedDisk::Rings(table) => table.potential(rho, z),
            PreparedDisk::MiyamotoNagai(disk) => {
                let s = disk.scale_length + (z * z + disk.scale_height * disk.scale_height).sqrt();
                -G * disk.mass / (rho * rho + s * s).sqrt()
            }
        }
    }
}




// ============================================================================
impl RingTable {

    /**
     * Place rings at the midpoints of the disk's cumulative radial and
     * vertical mass laws. Only the upper half of the heights is kept; each
     * ring stands for itself and its mirror image.
     */
    pub fn new(disk: &ExponentialDisk, radial_nodes: usize, vertical_nodes: usize) -> Self {
        let radii: Vec<f64> = (0..radial_nodes)
            .filter_map(|i| disk.inverse_radial_cumulative((i as f64 + 0.5) / radial_nodes as f64).ok())
            .collect();
        let softening = ring_softening(&radii);
        let heights: Vec<f64> = (vertical_nodes / 2..vertical_nodes)
            .filter_map(|j| disk.inverse_height_cumulative((j as f64 + 0.5) / vertical_nodes as f64).ok())
            .collect();

        let rings: Vec<Ring> = radii
            .iter()
            .zip(&softening)
            .flat_map(|(&radius, &softening)| heights.iter().map(move |&height| Ring { radius, height, softening }))
            .collect();

        let mass_per_ring = if rings.is_empty() { 0.0 } else { disk.mass / (2 * rings.len()) as f64 };
        Self { mass_per_ring, rings }
    }

    /**
     * Number of rings, counting mirror images
     */
    pub fn len(&self) -> usize {
        2 * self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    pub fn potential(&self, rho: f64, z: f64) -> f64 {
        // Summing each mirror pair first keeps the result exactly even in z.
        let total: f64 = self.rings
            .iter()
            .map(|r| ring_potential(rho, z, r.radius, r.height, r.softening) + ring_potential(rho, z, r.radius, -r.height, r.softening))
            .sum();
        self.mass_per_ring * total
    }
}




// ============================================================================
/**
 * Potential at (R, z) of a thin ring of unit mass, radius a and height h:
 * -G / AGM(s+, s-), with s+- the largest and smallest distances from the
 * field point to the ring. A non-zero softening length is added in
 * quadrature to both distances.
 */
fn ring_potential(rho: f64, z: f64, a: f64, h: f64, softening: f64) -> f64 {
    let dz2 = (z - h) * (z - h) + softening * softening;
    let s_plus  = ((rho + a) * (rho + a) + dz2).sqrt();
    let s_minus = ((rho - a) * (rho - a) + dz2).sqrt();
    -G / arithmetic_geometric_mean(s_plus, s_minus)
}

fn arithmetic_geometric_mean(mut a: f64, mut b: f64) -> f64 {
    for _ in 0..64 {
        if (a - b).abs() <= 1e-15 * a {
            break
        }
        let next = 0.5 * (a + b);
        b = (a * b).sqrt();
        a = next;
    }
    a
}

/**
 * Half the distance between the neighbours of each ring radius. The
 * innermost ring's inner neighbour is the axis; the outermost ring mirrors
 * the gap below it.
 */
fn ring_softening(radii: &[f64]) -> Vec<f64> {
    let n = radii.len();
    (0..n)
        .map(|i| {
            let inner = if i > 0 { radii[i - 1] } else { 0.0 };
            let outer = if i + 1 < n {
                radii[i + 1]
            } else if n > 1 {
                2.0 * radii[i] - radii[i - 1]
            } else {
                2.0 * radii[i]
            };
            0.5 * (outer - inner)
        })
        .collect()
}




// ============================================================================
/**
 * Combined potential of halo, bulge and both disks at a single point. The
 * stellar and gas disks share one shape, so `disks` is the field of a single
 * disk carrying their combined mass. The height enters only through its
 * absolute value.
 */
pub fn potential_at<F: DiskField>(params: &GalaxyParameters, disks: &F, rho: f64, z: f64) -> f64 {
    let z = z.abs();
    let r = (rho * rho + z * z).sqrt();
    params.halo().potential(r) + disks.potential(rho, z) + params.bulge().potential(r)
}




/**
 * Single disk with the combined mass of the stellar and gas disks
 */
pub fn combined_disk(params: &GalaxyParameters) -> ExponentialDisk {
    ExponentialDisk { mass: params.m_disk + params.m_gas, ..params.disk() }
}




/**
 * Tabulate the combined potential over the grid. The disk field is prepared
 * once, before the loop over nodes.
 */
pub fn build_potential<K: DiskPotential>(params: &GalaxyParameters, grid: &Grid, kernel: &K) -> Array2<f64> {
    let (n_rho, n_z) = grid.shape();
    let mut phi = Array2::zeros((n_rho, n_z));
    let disks = kernel.field(&combined_disk(params));

    for i in 0..n_rho {
        log::debug!("potential calculation, {} of {}...", i, n_rho);
        for j in 0..n_z {
            phi[[i, j]] = potential_at(params, &disks, grid.rho[i], grid.z[j]);
        }
    }
    phi
}
