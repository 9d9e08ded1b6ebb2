use ndarray::Array1;
use serde::{Serialize, Deserialize};




/**
 * Abstract description of the (cylindrical radius, height) grid on which the
 * potential, dispersion and temperature fields are tabulated
 */
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Mesh {

    /// First node of both axes; both axes start precisely here
    #[serde(default = "Mesh::default_inner_edge")]
    pub inner_edge: f64,

    /// Last radius node, in units of the halo scale radius
    #[serde(default = "Mesh::default_radial_extent")]
    pub radial_extent: f64,

    /// Last height node, in units of the halo scale radius. This has to reach
    /// far past the radial extent so the vertical integrals converge.
    #[serde(default = "Mesh::default_vertical_extent")]
    pub vertical_extent: f64,

    /// Number of nodes on each axis
    #[serde(default = "Mesh::default_num_zones")]
    pub num_zones: usize,
}




/**
 * Concrete log-spaced axes, built from a mesh and the halo scale radius
 */
#[derive(Clone, Debug)]
pub struct Grid {
    pub rho: Array1<f64>,
    pub z: Array1<f64>,
}




// ============================================================================
impl Default for Mesh {
    fn default() -> Self {
        Self {
            inner_edge: Self::default_inner_edge(),
            radial_extent: Self::default_radial_extent(),
            vertical_extent: Self::default_vertical_extent(),
            num_zones: Self::default_num_zones(),
        }
    }
}

impl Mesh {
    fn default_inner_edge() -> f64 { 0.1 }
    fn default_radial_extent() -> f64 { 200.0 }
    fn default_vertical_extent() -> f64 { 2000.0 }
    fn default_num_zones() -> usize { 110 }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.num_zones < 4 {
            anyhow::bail!("mesh: num_zones must be at least 4")
        }
        if self.inner_edge <= 0.0 {
            anyhow::bail!("mesh: inner_edge must be positive")
        }
        if self.radial_extent <= 0.0 || self.vertical_extent <= 0.0 {
            anyhow::bail!("mesh: radial and vertical extents must be positive")
        }
        Ok(())
    }

    /**
     * Return an error unless both axes, scaled by the halo scale radius, end
     * beyond the inner edge
     */
    pub fn validate_extents(&self, halo_scale_radius: f64) -> anyhow::Result<()> {
        for (name, extent) in &[("radial", self.radial_extent), ("vertical", self.vertical_extent)] {
            if !(extent * halo_scale_radius > self.inner_edge) {
                anyhow::bail!("mesh: {} extent {} x a_halo {} does not reach past inner_edge {}", name, extent, halo_scale_radius, self.inner_edge)
            }
        }
        Ok(())
    }

    /**
     * Build the grid axes for a halo of the given scale radius. The caller
     * must ensure the outer edges lie beyond the inner edge; see
     * `validate_extents`.
     */
    pub fn grid(&self, halo_scale_radius: f64) -> Grid {
        Grid {
            rho: logspace(self.inner_edge, self.radial_extent * halo_scale_radius, self.num_zones),
            z:   logspace(self.inner_edge, self.vertical_extent * halo_scale_radius, self.num_zones),
        }
    }
}




// ============================================================================
impl Grid {
    pub fn shape(&self) -> (usize, usize) {
        (self.rho.len(), self.z.len())
    }

    /// Cell index of a cylindrical radius.
    pub fn locate_rho(&self, rho: f64) -> usize {
        lower_bound(self.rho.as_slice().unwrap_or(&[]), rho)
    }

    /// Cell index of a height; the sign of the height is ignored.
    pub fn locate_z(&self, z: f64) -> usize {
        lower_bound(self.z.as_slice().unwrap_or(&[]), z.abs())
    }
}




// ============================================================================
/**
 * Nodes evenly spaced in log10 between `start` and `stop`, both included
 */
pub fn logspace(start: f64, stop: f64, num: usize) -> Array1<f64> {
    let (y0, y1) = (start.log10(), stop.log10());
    let dy = (y1 - y0) / (num - 1) as f64;
    Array1::from_shape_fn(num, |i| {
        if i == 0 {
            start
        } else if i == num - 1 {
            stop
        } else {
            10f64.powf(y0 + dy * i as f64)
        }
    })
}

/**
 * Index of the first axis node not smaller than `x`, clipped to the last
 * node when `x` lies at or beyond it
 */
pub fn lower_bound(axis: &[f64], x: f64) -> usize {
    let index = axis.partition_point(|&a| a < x);
    index.min(axis.len().saturating_sub(1))
}




// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mesh_spans_the_documented_extents() {
        let grid = Mesh::default().grid(10.0);
        assert_eq!(grid.shape(), (110, 110));
        assert_eq!(grid.rho[0], 0.1);
        assert_eq!(grid.rho[109], 2000.0);
        assert_eq!(grid.z[109], 20000.0);
    }

    #[test]
    fn axes_are_strictly_increasing_and_log_uniform() {
        let axis = logspace(0.1, 2000.0, 110);
        for i in 1..axis.len() {
            assert!(axis[i] > axis[i - 1]);
        }
        let r0 = axis[1] / axis[0];
        let r1 = axis[100] / axis[99];
        assert!((r0 - r1).abs() < 1e-9);
    }

    #[test]
    fn lower_bound_matches_bisect_left_and_clips() {
        let axis = [1.0, 2.0, 4.0, 8.0];
        assert_eq!(lower_bound(&axis, 0.5), 0);
        assert_eq!(lower_bound(&axis, 1.0), 0);
        assert_eq!(lower_bound(&axis, 1.5), 1);
        assert_eq!(lower_bound(&axis, 4.0), 2);
        assert_eq!(lower_bound(&axis, 5.0), 3);
        assert_eq!(lower_bound(&axis, 8.0), 3);
        assert_eq!(lower_bound(&axis, 100.0), 3);
    }

    #[test]
    fn height_lookup_ignores_sign() {
        let grid = Mesh::default().grid(1.0);
        assert_eq!(grid.locate_z(-3.0), grid.locate_z(3.0));
    }

    #[test]
    fn mesh_defaults_fill_missing_fields() {
        let mesh: Mesh = serde_yaml::from_str("num_zones: 64").unwrap();
        assert_eq!(mesh.num_zones, 64);
        assert_eq!(mesh.radial_extent, 200.0);
        assert!(serde_yaml::from_str::<Mesh>("zones: 64").is_err());
    }

    #[test]
    fn extents_must_reach_past_the_inner_edge() {
        let mesh = Mesh::default();
        assert!(mesh.validate_extents(1.0).is_ok());
        assert!(mesh.validate_extents(4e-4).is_err());
        assert!(Mesh { vertical_extent: 0.01, ..Mesh::default() }.validate_extents(1.0).is_err());
    }
}
