use std::f64::consts::PI;
use serde::{Serialize, Deserialize};
use crate::roots;
use crate::units::G;




/**
 * Inner slope of a Dehnen model: gamma = 0 (core) or gamma = 1 (cusp)
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slope {
    Core,
    Cusp,
}




/**
 * Spherical Dehnen model, used for both the dark matter halo and the bulge
 */
#[derive(Clone, Copy, Debug)]
pub struct Dehnen {
    pub mass: f64,
    pub scale_radius: f64,
    pub slope: Slope,
}




/**
 * Exponential disk with a sech^2 vertical profile, used for the stellar and
 * the gaseous disk
 */
#[derive(Clone, Copy, Debug)]
pub struct ExponentialDisk {
    pub mass: f64,
    pub scale_length: f64,
    pub scale_height: f64,
}




// ============================================================================
impl Slope {
    pub fn from_core_flag(core: bool) -> Self {
        if core {
            Slope::Core
        } else {
            Slope::Cusp
        }
    }

    /// Power of r / (r + a) in the enclosed mass fraction.
    fn mass_exponent(self) -> i32 {
        match self {
            Slope::Core => 3,
            Slope::Cusp => 2,
        }
    }
}




// ============================================================================
impl Dehnen {

    /**
     * Mass density at spherical radius r. The cusp variant diverges at the
     * origin, so r must be positive.
     */
    pub fn density(&self, r: f64) -> f64 {
        let (m, a) = (self.mass, self.scale_radius);
        match self.slope {
            Slope::Core => 3.0 * m / (4.0 * PI) * a / (r + a).powi(4),
            Slope::Cusp => m / (2.0 * PI) * a / (r * (r + a).powi(3)),
        }
    }

    pub fn potential(&self, r: f64) -> f64 {
        let (m, a) = (self.mass, self.scale_radius);
        let x = r / (r + a);
        match self.slope {
            Slope::Core => G * m / (2.0 * a) * (x * x - 1.0),
            Slope::Cusp => G * m / a * (x - 1.0),
        }
    }

    /**
     * Fraction of the total mass enclosed within radius r
     */
    pub fn enclosed_fraction(&self, r: f64) -> f64 {
        (r / (r + self.scale_radius)).powi(self.slope.mass_exponent())
    }

    /**
     * Radius enclosing the given fraction of the total mass; the fraction
     * must be in [0, 1).
     */
    pub fn inverse_enclosed_fraction(&self, fraction: f64) -> f64 {
        let s = fraction.powf(1.0 / self.slope.mass_exponent() as f64);
        self.scale_radius * s / (1.0 - s)
    }

    /**
     * Map a uniform deviate in [0, 1) to a radius no larger than
     * `max_radius`, by rescaling it to the mass fraction enclosed there.
     */
    pub fn truncated_radius(&self, u: f64, max_radius: f64) -> f64 {
        self.inverse_enclosed_fraction(u * self.enclosed_fraction(max_radius))
    }
}




// ============================================================================
impl ExponentialDisk {

    pub fn density(&self, rho: f64, z: f64) -> f64 {
        let (rd, z0) = (self.scale_length, self.scale_height);
        let sech = 1.0 / (z / z0).cosh();
        self.mass / (4.0 * PI * z0 * rd * rd) * sech * sech * (-rho / rd).exp()
    }

    /**
     * Fraction of the disk mass inside cylindrical radius r
     */
    pub fn radial_cumulative(&self, r: f64) -> f64 {
        let x = r / self.scale_length;
        1.0 - (1.0 + x) * (-x).exp()
    }

    /**
     * Cylindrical radius enclosing the given mass fraction, found by Brent's
     * method on [0, 1e10]. The fraction must lie strictly inside (0, 1).
     */
    pub fn inverse_radial_cumulative(&self, fraction: f64) -> Result<f64, roots::Error> {
        roots::require_open_unit(fraction)?;
        roots::brent(|r| self.radial_cumulative(r) - fraction, 0.0, 1.0e10)
    }

    /**
     * Height below which the given fraction of the vertical mass column lies
     */
    pub fn inverse_height_cumulative(&self, fraction: f64) -> Result<f64, roots::Error> {
        roots::require_open_unit(fraction)?;
        Ok(0.5 * self.scale_height * (fraction / (1.0 - fraction)).ln())
    }
}
