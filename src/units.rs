//! Physical constants in the simulation's unit system: lengths in kpc,
//! velocities in km/s, masses in 10^10 solar masses.




/// Gravitational constant (kpc (km/s)^2 / 10^10 Msun)
pub const G: f64 = 43007.1;

/// Proton mass over Boltzmann constant, in K / (km/s)^2
pub const MP_OVER_KB: f64 = 121.148;

/// Primordial hydrogen mass fraction
pub const HYDROGEN_MASSFRAC: f64 = 0.76;

/// Adiabatic index of a monatomic ideal gas
pub const GAMMA: f64 = 5.0 / 3.0;

/// Temperature above which hydrogen is assumed fully ionized (K)
pub const IONIZATION_TEMPERATURE: f64 = 1.0e4;




// ============================================================================
/**
 * Mean molecular weight of a fully neutral primordial gas
 */
pub fn neutral_mean_weight() -> f64 {
    4.0 / (1.0 + 3.0 * HYDROGEN_MASSFRAC)
}

/**
 * Mean molecular weight of a fully ionized primordial gas
 */
pub fn ionized_mean_weight() -> f64 {
    4.0 / (3.0 + 5.0 * HYDROGEN_MASSFRAC)
}
