//! Equilibrium initial conditions for multi-component disk galaxies: a
//! Dehnen halo and bulge, and exponential stellar and gas disks, sampled as
//! particles in approximate equilibrium with their combined potential.




// ============================================================================
pub mod app;
pub mod catalog;
pub mod config_patch;
pub mod galaxy;
pub mod interp;
pub mod io;
pub mod jeans;
pub mod mesh;
pub mod param_file;
pub mod potential;
pub mod profiles;
pub mod roots;
pub mod sampling;
pub mod thermal;
pub mod traits;
pub mod units;
pub mod velocities;
