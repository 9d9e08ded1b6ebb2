use crate::catalog::Snapshot;
use crate::profiles::ExponentialDisk;




/**
 * Potential of a finite-thickness exponential disk: the one piece of the
 * combined potential which has no closed form
 */
pub trait DiskPotential {

    /// The disk potential, ready to be evaluated at many points
    type Field: DiskField;

    /**
     * Return an error if the kernel was somehow configured improperly.
     */
    fn validate(&self) -> anyhow::Result<()>;

    /**
     * Do any per-disk setup work and return the field of the given disk.
     */
    fn field(&self, disk: &ExponentialDisk) -> Self::Field;
}




/**
 * Potential field of a single disk
 */
pub trait DiskField {

    /**
     * Return the potential at cylindrical radius `rho` and height `z`. The
     * result must be even in `z`.
     */
    fn potential(&self, rho: f64, z: f64) -> f64;
}




/**
 * Conversion of a gas temperature to the simulation's specific internal
 * energy unit
 */
pub trait TemperatureConversion {

    /**
     * Return the specific internal energy of gas at temperature `temperature`
     * (in K) whose mean molecular weight is `mean_molecular_weight`. The
     * caller decides the ionization state; the conversion must not revisit
     * it.
     */
    fn internal_energy(&self, temperature: f64, mean_molecular_weight: f64) -> f64;
}




/**
 * Persists an assembled snapshot in some on-disk format
 */
pub trait SnapshotWriter {

    type Error: std::error::Error + Send + Sync + 'static;

    /**
     * Write the snapshot, returning an appropriate error if it could not be
     * persisted.
     */
    fn write(&self, snapshot: &Snapshot) -> Result<(), Self::Error>;
}
