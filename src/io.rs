use std::path::Path;
use serde::Serialize;
use crate::catalog::Snapshot;
use crate::traits::SnapshotWriter;




// ============================================================================
#[derive(thiserror::Error, Debug)]
pub enum Error {

    #[cfg(feature = "serde_cbor")]
    #[error("{0}")]
    SerdeCbor(#[from] serde_cbor::Error),

    #[error("{0}")]
    IO(#[from] std::io::Error),

    #[error("output file {0} requested, but serde_cbor is not enabled")]
    SerdeCborNotEnabled(String),
}




/**
 * Writes snapshots as a single CBOR document
 */
#[derive(Clone, Debug)]
pub struct CborSnapshot {
    pub path: String,
}




// ============================================================================
pub fn parent_directory(path_str: &str) -> String {
    match Path::new(&path_str).parent().and_then(Path::to_str) {
        None     => ".",
        Some("") => ".",
        Some(parent) => parent,
    }.into()
}

#[cfg(feature = "serde_cbor")]
pub fn write_cbor<T: Serialize>(value: &T, path_str: &str) -> Result<(), Error> {
    log::info!("write {}", path_str);
    let file = std::fs::File::create(&path_str)?;
    let buffer = std::io::BufWriter::new(file);

    serde_cbor::to_writer(buffer, &value)?;
    Ok(())
}

#[cfg(not(feature = "serde_cbor"))]
pub fn write_cbor<T: Serialize>(_: &T, path_str: &str) -> Result<(), Error> {
    Err(Error::SerdeCborNotEnabled(path_str.to_string()))
}

#[cfg(feature = "serde_cbor")]
pub fn read_cbor<T: for<'de> serde::Deserialize<'de>>(path_str: &str) -> Result<T, Error> {
    let file = std::fs::File::open(path_str)?;
    let buffer = std::io::BufReader::new(file);
    Ok(serde_cbor::from_reader(buffer)?)
}




// ============================================================================
impl SnapshotWriter for CborSnapshot {
    type Error = Error;

    fn write(&self, snapshot: &Snapshot) -> Result<(), Error> {
        write_cbor(snapshot, &self.path)
    }
}




// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_directory_defaults_to_here() {
        assert_eq!(parent_directory("galaxy.yaml"), ".");
        assert_eq!(parent_directory("runs/mw/galaxy.yaml"), "runs/mw");
    }

    #[cfg(feature = "serde_cbor")]
    #[test]
    fn snapshot_survives_a_cbor_round_trip() {
        use std::collections::BTreeMap;
        use ndarray::{array, Array1};
        use crate::catalog::{Component, GasProperties, ParticleCatalog, ParticleSet};

        let halo = ParticleSet::new(Component::Halo, array![[1.0, 2.0, 3.0]], array![[0.5, 0.0, -0.5]], 2.0);
        let catalog = ParticleCatalog::new(vec![halo], GasProperties { internal_energy: Array1::zeros(0), density: Array1::zeros(0) });
        let mut attributes = BTreeMap::new();
        attributes.insert("Time".to_string(), "0.0".to_string());
        let snapshot = catalog.assemble(attributes).unwrap();

        let path = std::env::temp_dir().join(format!("galaxy-ic-io-test-{}.cbor", std::process::id()));
        let writer = CborSnapshot { path: path.to_string_lossy().into_owned() };
        writer.write(&snapshot).unwrap();
        let back: Snapshot = read_cbor(&writer.path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(back.positions, snapshot.positions);
        assert_eq!(back.header.num_particles, [0, 1, 0, 0, 0, 0]);
        assert_eq!(back.header.attributes["Time"], "0.0");
    }
}
