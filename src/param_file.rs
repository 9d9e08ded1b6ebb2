//! Reader for the legacy plain-text parameter files: one `name value...`
//! entry per line, with `%` or `#` starting a comment line.

use std::collections::BTreeMap;
use std::num::ParseFloatError;
use crate::galaxy::GalaxyParameters;




// ============================================================================
#[derive(thiserror::Error, Debug)]
pub enum Error {

    #[error("{0}")]
    IO(#[from] std::io::Error),

    #[error("parameter '{0}' is missing")]
    Missing(String),

    #[error("parameter '{name}': {source}")]
    ParseFloat {
        name: String,
        source: ParseFloatError,
    },

    #[error("parameter '{name}' = {value} is not a non-negative whole number")]
    NotACount {
        name: String,
        value: f64,
    },
}




/**
 * Name-value table read from a parameter file. Values keep all the tokens
 * following the name, so that header entries with several numbers survive.
 */
#[derive(Clone, Debug, Default)]
pub struct ParameterTable {
    entries: BTreeMap<String, Vec<String>>,
}




// ============================================================================
impl ParameterTable {

    pub fn parse(contents: &str) -> Self {
        let entries = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('%') && !line.starts_with('#'))
            .filter_map(|line| {
                let mut tokens = line.split_whitespace();
                let name = tokens.next()?;
                Some((name.to_string(), tokens.map(String::from).collect()))
            })
            .collect();
        Self { entries }
    }

    pub fn from_file<P: AsRef<std::path::Path>>(filename: P) -> Result<Self, Error> {
        Ok(Self::parse(&std::fs::read_to_string(filename)?))
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn f64(&self, name: &str) -> Result<f64, Error> {
        let token = self
            .get(name)
            .and_then(|values| values.first())
            .ok_or_else(|| Error::Missing(name.to_string()))?;
        token.parse().map_err(|source| Error::ParseFloat { name: name.to_string(), source })
    }

    /**
     * Particle counts may be written in floating point notation (e.g. 1e5),
     * but must be whole numbers
     */
    pub fn count(&self, name: &str) -> Result<usize, Error> {
        let value = self.f64(name)?;
        if value >= 0.0 && value.fract() == 0.0 {
            Ok(value as usize)
        } else {
            Err(Error::NotACount { name: name.to_string(), value })
        }
    }

    /**
     * Boolean flags are numbers: zero is false. A missing flag is false.
     */
    pub fn flag(&self, name: &str) -> Result<bool, Error> {
        match self.get(name) {
            None => Ok(false),
            Some(_) => Ok(self.f64(name)? != 0.0),
        }
    }

    /**
     * All entries, with multi-token values joined by single spaces
     */
    pub fn to_attributes(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(name, values)| (name.clone(), values.join(" ")))
            .collect()
    }

    /**
     * Read the galaxy parameters, using the key names of the legacy format
     */
    pub fn galaxy_parameters(&self) -> Result<GalaxyParameters, Error> {
        Ok(GalaxyParameters {
            m_halo:     self.f64("M_halo")?,
            m_disk:     self.f64("M_disk")?,
            m_bulge:    self.f64("M_bulge")?,
            m_gas:      self.f64("M_gas")?,
            n_halo:     self.count("N_halo")?,
            n_disk:     self.count("N_disk")?,
            n_bulge:    self.count("N_bulge")?,
            n_gas:      self.count("N_gas")?,
            a_halo:     self.f64("a_halo")?,
            a_bulge:    self.f64("a_bulge")?,
            rd:         self.f64("Rd")?,
            z0:         self.f64("z0")?,
            halo_core:  self.flag("halo_core")?,
            bulge_core: self.flag("bulge_core")?,
        })
    }
}




// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: &str = "
% Milky Way-like galaxy
M_halo  95.2
M_disk  5.0
M_bulge 1.0
M_gas   1e-1
N_halo  1e5
N_disk  50000
N_bulge 10000
N_gas   20000
a_halo  47.0
a_bulge 1.5
Rd      3.5
z0      0.7
# cored halo
halo_core 1
";

    #[test]
    fn parses_the_legacy_parameter_file() {
        let p = ParameterTable::parse(PARAMS).galaxy_parameters().unwrap();
        assert_eq!(p.m_gas, 0.1);
        assert_eq!(p.n_halo, 100000);
        assert!(p.halo_core);
        assert!(!p.bulge_core);
    }

    #[test]
    fn missing_and_malformed_entries_are_errors() {
        let table = ParameterTable::parse("M_halo ninety\nN_gas 1.5\n");
        assert!(matches!(table.f64("M_halo"), Err(Error::ParseFloat { .. })));
        assert!(matches!(table.count("N_gas"), Err(Error::NotACount { .. })));
        assert!(matches!(table.f64("Rd"), Err(Error::Missing(_))));
    }

    #[test]
    fn header_values_keep_every_token() {
        let table = ParameterTable::parse("Time 0.0\nMassTable 0 0 0 0 0 0\n");
        let attributes = table.to_attributes();
        assert_eq!(attributes["MassTable"], "0 0 0 0 0 0");
        assert_eq!(table.get("Time").map(|v| v.len()), Some(1));
    }

    #[test]
    fn unreadable_file_is_an_io_error() {
        let path = std::env::temp_dir().join("galaxy-ic-no-such-dir").join("galaxy_param.txt");
        assert!(matches!(ParameterTable::from_file(&path), Err(Error::IO(_))));
    }
}
