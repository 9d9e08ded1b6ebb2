pub static DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
pub static VERSION_AND_BUILD: &str = git_version::git_version!(prefix=concat!("v", env!("CARGO_PKG_VERSION"), " "), fallback="unknown");


use std::{
    collections::BTreeMap,
    ffi::OsStr,
    fs::{File, read_to_string},
    path::Path,
};
use rand::SeedableRng;
use rand_chacha::ChaChaRng;
use serde::{
    Serialize,
    Deserialize,
};
use crate::catalog::{ParticleCatalog, Snapshot};
use crate::config_patch::{self, Patch};
use crate::galaxy::{self, GalaxyParameters};
use crate::mesh::Mesh;
use crate::param_file::{self, ParameterTable};
use crate::potential::DiskKernel;
use crate::thermal::IdealGas;
use crate::traits::DiskPotential;


// ============================================================================
#[derive(thiserror::Error, Debug)]
pub enum Error {

    #[error("{0}")]
    IO(#[from] std::io::Error),

    #[error("{0}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    ConfigPatch(#[from] config_patch::Error),

    #[error("{0}")]
    ParamFile(#[from] param_file::Error),

    #[error("header.txt or galaxy_param.txt missing in {0}")]
    MissingLegacyFiles(String),

    #[error("unknown input file type '{0}'")]
    UnknownInputType(String),
}


/**
 * Run control: the random seed and the snapshot file name, which is placed
 * next to the input file
 */
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Control {
    #[serde(default)]
    pub seed: u64,

    #[serde(default = "Control::default_output")]
    pub output: String,
}


/**
 * User configuration
 */
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    pub galaxy: GalaxyParameters,

    #[serde(default)]
    pub mesh: Mesh,

    #[serde(default)]
    pub potential: DiskKernel,

    #[serde(default)]
    pub gas: IdealGas,

    #[serde(default)]
    pub control: Control,

    /// Attributes copied verbatim into the snapshot header
    #[serde(default)]
    pub header: BTreeMap<String, String>,
}


/**
 * App state
 */
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct App {
    pub config: Configuration,
    pub version: String,
}




// ============================================================================
impl Default for Control {
    fn default() -> Self {
        Self { seed: 0, output: Self::default_output() }
    }
}

impl Control {
    fn default_output() -> String {
        "galaxy.cbor".to_string()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.output.is_empty() {
            anyhow::bail!("control: output file name must not be empty")
        }
        Ok(())
    }
}




// ============================================================================
impl Configuration {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.galaxy.validate()?;
        self.mesh.validate()?;
        self.mesh.validate_extents(self.galaxy.a_halo)?;
        self.potential.validate()?;
        self.gas.validate()?;
        self.control.validate()?;
        Ok(())
    }

    /**
     * Build a configuration from the legacy galaxy_param.txt and header.txt
     * pair in the given directory, with defaults for everything else
     */
    pub fn from_legacy_directory(directory: &str) -> Result<Self, Error> {
        let dir = Path::new(directory);
        let (params_file, header_file) = (dir.join("galaxy_param.txt"), dir.join("header.txt"));

        if !(params_file.is_file() && header_file.is_file()) {
            return Err(Error::MissingLegacyFiles(directory.to_string()))
        }
        let galaxy = ParameterTable::from_file(params_file)?.galaxy_parameters()?;
        let header = ParameterTable::from_file(header_file)?.to_attributes();

        Ok(Self {
            galaxy,
            mesh: Mesh::default(),
            potential: DiskKernel::default(),
            gas: IdealGas::default(),
            control: Control::default(),
            header,
        })
    }
}




// ============================================================================
impl App {

    /**
     * Return self as a result, which will be in an error state if any of the
     * configuration items did not pass validation.
     */
    pub fn validate(self) -> anyhow::Result<Self> {
        self.config.validate()?;
        Ok(self)
    }

    /**
     * Construct a new App instance from a user configuration, applying
     * patches in order. A patch is either a `key.path=value` string or the
     * name of a YAML file.
     */
    pub fn from_config(mut config: Configuration, patches: &[String]) -> Result<Self, Error> {
        for patch in patches {
            if patch.ends_with(".yaml") {
                config.patch_from_reader(File::open(patch)?)?
            } else {
                config.patch_from_key_val(patch)?
            }
        }
        Ok(Self { config, version: VERSION_AND_BUILD.to_string() })
    }

    /**
     * Construct a new App instance from a file: may be a config.yaml, or a
     * directory holding the legacy parameter and header files.
     */
    pub fn from_file(filename: &str, patches: &[String]) -> Result<Self, Error> {
        if Path::new(filename).is_dir() {
            return Self::from_config(Configuration::from_legacy_directory(filename)?, patches)
        }
        match Path::new(&filename).extension().and_then(OsStr::to_str) {
            Some("yaml") => Self::from_config(serde_yaml::from_str(&read_to_string(filename)?)?, patches),
            _ => Err(Error::UnknownInputType(filename.to_string())),
        }
    }

    /**
     * Construct a new App instance from a preset (hard-coded) configuration
     * name, or otherwise an input file if no matching preset is found.
     */
    pub fn from_preset_or_file(input: &str, patches: &[String]) -> Result<Self, Error> {
        match input {
            "milky_way" => Self::from_config(serde_yaml::from_str(std::include_str!("../setups/milky_way.yaml"))?, patches),
            _ => Self::from_file(input, patches),
        }
    }

    /**
     * Generate the particle catalog, seeding the random number generator
     * from the configuration
     */
    pub fn run(&self) -> Result<ParticleCatalog, galaxy::Error> {
        let config = &self.config;
        let mut rng = ChaChaRng::seed_from_u64(config.control.seed);
        log::info!("{} particles, seed {}", config.galaxy.n_total(), config.control.seed);
        galaxy::generate(&config.galaxy, &config.mesh, &config.potential, &config.gas, &mut rng)
    }

    /**
     * Assemble a snapshot from a generated catalog, with the configured
     * header attributes and the code version
     */
    pub fn snapshot(&self, catalog: &ParticleCatalog) -> Result<Snapshot, galaxy::Error> {
        let mut attributes = self.config.header.clone();
        attributes.insert("GeneratorVersion".to_string(), self.version.clone());
        Ok(catalog.assemble(attributes)?)
    }
}
