//! Configuration for the case study
//!
//! The model reads a single selector, `CS_VERSION`, from the
//! `[SUL CONFIGURATION]` section of an INI source:
//!
//! ```ini
//! [SUL CONFIGURATION]
//! CS_VERSION = 8
//! ```
//!
//! A missing section or key, or a value that is not an integer, is fatal.

use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};

/// Case-study configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SulConfig {
    #[serde(rename = "sul configuration", alias = "SUL CONFIGURATION")]
    pub sul: SulSection,
}

/// `[SUL CONFIGURATION]` section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SulSection {
    /// Event-alphabet version selector
    #[serde(rename = "cs_version", alias = "CS_VERSION")]
    pub cs_version: u32,
}

impl SulConfig {
    pub fn new(cs_version: u32) -> Self {
        Self {
            sul: SulSection { cs_version },
        }
    }

    /// Event-alphabet version selector
    pub fn cs_version(&self) -> u32 {
        self.sul.cs_version
    }

    /// Load from an INI file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path
            .to_str()
            .ok_or_else(|| Error::Configuration(format!("non UTF-8 path {}", path.display())))?;

        let config = Config::builder()
            .add_source(File::new(path_str, FileFormat::Ini).required(true))
            .build()?
            .try_deserialize::<SulConfig>()?;

        info!(path = %path.display(), cs_version = config.cs_version(), "Configuration loaded");
        Ok(config)
    }

    /// Load from INI text
    pub fn from_ini_str(content: &str) -> Result<Self> {
        Ok(Config::builder()
            .add_source(File::from_str(content, FileFormat::Ini))
            .build()?
            .try_deserialize::<SulConfig>()?)
    }
}

/// Settings of the diagnostic exercise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseConfig {
    /// Directory holding trace files
    #[serde(default = "default_trace_dir")]
    pub trace_dir: PathBuf,

    /// File-name prefix selecting this case study's traces
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Event tags whose following segments are estimated, in word order
    #[serde(default = "default_segment_prefix")]
    pub segment_prefix: Vec<String>,

    /// Whether hypothesis-testing verdicts are committed to the mode map
    #[serde(default = "default_save")]
    pub save_verdicts: bool,
}

fn default_trace_dir() -> PathBuf {
    PathBuf::from("./resources/traces/uppaal")
}

fn default_file_prefix() -> String {
    "THERMO".to_string()
}

fn default_segment_prefix() -> Vec<String> {
    vec!["h_0".to_string()]
}

fn default_save() -> bool {
    true
}

impl Default for ExerciseConfig {
    fn default() -> Self {
        Self {
            trace_dir: default_trace_dir(),
            file_prefix: default_file_prefix(),
            segment_prefix: default_segment_prefix(),
            save_verdicts: default_save(),
        }
    }
}
