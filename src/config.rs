//! Configuration for building visibility fields from persisted data.
//!
//! Loaded from a single YAML file; every section is optional and falls back
//! to defaults, so a minimal deployment needs no config file at all.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::BatchBackend;
use crate::transform::LogCompression;

/// Full jyoti-map configuration loaded from YAML
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct JyotiConfig {
    /// Dynamic-range compression settings
    #[serde(default)]
    pub compression: CompressionSection,

    /// Query execution settings
    #[serde(default)]
    pub query: QuerySection,

    /// Sensor metadata settings
    #[serde(default)]
    pub sensors: SensorSection,
}

impl JyotiConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Dynamic-range compression settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionSection {
    /// Apply the codec to raw values at load time
    pub enabled: bool,
    /// Expected maximum raw value
    pub vmax: f32,
    /// Small positive floor keeping log10 finite at zero
    pub eps: f32,
    /// Output range [-1, 1] instead of [0, 1]
    pub sin_out: bool,
}

impl Default for CompressionSection {
    fn default() -> Self {
        let codec = LogCompression::default();
        Self {
            enabled: false,
            vmax: codec.vmax,
            eps: codec.eps,
            sin_out: codec.sin_out,
        }
    }
}

impl CompressionSection {
    /// The configured codec, or None when compression is disabled.
    pub fn codec(&self) -> Option<LogCompression> {
        self.enabled
            .then(|| LogCompression::new(self.vmax, self.eps, self.sin_out))
    }
}

/// Query execution settings
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QuerySection {
    /// Batch execution backend for addressing and gradient queries
    pub backend: BatchBackend,
}

/// Sensor metadata settings
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SensorSection {
    /// Path to a CSV table of sensor positions (columns x, y, z)
    pub positions: Option<PathBuf>,
}
