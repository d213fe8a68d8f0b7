use std::path::PathBuf;

use serde::Deserialize;

/// Where the reference data comes from
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TransitModelConfig {
    /// JSON reference-data file; the built-in Monterrey network when `None`
    pub data_path: Option<PathBuf>,
}

