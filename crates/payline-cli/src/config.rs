use std::fs;
use std::path::Path;

use anyhow::Context;
use payline_audit::BatchConfig;
use payline_chain::ChainConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "payline.toml";

/// CLI configuration file: `[batch]` and `[chain]` sections, both optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaylineConfig {
    pub batch: BatchConfig,
    pub chain: ChainConfig,
}

impl PaylineConfig {
    /// Load `path`, or `payline.toml` in the working directory if it exists,
    /// or fall back to defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
