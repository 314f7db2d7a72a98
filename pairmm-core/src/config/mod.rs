pub mod constants;
pub mod profiles;
pub mod types;

pub use profiles::{ConfigProfile, ProfileName};
pub use types::*;

use anyhow::{bail, Context, Result};
use std::path::Path;

impl EngineConfig {
    /// Load configuration from a TOML or JSON file, chosen by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: EngineConfig = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&raw)
                .with_context(|| format!("Failed to parse TOML config {}", path.display()))?,
            Some("json") => serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse JSON config {}", path.display()))?,
            other => bail!(
                "Unsupported config format {:?} for {}, expected .toml or .json",
                other,
                path.display()
            ),
        };

        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;

        Ok(config)
    }
}
