//! JSON config-file adapter.
//!
//! Implements [`ConfigPort`] over a single JSON file. Fields left out of
//! the file keep their defaults; a missing file means "all defaults".

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::BotConfig;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<BotConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "JsonConfigFile: {} not found, using defaults",
                    self.path.display()
                );
                return Ok(BotConfig::default());
            }
            Err(e) => {
                warn!("JsonConfigFile: reading {}: {}", self.path.display(), e);
                return Err(ConfigError::IoError);
            }
        };

        let config: BotConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("JsonConfigFile: parsing {}: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        config.validate()?;
        info!("JsonConfigFile: loaded {}", self.path.display());
        Ok(config)
    }
}
