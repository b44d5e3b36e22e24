//! Infrastructure implementation of the `ConfigStore` port.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::application::ports::ConfigStore;
use crate::domain::config::{CONFIG_FILE, PawsConfig};

/// Reads `paws.yaml` from the userdir, or from `$PAWS_CONFIG` when set.
pub struct YamlConfigStore {
    userdir: PathBuf,
}

impl YamlConfigStore {
    #[must_use]
    pub fn new(userdir: &Path) -> Self {
        Self {
            userdir: userdir.to_path_buf(),
        }
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<PawsConfig> {
        let path = self.path();
        if !path.exists() {
            return Ok(PawsConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(PawsConfig::default());
        }
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    fn path(&self) -> PathBuf {
        if let Ok(val) = std::env::var("PAWS_CONFIG") {
            return PathBuf::from(val);
        }
        self.userdir.join(CONFIG_FILE)
    }
}
