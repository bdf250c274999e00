//! XDG-compliant path resolution for narrplan.

use std::path::PathBuf;

use crate::error::ConfigError;

const APP_DIR: &str = "narrplan";

/// Global XDG-compliant directories for narrplan.
#[derive(Debug, Clone)]
pub struct NarrPaths {
    /// `$XDG_CONFIG_HOME/narrplan/`
    pub config_dir: PathBuf,
}

impl NarrPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> Result<Self, ConfigError> {
        let config_home = match std::env::var("XDG_CONFIG_HOME") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .map_err(|_| ConfigError::NoHome)?,
        };
        Ok(Self {
            config_dir: config_home.join(APP_DIR),
        })
    }

    /// Path to the global config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }
}
