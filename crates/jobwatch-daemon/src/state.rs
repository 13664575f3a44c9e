//! Config discovery for the daemon.

use std::path::{Path, PathBuf};

use jobwatch::{load_config, Config, ConfigError};
use log::info;

/// `~/.jobwatch/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".jobwatch").join("config.json"))
}

/// Loads the config from an explicit path, or from the default location.
///
/// An explicit path must exist. A missing default file falls back to
/// built-in defaults.
pub fn load_daemon_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => load_config(&path),
        Some(path) => {
            info!("No config at {:?}, using defaults", path);
            Ok(Config::default())
        }
        None => {
            info!("Could not determine home directory, using default config");
            Ok(Config::default())
        }
    }
}
