use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

const SUPPORTED_VERSION: &str = "1.0";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != SUPPORTED_VERSION {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.worker_count == 0 {
        return Err(ConfigError::Validation {
            message: "workerCount must be greater than 0".to_string(),
        });
    }

    let classifier = &config.classifier;
    if classifier.allowed_apps.is_empty() {
        return Err(ConfigError::Validation {
            message: "classifier.allowedApps must not be empty".to_string(),
        });
    }

    if classifier.keywords.iter().all(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation {
            message: "classifier.keywords must contain at least one keyword".to_string(),
        });
    }

    for (name, pattern) in [
        ("acceptPattern", &classifier.accept_pattern),
        ("batchYearPattern", &classifier.batch_year_pattern),
    ] {
        if let Err(e) = regex::Regex::new(pattern) {
            return Err(ConfigError::InvalidPattern {
                name: name.to_string(),
                reason: e.to_string(),
            });
        }
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(ConfigError::Validation {
            message: format!(
                "Unknown log level '{}', expected one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    Ok(())
}
