use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Always-accept pattern: current batch, freshers and recent graduates.
pub const DEFAULT_ACCEPT_PATTERN: &str =
    r".*\b2025\s*batch\b.*|.*\bfresher\b.*|.*\brecent\s*graduate\b.*";

/// Any "20XX batch" mention; rejects postings aimed at other batches.
pub const DEFAULT_BATCH_YEAR_PATTERN: &str = r".*\b20[0-9]{2}\s*batch\b.*";

/// Database location relative to the home directory.
const DEFAULT_DATABASE_PATH: &str = ".jobwatch/data/jobwatch.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub version: String,
    /// SQLite file; `~` expands to the home directory. Defaults to
    /// `~/.jobwatch/data/jobwatch.db`.
    #[serde(default)]
    pub database_path: Option<String>,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_worker_count() -> usize {
    num_cpus::get()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            database_path: None,
            worker_count: default_worker_count(),
            classifier: ClassifierConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Resolves `database_path`, expanding a leading `~`. Falls back to the
    /// default location when unset.
    pub fn resolved_database_path(&self) -> Option<PathBuf> {
        match &self.database_path {
            Some(path) => Some(expand_home(path)),
            None => dirs::home_dir().map(|home| home.join(DEFAULT_DATABASE_PATH)),
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierConfig {
    /// Package ids whose notifications are considered at all.
    #[serde(default = "default_allowed_apps")]
    pub allowed_apps: Vec<String>,
    /// Case-insensitive substrings; at least one must occur.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_accept_pattern")]
    pub accept_pattern: String,
    #[serde(default = "default_batch_year_pattern")]
    pub batch_year_pattern: String,
    /// Package id to source label. Unmapped ids are stored verbatim.
    #[serde(default = "default_display_names")]
    pub display_names: BTreeMap<String, String>,
}

fn default_allowed_apps() -> Vec<String> {
    vec![
        "com.whatsapp".to_string(),
        "org.telegram.messenger".to_string(),
    ]
}

fn default_keywords() -> Vec<String> {
    [
        "job",
        "career",
        "hiring",
        "opening",
        "position",
        "vacancy",
        "recruitment",
        "opportunity",
        "apply",
        "fresher",
        "graduate",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_accept_pattern() -> String {
    DEFAULT_ACCEPT_PATTERN.to_string()
}

fn default_batch_year_pattern() -> String {
    DEFAULT_BATCH_YEAR_PATTERN.to_string()
}

fn default_display_names() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("com.whatsapp".to_string(), "WhatsApp".to_string()),
        (
            "org.telegram.messenger".to_string(),
            "Telegram".to_string(),
        ),
    ])
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            allowed_apps: default_allowed_apps(),
            keywords: default_keywords(),
            accept_pattern: default_accept_pattern(),
            batch_year_pattern: default_batch_year_pattern(),
            display_names: default_display_names(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error. `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}
