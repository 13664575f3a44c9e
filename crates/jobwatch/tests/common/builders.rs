//! Builder patterns for creating test data programmatically.

#![allow(dead_code)]

use jobwatch::{
    ApplicationStatus, ClassifierConfig, Config, LoggingConfig, NewJobPosting, NotificationEvent,
};

/// Builder for `NewJobPosting` instances.
pub struct PostingBuilder {
    posting: NewJobPosting,
}

impl PostingBuilder {
    pub fn new() -> Self {
        Self {
            posting: NewJobPosting::new("WhatsApp", "Hiring freshers", "Apply now", 0),
        }
    }

    pub fn source(mut self, source: &str) -> Self {
        self.posting.source = source.to_string();
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.posting.title = title.to_string();
        self
    }

    pub fn timestamp(mut self, timestamp: i64) -> Self {
        self.posting.timestamp = timestamp;
        self
    }

    pub fn read(mut self) -> Self {
        self.posting.is_read = true;
        self
    }

    pub fn favorite(mut self) -> Self {
        self.posting.is_favorite = true;
        self
    }

    pub fn status(mut self, status: ApplicationStatus) -> Self {
        self.posting.application_status = status;
        self
    }

    pub fn build(self) -> NewJobPosting {
        self.posting
    }
}

impl Default for PostingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for an event from WhatsApp.
pub fn whatsapp(title: &str, text: &str) -> NotificationEvent {
    NotificationEvent::new("com.whatsapp", title, text)
}

/// Shorthand for an event from Telegram.
pub fn telegram(title: &str, text: &str) -> NotificationEvent {
    NotificationEvent::new("org.telegram.messenger", title, text)
}

/// Builder for `Config` instances.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with sensible defaults for testing.
    pub fn new() -> Self {
        Self {
            config: Config {
                worker_count: 1,
                ..Config::default()
            },
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.config.version = version.to_string();
        self
    }

    pub fn worker_count(mut self, count: usize) -> Self {
        self.config.worker_count = count;
        self
    }

    pub fn database_path(mut self, path: &str) -> Self {
        self.config.database_path = Some(path.to_string());
        self
    }

    pub fn allowed_apps(mut self, apps: &[&str]) -> Self {
        self.config.classifier.allowed_apps = apps.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn keywords(mut self, keywords: &[&str]) -> Self {
        self.config.classifier.keywords = keywords.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn display_name(mut self, package: &str, name: &str) -> Self {
        self.config
            .classifier
            .display_names
            .insert(package.to_string(), name.to_string());
        self
    }

    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    pub fn classifier(&self) -> ClassifierConfig {
        self.config.classifier.clone()
    }

    pub fn build(self) -> Config {
        self.config
    }

    /// Serializes the config the way it would appear on disk.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.config).expect("Config serializes")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
