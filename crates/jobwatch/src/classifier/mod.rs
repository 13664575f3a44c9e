//! Heuristic job-posting classifier.
//!
//! Decides whether a notification looks like a job posting aimed at the
//! current graduating batch. Classification is pure: no I/O, no clock.

pub mod matcher;

use std::collections::{BTreeMap, HashSet};

use crate::config::ClassifierConfig;
use crate::error::ConfigError;
use crate::posting::NewJobPosting;

pub use matcher::{FullMatchPattern, KeywordMatcher};

/// Why a notification was not turned into a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The source app is not on the allowlist.
    SourceNotAllowed,
    /// No configured keyword occurs in the text.
    NoKeyword,
    /// The text names a batch year other than the accepted one.
    OtherBatch,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::SourceNotAllowed => write!(f, "source app not allowed"),
            Rejection::NoKeyword => write!(f, "no job keyword"),
            Rejection::OtherBatch => write!(f, "targets another batch"),
        }
    }
}

pub struct Classifier {
    allowed_apps: HashSet<String>,
    keywords: KeywordMatcher,
    accept: FullMatchPattern,
    batch_year: FullMatchPattern,
    display_names: BTreeMap<String, String>,
}

impl Classifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self, ConfigError> {
        let accept = FullMatchPattern::new("acceptPattern", &config.accept_pattern)?;
        let batch_year = FullMatchPattern::new("batchYearPattern", &config.batch_year_pattern)?;
        log::debug!(
            "Classifier ready for {} apps (accept: {}, batch year: {})",
            config.allowed_apps.len(),
            accept.as_str(),
            batch_year.as_str()
        );

        Ok(Self {
            allowed_apps: config.allowed_apps.iter().cloned().collect(),
            keywords: KeywordMatcher::new(&config.keywords),
            accept,
            batch_year,
            display_names: config.display_names.clone(),
        })
    }

    /// Classifies a notification; `captured_at` is epoch millis.
    pub fn classify(
        &self,
        source_app: &str,
        title: &str,
        body: &str,
        captured_at: i64,
    ) -> Option<NewJobPosting> {
        self.evaluate(source_app, title, body, captured_at).ok()
    }

    /// Like `classify`, but reports which check rejected the notification.
    pub fn evaluate(
        &self,
        source_app: &str,
        title: &str,
        body: &str,
        captured_at: i64,
    ) -> Result<NewJobPosting, Rejection> {
        if !self.is_allowed(source_app) {
            return Err(Rejection::SourceNotAllowed);
        }

        let combined = format!("{} {}", title, body).to_lowercase();

        if !self.keywords.matches(&combined) {
            return Err(Rejection::NoKeyword);
        }

        if !self.passes_batch_filter(&combined) {
            return Err(Rejection::OtherBatch);
        }

        Ok(NewJobPosting::new(
            self.display_name(source_app),
            title,
            body,
            captured_at,
        ))
    }

    pub fn is_allowed(&self, source_app: &str) -> bool {
        self.allowed_apps.contains(source_app)
    }

    /// Source label for a package id; unmapped ids are returned unchanged.
    pub fn display_name<'a>(&'a self, source_app: &'a str) -> &'a str {
        self.display_names
            .get(source_app)
            .map(String::as_str)
            .unwrap_or(source_app)
    }

    fn passes_batch_filter(&self, combined: &str) -> bool {
        self.accept.is_full_match(combined) || !self.batch_year.is_full_match(combined)
    }
}
