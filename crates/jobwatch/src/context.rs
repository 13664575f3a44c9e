//! Application wiring.
//!
//! Builds the classifier, database, store, board and intake pool in that
//! order and hands them to the caller. Nothing here is global.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::board::JobBoard;
use crate::classifier::Classifier;
use crate::clock::{Clock, SystemClock};
use crate::config::loader::validate_config;
use crate::config::Config;
use crate::db::Database;
use crate::error::{ConfigError, IntakeError, Result};
use crate::intake::{IntakeBroadcaster, IntakeHandler, IntakeOutcome, IntakePool, NotificationEvent};
use crate::store::JobStore;

pub struct AppContext {
    config: Config,
    classifier: Arc<Classifier>,
    store: JobStore,
    board: JobBoard,
    intake: IntakePool,
}

impl AppContext {
    /// Opens the configured database and starts the intake workers.
    pub fn initialize(config: Config) -> Result<Self> {
        validate_config(&config)?;
        let classifier = Arc::new(Classifier::new(&config.classifier)?);

        let path = config
            .resolved_database_path()
            .ok_or_else(|| ConfigError::Validation {
                message: "Could not determine home directory for the database".to_string(),
            })?;
        let db = Database::open(&path)?;

        Self::assemble(config, classifier, db, Arc::new(SystemClock))
    }

    /// Like `initialize`, with a caller-supplied database and clock.
    pub fn initialize_with(config: Config, db: Database, clock: Arc<dyn Clock>) -> Result<Self> {
        validate_config(&config)?;
        let classifier = Arc::new(Classifier::new(&config.classifier)?);
        Self::assemble(config, classifier, db, clock)
    }

    fn assemble(
        config: Config,
        classifier: Arc<Classifier>,
        db: Database,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let location = db
            .path()
            .map_or_else(|| ":memory:".to_string(), |p| p.display().to_string());
        let store = JobStore::new(db)?;
        let board = JobBoard::new(store.clone());
        let handler = IntakeHandler::new(Arc::clone(&classifier), store.clone(), clock);
        let intake = IntakePool::new(handler, config.worker_count, IntakeBroadcaster::default())?;

        tracing::info!(
            workers = config.worker_count,
            database = %location,
            "Application context initialized"
        );

        Ok(Self {
            config,
            classifier,
            store,
            board,
            intake,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    pub fn board(&self) -> &JobBoard {
        &self.board
    }

    pub fn intake(&self) -> &IntakePool {
        &self.intake
    }

    /// Queues a notification for classification.
    pub fn submit(&self, event: NotificationEvent) -> std::result::Result<(), IntakeError> {
        self.intake.submit(event)
    }

    pub fn subscribe_outcomes(&self) -> broadcast::Receiver<IntakeOutcome> {
        self.intake.outcomes().subscribe()
    }

    /// Drains the intake queue, stops the workers and returns the board.
    pub fn finish(self) -> JobBoard {
        self.intake.wait();
        self.board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    #[test]
    fn test_initialize_with_in_memory_db() {
        let config = Config {
            worker_count: 1,
            ..Config::default()
        };
        let db = Database::open_in_memory().unwrap();
        let ctx = AppContext::initialize_with(config, db, Arc::new(FixedClock::new(10))).unwrap();

        ctx.submit(NotificationEvent::new("com.whatsapp", "Hiring", "fresher"))
            .unwrap();
        let board = ctx.finish();

        let postings = board.store().all_postings().unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].timestamp, 10);
    }

    #[test]
    fn test_initialize_rejects_invalid_config() {
        let config = Config {
            worker_count: 0,
            ..Config::default()
        };
        let db = Database::open_in_memory().unwrap();
        let result = AppContext::initialize_with(config, db, Arc::new(SystemClock));
        assert!(matches!(result, Err(crate::JobwatchError::Config(_))));
    }

    #[test]
    fn test_initialize_opens_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("jobs.db");
        let config = Config {
            database_path: Some(path.to_string_lossy().to_string()),
            worker_count: 1,
            ..Config::default()
        };

        let ctx = AppContext::initialize(config).unwrap();
        assert!(path.exists());
        ctx.finish();
    }
}
