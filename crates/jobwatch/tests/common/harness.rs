//! Test harness for isolated test execution.
//!
//! Each `TestHarness` owns a temporary directory holding its own SQLite
//! file, so tests never share state.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use jobwatch::{
    AppContext, Classifier, ClassifierConfig, Config, Database, FixedClock, IntakeBroadcaster,
    IntakeHandler, IntakeOutcome, JobBoard, JobPosting, JobStore, NewJobPosting,
    NotificationEvent,
};

/// Capture time the harness clock starts at (2025-01-01T00:00:00Z).
pub const START_MILLIS: i64 = 1_735_689_600_000;

pub struct TestHarness {
    temp_dir: TempDir,
    pub db_path: PathBuf,
    pub clock: Arc<FixedClock>,
    pub store: JobStore,
    pub board: JobBoard,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("data").join("jobwatch.db");
        let db = Database::open(&db_path).expect("Failed to open test database");
        let store = JobStore::new(db).expect("Failed to create store");
        let board = JobBoard::new(store.clone());

        Self {
            temp_dir,
            db_path,
            clock: Arc::new(FixedClock::new(START_MILLIS)),
            store,
            board,
        }
    }

    /// Builds an `AppContext` over a fresh database in this harness's temp dir.
    pub fn context(&self, config: Config) -> AppContext {
        let path = self.temp_dir.path().join("context.db");
        let db = Database::open(&path).expect("Failed to open context database");
        AppContext::initialize_with(config, db, self.clock.clone())
            .expect("Failed to initialize context")
    }

    /// An intake handler over this harness's store using default classifier settings.
    pub fn handler(&self) -> IntakeHandler {
        self.handler_with(&ClassifierConfig::default())
    }

    pub fn handler_with(&self, config: &ClassifierConfig) -> IntakeHandler {
        let classifier = Arc::new(Classifier::new(config).expect("Invalid classifier config"));
        IntakeHandler::new(classifier, self.store.clone(), self.clock.clone())
    }

    /// Runs one event through the intake synchronously.
    pub fn ingest(&self, event: &NotificationEvent) -> IntakeOutcome {
        self.handler().process_event(event)
    }

    /// Inserts a posting directly and returns the stored record.
    pub fn insert(&self, posting: NewJobPosting) -> JobPosting {
        let id = self.store.insert(&posting).expect("Insert failed");
        self.store
            .find_by_id(id)
            .expect("Lookup failed")
            .expect("Inserted posting missing")
    }

    /// Inserts one posting per timestamp and returns their ids in order.
    pub fn insert_at(&self, timestamps: &[i64]) -> Vec<i64> {
        timestamps
            .iter()
            .map(|&ts| self.insert(crate::common::PostingBuilder::new().timestamp(ts).build()).id)
            .collect()
    }

    pub fn ids(postings: &[JobPosting]) -> Vec<i64> {
        postings.iter().map(|p| p.id).collect()
    }

    pub fn broadcaster() -> IntakeBroadcaster {
        IntakeBroadcaster::default()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Upper bound for awaiting a reactive update in tests.
pub const UPDATE_TIMEOUT: Duration = Duration::from_secs(5);
