//! Notification intake: allowlist, classify, store.

pub mod event;
pub mod pool;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::classifier::Classifier;
use crate::clock::Clock;
use crate::store::JobStore;

pub use event::NotificationEvent;
pub use pool::{IntakePool, IntakeSubmitter, ShutdownHandle};

/// What happened to one notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IntakeOutcome {
    /// Classified as a job posting and inserted.
    #[serde(rename_all = "camelCase")]
    Stored {
        id: i64,
        source: String,
        title: String,
        timestamp: i64,
    },
    /// Not a job posting.
    #[serde(rename_all = "camelCase")]
    Ignored { package_name: String, reason: String },
    /// Classified as a posting but the insert failed; the candidate is dropped.
    #[serde(rename_all = "camelCase")]
    Failed { package_name: String, error: String },
}

/// Broadcasts intake outcomes to observers.
#[derive(Clone)]
pub struct IntakeBroadcaster {
    sender: Arc<broadcast::Sender<IntakeOutcome>>,
}

impl IntakeBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn send(&self, outcome: IntakeOutcome) {
        // No active receivers is fine
        let _ = self.sender.send(outcome);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<IntakeOutcome> {
        self.sender.subscribe()
    }
}

impl Default for IntakeBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Everything a worker needs to turn an event into a stored posting.
#[derive(Clone)]
pub struct IntakeHandler {
    classifier: Arc<Classifier>,
    store: JobStore,
    clock: Arc<dyn Clock>,
}

impl IntakeHandler {
    pub fn new(classifier: Arc<Classifier>, store: JobStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            classifier,
            store,
            clock,
        }
    }

    /// Classifies one event and inserts it on a match. Blocks on the
    /// store; call from a worker thread.
    pub fn process_event(&self, event: &NotificationEvent) -> IntakeOutcome {
        let package_name = event.package_name();
        let span = tracing::debug_span!("intake_event", package = %package_name);
        let _guard = span.enter();

        let captured_at = self.clock.now_millis();
        let posting = match self.classifier.evaluate(
            package_name,
            event.title(),
            event.text(),
            captured_at,
        ) {
            Ok(posting) => posting,
            Err(rejection) => {
                tracing::trace!(%rejection, "Notification ignored");
                return IntakeOutcome::Ignored {
                    package_name: package_name.to_string(),
                    reason: rejection.to_string(),
                };
            }
        };

        match self.store.insert(&posting) {
            Ok(id) => {
                tracing::info!(id, source = %posting.source, "Stored job posting");
                IntakeOutcome::Stored {
                    id,
                    source: posting.source,
                    title: posting.title,
                    timestamp: posting.timestamp,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to store job posting");
                IntakeOutcome::Failed {
                    package_name: package_name.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::ClassifierConfig;
    use crate::db::Database;

    fn handler() -> (IntakeHandler, JobStore) {
        let store = JobStore::new(Database::open_in_memory().unwrap()).unwrap();
        let classifier = Arc::new(Classifier::new(&ClassifierConfig::default()).unwrap());
        let clock = Arc::new(FixedClock::new(1_700_000_000_000));
        (IntakeHandler::new(classifier, store.clone(), clock), store)
    }

    #[test]
    fn test_matching_event_is_stored_with_clock_time() {
        let (handler, store) = handler();
        let outcome =
            handler.process_event(&NotificationEvent::new("com.whatsapp", "Hiring", "fresher"));

        let id = match outcome {
            IntakeOutcome::Stored { id, ref source, timestamp, .. } => {
                assert_eq!(source, "WhatsApp");
                assert_eq!(timestamp, 1_700_000_000_000);
                id
            }
            other => panic!("Expected Stored, got {:?}", other),
        };
        assert!(store.find_by_id(id).unwrap().is_some());
    }

    #[test]
    fn test_empty_event_is_ignored() {
        let (handler, store) = handler();
        let outcome = handler.process_event(&NotificationEvent::default());
        assert!(matches!(outcome, IntakeOutcome::Ignored { .. }));
        assert_eq!(store.unread_count().unwrap(), 0);
    }

    #[test]
    fn test_insert_failure_reports_failed() {
        let (handler, store) = handler();
        store
            .database()
            .with_conn(|conn| {
                conn.execute_batch("DROP TABLE job_postings;")?;
                Ok(())
            })
            .unwrap();

        let outcome =
            handler.process_event(&NotificationEvent::new("com.whatsapp", "Job", "apply"));
        assert!(matches!(outcome, IntakeOutcome::Failed { .. }));
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let outcome = IntakeOutcome::Ignored {
            package_name: "com.example".to_string(),
            reason: "source app not allowed".to_string(),
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["outcome"], "ignored");
        assert_eq!(value["packageName"], "com.example");
    }
}
