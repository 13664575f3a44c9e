//! Stdin event source and outcome logging.

use std::io::BufRead;

use jobwatch::{IntakeOutcome, IntakeSubmitter, NotificationEvent};
use log::{debug, info, warn};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Counts from one pass over the input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReadStats {
    pub submitted: usize,
    pub skipped: usize,
}

/// Reads newline-delimited JSON notification events and submits them.
///
/// Blank lines are ignored. Lines that are not UTF-8 or not a valid event
/// are skipped with a warning. Stops early on an I/O error or once the
/// intake refuses new events.
pub fn read_events<R: BufRead>(mut reader: R, submitter: &IntakeSubmitter) -> ReadStats {
    let mut stats = ReadStats::default();
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => line_no += 1,
            Err(e) => {
                warn!("Failed to read input line {}: {}", line_no + 1, e);
                break;
            }
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                warn!("Skipping non-UTF-8 input on line {}: {}", line_no, e);
                stats.skipped += 1;
                continue;
            }
        };

        if line.is_empty() {
            continue;
        }

        let event: NotificationEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!("Skipping malformed event on line {}: {}", line_no, e);
                stats.skipped += 1;
                continue;
            }
        };

        if let Err(e) = submitter.submit(event) {
            info!("Intake stopped accepting events: {}", e);
            break;
        }
        stats.submitted += 1;
    }

    stats
}

/// Logs every intake outcome until the intake shuts down.
pub fn spawn_outcome_logger(mut rx: broadcast::Receiver<IntakeOutcome>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(IntakeOutcome::Stored { id, source, title, .. }) => {
                    info!("Stored posting #{} from {}: {}", id, source, title);
                }
                Ok(IntakeOutcome::Ignored {
                    package_name,
                    reason,
                }) => {
                    debug!("Ignored notification from {}: {}", package_name, reason);
                }
                Ok(IntakeOutcome::Failed {
                    package_name,
                    error,
                }) => {
                    warn!("Dropped posting from {}: {}", package_name, error);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Outcome logger lagged, {} outcomes skipped", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use jobwatch::{
        ClassifierConfig, Classifier, Database, FixedClock, IntakeBroadcaster, IntakeHandler,
        IntakePool, JobStore,
    };

    use super::*;

    fn test_pool() -> (JobStore, IntakePool) {
        let store = JobStore::new(Database::open_in_memory().unwrap()).unwrap();
        let classifier = Arc::new(Classifier::new(&ClassifierConfig::default()).unwrap());
        let handler = IntakeHandler::new(classifier, store.clone(), Arc::new(FixedClock::new(1)));
        let pool = IntakePool::new(handler, 1, IntakeBroadcaster::default()).unwrap();
        (store, pool)
    }

    #[test]
    fn test_read_events_skips_bad_lines() {
        let (store, pool) = test_pool();

        let input = concat!(
            r#"{"packageName": "com.whatsapp", "title": "Hiring", "text": "fresher"}"#,
            "\n\nnot json\n",
            r#"{"packageName": "org.telegram.messenger", "title": "Job", "text": "apply"}"#,
            "\n"
        );

        let submitter = pool.submitter();
        let stats = read_events(Cursor::new(input), &submitter);
        drop(submitter);
        pool.wait();

        assert_eq!(
            stats,
            ReadStats {
                submitted: 2,
                skipped: 1
            }
        );
        assert_eq!(store.unread_count().unwrap(), 2);
    }

    #[test]
    fn test_non_utf8_line_does_not_stop_reading() {
        let (store, pool) = test_pool();

        let mut input = b"{\"packageName\": \"com.whatsapp\", \"title\": \"Hiring \xff\"}\n".to_vec();
        input.extend_from_slice(
            br#"{"packageName": "com.whatsapp", "title": "Hiring", "text": "fresher"}"#,
        );

        let submitter = pool.submitter();
        let stats = read_events(Cursor::new(input), &submitter);
        drop(submitter);
        pool.wait();

        assert_eq!(
            stats,
            ReadStats {
                submitted: 1,
                skipped: 1
            }
        );
        assert_eq!(store.unread_count().unwrap(), 1);
    }
}
