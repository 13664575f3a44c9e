//! Job record store with live views.
//!
//! `JobStore` wraps the `Database` handle and the `job_repo` functions.
//! After every write that changes at least one row it reloads the full
//! posting list under the same connection lock and publishes it as a
//! `Snapshot` on a `tokio::sync::watch` channel. Live views subscribe to
//! that channel and rerun their query when the revision moves.

pub mod error;
pub mod live;

use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::watch;

use crate::db::{job_repo, Database, DatabaseError};
use crate::posting::{ApplicationStatus, JobPosting, NewJobPosting};

pub use error::StoreError;
pub use live::LiveQuery;

/// Full posting list as of a given store revision.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Incremented once per committed change.
    pub revision: u64,
    /// All postings, newest first.
    pub postings: Arc<Vec<JobPosting>>,
}

/// Durable store of classified job postings.
///
/// Cheap to clone. Synchronous methods block on the connection lock and
/// are meant for worker threads; `run` moves a closure onto tokio's
/// blocking pool for async callers.
#[derive(Clone)]
pub struct JobStore {
    db: Database,
    snapshot: Arc<watch::Sender<Snapshot>>,
}

impl JobStore {
    /// Creates a store and loads the initial snapshot.
    pub fn new(db: Database) -> Result<Self, StoreError> {
        let postings = db.with_conn(job_repo::list_all)?;
        let (sender, _) = watch::channel(Snapshot {
            revision: 0,
            postings: Arc::new(postings),
        });

        Ok(Self {
            db,
            snapshot: Arc::new(sender),
        })
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    /// Subscribes to snapshot publications.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.subscribe()
    }

    /// Runs `f` against this store on tokio's blocking pool.
    pub async fn run<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&JobStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || f(&store)).await?
    }

    /// Executes a read query under the connection lock.
    pub fn read<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        Ok(self.db.with_conn(f)?)
    }

    /// Executes a write and publishes a new snapshot if any row changed.
    fn write<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<(T, usize), DatabaseError>,
    {
        let value = self.db.with_conn(|conn| {
            let (value, changed) = f(conn)?;
            if changed > 0 {
                self.publish(conn);
            }
            Ok(value)
        })?;
        Ok(value)
    }

    fn publish(&self, conn: &Connection) {
        match job_repo::list_all(conn) {
            Ok(postings) => self.snapshot.send_modify(|snapshot| {
                snapshot.revision += 1;
                snapshot.postings = Arc::new(postings);
            }),
            // The write itself committed; views catch up on the next change.
            Err(e) => log::error!("Failed to reload postings after write: {}", e),
        }
    }

    // ─── Mutations ──────────────────────────────────────────────────────────

    /// Inserts a posting and returns the id SQLite assigned to it.
    pub fn insert(&self, posting: &NewJobPosting) -> Result<i64, StoreError> {
        self.write(|conn| job_repo::insert(conn, posting).map(|id| (id, 1)))
    }

    /// Writes the mutable fields of `posting` back to its row.
    pub fn update(&self, posting: &JobPosting) -> Result<(), StoreError> {
        self.write(|conn| job_repo::update(conn, posting).map(|n| ((), n)))
    }

    pub fn delete(&self, posting: &JobPosting) -> Result<(), StoreError> {
        self.delete_by_id(posting.id)
    }

    pub fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        self.write(|conn| job_repo::delete_by_id(conn, id).map(|n| ((), n)))
    }

    /// Deletes every id in `ids` in one transaction.
    pub fn delete_many(&self, ids: &[i64]) -> Result<(), StoreError> {
        self.write(|conn| job_repo::delete_by_ids(conn, ids).map(|n| ((), n)))
    }

    pub fn mark_as_read(&self, id: i64) -> Result<(), StoreError> {
        self.write(|conn| job_repo::mark_read(conn, id).map(|n| ((), n)))
    }

    /// Marks every id in `ids` as read in one transaction.
    pub fn mark_many_as_read(&self, ids: &[i64]) -> Result<(), StoreError> {
        self.write(|conn| job_repo::mark_read_many(conn, ids).map(|n| ((), n)))
    }

    pub fn update_status(&self, id: i64, status: ApplicationStatus) -> Result<(), StoreError> {
        self.write(|conn| job_repo::update_status(conn, id, status).map(|n| ((), n)))
    }

    /// Sets `status` on every id in `ids` in one transaction.
    pub fn update_many_status(
        &self,
        ids: &[i64],
        status: ApplicationStatus,
    ) -> Result<(), StoreError> {
        self.write(|conn| job_repo::update_status_many(conn, ids, status).map(|n| ((), n)))
    }

    pub fn set_favorite(&self, id: i64, favorite: bool) -> Result<(), StoreError> {
        self.write(|conn| job_repo::set_favorite(conn, id, favorite).map(|n| ((), n)))
    }

    // ─── One-shot queries ───────────────────────────────────────────────────

    pub fn find_by_id(&self, id: i64) -> Result<Option<JobPosting>, StoreError> {
        self.read(|conn| job_repo::find_by_id(conn, id))
    }

    pub fn all_postings(&self) -> Result<Vec<JobPosting>, StoreError> {
        self.read(job_repo::list_all)
    }

    pub fn unread_postings(&self) -> Result<Vec<JobPosting>, StoreError> {
        self.read(job_repo::list_unread)
    }

    pub fn postings_by_source(&self, source: &str) -> Result<Vec<JobPosting>, StoreError> {
        self.read(|conn| job_repo::list_by_source(conn, source))
    }

    /// Postings captured within `[start, end]` epoch millis, inclusive.
    pub fn postings_by_date_range(
        &self,
        start: i64,
        end: i64,
    ) -> Result<Vec<JobPosting>, StoreError> {
        self.read(|conn| job_repo::list_by_date_range(conn, start, end))
    }

    pub fn postings_by_status(
        &self,
        status: ApplicationStatus,
    ) -> Result<Vec<JobPosting>, StoreError> {
        self.read(|conn| job_repo::list_by_status(conn, status))
    }

    pub fn favorite_postings(&self) -> Result<Vec<JobPosting>, StoreError> {
        self.read(job_repo::list_favorites)
    }

    pub fn unread_count(&self) -> Result<u64, StoreError> {
        self.read(job_repo::count_unread)
    }

    // ─── Live views ─────────────────────────────────────────────────────────

    /// Builds a live view over an arbitrary query.
    pub fn live<T, F>(&self, query: F) -> LiveQuery<T>
    where
        F: Fn(&Connection) -> Result<T, DatabaseError> + Send + Sync + 'static,
        T: Send + 'static,
    {
        LiveQuery::new(self.clone(), Arc::new(query))
    }

    pub fn watch_all_postings(&self) -> LiveQuery<Vec<JobPosting>> {
        self.live(job_repo::list_all)
    }

    pub fn watch_unread_postings(&self) -> LiveQuery<Vec<JobPosting>> {
        self.live(job_repo::list_unread)
    }

    pub fn watch_postings_by_source(&self, source: &str) -> LiveQuery<Vec<JobPosting>> {
        let source = source.to_string();
        self.live(move |conn| job_repo::list_by_source(conn, &source))
    }

    pub fn watch_postings_by_date_range(&self, start: i64, end: i64) -> LiveQuery<Vec<JobPosting>> {
        self.live(move |conn| job_repo::list_by_date_range(conn, start, end))
    }

    pub fn watch_postings_by_status(
        &self,
        status: ApplicationStatus,
    ) -> LiveQuery<Vec<JobPosting>> {
        self.live(move |conn| job_repo::list_by_status(conn, status))
    }

    pub fn watch_favorite_postings(&self) -> LiveQuery<Vec<JobPosting>> {
        self.live(job_repo::list_favorites)
    }

    pub fn watch_unread_count(&self) -> LiveQuery<u64> {
        self.live(job_repo::count_unread)
    }
}
