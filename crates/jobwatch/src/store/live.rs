//! Live query views over the job store.

use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::watch;

use super::{JobStore, Snapshot, StoreError};
use crate::db::DatabaseError;

type QueryFn<T> = Arc<dyn Fn(&Connection) -> Result<T, DatabaseError> + Send + Sync>;

/// A query that is re-evaluated every time the store publishes a new
/// snapshot. Dropping the view unsubscribes it.
pub struct LiveQuery<T> {
    store: JobStore,
    receiver: watch::Receiver<Snapshot>,
    query: QueryFn<T>,
}

impl<T> Clone for LiveQuery<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            receiver: self.receiver.clone(),
            query: Arc::clone(&self.query),
        }
    }
}

impl<T: Send + 'static> LiveQuery<T> {
    pub(crate) fn new(store: JobStore, query: QueryFn<T>) -> Self {
        let receiver = store.subscribe();
        Self {
            store,
            receiver,
            query,
        }
    }

    /// Latest revision published by the store.
    pub fn revision(&self) -> u64 {
        self.receiver.borrow().revision
    }

    /// Evaluates the query now, blocking on the connection lock.
    pub fn current(&mut self) -> Result<T, StoreError> {
        self.receiver.borrow_and_update();
        self.store.read(|conn| (*self.query)(conn))
    }

    /// Evaluates the query now on tokio's blocking pool.
    pub async fn load(&mut self) -> Result<T, StoreError> {
        self.receiver.borrow_and_update();
        let query = Arc::clone(&self.query);
        self.store.run(move |store| store.read(|conn| (*query)(conn))).await
    }

    /// Waits for the next published change, then evaluates the query.
    ///
    /// Changes published since the last `current`/`load`/`next` call are
    /// coalesced into one result.
    pub async fn next(&mut self) -> Result<T, StoreError> {
        self.receiver
            .changed()
            .await
            .map_err(|_| StoreError::Closed)?;
        self.load().await
    }
}
