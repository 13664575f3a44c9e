//! Store error types.

use thiserror::Error;

use crate::db::DatabaseError;

/// Errors surfaced by `JobStore` and its live views.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Blocking store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// The store that fed a live view has been dropped.
    #[error("Job store closed")]
    Closed,
}
