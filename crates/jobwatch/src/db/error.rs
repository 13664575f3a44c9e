use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("cannot create database directory {}: {source}", dir.display())]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schema v{version} ({description}) failed to apply: {source}")]
    Migration {
        version: u32,
        description: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// Dropping an unsupported newer schema failed.
    #[error("cannot reset schema v{found}: {source}")]
    Reset {
        found: u32,
        #[source]
        source: rusqlite::Error,
    },

    /// A thread panicked while it held the connection.
    #[error("database connection poisoned by a panicked caller")]
    Poisoned,
}
