//! Versioned schema for `job_postings`.
//!
//! Each migration runs in its own transaction together with the row that
//! records it in `_migrations`, so a failed step leaves the previous
//! version intact. A file stamped by a newer build is wiped and rebuilt.

use rusqlite::Connection;

use super::error::DatabaseError;

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_job_postings_table",
        sql: include_str!("sql/001_create_job_postings.sql"),
    },
    Migration {
        version: 2,
        description: "add_job_posting_indexes",
        sql: include_str!("sql/002_add_job_posting_indexes.sql"),
    },
];

/// Highest schema version known to this build.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Brings the schema up to `latest_version()`.
pub fn run_all(conn: &Connection) -> Result<(), DatabaseError> {
    let mut version = schema_version(conn)?;

    if version > latest_version() {
        log::warn!(
            "Schema v{} is newer than supported v{}; discarding stored postings",
            version,
            latest_version()
        );
        conn.execute_batch("DROP TABLE IF EXISTS job_postings; DELETE FROM _migrations;")
            .map_err(|source| DatabaseError::Reset {
                found: version,
                source,
            })?;
        version = 0;
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > version) {
        log::info!("Applying schema v{}: {}", migration.version, migration.description);
        apply(conn, migration).map_err(|source| DatabaseError::Migration {
            version: migration.version,
            description: migration.description,
            source,
        })?;
    }

    Ok(())
}

fn apply(conn: &Connection, migration: &Migration) -> rusqlite::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.execute(
        "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
        rusqlite::params![migration.version, migration.description],
    )?;
    tx.commit()
}

/// Creates the tracking table if needed and returns the applied version.
fn schema_version(conn: &Connection) -> Result<u32, DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;
    Ok(conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |r| {
        r.get(0)
    })?)
}
