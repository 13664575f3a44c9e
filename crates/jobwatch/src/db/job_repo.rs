//! Job posting repository: CRUD operations for the `job_postings` table.
//!
//! Functions take a `&Connection` so callers can combine a write with a
//! follow-up read under a single lock (see `JobStore`). Every list query
//! orders by `timestamp DESC, id DESC`.

use rusqlite::{params, Connection, Row};

use super::DatabaseError;
use crate::posting::{ApplicationStatus, JobPosting, NewJobPosting};

const SELECT_COLUMNS: &str = "SELECT id, source, title, content, timestamp, is_read, \
     application_status, is_favorite FROM job_postings";

const ORDER_BY: &str = "ORDER BY timestamp DESC, id DESC";

fn from_row(row: &Row<'_>) -> Result<JobPosting, rusqlite::Error> {
    Ok(JobPosting {
        id: row.get("id")?,
        source: row.get("source")?,
        title: row.get("title")?,
        content: row.get("content")?,
        timestamp: row.get("timestamp")?,
        is_read: row.get("is_read")?,
        application_status: row.get("application_status")?,
        is_favorite: row.get("is_favorite")?,
    })
}

fn list_where<P: rusqlite::Params>(
    conn: &Connection,
    condition: &str,
    params: P,
) -> Result<Vec<JobPosting>, DatabaseError> {
    let sql = format!("{} {} {}", SELECT_COLUMNS, condition, ORDER_BY);
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt
        .query_map(params, from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Inserts a new posting and returns its generated id.
pub fn insert(conn: &Connection, posting: &NewJobPosting) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO job_postings (source, title, content, timestamp, is_read,
         application_status, is_favorite)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            posting.source,
            posting.title,
            posting.content,
            posting.timestamp,
            posting.is_read,
            posting.application_status,
            posting.is_favorite,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Updates the mutable columns of a posting. `source`, `title`, `content`
/// and `timestamp` are fixed at capture time and never rewritten.
pub fn update(conn: &Connection, posting: &JobPosting) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE job_postings SET is_read = ?2, application_status = ?3, is_favorite = ?4
         WHERE id = ?1",
        params![
            posting.id,
            posting.is_read,
            posting.application_status,
            posting.is_favorite,
        ],
    )?;
    Ok(changed)
}

/// Deletes a single posting by id.
pub fn delete_by_id(conn: &Connection, id: i64) -> Result<usize, DatabaseError> {
    let changed = conn.execute("DELETE FROM job_postings WHERE id = ?1", params![id])?;
    Ok(changed)
}

/// Deletes every posting in `ids` inside one transaction.
pub fn delete_by_ids(conn: &Connection, ids: &[i64]) -> Result<usize, DatabaseError> {
    for_each_id(conn, ids, "DELETE FROM job_postings WHERE id = ?1", |stmt, id| {
        stmt.execute(params![id])
    })
}

/// Marks a posting as read. Already-read rows are left untouched.
pub fn mark_read(conn: &Connection, id: i64) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE job_postings SET is_read = 1 WHERE id = ?1 AND is_read = 0",
        params![id],
    )?;
    Ok(changed)
}

/// Marks every posting in `ids` as read inside one transaction.
pub fn mark_read_many(conn: &Connection, ids: &[i64]) -> Result<usize, DatabaseError> {
    for_each_id(
        conn,
        ids,
        "UPDATE job_postings SET is_read = 1 WHERE id = ?1 AND is_read = 0",
        |stmt, id| stmt.execute(params![id]),
    )
}

/// Sets the application status of one posting.
pub fn update_status(
    conn: &Connection,
    id: i64,
    status: ApplicationStatus,
) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE job_postings SET application_status = ?2
         WHERE id = ?1 AND application_status != ?2",
        params![id, status],
    )?;
    Ok(changed)
}

/// Sets the application status of every posting in `ids` inside one transaction.
pub fn update_status_many(
    conn: &Connection,
    ids: &[i64],
    status: ApplicationStatus,
) -> Result<usize, DatabaseError> {
    for_each_id(
        conn,
        ids,
        "UPDATE job_postings SET application_status = ?2
         WHERE id = ?1 AND application_status != ?2",
        |stmt, id| stmt.execute(params![id, status]),
    )
}

/// Sets or clears the favorite flag of one posting.
pub fn set_favorite(conn: &Connection, id: i64, favorite: bool) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE job_postings SET is_favorite = ?2 WHERE id = ?1 AND is_favorite != ?2",
        params![id, favorite],
    )?;
    Ok(changed)
}

/// Runs one prepared statement per id in a transaction; all or nothing.
fn for_each_id<F>(
    conn: &Connection,
    ids: &[i64],
    sql: &str,
    mut exec: F,
) -> Result<usize, DatabaseError>
where
    F: FnMut(&mut rusqlite::CachedStatement<'_>, i64) -> Result<usize, rusqlite::Error>,
{
    if ids.is_empty() {
        return Ok(0);
    }

    let tx = conn.unchecked_transaction()?;
    let mut changed = 0;
    {
        let mut stmt = tx.prepare_cached(sql)?;
        for &id in ids {
            changed += exec(&mut stmt, id)?;
        }
    }
    tx.commit()?;
    Ok(changed)
}

/// Finds a posting by its id.
pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<JobPosting>, DatabaseError> {
    let mut rows = list_where(conn, "WHERE id = ?1", params![id])?;
    Ok(rows.pop())
}

/// All postings, newest first.
pub fn list_all(conn: &Connection) -> Result<Vec<JobPosting>, DatabaseError> {
    list_where(conn, "", [])
}

/// Postings that have never been opened.
pub fn list_unread(conn: &Connection) -> Result<Vec<JobPosting>, DatabaseError> {
    list_where(conn, "WHERE is_read = 0", [])
}

/// Postings captured from the given source label (exact match).
pub fn list_by_source(conn: &Connection, source: &str) -> Result<Vec<JobPosting>, DatabaseError> {
    list_where(conn, "WHERE source = ?1", params![source])
}

/// Postings whose timestamp lies in `[start, end]`, both inclusive.
pub fn list_by_date_range(
    conn: &Connection,
    start: i64,
    end: i64,
) -> Result<Vec<JobPosting>, DatabaseError> {
    list_where(conn, "WHERE timestamp BETWEEN ?1 AND ?2", params![start, end])
}

/// Postings with the given application status.
pub fn list_by_status(
    conn: &Connection,
    status: ApplicationStatus,
) -> Result<Vec<JobPosting>, DatabaseError> {
    list_where(conn, "WHERE application_status = ?1", params![status])
}

/// Postings marked as favorite.
pub fn list_favorites(conn: &Connection) -> Result<Vec<JobPosting>, DatabaseError> {
    list_where(conn, "WHERE is_favorite = 1", [])
}

/// Number of unread postings.
pub fn count_unread(conn: &Connection) -> Result<u64, DatabaseError> {
    let count: u64 = conn.query_row(
        "SELECT COUNT(*) FROM job_postings WHERE is_read = 0",
        [],
        |r| r.get(0),
    )?;
    Ok(count)
}
