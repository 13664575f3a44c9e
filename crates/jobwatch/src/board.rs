//! Presentation-facing facade over the store, filter and selection.
//!
//! Every command runs its storage work off the caller's task. Failures
//! are logged and returned so the caller can keep the record on screen
//! and offer a retry.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::filter::{FilterEngine, FilterState, FilterType, FilteredView};
use crate::posting::{ApplicationStatus, JobPosting};
use crate::selection::{SelectionController, SelectionState};
use crate::store::{JobStore, LiveQuery, StoreError};

#[derive(Clone)]
pub struct JobBoard {
    store: JobStore,
    filter: FilterEngine,
    selection: SelectionController,
    current: Arc<watch::Sender<Option<JobPosting>>>,
}

impl JobBoard {
    pub fn new(store: JobStore) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            filter: FilterEngine::new(store.clone()),
            selection: SelectionController::new(store.clone()),
            store,
            current: Arc::new(current),
        }
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    pub fn filter(&self) -> &FilterEngine {
        &self.filter
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    // ─── Live views ─────────────────────────────────────────────────────────

    pub fn all_postings(&self) -> LiveQuery<Vec<JobPosting>> {
        self.store.watch_all_postings()
    }

    pub fn unread_postings(&self) -> LiveQuery<Vec<JobPosting>> {
        self.store.watch_unread_postings()
    }

    pub fn unread_count(&self) -> LiveQuery<u64> {
        self.store.watch_unread_count()
    }

    pub fn favorite_postings(&self) -> LiveQuery<Vec<JobPosting>> {
        self.store.watch_favorite_postings()
    }

    pub fn postings_by_source(&self, source: &str) -> LiveQuery<Vec<JobPosting>> {
        self.store.watch_postings_by_source(source)
    }

    pub fn postings_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> LiveQuery<Vec<JobPosting>> {
        self.store
            .watch_postings_by_date_range(start.timestamp_millis(), end.timestamp_millis())
    }

    pub fn postings_by_status(&self, status: ApplicationStatus) -> LiveQuery<Vec<JobPosting>> {
        self.store.watch_postings_by_status(status)
    }

    pub fn filtered_postings(&self) -> FilteredView {
        self.filter.filtered_postings()
    }

    // ─── Filter commands ────────────────────────────────────────────────────

    pub fn current_filter(&self) -> FilterType {
        self.filter.current_filter()
    }

    pub fn filter_state(&self) -> FilterState {
        self.filter.state()
    }

    pub fn set_filter_by_source(&self, source: &str) {
        self.filter.set_filter_by_source(source);
    }

    pub fn set_filter_by_date_range(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) {
        self.filter.set_filter_by_date_range(start, end);
    }

    pub fn set_filter_by_status(&self, status: ApplicationStatus) {
        self.filter.set_filter_by_status(status);
    }

    pub fn show_favorites(&self) {
        self.filter.show_favorites();
    }

    pub fn reset_filter(&self) {
        self.filter.reset_filter();
    }

    // ─── Record commands ────────────────────────────────────────────────────

    pub async fn mark_as_read(&self, id: i64) -> Result<(), StoreError> {
        self.command("mark_as_read", move |store| store.mark_as_read(id))
            .await
    }

    pub async fn delete(&self, posting: &JobPosting) -> Result<(), StoreError> {
        self.delete_by_id(posting.id).await
    }

    pub async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        self.command("delete", move |store| store.delete_by_id(id))
            .await?;
        self.current.send_if_modified(|current| {
            if current.as_ref().is_some_and(|p| p.id == id) {
                *current = None;
                true
            } else {
                false
            }
        });
        Ok(())
    }

    pub async fn update_status(&self, id: i64, status: ApplicationStatus) -> Result<(), StoreError> {
        self.command("update_status", move |store| store.update_status(id, status))
            .await
    }

    /// Sets the favorite flag of `id` to `is_favorite`.
    pub async fn toggle_favorite(&self, id: i64, is_favorite: bool) -> Result<(), StoreError> {
        self.command("toggle_favorite", move |store| {
            store.set_favorite(id, is_favorite)
        })
        .await
    }

    async fn command<F>(&self, name: &'static str, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&JobStore) -> Result<(), StoreError> + Send + 'static,
    {
        let result = self.store.run(f).await;
        if let Err(e) = &result {
            tracing::error!(command = name, error = %e, "Job board command failed");
        }
        result
    }

    // ─── Detail view ────────────────────────────────────────────────────────

    /// Shows `posting` in the detail view and marks it read.
    pub async fn open_posting(&self, posting: JobPosting) -> Result<(), StoreError> {
        let id = posting.id;
        self.current.send_replace(Some(posting));
        self.mark_as_read(id).await
    }

    pub fn close_posting(&self) {
        self.current.send_if_modified(|current| current.take().is_some());
    }

    pub fn current_posting(&self) -> watch::Receiver<Option<JobPosting>> {
        self.current.subscribe()
    }

    // ─── Selection ──────────────────────────────────────────────────────────

    pub fn selection_state(&self) -> SelectionState {
        self.selection.state()
    }

    pub fn toggle_multi_select(&self) {
        self.selection.toggle_multi_select();
    }

    pub fn toggle_selection(&self, id: i64) {
        self.selection.toggle_selection(id);
    }

    pub fn select_all<I: IntoIterator<Item = i64>>(&self, ids: I) {
        self.selection.select_all(ids);
    }

    pub fn clear_selection(&self) {
        self.selection.clear_selection();
    }

    pub async fn delete_selected(&self) -> Result<(), StoreError> {
        let result = self.selection.delete_selected().await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "Failed to delete selected postings");
        }
        result
    }

    pub async fn mark_selected_as_read(&self) -> Result<(), StoreError> {
        let result = self.selection.mark_selected_as_read().await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "Failed to mark selected postings as read");
        }
        result
    }

    pub async fn update_selected_status(&self, status: ApplicationStatus) -> Result<(), StoreError> {
        let result = self.selection.update_selected_status(status).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "Failed to update status of selected postings");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::posting::NewJobPosting;

    fn board() -> JobBoard {
        JobBoard::new(JobStore::new(Database::open_in_memory().unwrap()).unwrap())
    }

    #[tokio::test]
    async fn test_open_posting_marks_read() {
        let board = board();
        let id = board
            .store()
            .insert(&NewJobPosting::new("WhatsApp", "Hiring", "fresher", 1))
            .unwrap();
        let posting = board.store().find_by_id(id).unwrap().unwrap();
        let current = board.current_posting();

        board.open_posting(posting).await.unwrap();

        assert_eq!(current.borrow().as_ref().map(|p| p.id), Some(id));
        assert_eq!(board.unread_count().current().unwrap(), 0);

        board.close_posting();
        assert!(current.borrow().is_none());
    }

    #[tokio::test]
    async fn test_deleting_open_posting_closes_it() {
        let board = board();
        let id = board
            .store()
            .insert(&NewJobPosting::new("Telegram", "Opening", "", 1))
            .unwrap();
        let posting = board.store().find_by_id(id).unwrap().unwrap();
        board.open_posting(posting.clone()).await.unwrap();

        board.delete(&posting).await.unwrap();

        assert!(board.current_posting().borrow().is_none());
        assert!(board.all_postings().current().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_command_returns_error() {
        let board = board();
        board
            .store()
            .database()
            .with_conn(|conn| {
                conn.execute_batch("DROP TABLE job_postings;")?;
                Ok(())
            })
            .unwrap();

        let result = board.update_status(1, ApplicationStatus::Applied).await;
        assert!(matches!(result, Err(StoreError::Database(_))));
    }
}
