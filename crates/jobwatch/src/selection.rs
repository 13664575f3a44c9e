//! Multi-select state and bulk actions over the job store.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::watch;

use crate::posting::ApplicationStatus;
use crate::store::{JobStore, StoreError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub multi_select_active: bool,
    pub selected_ids: BTreeSet<i64>,
}

impl SelectionState {
    pub fn is_selected(&self, id: i64) -> bool {
        self.selected_ids.contains(&id)
    }

    pub fn ids(&self) -> Vec<i64> {
        self.selected_ids.iter().copied().collect()
    }
}

#[derive(Clone)]
pub struct SelectionController {
    store: JobStore,
    state: Arc<watch::Sender<SelectionState>>,
}

impl SelectionController {
    pub fn new(store: JobStore) -> Self {
        let (state, _) = watch::channel(SelectionState::default());
        Self {
            store,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionState> {
        self.state.subscribe()
    }

    /// Flips multi-select mode. Leaving the mode empties the selection.
    pub fn toggle_multi_select(&self) {
        self.state.send_modify(|state| {
            state.multi_select_active = !state.multi_select_active;
            if !state.multi_select_active {
                state.selected_ids.clear();
            }
        });
    }

    /// Adds `id` if absent, removes it if present. Works outside
    /// multi-select mode as well.
    pub fn toggle_selection(&self, id: i64) {
        self.state.send_modify(|state| {
            if !state.selected_ids.remove(&id) {
                state.selected_ids.insert(id);
            }
        });
    }

    /// Replaces the selection with exactly `ids`.
    pub fn select_all<I: IntoIterator<Item = i64>>(&self, ids: I) {
        let ids: BTreeSet<i64> = ids.into_iter().collect();
        self.state.send_modify(|state| state.selected_ids = ids);
    }

    pub fn clear_selection(&self) {
        self.state
            .send_if_modified(|state| !std::mem::take(&mut state.selected_ids).is_empty());
    }

    /// Deletes every selected posting, then clears the selection and
    /// leaves multi-select mode. On failure nothing changes.
    pub async fn delete_selected(&self) -> Result<(), StoreError> {
        let ids = self.state().ids();
        tracing::debug!(count = ids.len(), "Deleting selected postings");

        self.store.run(move |store| store.delete_many(&ids)).await?;

        self.state.send_modify(|state| {
            state.selected_ids.clear();
            state.multi_select_active = false;
        });
        Ok(())
    }

    /// Marks every selected posting as read. The selection is kept.
    pub async fn mark_selected_as_read(&self) -> Result<(), StoreError> {
        let ids = self.state().ids();
        self.store
            .run(move |store| store.mark_many_as_read(&ids))
            .await
    }

    /// Sets `status` on every selected posting. The selection is kept.
    pub async fn update_selected_status(&self, status: ApplicationStatus) -> Result<(), StoreError> {
        let ids = self.state().ids();
        self.store
            .run(move |store| store.update_many_status(&ids, status))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn controller() -> SelectionController {
        let store = JobStore::new(Database::open_in_memory().unwrap()).unwrap();
        SelectionController::new(store)
    }

    #[test]
    fn test_toggle_multi_select_off_clears() {
        let selection = controller();
        selection.toggle_multi_select();
        selection.toggle_selection(1);
        selection.toggle_selection(2);
        assert!(selection.state().multi_select_active);
        assert_eq!(selection.state().ids(), vec![1, 2]);

        selection.toggle_multi_select();
        let state = selection.state();
        assert!(!state.multi_select_active);
        assert!(state.selected_ids.is_empty());
    }

    #[test]
    fn test_toggle_selection_flips_membership() {
        let selection = controller();
        selection.toggle_selection(5);
        assert!(selection.state().is_selected(5));
        selection.toggle_selection(5);
        assert!(!selection.state().is_selected(5));
    }

    #[test]
    fn test_select_all_replaces() {
        let selection = controller();
        selection.toggle_selection(9);
        selection.select_all(vec![1, 2, 3]);
        assert_eq!(selection.state().ids(), vec![1, 2, 3]);

        selection.clear_selection();
        assert!(selection.state().selected_ids.is_empty());
    }

    #[test]
    fn test_clear_empty_selection_does_not_notify() {
        let selection = controller();
        let mut rx = selection.subscribe();
        rx.borrow_and_update();
        selection.clear_selection();
        assert!(!rx.has_changed().unwrap());
    }
}
