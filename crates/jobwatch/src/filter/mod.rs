//! Query/filter engine over the live posting snapshot.
//!
//! Filter parameters are sticky: switching the active variant keeps the
//! source, date range and status that were set earlier. Only
//! `reset_filter` clears them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::posting::{ApplicationStatus, JobPosting};
use crate::store::{JobStore, Snapshot, StoreError};

/// Which filter variant is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterType {
    #[default]
    All,
    BySource,
    ByDate,
    ByStatus,
    Favorites,
}

/// Active variant plus every parameter set so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub filter_type: FilterType,
    pub source: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub status: Option<ApplicationStatus>,
}

impl FilterState {
    /// The filter to apply, resolved from the active variant.
    pub fn active(&self) -> Filter {
        match self.filter_type {
            FilterType::All => Filter::All,
            FilterType::BySource => Filter::BySource(self.source.clone()),
            FilterType::ByDate => Filter::ByDate {
                start: self.start,
                end: self.end,
            },
            FilterType::ByStatus => Filter::ByStatus(self.status),
            FilterType::Favorites => Filter::Favorites,
        }
    }
}

/// A resolved filter predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    All,
    /// Exact, case-sensitive source label.
    BySource(String),
    /// Inclusive range; passes everything unless both bounds are set.
    ByDate {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
    /// Passes everything when no status is set.
    ByStatus(Option<ApplicationStatus>),
    Favorites,
}

impl Filter {
    pub fn matches(&self, posting: &JobPosting) -> bool {
        match self {
            Filter::All => true,
            Filter::BySource(source) => posting.source == *source,
            Filter::ByDate {
                start: Some(start),
                end: Some(end),
            } => {
                (start.timestamp_millis()..=end.timestamp_millis()).contains(&posting.timestamp)
            }
            Filter::ByDate { .. } => true,
            Filter::ByStatus(Some(status)) => posting.application_status == *status,
            Filter::ByStatus(None) => true,
            Filter::Favorites => posting.is_favorite,
        }
    }

    /// Keeps matching postings, preserving input order.
    pub fn apply(&self, postings: &[JobPosting]) -> Vec<JobPosting> {
        postings
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect()
    }
}

/// Holds the filter state and hands out filtered live views.
#[derive(Clone)]
pub struct FilterEngine {
    store: JobStore,
    state: Arc<watch::Sender<FilterState>>,
}

impl FilterEngine {
    pub fn new(store: JobStore) -> Self {
        let (state, _) = watch::channel(FilterState::default());
        Self {
            store,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> FilterState {
        self.state.borrow().clone()
    }

    pub fn current_filter(&self) -> FilterType {
        self.state.borrow().filter_type
    }

    /// Subscribes to filter state changes.
    pub fn subscribe(&self) -> watch::Receiver<FilterState> {
        self.state.subscribe()
    }

    pub fn set_filter_by_source(&self, source: &str) {
        self.modify(|state| {
            state.source = source.to_string();
            state.filter_type = FilterType::BySource;
        });
    }

    pub fn set_filter_by_date_range(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) {
        self.modify(|state| {
            state.start = start;
            state.end = end;
            state.filter_type = FilterType::ByDate;
        });
    }

    pub fn set_filter_by_status(&self, status: ApplicationStatus) {
        self.modify(|state| {
            state.status = Some(status);
            state.filter_type = FilterType::ByStatus;
        });
    }

    pub fn show_favorites(&self) {
        self.select(FilterType::Favorites);
    }

    /// Switches the active variant, keeping all parameters.
    pub fn select(&self, filter_type: FilterType) {
        self.modify(|state| state.filter_type = filter_type);
    }

    /// Back to `All` with every parameter cleared.
    pub fn reset_filter(&self) {
        self.modify(|state| *state = FilterState::default());
    }

    fn modify<F: FnOnce(&mut FilterState)>(&self, f: F) {
        self.state.send_if_modified(|state| {
            let before = state.clone();
            f(state);
            *state != before
        });
    }

    /// Live view recomputed whenever the postings or the filter change.
    pub fn filtered_postings(&self) -> FilteredView {
        FilteredView {
            _store: self.store.clone(),
            _state: Arc::clone(&self.state),
            snapshots: self.store.subscribe(),
            filters: self.state.subscribe(),
        }
    }
}

/// Filtered projection of the posting snapshot.
pub struct FilteredView {
    // Keep both senders alive for as long as the view exists.
    _store: JobStore,
    _state: Arc<watch::Sender<FilterState>>,
    snapshots: watch::Receiver<Snapshot>,
    filters: watch::Receiver<FilterState>,
}

impl FilteredView {
    /// Computes the filtered list from the latest snapshot and filter.
    pub fn current(&mut self) -> Vec<JobPosting> {
        let postings = Arc::clone(&self.snapshots.borrow_and_update().postings);
        let filter = self.filters.borrow_and_update().active();
        filter.apply(&postings)
    }

    /// Waits for a posting or filter change, then recomputes.
    pub async fn next(&mut self) -> Result<Vec<JobPosting>, StoreError> {
        tokio::select! {
            changed = self.snapshots.changed() => changed.map_err(|_| StoreError::Closed)?,
            changed = self.filters.changed() => changed.map_err(|_| StoreError::Closed)?,
        }
        Ok(self.current())
    }

    /// Current filter state.
    pub fn filter(&self) -> FilterState {
        self.filters.borrow().clone()
    }
}
