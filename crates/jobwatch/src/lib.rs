pub mod board;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod filter;
pub mod intake;
pub mod logging;
pub mod posting;
pub mod selection;
pub mod store;

pub use board::JobBoard;
pub use classifier::{Classifier, Rejection};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    load_config, load_config_from_str, ClassifierConfig, Config, LogFormat, LoggingConfig,
};
pub use context::AppContext;
pub use db::Database;
pub use error::{ConfigError, IntakeError, JobwatchError, LoggingError, Result};
pub use filter::{Filter, FilterEngine, FilterState, FilterType, FilteredView};
pub use intake::{
    IntakeBroadcaster, IntakeHandler, IntakeOutcome, IntakePool, IntakeSubmitter, NotificationEvent,
    ShutdownHandle,
};
pub use logging::init_logging;
pub use posting::{ApplicationStatus, JobPosting, NewJobPosting};
pub use selection::{SelectionController, SelectionState};
pub use store::{JobStore, LiveQuery, Snapshot, StoreError};
