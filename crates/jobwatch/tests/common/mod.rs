//! Shared test utilities for jobwatch integration tests.
//!
//! This module provides:
//! - `TestHarness` with a temp-dir database, a fixed clock and a board
//! - Builders for notifications, postings and configs

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
