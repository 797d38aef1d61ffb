//! State codec and query-transaction pipeline for a query-exploration pane.
//!
//! The crate turns a user's exploration session (time range, datasource,
//! queries, display toggles) into a shareable URL parameter and back, builds
//! immutable execution descriptors for query batches, aggregates raw
//! per-query results into typed view models, assigns collision-free colors
//! to time series across sequential result sets, and maintains a bounded,
//! persisted per-datasource query history.
//!
//! Query execution, rendering, and re-render scheduling are external; they
//! are reached through the traits in [`time`], [`history::store`], and
//! [`datasource`].

pub mod colors;
pub mod datasource;
pub mod error;
pub mod history;
pub mod query;
pub mod results;
pub mod state;
pub mod time;
pub mod transaction;

pub use error::Error;
pub use query::Query;
pub use state::{SessionState, UiState};
pub use transaction::{QueryTransaction, ResultType};
