//! Session state for a single exploration pane.

pub mod urlcodec;

use serde::{Deserialize, Serialize};

use crate::query::Query;
use crate::time::RawTimeRange;

/// How duplicate log lines are collapsed in the logs view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupStrategy {
    #[default]
    None,
    Exact,
    Numbers,
    Signature,
}

impl DedupStrategy {
    /// Index used in the compact UI segment.
    pub fn index(self) -> u64 {
        match self {
            DedupStrategy::None => 0,
            DedupStrategy::Exact => 1,
            DedupStrategy::Numbers => 2,
            DedupStrategy::Signature => 3,
        }
    }

    /// Unknown indices decode as `None` rather than failing.
    pub fn from_index(index: u64) -> Self {
        match index {
            1 => DedupStrategy::Exact,
            2 => DedupStrategy::Numbers,
            3 => DedupStrategy::Signature,
            _ => DedupStrategy::None,
        }
    }
}

/// Display toggles of the pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiState {
    pub showing_graph: bool,
    pub showing_logs: bool,
    pub showing_table: bool,
    pub dedup_strategy: DedupStrategy,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            showing_graph: true,
            showing_logs: true,
            showing_table: true,
            dedup_strategy: DedupStrategy::None,
        }
    }
}

/// Complete session state of one pane. Mutated only by producing a new
/// value; the URL codec in [`urlcodec`] maps it to and from a URL parameter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub datasource: Option<String>,
    pub queries: Vec<Query>,
    pub range: RawTimeRange,
    pub ui: UiState,
}
