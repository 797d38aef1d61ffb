//! Bounded, persisted per-datasource query history.

pub mod store;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Error;
use crate::query::Query;
use store::Store;

/// Hard cap on persisted history length per datasource.
pub const MAX_HISTORY_ITEMS: usize = 100;

fn history_key(datasource_id: &str) -> String {
    format!("history.{datasource_id}")
}

/// One executed query with its capture timestamp (epoch milliseconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub query: Query,
    pub ts: i64,
}

/// Load the persisted history of a datasource. Missing or malformed content
/// yields an empty list.
pub fn load_history(store: &dyn Store, datasource_id: &str) -> Vec<HistoryItem> {
    let Some(text) = store.get(&history_key(datasource_id)) else {
        return Vec::new();
    };
    match serde_json::from_str(&text) {
        Ok(items) => items,
        Err(e) => {
            warn!("discarding malformed history for {datasource_id}: {e}");
            Vec::new()
        }
    }
}

/// Record a batch of executed queries: prepend one item per query, all
/// stamped with one shared capture timestamp, truncate to the cap, and
/// persist. Returns the updated list.
///
/// Prepending once per query means a multi-query batch ends up in reverse
/// batch order at the front of the list.
pub fn update_history(
    store: &dyn Store,
    history: &[HistoryItem],
    datasource_id: &str,
    queries: &[Query],
) -> Result<Vec<HistoryItem>, Error> {
    let ts = Utc::now().timestamp_millis();
    let mut updated = history.to_vec();
    for query in queries {
        updated.insert(
            0,
            HistoryItem {
                query: query.clone(),
                ts,
            },
        );
    }
    updated.truncate(MAX_HISTORY_ITEMS);
    let text = serde_json::to_string(&updated)?;
    store.set(&history_key(datasource_id), &text)?;
    Ok(updated)
}

/// Drop the persisted history of a datasource entirely.
pub fn clear_history(store: &dyn Store, datasource_id: &str) -> Result<(), Error> {
    store.delete(&history_key(datasource_id))
}

/// Stable display key per query for list rendering: the datasource name
/// when known, the query key otherwise, suffixed with the batch index.
pub fn get_query_keys(queries: &[Query], datasource_name: Option<&str>) -> Vec<String> {
    queries
        .iter()
        .enumerate()
        .map(|(index, query)| {
            let primary = datasource_name.or(query.key.as_deref()).unwrap_or("");
            format!("{primary}-{index}")
        })
        .collect()
}
