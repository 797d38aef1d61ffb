//! Immutable execution descriptors for query batches.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::query::{Query, keys::generate_key};
use crate::time::{QueryIntervals, RawTimeRange, TimeRange};

/// The view a result set feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultType {
    Graph,
    Table,
    Logs,
}

/// Options shared by every query in a batch. `fields` is merged onto each
/// query before execution; shared values win over per-query fields.
#[derive(Debug, Clone, Default)]
pub struct SharedQueryOptions {
    /// Result format hint, first component of the panel id.
    pub format: String,
    pub max_data_points: i64,
    pub fields: Map<String, Value>,
}

/// Fully assembled options handed to the execution layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionOptions {
    pub interval: String,
    pub interval_ms: i64,
    /// Correlation id for cancellation: unique per logically distinct
    /// request, stable across re-issues of the same one.
    pub panel_id: String,
    /// Queries with the shared options merged in.
    pub targets: Vec<Query>,
    pub range: TimeRange,
    pub range_raw: RawTimeRange,
    /// Templating variables, exposing the resolved interval as
    /// `__interval` / `__interval_ms`.
    pub scoped_vars: Map<String, Value>,
    pub max_data_points: i64,
}

/// One query execution request. Created once per run; `done`, `latency`,
/// and `result` are written by the external execution layer as results
/// arrive, never by this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTransaction {
    pub id: String,
    /// The original, unmerged queries.
    pub queries: Vec<Query>,
    pub options: TransactionOptions,
    pub result_type: ResultType,
    pub scanning: bool,
    pub done: bool,
    pub latency: i64,
    /// Raw result payload, filled in on completion.
    pub result: Option<Value>,
}

/// Assemble a transaction from a batch, shared options, and a resolved
/// range.
pub fn build_query_transaction(
    queries: &[Query],
    result_type: ResultType,
    options: &SharedQueryOptions,
    range: &TimeRange,
    intervals: &QueryIntervals,
    scanning: bool,
) -> QueryTransaction {
    let targets: Vec<Query> = queries
        .iter()
        .map(|query| {
            let mut query = query.clone();
            for (name, value) in &options.fields {
                query.fields.insert(name.clone(), value.clone());
            }
            query
        })
        .collect();

    // The combined key is order-sensitive: reordering the batch is a new
    // logical request and must get a new panel id.
    let combined_key: String = queries.iter().filter_map(|q| q.key.as_deref()).collect();
    let panel_id = format!("{}-{}", options.format, combined_key);

    let mut scoped_vars = Map::new();
    scoped_vars.insert(
        "__interval".to_string(),
        scoped_var(&intervals.interval, json!(&intervals.interval)),
    );
    scoped_vars.insert(
        "__interval_ms".to_string(),
        scoped_var(&intervals.interval_ms.to_string(), json!(intervals.interval_ms)),
    );

    QueryTransaction {
        id: generate_key(0),
        queries: queries.to_vec(),
        options: TransactionOptions {
            interval: intervals.interval.clone(),
            interval_ms: intervals.interval_ms,
            panel_id,
            targets,
            range: range.clone(),
            range_raw: range.raw.clone(),
            scoped_vars,
            max_data_points: options.max_data_points,
        },
        result_type,
        scanning,
        done: false,
        latency: 0,
        result: None,
    }
}

fn scoped_var(text: &str, value: Value) -> Value {
    json!({ "text": text, "value": value })
}
