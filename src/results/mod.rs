//! Aggregation of raw per-query results into typed view models.

pub mod logs;
pub mod table;

use serde_json::Value;

use crate::transaction::ResultType;
use logs::LogsModel;
use table::TableModel;

/// Typed view model produced from a batch of raw results. The variants are
/// exclusive: each result type yields only its own model.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewModel {
    /// Flattened raw series, left unconverted for the graph renderer.
    Graph(Vec<Value>),
    Table(TableModel),
    Logs(LogsModel),
}

impl ViewModel {
    pub fn as_table(&self) -> Option<&TableModel> {
        match self {
            ViewModel::Table(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_logs(&self) -> Option<&LogsModel> {
        match self {
            ViewModel::Logs(model) => Some(model),
            _ => None,
        }
    }
}

/// Merge raw per-query result payloads into the view model for
/// `result_type`. Each query may return a collection of series or rows, so
/// one level of nesting is flattened first.
pub fn calculate_results(
    raw_results: &[Value],
    result_type: ResultType,
    graph_interval_ms: i64,
) -> ViewModel {
    let flattened = flatten_results(raw_results);
    match result_type {
        ResultType::Graph => ViewModel::Graph(flattened),
        ResultType::Table => ViewModel::Table(table::merge_tables(&flattened)),
        ResultType::Logs => ViewModel::Logs(logs::to_logs_model(&flattened, graph_interval_ms)),
    }
}

fn flatten_results(raw: &[Value]) -> Vec<Value> {
    let mut out = Vec::with_capacity(raw.len());
    for item in raw {
        match item {
            Value::Array(inner) => out.extend(inner.iter().cloned()),
            other => out.push(other.clone()),
        }
    }
    out
}
