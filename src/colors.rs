//! Deterministic color assignment for graphed time series.

use serde_json::Value;

use crate::transaction::{QueryTransaction, ResultType};

/// Display palette referenced by index. Series colors cycle through it.
pub const DEFAULT_COLOR_PALETTE: &[&str] = &[
    "#7EB26D", "#EAB839", "#6ED0E0", "#EF843C", "#E24D42", "#1F78C1", "#BA43A9", "#705DA0",
    "#508642", "#CCA300", "#447EBC", "#C15C17", "#890F02", "#0A437C", "#6D1F62", "#584477",
    "#B7DBAB", "#F4D598", "#70DBED", "#F9BA8F",
];

/// A series ready for the graph renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub datapoints: Vec<Value>,
    /// The query's target label.
    pub alias: String,
    pub color: String,
    pub unit: Option<String>,
}

/// Build the series list for one transaction's graph result.
///
/// The palette offset equals the total series count contributed by every
/// transaction appearing before `transaction` in `all_transactions` that is
/// Graph-typed and done, so series shown together never collide on color.
pub fn make_time_series_list(
    data_list: &[Value],
    transaction: &QueryTransaction,
    all_transactions: &[QueryTransaction],
) -> Vec<TimeSeries> {
    let mut offset = 0;
    let mut found = false;
    for tx in all_transactions {
        if tx.id == transaction.id {
            found = true;
            break;
        }
        if tx.result_type == ResultType::Graph && tx.done {
            offset += series_count(tx);
        }
    }
    // a transaction absent from the list has nothing before it
    if !found {
        offset = 0;
    }
    data_list
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let color = DEFAULT_COLOR_PALETTE[(offset + index) % DEFAULT_COLOR_PALETTE.len()];
            TimeSeries {
                datapoints: item
                    .get("datapoints")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default(),
                alias: item
                    .get("target")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                color: color.to_string(),
                unit: item.get("unit").and_then(Value::as_str).map(str::to_string),
            }
        })
        .collect()
}

fn series_count(tx: &QueryTransaction) -> usize {
    tx.result
        .as_ref()
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}
