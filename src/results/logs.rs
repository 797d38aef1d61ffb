//! Logs view model construction.
//!
//! Raw tabular items are converted to field-tagged series (types inferred
//! from column names and cell content), then into a logs view: one row per
//! log line, newest first, with a histogram series bucketed by the graph
//! interval. Dedup strategies collapse consecutive duplicate lines.

use chrono::DateTime;
use serde_json::Value;
use std::collections::BTreeMap;

use super::table::column_text;
use crate::state::DedupStrategy;

/// Inferred type of a series field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Time,
    Number,
    String,
    Boolean,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogRow {
    pub timestamp_ms: i64,
    pub line: String,
    /// Consecutive rows collapsed into this one by [`dedup_rows`].
    pub duplicates: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogsModel {
    /// Newest first.
    pub rows: Vec<LogRow>,
    /// `(bucket_start_ms, row_count)` pairs, oldest bucket first.
    pub series: Vec<(i64, u64)>,
}

/// Convert flattened raw items into a logs model bucketed by
/// `interval_ms`. Items without a tabular shape are skipped.
pub fn to_logs_model(items: &[Value], interval_ms: i64) -> LogsModel {
    let mut rows = Vec::new();
    for item in items {
        let Some((fields, data)) = tag_fields(item) else {
            continue;
        };
        let time_index = fields.iter().position(|f| f.field_type == FieldType::Time);
        let line_index = fields.iter().position(|f| f.field_type == FieldType::String);
        for raw_row in data {
            let Some(cells) = raw_row.as_array() else {
                continue;
            };
            let timestamp_ms = time_index
                .and_then(|i| cells.get(i))
                .and_then(cell_epoch_ms)
                .unwrap_or(0);
            let line = line_index
                .and_then(|i| cells.get(i))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            rows.push(LogRow {
                timestamp_ms,
                line,
                duplicates: 0,
            });
        }
    }
    rows.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
    let series = bucket_rows(&rows, interval_ms);
    LogsModel { rows, series }
}

/// Collapse consecutive duplicate rows according to the strategy, counting
/// how many rows each survivor absorbed.
pub fn dedup_rows(rows: &[LogRow], strategy: DedupStrategy) -> Vec<LogRow> {
    if strategy == DedupStrategy::None {
        return rows.to_vec();
    }
    let mut out: Vec<LogRow> = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(last) = out.last_mut()
            && dedup_key(&last.line, strategy) == dedup_key(&row.line, strategy)
        {
            last.duplicates += 1;
        } else {
            out.push(row.clone());
        }
    }
    out
}

fn dedup_key(line: &str, strategy: DedupStrategy) -> String {
    match strategy {
        DedupStrategy::None | DedupStrategy::Exact => line.to_string(),
        DedupStrategy::Numbers => line.chars().filter(|c| !c.is_ascii_digit()).collect(),
        DedupStrategy::Signature => line
            .chars()
            .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
            .collect(),
    }
}

/// Field-tag one raw item: columns become fields whose types are inferred
/// from the column name and the first non-null cell.
fn tag_fields(item: &Value) -> Option<(Vec<Field>, &Vec<Value>)> {
    let obj = item.as_object()?;
    let columns = obj.get("columns")?.as_array()?;
    let rows = obj.get("rows")?.as_array()?;
    let fields = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let name = column_text(column);
            let field_type = infer_field_type(&name, rows, index);
            Field { name, field_type }
        })
        .collect();
    Some((fields, rows))
}

fn infer_field_type(name: &str, rows: &[Value], index: usize) -> FieldType {
    let lower = name.to_lowercase();
    if lower == "time" || lower == "ts" || lower == "timestamp" {
        return FieldType::Time;
    }
    for row in rows {
        match row.get(index) {
            None | Some(Value::Null) => continue,
            Some(Value::Bool(_)) => return FieldType::Boolean,
            Some(Value::Number(_)) => return FieldType::Number,
            Some(Value::String(_)) => return FieldType::String,
            Some(_) => return FieldType::Other,
        }
    }
    FieldType::Other
}

fn cell_epoch_ms(cell: &Value) -> Option<i64> {
    match cell {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s
            .parse::<i64>()
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|t| t.timestamp_millis())),
        _ => None,
    }
}

fn bucket_rows(rows: &[LogRow], interval_ms: i64) -> Vec<(i64, u64)> {
    let interval = interval_ms.max(1);
    let mut counts: BTreeMap<i64, u64> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.timestamp_ms / interval * interval).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(ts: i64, line: &str) -> LogRow {
        LogRow {
            timestamp_ms: ts,
            line: line.to_string(),
            duplicates: 0,
        }
    }

    #[test]
    fn rows_are_extracted_newest_first() {
        let items = vec![json!({
            "columns": ["time", "message"],
            "rows": [[1000, "older"], [3000, "newest"], [2000, "middle"]],
        })];
        let model = to_logs_model(&items, 1000);
        let lines: Vec<&str> = model.rows.iter().map(|r| r.line.as_str()).collect();
        assert_eq!(lines, vec!["newest", "middle", "older"]);
    }

    #[test]
    fn histogram_buckets_by_interval() {
        let items = vec![json!({
            "columns": ["time", "message"],
            "rows": [[100, "a"], [900, "b"], [1100, "c"]],
        })];
        let model = to_logs_model(&items, 1000);
        assert_eq!(model.series, vec![(0, 2), (1000, 1)]);
    }

    #[test]
    fn rfc3339_timestamps_are_understood() {
        let items = vec![json!({
            "columns": ["time", "message"],
            "rows": [["2026-01-15T00:00:00Z", "a"]],
        })];
        let model = to_logs_model(&items, 1000);
        assert_eq!(model.rows[0].timestamp_ms, 1768435200000);
    }

    #[test]
    fn field_types_inferred_from_name_and_content() {
        let item = json!({
            "columns": ["Time", "level", "count"],
            "rows": [[1000, "info", 3]],
        });
        let (fields, _) = tag_fields(&item).unwrap();
        assert_eq!(fields[0].field_type, FieldType::Time);
        assert_eq!(fields[1].field_type, FieldType::String);
        assert_eq!(fields[2].field_type, FieldType::Number);
    }

    #[test]
    fn non_tabular_items_are_skipped() {
        let model = to_logs_model(&[json!({ "target": "a" })], 1000);
        assert_eq!(model, LogsModel::default());
    }

    #[test]
    fn dedup_none_keeps_everything() {
        let rows = vec![row(3, "a"), row(2, "a"), row(1, "b")];
        assert_eq!(dedup_rows(&rows, DedupStrategy::None).len(), 3);
    }

    #[test]
    fn dedup_exact_collapses_consecutive_identical_lines() {
        let rows = vec![row(3, "a"), row(2, "a"), row(1, "b"), row(0, "a")];
        let out = dedup_rows(&rows, DedupStrategy::Exact);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].duplicates, 1);
        assert_eq!(out[2].line, "a");
    }

    #[test]
    fn dedup_numbers_ignores_digits() {
        let rows = vec![row(2, "took 15ms"), row(1, "took 23ms")];
        let out = dedup_rows(&rows, DedupStrategy::Numbers);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].duplicates, 1);
    }

    #[test]
    fn dedup_signature_matches_on_punctuation_shape() {
        let rows = vec![
            row(2, "GET /api/users -> 200"),
            row(1, "GET /api/posts -> 500"),
            row(0, "plain line"),
        ];
        let out = dedup_rows(&rows, DedupStrategy::Signature);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].duplicates, 1);
    }
}
