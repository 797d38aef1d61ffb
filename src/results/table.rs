//! Merged table view model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A table column. Only the display text takes part in merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableModel {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
}

/// Merge every tabular item (anything with both `columns` and `rows`) into
/// one model: column set union in first-seen order, rows re-projected onto
/// the union and concatenated in input order. No tabular items yield an
/// empty model, never a missing one, so renderers always get a valid shape.
pub fn merge_tables(items: &[Value]) -> TableModel {
    let mut model = TableModel::default();
    let mut index_of: HashMap<String, usize> = HashMap::new();

    for item in items {
        let Some((names, rows)) = as_table(item) else {
            continue;
        };
        let mapping: Vec<usize> = names
            .into_iter()
            .map(|name| {
                *index_of.entry(name.clone()).or_insert_with(|| {
                    model.columns.push(Column { text: name });
                    model.columns.len() - 1
                })
            })
            .collect();
        for row in rows {
            let cells = row.as_array().cloned().unwrap_or_default();
            let mut projected = vec![Value::Null; model.columns.len()];
            for (i, cell) in cells.into_iter().enumerate() {
                if let Some(&target) = mapping.get(i) {
                    projected[target] = cell;
                }
            }
            model.rows.push(projected);
        }
    }

    // rows merged before a later table widened the union are short
    let width = model.columns.len();
    for row in &mut model.rows {
        row.resize(width, Value::Null);
    }
    model
}

fn as_table(item: &Value) -> Option<(Vec<String>, &Vec<Value>)> {
    let obj = item.as_object()?;
    let columns = obj.get("columns")?.as_array()?;
    let rows = obj.get("rows")?.as_array()?;
    Some((columns.iter().map(column_text).collect(), rows))
}

pub(crate) fn column_text(column: &Value) -> String {
    match column {
        Value::String(s) => s.clone(),
        Value::Object(obj) => obj
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        other => other.to_string(),
    }
}
