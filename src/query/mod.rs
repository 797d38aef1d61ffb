//! Query data model and identity bookkeeping.
//!
//! Datasource-specific query fields are kept as an open mapping; only `key`
//! and `refId` are owned by this crate.

pub mod keys;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single datasource query.
///
/// `key` is globally unique per allocation and used only for identity and
/// ordering; it is never displayed. `ref_id` is the short display letter
/// datasources use to correlate results within a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(rename = "refId", default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    /// Datasource-specific fields, passed through untouched.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Query {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Builder-style field insertion, mostly useful in tests and callers
    /// constructing queries by hand.
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extra_fields_round_trip_through_serde() {
        let q = Query {
            key: Some("Q-1".to_string()),
            ref_id: Some("A".to_string()),
            fields: Map::new(),
        }
        .with_field("expr", "up")
        .with_field("instant", true);

        let text = serde_json::to_string(&q).unwrap();
        let back: Query = serde_json::from_str(&text).unwrap();
        assert_eq!(back, q);
        assert_eq!(back.field_str("expr"), Some("up"));
        assert_eq!(back.field("instant"), Some(&json!(true)));
    }

    #[test]
    fn ref_id_serializes_in_camel_case() {
        let q = Query {
            ref_id: Some("A".to_string()),
            ..Query::default()
        };
        let text = serde_json::to_string(&q).unwrap();
        assert!(text.contains(r#""refId":"A""#));
    }

    #[test]
    fn absent_key_and_ref_id_are_omitted() {
        let q = Query::default().with_field("expr", "up");
        assert_eq!(serde_json::to_string(&q).unwrap(), r#"{"expr":"up"}"#);
    }
}
