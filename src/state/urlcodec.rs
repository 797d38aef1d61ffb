//! URL codec for session state.
//!
//! Two wire forms share one parameter. Non-compact: verbatim JSON of
//! [`SessionState`]. Compact: a positional array
//! `[from, to, datasource, ...segments]` with a fixed three-element header
//! followed by query segments and one UI segment. Newly serialized segments
//! are tagged `{"kind": "query"|"ui", "payload": ...}`; decoding also
//! accepts the legacy untagged form, discriminated by field presence.
//!
//! Parsing is total: malformed input is logged and yields the full default
//! state, never an error.

use serde_json::{Value, json};
use tracing::error;

use super::{DedupStrategy, SessionState, UiState};
use crate::query::Query;
use crate::time::{DEFAULT_RANGE_FROM, DEFAULT_RANGE_TO, RawTimeRange};

/// Positions occupied by the fixed compact header: from, to, datasource.
const COMPACT_HEADER_LEN: usize = 3;

/// Fields whose presence marks a bare object as a legacy query segment.
const QUERY_SEGMENT_FIELDS: &[&str] = &["expr", "target", "datasource"];

/// Decode a URL parameter into session state. Any failure falls back to the
/// default state so the pane never opens half-valid.
pub fn parse_url_state(text: &str) -> SessionState {
    if text.is_empty() {
        return SessionState::default();
    }
    let decoded = percent_decode(text);
    let value: Value = match serde_json::from_str(&decoded) {
        Ok(value) => value,
        Err(e) => {
            error!("discarding malformed state parameter: {e}");
            return SessionState::default();
        }
    };
    match value {
        Value::Array(items) => parse_compact(items),
        other => match serde_json::from_value(other) {
            Ok(state) => state,
            Err(e) => {
                error!("discarding non-compact state with unexpected shape: {e}");
                SessionState::default()
            }
        },
    }
}

/// Encode session state for embedding in a URL parameter.
pub fn serialize_state_to_url_param(state: &SessionState, compact: bool) -> String {
    let value = if compact {
        compact_value(state)
    } else {
        match serde_json::to_value(state) {
            Ok(value) => value,
            Err(e) => {
                error!("failed to serialize session state: {e}");
                return String::new();
            }
        }
    };
    match serde_json::to_string(&value) {
        Ok(text) => percent_encode(&text),
        Err(e) => {
            error!("failed to serialize session state: {e}");
            String::new()
        }
    }
}

fn compact_value(state: &SessionState) -> Value {
    let mut items = vec![
        Value::String(state.range.from.clone()),
        Value::String(state.range.to.clone()),
        state.datasource.clone().map_or(Value::Null, Value::String),
    ];
    for query in &state.queries {
        items.push(json!({ "kind": "query", "payload": query }));
    }
    let ui = &state.ui;
    items.push(json!({
        "kind": "ui",
        "payload": [
            ui.showing_graph,
            ui.showing_logs,
            ui.showing_table,
            ui.dedup_strategy.index(),
        ],
    }));
    Value::Array(items)
}

fn parse_compact(items: Vec<Value>) -> SessionState {
    if items.len() <= COMPACT_HEADER_LEN {
        error!(
            "compact state array too short: {} element(s)",
            items.len()
        );
        return SessionState::default();
    }
    let mut state = SessionState {
        range: RawTimeRange {
            from: header_string(&items[0], DEFAULT_RANGE_FROM),
            to: header_string(&items[1], DEFAULT_RANGE_TO),
        },
        datasource: items[2].as_str().map(str::to_string),
        ..SessionState::default()
    };
    let mut ui_seen = false;
    for item in &items[COMPACT_HEADER_LEN..] {
        match classify_segment(item) {
            Segment::Query(payload) => match serde_json::from_value(payload.clone()) {
                Ok(query) => state.queries.push(query),
                Err(e) => error!("dropping malformed query segment: {e}"),
            },
            Segment::Ui(payload) => {
                // first UI segment wins
                if !ui_seen {
                    state.ui = parse_ui_segment(payload);
                    ui_seen = true;
                }
            }
            Segment::Unknown => {}
        }
    }
    state
}

// Raw boundaries may arrive as strings or epoch numbers.
fn header_string(value: &Value, default: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => default.to_string(),
    }
}

enum Segment<'a> {
    Query(&'a Value),
    Ui(&'a Value),
    Unknown,
}

fn classify_segment(item: &Value) -> Segment<'_> {
    let Some(obj) = item.as_object() else {
        return Segment::Unknown;
    };
    if let Some(kind) = obj.get("kind").and_then(Value::as_str) {
        let payload = obj.get("payload").unwrap_or(&Value::Null);
        return match kind {
            "query" => Segment::Query(payload),
            "ui" => Segment::Ui(payload),
            _ => Segment::Unknown,
        };
    }
    if let Some(ui) = obj.get("ui") {
        return Segment::Ui(ui);
    }
    if QUERY_SEGMENT_FIELDS.iter().any(|f| obj.contains_key(*f)) {
        return Segment::Query(item);
    }
    Segment::Unknown
}

fn parse_ui_segment(payload: &Value) -> UiState {
    let defaults = UiState::default();
    let arr = payload.as_array();
    let get = |i: usize| arr.and_then(|a| a.get(i));
    UiState {
        showing_graph: get(0).and_then(Value::as_bool).unwrap_or(defaults.showing_graph),
        showing_logs: get(1).and_then(Value::as_bool).unwrap_or(defaults.showing_logs),
        showing_table: get(2).and_then(Value::as_bool).unwrap_or(defaults.showing_table),
        dedup_strategy: get(3)
            .and_then(Value::as_u64)
            .map(DedupStrategy::from_index)
            .unwrap_or_default(),
    }
}

// encodeURIComponent charset: alphanumerics and -_.!~*'() stay literal.
fn percent_encode(text: &str) -> String {
    const UNRESERVED: &str = "-_.!~*'()";
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        if byte.is_ascii_alphanumeric() || UNRESERVED.contains(byte as char) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

// Lenient: malformed escapes pass through literally.
fn percent_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2]))
        {
            out.push(hi << 4 | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}
