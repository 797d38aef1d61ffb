//! Key and ref-id allocation for query batches.

use chrono::Utc;
use serde_json::Value;

use super::Query;

/// Generate a key unique within a session's lifetime, derived from the
/// current time, a random component, and the caller's index. Not sortable,
/// only unique.
pub fn generate_key(index: usize) -> String {
    format!(
        "Q-{}-{:016x}-{}",
        Utc::now().timestamp_millis(),
        rand::random::<u64>(),
        index
    )
}

/// Next unused ref-id letter, scanning from `A`. Batches larger than the
/// alphabet fall back to numbered ids, which are scanned the same way so a
/// kept numbered ref-id can never be handed out twice.
fn next_ref_id(used: &[&str]) -> String {
    for letter in 'A'..='Z' {
        let candidate = letter.to_string();
        if !used.contains(&candidate.as_str()) {
            return candidate;
        }
    }
    let mut n = used.len();
    loop {
        let candidate = format!("R{n}");
        if !used.contains(&candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}

/// Guarantee a non-empty, fully keyed batch.
///
/// An empty input yields a single fresh query. Otherwise every query gets a
/// fresh `key`; an existing non-empty `ref_id` is kept unless a query
/// earlier in the output already claimed it, in which case the next unused
/// letter is allocated. Output ref-ids are pairwise distinct.
pub fn ensure_queries(queries: &[Query]) -> Vec<Query> {
    if queries.is_empty() {
        let mut query = Query::default();
        query.key = Some(generate_key(0));
        query.ref_id = Some(next_ref_id(&[]));
        return vec![query];
    }

    let mut out: Vec<Query> = Vec::with_capacity(queries.len());
    for (index, query) in queries.iter().enumerate() {
        let mut query = query.clone();
        query.key = Some(generate_key(index));
        let used: Vec<&str> = out.iter().filter_map(|q| q.ref_id.as_deref()).collect();
        let keep = query
            .ref_id
            .as_deref()
            .is_some_and(|id| !id.is_empty() && !used.contains(&id));
        if !keep {
            query.ref_id = Some(next_ref_id(&used));
        }
        out.push(query);
    }
    out
}

/// True when at least one query carries a truthy datasource-specific field,
/// i.e. the batch is worth executing.
pub fn has_non_empty_query(queries: &[Query]) -> bool {
    queries
        .iter()
        .any(|query| query.fields.values().any(is_truthy))
}

/// Copy of a query with the session-local `key`/`refId` stripped, for
/// contexts such as dashboard export that must not leak them.
pub fn clear_query_keys(query: &Query) -> Query {
    Query {
        key: None,
        ref_id: None,
        fields: query.fields.clone(),
    }
}

// null, false, 0 and "" are falsy; arrays and objects count even when
// empty.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn query_with_ref_id(ref_id: &str) -> Query {
        Query {
            ref_id: Some(ref_id.to_string()),
            ..Query::default()
        }
    }

    #[test]
    fn generate_key_is_unique_across_many_calls() {
        let keys: HashSet<String> = (0..1000usize).map(generate_key).collect();
        assert_eq!(keys.len(), 1000);
    }

    #[test]
    fn ensure_queries_empty_input_yields_one_keyed_query() {
        let out = ensure_queries(&[]);
        assert_eq!(out.len(), 1);
        assert!(out[0].key.as_deref().is_some_and(|k| !k.is_empty()));
        assert_eq!(out[0].ref_id.as_deref(), Some("A"));
    }

    #[test]
    fn ensure_queries_allocates_next_unused_letter() {
        let input = vec![
            query_with_ref_id("B"),
            Query::default(),
            Query::default(),
        ];
        let out = ensure_queries(&input);
        assert_eq!(out[0].ref_id.as_deref(), Some("B"));
        assert_eq!(out[1].ref_id.as_deref(), Some("A"));
        assert_eq!(out[2].ref_id.as_deref(), Some("C"));
    }

    #[test]
    fn ensure_queries_never_emits_duplicate_ref_ids() {
        let input = vec![
            query_with_ref_id("A"),
            query_with_ref_id("A"),
            query_with_ref_id(""),
            query_with_ref_id("A"),
        ];
        let out = ensure_queries(&input);
        let ids: HashSet<&str> = out.iter().filter_map(|q| q.ref_id.as_deref()).collect();
        assert_eq!(ids.len(), out.len());
        assert!(ids.iter().all(|id| !id.is_empty()));
    }

    #[test]
    fn ensure_queries_past_alphabet_skips_taken_numbered_ids() {
        // one kept numbered ref-id plus enough empties to exhaust A..Z and
        // reach the numbered fallback
        let mut input = vec![query_with_ref_id("R27")];
        input.extend((0..27).map(|_| Query::default()));
        let out = ensure_queries(&input);
        let ids: HashSet<&str> = out.iter().filter_map(|q| q.ref_id.as_deref()).collect();
        assert_eq!(ids.len(), out.len());
        assert!(ids.contains("R27"));
        assert!(ids.contains("R28"));
    }

    #[test]
    fn ensure_queries_assigns_fresh_keys_to_every_query() {
        let input = vec![Query::default(), Query::default()];
        let out = ensure_queries(&input);
        assert_ne!(out[0].key, out[1].key);
    }

    #[test]
    fn has_non_empty_query_ignores_falsy_fields() {
        let empty = Query::default()
            .with_field("expr", "")
            .with_field("hide", false);
        assert!(!has_non_empty_query(&[empty]));

        let real = Query::default().with_field("expr", "up");
        assert!(has_non_empty_query(&[real]));
    }

    #[test]
    fn has_non_empty_query_false_for_keys_only() {
        let q = Query {
            key: Some("Q-1".to_string()),
            ref_id: Some("A".to_string()),
            ..Query::default()
        };
        assert!(!has_non_empty_query(&[q]));
    }

    #[test]
    fn clear_query_keys_strips_identity_only() {
        let q = Query {
            key: Some("Q-1".to_string()),
            ref_id: Some("A".to_string()),
            ..Query::default()
        }
        .with_field("expr", "up");
        let cleared = clear_query_keys(&q);
        assert_eq!(cleared.key, None);
        assert_eq!(cleared.ref_id, None);
        assert_eq!(cleared.field_str("expr"), Some("up"));
    }
}
