//! Scoring response shapes.
//!
//! The service has shipped several envelopes over time. Accepted, in
//! priority order:
//!
//! 1. a bare array of result objects
//! 2. an object holding the array under one of [`RESULT_KEYS`]
//! 3. an object with an array field as long as the request
//!
//! Anything else is [`ScoringError::UnsupportedShape`].

use scorebridge_core::Record;
use serde_json::{Map, Value};

use crate::client::ScoringError;

/// Known result-collection keys, highest priority first.
pub const RESULT_KEYS: &[&str] = &["predicciones", "predictions", "result", "results", "data", "items"];

/// Top-level shape of a decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoringResponse {
    Array(Vec<Value>),
    Object(Map<String, Value>),
    /// String, number, boolean or null body.
    Scalar(&'static str),
}

impl From<Value> for ScoringResponse {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::Array(items),
            Value::Object(map) => Self::Object(map),
            Value::Null => Self::Scalar("null"),
            Value::Bool(_) => Self::Scalar("boolean"),
            Value::Number(_) => Self::Scalar("number"),
            Value::String(_) => Self::Scalar("string"),
        }
    }
}

impl ScoringResponse {
    /// Pick the result array for a request of `expected` records.
    pub fn into_results(self, expected: usize) -> Result<Vec<Record>, ScoringError> {
        let items = match self {
            Self::Array(items) => items,
            Self::Object(map) => select_from_object(map, expected)?,
            Self::Scalar(kind) => {
                return Err(ScoringError::UnsupportedShape {
                    kind,
                    keys: Vec::new(),
                })
            }
        };
        into_records(items)
    }
}

fn select_from_object(mut map: Map<String, Value>, expected: usize) -> Result<Vec<Value>, ScoringError> {
    if let Some(key) = RESULT_KEYS.iter().find(|k| matches!(map.get(**k), Some(Value::Array(_)))) {
        if let Some(Value::Array(items)) = map.remove(*key) {
            log::debug!("scoring results found under known key '{key}'");
            return Ok(items);
        }
    }

    let same_length = map
        .iter()
        .find(|(_, v)| matches!(v, Value::Array(items) if items.len() == expected))
        .map(|(k, _)| k.clone());
    if let Some(key) = same_length {
        if let Some(Value::Array(items)) = map.remove(&key) {
            log::debug!("scoring results taken from field '{key}' matching request length {expected}");
            return Ok(items);
        }
    }

    Err(ScoringError::UnsupportedShape {
        kind: "object",
        keys: map.keys().cloned().collect(),
    })
}

fn into_records(items: Vec<Value>) -> Result<Vec<Record>, ScoringError> {
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Ok(Record::from(map)),
            _ => Err(ScoringError::UnsupportedShape {
                kind: "array of non-objects",
                keys: Vec::new(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: Value, expected: usize) -> Result<Vec<Record>, ScoringError> {
        ScoringResponse::from(body).into_results(expected)
    }

    #[test]
    fn bare_array_is_used_directly() {
        let out = parse(json!([{"id_cliente": 1}, {"id_cliente": 2}]), 2).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].get("id_cliente"), Some(&json!(2)));
    }

    #[test]
    fn bare_array_of_other_length_is_still_accepted() {
        let out = parse(json!([{"id_cliente": 1}]), 3).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn known_key_wins_regardless_of_length() {
        let out = parse(json!({"predicciones": [{"score": 0.1}], "other": [{}, {}]}), 2).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("score"), Some(&json!(0.1)));
    }

    #[test]
    fn known_keys_follow_priority_order() {
        let body = json!({
            "data": [{"from": "data"}],
            "results": [{"from": "results"}],
        });
        let out = parse(body, 1).unwrap();
        assert_eq!(out[0].get("from"), Some(&json!("results")));
    }

    #[test]
    fn known_key_with_non_array_value_is_skipped() {
        let body = json!({
            "predictions": "not a list",
            "items": [{"from": "items"}],
        });
        let out = parse(body, 5).unwrap();
        assert_eq!(out[0].get("from"), Some(&json!("items")));
    }

    #[test]
    fn unknown_key_with_matching_length_is_used() {
        let body = json!({
            "model_version": "v3",
            "warnings": [],
            "scores": [{"s": 1}, {"s": 2}],
        });
        let out = parse(body, 2).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].get("s"), Some(&json!(1)));
    }

    #[test]
    fn first_matching_length_field_wins() {
        let body = json!({
            "a": [{"from": "a"}],
            "b": [{"from": "b"}],
        });
        let out = parse(body, 1).unwrap();
        assert_eq!(out[0].get("from"), Some(&json!("a")));
    }

    #[test]
    fn object_without_usable_array_reports_keys() {
        let err = parse(json!({"foo": "bar", "list": [{}, {}]}), 3).unwrap_err();
        match err {
            ScoringError::UnsupportedShape { kind, keys } => {
                assert_eq!(kind, "object");
                assert_eq!(keys, vec!["foo".to_string(), "list".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn scalar_body_is_unsupported() {
        let err = parse(json!("ok"), 1).unwrap_err();
        assert!(matches!(err, ScoringError::UnsupportedShape { kind: "string", .. }));
        assert!(err.to_string().contains("string"));
    }

    #[test]
    fn non_object_items_are_unsupported() {
        let err = parse(json!([0.1, 0.2]), 2).unwrap_err();
        assert!(matches!(err, ScoringError::UnsupportedShape { kind: "array of non-objects", .. }));
    }
}
