use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field that identifies the client behind an application.
pub const CLIENT_KEY: &str = "id_cliente";

/// A single flat row: field name to scalar JSON value.
///
/// Field order is insertion order, so a record serializes with its columns
/// in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Value of `field`, treating an explicit JSON null as absent.
    pub fn get_non_null(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.shift_remove(field)
    }

    /// Move `from` to `to`, keeping the value. No-op if `from` is absent.
    ///
    /// The renamed field is appended at the end of the record.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        match self.0.shift_remove(from) {
            Some(value) => {
                self.0.insert(to.to_string(), value);
                true
            }
            None => false,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy of this record restricted to `columns`, in `columns` order.
    /// Columns the record does not carry are skipped, not nulled.
    pub fn project(&self, columns: &[&str]) -> Record {
        columns
            .iter()
            .filter_map(|c| self.0.get(*c).map(|v| (c.to_string(), v.clone())))
            .collect()
    }

    /// Canonical text form of the client key, if present and non-null.
    pub fn key(&self, field: &str) -> Option<String> {
        self.get_non_null(field).and_then(key_text)
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Join key text for a scalar value.
///
/// Integral numbers and numeric strings collapse to the same form, so
/// `17`, `17.0` and `" 17 "` are one key. Non-scalar values have no key.
pub fn key_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(number_key(n)),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<f64>() {
                Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
                    Some(format!("{}", f as i64))
                }
                _ => Some(trimmed.to_string()),
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn number_key(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

/// Build a record from a `serde_json::json!` object literal. Non-objects
/// yield an empty record.
pub fn record_from_value(value: Value) -> Record {
    match value {
        Value::Object(map) => Record(map),
        _ => Record::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_text_collapses_numeric_forms() {
        assert_eq!(key_text(&json!(17)), Some("17".into()));
        assert_eq!(key_text(&json!(17.0)), Some("17".into()));
        assert_eq!(key_text(&json!(" 17 ")), Some("17".into()));
        assert_eq!(key_text(&json!("17.0")), Some("17".into()));
        assert_eq!(key_text(&json!("C-17")), Some("C-17".into()));
        assert_eq!(key_text(&json!(1.5)), Some("1.5".into()));
    }

    #[test]
    fn key_text_rejects_empty_and_null() {
        assert_eq!(key_text(&json!(null)), None);
        assert_eq!(key_text(&json!("   ")), None);
        assert_eq!(key_text(&json!([1])), None);
    }

    #[test]
    fn project_keeps_requested_order_and_skips_missing() {
        let rec = record_from_value(json!({"b": 2, "a": 1, "c": null}));
        let out = rec.project(&["a", "missing", "c", "b"]);
        let fields: Vec<&str> = out.fields().collect();
        assert_eq!(fields, vec!["a", "c", "b"]);
        assert_eq!(out.get("c"), Some(&Value::Null));
    }

    #[test]
    fn rename_moves_value() {
        let mut rec = record_from_value(json!({"score": 0.4, "id": 1}));
        assert!(rec.rename("score", "score_riesgo"));
        assert!(!rec.contains("score"));
        assert_eq!(rec.get("score_riesgo"), Some(&json!(0.4)));
        assert!(!rec.rename("nope", "other"));
    }

    #[test]
    fn get_non_null_treats_null_as_absent() {
        let rec = record_from_value(json!({"id_cliente": null}));
        assert!(rec.contains(CLIENT_KEY));
        assert!(rec.get_non_null(CLIENT_KEY).is_none());
        assert_eq!(rec.key(CLIENT_KEY), None);
    }

    #[test]
    fn serializes_transparently() {
        let rec = record_from_value(json!({"x": 1, "y": "z"}));
        let s = serde_json::to_string(&rec).unwrap();
        assert_eq!(s, r#"{"x":1,"y":"z"}"#);
    }
}
