use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Number as JsonNumber, Value};

use crate::record::Record;
use crate::schema::{ColumnKind, SOURCE_COLUMNS};

/// Type the known source columns of one record and fill defaults.
///
/// Fields outside the column table pass through untouched. Never fails:
/// a value that cannot be coerced becomes null, then the default (if any)
/// is applied.
pub fn coerce_record(mut record: Record) -> Record {
    for spec in SOURCE_COLUMNS {
        let coerced = match record.get(spec.name) {
            Some(raw) => Some(coerce_value(raw, spec.kind)),
            None => None,
        };
        if let Some(value) = coerced {
            record.insert(spec.name, value);
        }
        if let Some(default) = spec.default {
            if record.get_non_null(spec.name).is_none() {
                record.insert(spec.name, default.to_value());
            }
        }
    }
    record
}

pub fn coerce_records(records: Vec<Record>) -> Vec<Record> {
    records.into_iter().map(coerce_record).collect()
}

pub fn coerce_value(raw: &Value, kind: ColumnKind) -> Value {
    match kind {
        ColumnKind::Integer | ColumnKind::Number => to_number(raw, kind == ColumnKind::Integer),
        ColumnKind::Text => match raw {
            Value::String(s) => Value::String(s.trim().to_string()),
            Value::Null => Value::Null,
            Value::Number(n) => Value::String(n.to_string()),
            Value::Bool(b) => Value::String(b.to_string()),
            other => other.clone(),
        },
        ColumnKind::Date => match raw {
            Value::String(s) => parse_date(s)
                .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                .unwrap_or(Value::Null),
            _ => Value::Null,
        },
        ColumnKind::Sex => {
            let text = match raw {
                Value::String(s) => s.trim().to_uppercase(),
                _ => String::new(),
            };
            match text.as_str() {
                "M" | "F" => Value::String(text),
                _ => Value::String("NA".into()),
            }
        }
    }
}

fn to_number(raw: &Value, integer: bool) -> Value {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    if let Value::Number(n) = raw {
        if n.is_i64() || n.is_u64() {
            return raw.clone();
        }
    }

    match parsed {
        Some(f) if f.is_finite() => {
            if f.fract() == 0.0 && f.abs() < 9.0e15 {
                Value::from(f as i64)
            } else if integer {
                Value::Null
            } else {
                JsonNumber::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
            }
        }
        _ => Value::Null,
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and RFC 3339 timestamps.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}
