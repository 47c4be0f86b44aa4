use scorebridge_core::Record;
use serde::{Serialize, Serializer};
use serde_json::Value;

pub const SCORE_FIELD: &str = "score_riesgo";
pub const LEGACY_DECISION_FIELD: &str = "decision_legacy";
pub const DECISION_FIELD: &str = "decision";

/// Checked in order when the canonical score field is missing.
pub const SCORE_ALIASES: &[&str] = &["score", "risk_score", "scoreRisk"];

/// Checked in order when the canonical legacy-decision field is missing.
pub const DECISION_ALIASES: &[&str] = &["decision", "legacy_decision", "approved"];

const APPROVED: &[&str] = &["aprobado", "approve", "approved", "1", "true", "si", "sí", "ok"];
const REJECTED: &[&str] = &["rechazado", "reject", "rejected", "0", "false", "no"];

const APPROVED_LABEL: &str = "Aprobado";
const REJECTED_LABEL: &str = "Rechazado";
const UNKNOWN_LABEL: &str = "Desconocido";

/// Canonical credit decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalDecision {
    Approved,
    Rejected,
    Unknown,
    /// Unrecognized text, kept verbatim.
    Passthrough(String),
}

impl CanonicalDecision {
    /// Dashboard label.
    pub fn label(&self) -> &str {
        match self {
            Self::Approved => APPROVED_LABEL,
            Self::Rejected => REJECTED_LABEL,
            Self::Unknown => UNKNOWN_LABEL,
            Self::Passthrough(s) => s,
        }
    }
}

impl std::fmt::Display for CanonicalDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for CanonicalDecision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl From<CanonicalDecision> for Value {
    fn from(d: CanonicalDecision) -> Self {
        match d {
            CanonicalDecision::Passthrough(s) => Value::String(s),
            other => Value::String(other.label().to_string()),
        }
    }
}

/// Map any raw decision value onto a [`CanonicalDecision`]. Total.
pub fn canonical_decision(raw: Option<&Value>) -> CanonicalDecision {
    let text = match raw {
        None | Some(Value::Null) => return CanonicalDecision::Unknown,
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => return CanonicalDecision::Unknown,
    };

    let folded = text.trim().to_lowercase();
    if APPROVED.contains(&folded.as_str()) {
        return CanonicalDecision::Approved;
    }
    if REJECTED.contains(&folded.as_str()) {
        return CanonicalDecision::Rejected;
    }

    match raw {
        Some(Value::String(s)) => CanonicalDecision::Passthrough(s.clone()),
        _ => CanonicalDecision::Unknown,
    }
}

/// Rename the first present alias to `canonical` unless `canonical` exists.
fn resolve_alias(record: &mut Record, canonical: &str, aliases: &[&str]) {
    if record.contains(canonical) {
        return;
    }
    if let Some(alias) = aliases.iter().find(|a| record.contains(a)) {
        record.rename(alias, canonical);
    }
}

/// Canonicalize the score and legacy-decision columns of one record, and
/// derive `decision` when `derive_decision` is set.
pub fn normalize(mut record: Record, derive_decision: bool) -> Record {
    resolve_alias(&mut record, SCORE_FIELD, SCORE_ALIASES);
    resolve_alias(&mut record, LEGACY_DECISION_FIELD, DECISION_ALIASES);
    if derive_decision {
        let decision = canonical_decision(record.get(LEGACY_DECISION_FIELD));
        record.insert(DECISION_FIELD, decision);
    }
    record
}

/// Normalize a merged set. `decision` is derived for every record as soon
/// as any record carries a legacy decision, so the column is uniform.
pub fn normalize_all(records: Vec<Record>) -> Vec<Record> {
    let resolved: Vec<Record> = records.into_iter().map(|r| normalize(r, false)).collect();

    let has_score = resolved.iter().any(|r| r.contains(SCORE_FIELD));
    let has_decision = resolved.iter().any(|r| r.contains(LEGACY_DECISION_FIELD));

    if !resolved.is_empty() {
        if !has_score {
            log::warn!("no score field found in scoring results (looked for {SCORE_FIELD}, {SCORE_ALIASES:?})");
        }
        if !has_decision {
            log::warn!(
                "no decision field found in scoring results (looked for {LEGACY_DECISION_FIELD}, {DECISION_ALIASES:?})"
            );
        }
    }

    if !has_decision {
        return resolved;
    }
    resolved.into_iter().map(|r| normalize(r, true)).collect()
}
