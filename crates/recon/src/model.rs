use scorebridge_core::Record;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// How results were paired with source records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Left outer join on the client key.
    Key,
    /// `source[i]` with `results[i]`.
    Position,
}

impl std::fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key => write!(f, "key"),
            Self::Position => write!(f, "position"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MergeOutput {
    pub records: Vec<Record>,
    pub strategy: MergeStrategy,
    /// Source records with no result (key path only).
    pub unmatched: usize,
}

// ---------------------------------------------------------------------------
// Engine output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub source_rows: usize,
    pub result_rows: usize,
    pub strategy: MergeStrategy,
    pub unmatched: usize,
    pub has_score: bool,
    pub has_decision: bool,
}

#[derive(Debug, Clone)]
pub struct ReconResult {
    pub records: Vec<Record>,
    pub summary: ReconSummary,
}
