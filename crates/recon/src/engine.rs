use scorebridge_core::{Record, CLIENT_KEY, OUTPUT_COLUMNS};

use crate::error::ReconError;
use crate::merge::merge;
use crate::model::{ReconResult, ReconSummary};
use crate::normalize::{normalize_all, LEGACY_DECISION_FIELD, SCORE_FIELD};

/// Merge the concatenated scoring results onto `source` and canonicalize
/// the scoring columns. Output follows source order.
pub fn run(source: &[Record], results: &[Record]) -> Result<ReconResult, ReconError> {
    let merged = merge(source, results, CLIENT_KEY)?;
    log::info!(
        "merged {} result(s) onto {} record(s) by {}",
        results.len(),
        source.len(),
        merged.strategy
    );

    let records = normalize_all(merged.records);

    let summary = ReconSummary {
        source_rows: source.len(),
        result_rows: results.len(),
        strategy: merged.strategy,
        unmatched: merged.unmatched,
        has_score: records.iter().any(|r| r.contains(SCORE_FIELD)),
        has_decision: records.iter().any(|r| r.contains(LEGACY_DECISION_FIELD)),
    };

    Ok(ReconResult { records, summary })
}

/// Restrict each record to the dashboard columns.
pub fn project(records: &[Record]) -> Vec<Record> {
    records.iter().map(|r| r.project(OUTPUT_COLUMNS)).collect()
}
