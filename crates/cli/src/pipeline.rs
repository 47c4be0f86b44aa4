//! Pipeline orchestration.
//!
//! extract → coerce → chunk → score (sequential) → reconcile → project → write.
//! The output file is written only after every chunk has been scored and
//! reconciled, so a failed run never leaves partial output behind.

use std::fmt;
use std::path::PathBuf;

use scorebridge_config::Settings;
use scorebridge_core::{coerce_records, Record};
use scorebridge_io::{write_records, RecordSource, SinkError, SourceError};
use scorebridge_recon::{MergeStrategy, ReconError, ReconSummary};
use scorebridge_scoring_client::{Scorer, ScoringError};
use serde::Serialize;

use crate::exit_codes::{
    EXIT_ALIGNMENT, EXIT_OUTPUT, EXIT_REMOTE_SCORING, EXIT_SOURCE, EXIT_UNSUPPORTED_SHAPE, EXIT_USAGE,
};

#[derive(Debug)]
pub enum PipelineError {
    Source(SourceError),
    /// Scoring failed on chunk `chunk` (1-based) of `chunks`.
    Scoring { chunk: usize, chunks: usize, error: ScoringError },
    Recon(ReconError),
    Sink(SinkError),
}

impl PipelineError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Source(_) => EXIT_SOURCE,
            Self::Scoring { error, .. } if error.is_remote() => EXIT_REMOTE_SCORING,
            Self::Scoring { .. } => EXIT_UNSUPPORTED_SHAPE,
            Self::Recon(ReconError::Alignment { .. }) => EXIT_ALIGNMENT,
            Self::Recon(ReconError::Configuration(_)) => EXIT_USAGE,
            Self::Sink(_) => EXIT_OUTPUT,
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(e) => write!(f, "{e}"),
            Self::Scoring { chunk, chunks, error } => write!(f, "chunk {chunk}/{chunks}: {error}"),
            Self::Recon(e) => write!(f, "{e}"),
            Self::Sink(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Source(e) => Some(e),
            Self::Scoring { error, .. } => Some(error),
            Self::Recon(e) => Some(e),
            Self::Sink(e) => Some(e),
        }
    }
}

impl From<SourceError> for PipelineError {
    fn from(e: SourceError) -> Self {
        Self::Source(e)
    }
}

impl From<ReconError> for PipelineError {
    fn from(e: ReconError) -> Self {
        Self::Recon(e)
    }
}

impl From<SinkError> for PipelineError {
    fn from(e: SinkError) -> Self {
        Self::Sink(e)
    }
}

/// Scored, reconciled and projected records plus the counters of how
/// they got there.
#[derive(Debug, Clone)]
pub struct Enriched {
    pub records: Vec<Record>,
    pub chunks: usize,
    pub results: usize,
    pub mismatched_chunks: usize,
    pub summary: ReconSummary,
}

/// Outcome of one `run`, printed as JSON with `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub extracted: usize,
    pub chunks: usize,
    pub results: usize,
    pub strategy: MergeStrategy,
    pub mismatched_chunks: usize,
    pub unmatched: usize,
    pub written: usize,
    pub output: PathBuf,
}

/// Score `records` in chunks of `batch_size`, one request at a time, then
/// reconcile the concatenated results and project the dashboard columns.
pub fn enrich<S: Scorer + ?Sized>(
    records: &[Record],
    batch_size: usize,
    scorer: &S,
) -> Result<Enriched, PipelineError> {
    let chunks = scorebridge_recon::chunk(records, batch_size)?;
    let total = chunks.len();

    let mut results = Vec::with_capacity(records.len());
    let mut mismatched_chunks = 0;
    for (idx, chunk) in chunks.iter().enumerate() {
        log::info!("scoring chunk {}/{} (records: {})", idx + 1, total, chunk.len());
        let scored = scorer.score(chunk).map_err(|error| PipelineError::Scoring {
            chunk: idx + 1,
            chunks: total,
            error,
        })?;
        if !scored.is_complete() {
            mismatched_chunks += 1;
        }
        results.extend(scored.records);
    }

    let reconciled = scorebridge_recon::run(records, &results)?;
    let projected = scorebridge_recon::project(&reconciled.records);

    Ok(Enriched {
        records: projected,
        chunks: total,
        results: results.len(),
        mismatched_chunks,
        summary: reconciled.summary,
    })
}

/// Full run: fetch from `source`, coerce, enrich through `scorer`, write
/// to the configured output path.
pub fn run_pipeline<S: Scorer + ?Sized>(
    settings: &Settings,
    source: &dyn RecordSource,
    scorer: &S,
) -> Result<RunReport, PipelineError> {
    log::info!("reading applications from {}", source.describe());
    let raw = source.fetch()?;
    let records = coerce_records(raw);
    let extracted = records.len();

    let enriched = enrich(&records, settings.pipeline.batch_size, scorer)?;
    let written = write_records(&settings.output.path, &enriched.records)?;

    Ok(RunReport {
        extracted,
        chunks: enriched.chunks,
        results: enriched.results,
        strategy: enriched.summary.strategy,
        mismatched_chunks: enriched.mismatched_chunks,
        unmatched: enriched.summary.unmatched,
        written,
        output: settings.output.path.clone(),
    })
}
