//! Credit application scoring pipeline: extract, score in chunks,
//! reconcile, write the dashboard file.

pub mod exit_codes;
pub mod pipeline;

pub use pipeline::{enrich, run_pipeline, Enriched, PipelineError, RunReport};
