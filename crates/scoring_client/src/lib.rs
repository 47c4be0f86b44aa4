//! Scoring API client. Owns the batch scoring wire contract: the request
//! envelope and the accepted response shapes.
//!
//! No batching, no merging, no retries.

mod client;
pub mod response;

pub use client::{
    Scorer, ScoredChunk, ScoringClient, ScoringError,
    DEFAULT_TIMEOUT, RECORDS_KEY,
};
pub use response::{ScoringResponse, RESULT_KEYS};
