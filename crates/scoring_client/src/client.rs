//! Batch scoring HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). One POST per chunk,
//! no retries: a failed call fails the run.

use std::time::Duration;

use scorebridge_core::Record;

use crate::response::ScoringResponse;

/// Top-level key of the request envelope.
pub const RECORDS_KEY: &str = "clientes";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest body excerpt carried in an error message.
const BODY_EXCERPT_CHARS: usize = 2000;

/// Anything that turns a chunk of records into scoring results.
pub trait Scorer {
    fn score(&self, chunk: &[Record]) -> Result<ScoredChunk, ScoringError>;
}

/// Results for one chunk, with the request size they answer.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub records: Vec<Record>,
    pub requested: usize,
}

impl ScoredChunk {
    pub fn is_complete(&self) -> bool {
        self.records.len() == self.requested
    }
}

/// Error type for scoring calls.
#[derive(Debug)]
pub enum ScoringError {
    /// Connection, TLS or timeout failure
    Transport(String),
    /// Non-success HTTP status with the raw response body
    Status { status: u16, body: String },
    /// Body is not JSON
    Decode(String),
    /// JSON body holds no recognizable result array
    UnsupportedShape { kind: &'static str, keys: Vec<String> },
}

impl ScoringError {
    /// Transport, status and decode failures are all remote-side failures.
    pub fn is_remote(&self) -> bool {
        !matches!(self, ScoringError::UnsupportedShape { .. })
    }
}

impl std::fmt::Display for ScoringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringError::Transport(msg) => write!(f, "scoring request failed: {}", msg),
            ScoringError::Status { status, body } => {
                write!(f, "scoring service returned HTTP {}: {}", status, excerpt(body))
            }
            ScoringError::Decode(msg) => write!(f, "scoring response is not valid JSON: {}", msg),
            ScoringError::UnsupportedShape { kind, keys } if keys.is_empty() => {
                write!(f, "unsupported scoring response: top-level {}", kind)
            }
            ScoringError::UnsupportedShape { kind, keys } => write!(
                f,
                "unsupported scoring response: {} without a usable result list (keys: {})",
                kind,
                keys.join(", ")
            ),
        }
    }
}

impl std::error::Error for ScoringError {}

/// Scoring API client (blocking).
pub struct ScoringClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl ScoringClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ScoringError> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ScoringError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("scorebridge/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ScoringError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Score one chunk. A result count that differs from the chunk size is
    /// logged and returned as-is; reconciliation decides what to do with it.
    pub fn score_chunk(&self, chunk: &[Record]) -> Result<ScoredChunk, ScoringError> {
        let body = serde_json::json!({ RECORDS_KEY: chunk });
        let json = self.post_json(&body)?;

        let records = ScoringResponse::from(json).into_results(chunk.len())?;
        let scored = ScoredChunk {
            records,
            requested: chunk.len(),
        };
        if !scored.is_complete() {
            log::warn!(
                "scoring returned {} result(s) for {} record(s); alignment will rely on the client key",
                scored.records.len(),
                scored.requested
            );
        }
        Ok(scored)
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn post_json(&self, body: &serde_json::Value) -> Result<serde_json::Value, ScoringError> {
        let response = self.http.post(&self.endpoint)
            .json(body)
            .send()
            .map_err(|e| ScoringError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            log::error!("scoring service error response ({}): {}", status, body);
            return Err(ScoringError::Status { status, body });
        }

        let text = response.text().map_err(|e| ScoringError::Transport(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| {
            ScoringError::Decode(format!("{} (body: {})", e, excerpt(&text)))
        })
    }
}

impl Scorer for ScoringClient {
    fn score(&self, chunk: &[Record]) -> Result<ScoredChunk, ScoringError> {
        self.score_chunk(chunk)
    }
}

fn excerpt(body: &str) -> String {
    if body.chars().count() <= BODY_EXCERPT_CHARS {
        return body.to_string();
    }
    let cut: String = body.chars().take(BODY_EXCERPT_CHARS).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mentions_code_and_body() {
        let err = ScoringError::Status { status: 422, body: "{\"detail\":\"bad field\"}".into() };
        let msg = err.to_string();
        assert!(msg.contains("HTTP 422"));
        assert!(msg.contains("bad field"));
        assert!(err.is_remote());
    }

    #[test]
    fn shape_error_lists_keys() {
        let err = ScoringError::UnsupportedShape { kind: "object", keys: vec!["foo".into(), "bar".into()] };
        assert_eq!(
            err.to_string(),
            "unsupported scoring response: object without a usable result list (keys: foo, bar)"
        );
        assert!(!err.is_remote());
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(BODY_EXCERPT_CHARS + 10);
        let short = excerpt(&body);
        assert_eq!(short.chars().count(), BODY_EXCERPT_CHARS + 1);
        assert!(short.ends_with('…'));
        assert_eq!(excerpt("short"), "short");
    }

    #[test]
    fn scored_chunk_completeness() {
        let chunk = ScoredChunk { records: vec![Record::new()], requested: 2 };
        assert!(!chunk.is_complete());
    }
}
