//! `scorebridge-recon`: batching and result reconciliation engine.
//!
//! Pure engine crate: receives source records and scoring results, returns
//! merged, canonicalized records. No network or file IO.

pub mod batch;
pub mod engine;
pub mod error;
pub mod merge;
pub mod model;
pub mod normalize;

pub use batch::chunk;
pub use engine::{project, run};
pub use error::ReconError;
pub use merge::merge;
pub use model::{MergeOutput, MergeStrategy, ReconResult, ReconSummary};
pub use normalize::{canonical_decision, normalize, normalize_all, CanonicalDecision};
