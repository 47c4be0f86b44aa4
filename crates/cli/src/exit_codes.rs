//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: schedulers and scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                                  |
//! |---------|------------------|----------------------------------------------|
//! | 0       | Universal        | Success                                      |
//! | 1       | Universal        | General error (unspecified)                  |
//! | 2       | Universal        | Usage or configuration error                 |
//! | 60-69   | pipeline         | Extraction, scoring, alignment, output       |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into [`crate::pipeline::PipelineError::exit_code`] or the command

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unreadable or invalid configuration.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Pipeline (60-69)
// =============================================================================

/// Source unavailable: database connect/query failure, unreadable input file.
pub const EXIT_SOURCE: u8 = 60;

/// Scoring service failed: transport error, timeout, non-success status,
/// or a body that is not JSON.
pub const EXIT_REMOTE_SCORING: u8 = 61;

/// Scoring response is JSON but holds no recognizable result list.
pub const EXIT_UNSUPPORTED_SHAPE: u8 = 62;

/// Results carry no client key and their count differs from the source.
pub const EXIT_ALIGNMENT: u8 = 63;

/// Output file could not be written.
pub const EXIT_OUTPUT: u8 = 64;
