use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// Invalid engine parameter (batch size, etc.).
    Configuration(String),
    /// No key on the results and the positional pairing does not line up.
    Alignment { source_len: usize, result_len: usize },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "configuration error: {msg}"),
            Self::Alignment { source_len, result_len } => write!(
                f,
                "cannot align {result_len} result(s) to {source_len} source record(s): \
                 results carry no client key and lengths differ"
            ),
        }
    }
}

impl std::error::Error for ReconError {}
