use std::fmt;
use std::path::{Path, PathBuf};

use scorebridge_core::Record;

/// Where the pipeline's input records come from.
pub trait RecordSource {
    /// Short label for logs ("mysql", a file path, ...).
    fn describe(&self) -> String;

    /// Read every record, in source order.
    fn fetch(&self) -> Result<Vec<Record>, SourceError>;
}

#[derive(Debug)]
pub enum SourceError {
    /// Could not connect to the database.
    Connect(String),
    /// Query failed or a column could not be decoded.
    Query(String),
    /// Input file could not be read.
    Read { path: PathBuf, message: String },
    /// Input file content is malformed.
    Parse { path: PathBuf, message: String },
    /// Input file extension is not .json or .csv.
    UnsupportedFormat(PathBuf),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(msg) => write!(f, "database connection failed: {msg}"),
            Self::Query(msg) => write!(f, "extraction query failed: {msg}"),
            Self::Read { path, message } => write!(f, "cannot read {}: {message}", path.display()),
            Self::Parse { path, message } => write!(f, "cannot parse {}: {message}", path.display()),
            Self::UnsupportedFormat(path) => write!(
                f,
                "unsupported input format: {} (expected .json or .csv)",
                path.display()
            ),
        }
    }
}

impl std::error::Error for SourceError {}

/// Pick a file source by extension.
pub fn file_source(path: &Path) -> Result<Box<dyn RecordSource>, SourceError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("json") => Ok(Box::new(crate::json::JsonFileSource::new(path))),
        Some("csv") | Some("tsv") | Some("txt") => Ok(Box::new(crate::csv::CsvFileSource::new(path))),
        _ => Err(SourceError::UnsupportedFormat(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_source_by_extension() {
        assert!(file_source(Path::new("in.JSON")).is_ok());
        assert!(file_source(Path::new("in.csv")).is_ok());
        let err = file_source(Path::new("in.xlsx")).err().unwrap();
        assert!(matches!(err, SourceError::UnsupportedFormat(_)));
        assert!(err.to_string().contains("in.xlsx"));
    }
}
