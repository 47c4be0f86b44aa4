// Record sources and the dashboard sink

pub mod csv;
pub mod json;
pub mod mysql;
pub mod source;

pub use json::{write_records, JsonFileSource, SinkError};
pub use mysql::{extract_query, MySqlSource};
pub use source::{file_source, RecordSource, SourceError};
pub use self::csv::CsvFileSource;
