// CSV/TSV record source

use std::path::{Path, PathBuf};

use scorebridge_core::Record;
use serde_json::Value;

use crate::source::{RecordSource, SourceError};

/// Header-row CSV file. Every cell is read as text; empty cells become
/// null. Typing is left to coercion.
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for CsvFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Vec<Record>, SourceError> {
        let bytes = std::fs::read(&self.path).map_err(|e| SourceError::Read {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        let content = decode_export(bytes);
        let delimiter = delimiter_for(&self.path, &content);
        parse_records(&content, delimiter).map_err(|e| SourceError::Parse {
            path: self.path.clone(),
            message: e,
        })
    }
}

/// Field separator of an export. `.tsv` files are tab-separated; anything
/// else uses whichever of tab, semicolon or comma splits the header row into
/// the most columns, comma on ties.
fn delimiter_for(path: &Path, content: &str) -> u8 {
    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("tsv")) {
        return b'\t';
    }
    let header = content.lines().next().unwrap_or_default();
    // max_by_key keeps the last maximum, so comma goes last.
    [b'\t', b';', b',']
        .into_iter()
        .max_by_key(|&delim| header_width(header, delim))
        .unwrap_or(b',')
}

fn header_width(header: &str, delim: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(false)
        .from_reader(header.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map_or(0, |r| r.len())
}

/// Bank exports are UTF-8 (possibly with a BOM) or Windows-1252.
fn decode_export(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s),
        Err(e) => encoding_rs::WINDOWS_1252.decode(e.as_bytes()).0.into_owned(),
    }
}

fn parse_records(content: &str, delimiter: u8) -> Result<Vec<Record>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = result.map_err(|e| format!("row {}: {e}", idx + 2))?;
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(h, cell)| {
                let value = if cell.is_empty() {
                    Value::Null
                } else {
                    Value::String(cell.to_string())
                };
                (h.clone(), value)
            })
            .collect();
        records.push(record);
    }
    Ok(records)
}
