// JSON record source and dashboard sink

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use scorebridge_core::Record;
use serde_json::Value;

use crate::source::{RecordSource, SourceError};

/// File holding a JSON array of objects.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Vec<Record>, SourceError> {
        let content = fs::read_to_string(&self.path).map_err(|e| SourceError::Read {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        let parse_err = |message: String| SourceError::Parse {
            path: self.path.clone(),
            message,
        };

        let value: Value = serde_json::from_str(&content).map_err(|e| parse_err(e.to_string()))?;
        let Value::Array(items) = value else {
            return Err(parse_err("expected a top-level array of objects".into()));
        };

        items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                Value::Object(map) => Ok(Record::from(map)),
                _ => Err(parse_err(format!("element {idx} is not an object"))),
            })
            .collect()
    }
}

#[derive(Debug)]
pub struct SinkError {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot write {}: {}", self.path.display(), self.message)
    }
}

impl std::error::Error for SinkError {}

/// Write records as a pretty-printed UTF-8 JSON array.
///
/// The parent directory is created if missing. Output goes to a sibling
/// temp file first and is renamed into place, so readers never see a
/// half-written file. Returns the number of records written.
pub fn write_records(path: &Path, records: &[Record]) -> Result<usize, SinkError> {
    let sink_err = |message: String| SinkError {
        path: path.to_path_buf(),
        message,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| sink_err(e.to_string()))?;
    }

    let tmp = temp_path(path);
    let result = write_pretty(&tmp, records).and_then(|_| fs::rename(&tmp, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(sink_err(e.to_string()));
    }

    log::info!("wrote {} record(s) to {}", records.len(), path.display());
    Ok(records.len())
}

fn write_pretty(path: &Path, records: &[Record]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".into());
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorebridge_core::record_from_value;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn reads_array_of_objects() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.json");
        fs::write(&path, r#"[{"id_cliente": 1, "edad": 30}, {"id_cliente": 2}]"#).unwrap();

        let records = JsonFileSource::new(&path).fetch().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("edad"), Some(&json!(30)));
        assert_eq!(records[0].fields().collect::<Vec<_>>(), vec!["id_cliente", "edad"]);
    }

    #[test]
    fn top_level_object_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.json");
        fs::write(&path, r#"{"clientes": []}"#).unwrap();

        let err = JsonFileSource::new(&path).fetch().unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
        assert!(err.to_string().contains("top-level array"));
    }

    #[test]
    fn non_object_element_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.json");
        fs::write(&path, r#"[{"a": 1}, 2]"#).unwrap();

        let err = JsonFileSource::new(&path).fetch().unwrap_err();
        assert!(err.to_string().contains("element 1"));
    }

    #[test]
    fn write_creates_parent_and_keeps_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("docs").join("data.json");
        let records = vec![
            record_from_value(json!({"id_cliente": 1, "comuna": "Ñuñoa", "decision": "Aprobado"})),
            record_from_value(json!({"id_cliente": 2, "comuna": "Maipú", "decision": "Rechazado"})),
        ];

        let written = write_records(&path, &records).unwrap();
        assert_eq!(written, 2);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Ñuñoa"));
        assert!(content.contains("\n  {"));
        let parsed: Vec<Value> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed[1]["decision"], json!("Rechazado"));
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn empty_input_writes_empty_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        write_records(&path, &[]).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn write_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "stale").unwrap();
        write_records(&path, &[record_from_value(json!({"x": 1}))]).unwrap();
        assert!(!fs::read_to_string(&path).unwrap().contains("stale"));
    }

    #[test]
    fn unwritable_target_is_sink_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        let err = write_records(&blocker.join("data.json"), &[]).unwrap_err();
        assert!(err.to_string().contains("cannot write"));
    }
}
