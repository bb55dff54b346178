//! Purpose: Read one file and decode it into a JSON document, or describe why not.
//! Exports: `LoadedDocument`, `LoadFailure`, `FailureKind`, `read_document`, limits.
//! Role: Untimed per-file step of the batch loader; pure apart from the file read.
//! Invariants: A failure always names its file and carries a human-readable cause.
//! Invariants: Parse failures carry 1-based line/column and a bounded snippet when available.
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::core::error::{Error, ErrorKind};
use crate::json::parse::{self, DecodeError, ParseFailureCategory};

pub const DEFAULT_MAX_FILE_BYTES: u64 = 256 * 1024 * 1024;
pub const MAX_SNIPPET_BYTES: usize = 80;

#[derive(Clone, Debug, PartialEq)]
pub struct LoadedDocument {
    pub index: usize,
    pub path: PathBuf,
    pub bytes: u64,
    pub elapsed: Duration,
    pub value: Value,
}

impl LoadedDocument {
    /// Number of top-level records: array length for arrays, otherwise one.
    pub fn entries(&self) -> usize {
        match &self.value {
            Value::Array(items) => items.len(),
            _ => 1,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum FailureKind {
    #[serde(rename = "FileReadError")]
    FileRead,
    #[serde(rename = "JsonParseError")]
    JsonParse,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoadFailure {
    pub index: usize,
    pub path: PathBuf,
    pub kind: FailureKind,
    pub error_kind: ErrorKind,
    pub message: String,
    pub category: Option<ParseFailureCategory>,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub snippet: Option<String>,
    pub hint: Option<String>,
}

impl LoadFailure {
    fn read(path: &Path, error_kind: ErrorKind, message: String) -> Self {
        Self {
            index: 0,
            path: path.to_path_buf(),
            kind: FailureKind::FileRead,
            error_kind,
            message,
            category: None,
            line: None,
            column: None,
            snippet: None,
            hint: None,
        }
    }

    fn parse(path: &Path, bytes: &[u8], err: &DecodeError) -> Self {
        let line = err.line();
        let column = err.column();
        let context = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            index: 0,
            path: path.to_path_buf(),
            kind: FailureKind::JsonParse,
            error_kind: ErrorKind::Corrupt,
            message: err.message(),
            category: Some(err.category()),
            line: Some(line),
            column: Some(column),
            snippet: parse::snippet_at(bytes, line, column, MAX_SNIPPET_BYTES),
            hint: Some(parse::hint_for_error(err, &context)),
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Turn a recorded failure into the fatal error used by the stop policy.
    pub fn into_error(self) -> Error {
        let mut err = Error::new(self.error_kind)
            .with_message(match self.kind {
                FailureKind::FileRead => format!("failed to read file: {}", self.message),
                FailureKind::JsonParse => format!("invalid JSON: {}", self.message),
            })
            .with_path(self.path);
        if let (Some(line), Some(column)) = (self.line, self.column) {
            err = err.with_position(line, column);
        }
        if let Some(hint) = self.hint {
            err = err.with_hint(hint);
        }
        err
    }
}

/// Read `path` fully and decode it; returns the value and the number of bytes read.
pub fn read_document(path: &Path, max_bytes: u64) -> Result<(Value, u64), LoadFailure> {
    let mut file = File::open(path).map_err(|err| io_failure(path, &err))?;
    let meta = file.metadata().map_err(|err| io_failure(path, &err))?;
    if !meta.is_file() {
        return Err(LoadFailure::read(
            path,
            ErrorKind::Usage,
            "not a regular file".to_string(),
        ));
    }
    if meta.len() > max_bytes {
        return Err(LoadFailure::read(
            path,
            ErrorKind::Usage,
            format!("file is {} bytes, limit is {max_bytes}", meta.len()),
        ));
    }

    let mut bytes = Vec::with_capacity(meta.len() as usize);
    // Bound the read as well; the file may grow after the metadata check.
    file.by_ref()
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|err| io_failure(path, &err))?;
    let len = bytes.len() as u64;
    if len > max_bytes {
        return Err(LoadFailure::read(
            path,
            ErrorKind::Usage,
            format!("file grew past the limit of {max_bytes} bytes"),
        ));
    }

    match parse::decode(&bytes) {
        Ok(value) => Ok((value, len)),
        Err(err) => Err(LoadFailure::parse(path, &bytes, &err)),
    }
}

fn io_failure(path: &Path, err: &std::io::Error) -> LoadFailure {
    LoadFailure::read(path, ErrorKind::from_io(err), err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{FailureKind, LoadedDocument, read_document};
    use crate::core::error::ErrorKind;
    use crate::json::parse::ParseFailureCategory;
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn reads_and_decodes_value() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("a.json");
        fs::write(&path, r#"{"x":[1,2,{"y":null}],"s":"é"}"#).expect("write");
        let (value, bytes) = read_document(&path, 1024).expect("load");
        assert_eq!(value, json!({"x": [1, 2, {"y": null}], "s": "é"}));
        assert_eq!(bytes, fs::metadata(&path).expect("meta").len());
    }

    #[test]
    fn parse_failure_has_position_and_snippet() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bad.json");
        fs::write(&path, "{\n  \"a\": tru\n}").expect("write");
        let failure = read_document(&path, 1024).expect_err("bad json");
        assert_eq!(failure.kind, FailureKind::JsonParse);
        assert_eq!(failure.error_kind, ErrorKind::Corrupt);
        assert_eq!(failure.category, Some(ParseFailureCategory::Syntax));
        assert_eq!(failure.line, Some(2));
        assert_eq!(failure.snippet.as_deref(), Some("\"a\": tru"));
        assert_eq!(failure.file_name(), "bad.json");
    }

    #[test]
    fn empty_file_failure_points_at_first_column() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("empty.json");
        fs::write(&path, "").expect("write");
        let failure = read_document(&path, 1024).expect_err("empty");
        assert_eq!(failure.category, Some(ParseFailureCategory::Eof));
        assert_eq!((failure.line, failure.column), (Some(1), Some(1)));
    }

    #[test]
    fn missing_file_is_read_failure() {
        let temp = tempfile::tempdir().expect("tempdir");
        let failure = read_document(&temp.path().join("gone.json"), 1024).expect_err("missing");
        assert_eq!(failure.kind, FailureKind::FileRead);
        assert_eq!(failure.error_kind, ErrorKind::NotFound);
        assert!(failure.line.is_none());
    }

    #[test]
    fn oversized_file_is_read_failure() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("big.json");
        fs::write(&path, "[1,2,3,4,5,6,7,8,9]").expect("write");
        let failure = read_document(&path, 4).expect_err("too big");
        assert_eq!(failure.kind, FailureKind::FileRead);
        assert!(failure.message.contains("limit is 4"));
    }

    #[test]
    fn stop_error_keeps_path_and_position() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bad.json");
        fs::write(&path, r#"{"a":"#).expect("write");
        let err = read_document(&path, 1024)
            .expect_err("bad json")
            .into_error();
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        assert_eq!(err.path(), Some(path.as_path()));
        assert_eq!(err.line(), Some(1));
        assert!(err.hint().is_some());
    }

    #[test]
    fn entries_counts_top_level_array() {
        let doc = LoadedDocument {
            index: 0,
            path: PathBuf::from("a.json"),
            bytes: 7,
            elapsed: Duration::ZERO,
            value: json!([1, 2, 3]),
        };
        assert_eq!(doc.entries(), 3);
        let scalar = LoadedDocument {
            value: json!("hello"),
            ..doc
        };
        assert_eq!(scalar.entries(), 1);
    }
}
