//! Purpose: Stdout JSON serializers for load reports.
//! Exports: `summary_json`, `document_json`, `failure_json`.
//! Role: Keep the summary envelope shape in one place.
//! Invariants: Stable key names for v0 summaries; optional keys appear only when known.
//! Invariants: Durations are milliseconds with microsecond precision.

use std::path::Path;
use std::time::Duration;

use jsonbatch::api::{BatchReport, LoadFailure, LoadedDocument};
use serde_json::{Map, Value, json};

pub(crate) fn summary_json(dir: &Path, report: &BatchReport) -> Value {
    let mut map = Map::new();
    map.insert("dir".to_string(), json!(dir.display().to_string()));
    map.insert("loaded".to_string(), json!(report.loaded()));
    map.insert("failed".to_string(), json!(report.failed()));
    map.insert("total".to_string(), json!(report.entries_total));
    map.insert("skipped_entries".to_string(), json!(report.skipped_entries));
    map.insert("list_ms".to_string(), json!(millis(report.list_elapsed)));
    map.insert("elapsed_ms".to_string(), json!(millis(report.elapsed)));
    map.insert(
        "files".to_string(),
        Value::Array(report.documents.iter().map(document_json).collect()),
    );
    map.insert(
        "failures".to_string(),
        Value::Array(report.failures.iter().map(failure_json).collect()),
    );
    Value::Object(map)
}

pub(crate) fn document_json(document: &LoadedDocument) -> Value {
    json!({
        "index": document.index,
        "file": file_label(&document.path),
        "path": document.path.display().to_string(),
        "bytes": document.bytes,
        "entries": document.entries(),
        "elapsed_ms": millis(document.elapsed),
    })
}

pub(crate) fn failure_json(failure: &LoadFailure) -> Value {
    let mut map = Map::new();
    map.insert("index".to_string(), json!(failure.index));
    map.insert("file".to_string(), json!(failure.file_name()));
    map.insert("path".to_string(), json!(failure.path.display().to_string()));
    map.insert("kind".to_string(), json!(failure.kind));
    map.insert("cause".to_string(), json!(failure.message));
    if let Some(category) = failure.category {
        map.insert("category".to_string(), json!(category));
    }
    if let Some(line) = failure.line {
        map.insert("line".to_string(), json!(line));
    }
    if let Some(column) = failure.column {
        map.insert("column".to_string(), json!(column));
    }
    if let Some(snippet) = &failure.snippet {
        map.insert("snippet".to_string(), json!(snippet));
    }
    Value::Object(map)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn millis(duration: Duration) -> f64 {
    duration.as_micros() as f64 / 1000.0
}
