//! Purpose: Define a stable, structured schema for non-fatal stderr notices.
//! Exports: `Notice`, `notice_json`, `skip_notice`, `summary_notice`.
//! Role: Shared contract helper for load diagnostics (skipped files, batch summary).
//! Invariants: Notices are non-fatal and never alter stdout payloads.
//! Invariants: JSON schema is stable once published; fields are additive-only.
use serde_json::{Map, Value, json};

use crate::core::batch::BatchReport;
use crate::core::document::LoadFailure;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: String,
    pub time: String,
    pub cmd: String,
    pub dir: String,
    pub message: String,
    pub details: Map<String, Value>,
}

pub fn notice_json(notice: &Notice) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(notice.kind));
    inner.insert("time".to_string(), json!(notice.time));
    inner.insert("cmd".to_string(), json!(notice.cmd));
    inner.insert("dir".to_string(), json!(notice.dir));
    inner.insert("message".to_string(), json!(notice.message));
    inner.insert("details".to_string(), Value::Object(notice.details.clone()));

    let mut outer = Map::new();
    outer.insert("notice".to_string(), Value::Object(inner));
    Value::Object(outer)
}

pub fn skip_notice(failure: &LoadFailure, dir: &str, time: String) -> Notice {
    let mut details = Map::new();
    details.insert("index".to_string(), json!(failure.index));
    details.insert("file".to_string(), json!(failure.file_name()));
    details.insert("path".to_string(), json!(failure.path.display().to_string()));
    details.insert("error_kind".to_string(), json!(failure.kind));
    details.insert("cause".to_string(), json!(failure.message));
    if let Some(category) = failure.category {
        details.insert("category".to_string(), json!(category));
    }
    if let Some(line) = failure.line {
        details.insert("line".to_string(), json!(line));
    }
    if let Some(column) = failure.column {
        details.insert("column".to_string(), json!(column));
    }
    if let Some(snippet) = &failure.snippet {
        details.insert("snippet".to_string(), json!(snippet));
    }

    Notice {
        kind: "load_skip".to_string(),
        time,
        cmd: "load".to_string(),
        dir: dir.to_string(),
        message: skip_message(failure),
        details,
    }
}

fn skip_message(failure: &LoadFailure) -> String {
    match (failure.line, failure.column) {
        (Some(line), Some(column)) => format!(
            "Skipped {} (invalid JSON at line {line}, column {column}).",
            failure.file_name()
        ),
        _ => format!("Skipped {}: {}.", failure.file_name(), failure.message),
    }
}

pub fn summary_notice(report: &BatchReport, dir: &str, time: String) -> Notice {
    let mut details = Map::new();
    details.insert("total".to_string(), json!(report.entries_total));
    details.insert("loaded".to_string(), json!(report.loaded()));
    details.insert("failed".to_string(), json!(report.failed()));
    Notice {
        kind: "load_summary".to_string(),
        time,
        cmd: "load".to_string(),
        dir: dir.to_string(),
        message: format!(
            "Loaded {} of {} file{}; {} skipped.",
            report.loaded(),
            report.entries_total,
            if report.entries_total == 1 { "" } else { "s" },
            report.failed()
        ),
        details,
    }
}
