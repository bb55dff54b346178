//! Purpose: Decode raw file bytes into JSON values and classify decode failures.
//! Exports: `decode`, `DecodeError`, `ParseFailureCategory`, `categorize_error`,
//!          `categorize_message`, `hint_for_error`, `snippet_at`.
//! Role: Parser boundary that centralizes serde_json usage details for file loads.
//! Invariants: A leading UTF-8 byte-order mark is ignored; other bytes must be UTF-8.
//! Invariants: Line and column numbers are 1-based; serde_json's column 0 (start of line) reads as 1.
//! Notes: Error mapping into load failures is done by callsites so path context stays explicit.

use bstr::ByteSlice;
use serde::Serialize;
use serde_json::Value;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseFailureCategory {
    Syntax,
    Eof,
    Data,
    Io,
    DepthLimit,
    Utf8,
    Unknown,
}

impl ParseFailureCategory {
    pub fn label(self) -> &'static str {
        match self {
            ParseFailureCategory::Syntax => "syntax",
            ParseFailureCategory::Eof => "eof",
            ParseFailureCategory::Data => "data",
            ParseFailureCategory::Io => "io",
            ParseFailureCategory::DepthLimit => "depth-limit",
            ParseFailureCategory::Utf8 => "utf8",
            ParseFailureCategory::Unknown => "unknown",
        }
    }
}

#[derive(Debug)]
pub enum DecodeError {
    Utf8 {
        offset: usize,
        line: usize,
        column: usize,
    },
    Json(serde_json::Error),
}

impl DecodeError {
    pub fn category(&self) -> ParseFailureCategory {
        match self {
            DecodeError::Utf8 { .. } => ParseFailureCategory::Utf8,
            DecodeError::Json(err) => categorize_error(err),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            DecodeError::Utf8 { line, .. } => *line,
            DecodeError::Json(err) => err.line(),
        }
    }

    pub fn column(&self) -> usize {
        match self {
            DecodeError::Utf8 { column, .. } => *column,
            DecodeError::Json(err) => err.column().max(1),
        }
    }

    pub fn message(&self) -> String {
        match self {
            DecodeError::Utf8 { offset, .. } => format!("invalid UTF-8 at byte {offset}"),
            DecodeError::Json(err) => err.to_string(),
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Utf8 { .. } => None,
            DecodeError::Json(err) => Some(err),
        }
    }
}

pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

/// Decode one whole file body into a single JSON value.
pub fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    let body = strip_bom(bytes);
    let text = std::str::from_utf8(body).map_err(|err| {
        let offset = err.valid_up_to();
        let (line, column) = position_of(body, offset);
        DecodeError::Utf8 {
            offset: offset + (bytes.len() - body.len()),
            line,
            column,
        }
    })?;
    serde_json::from_str(text).map_err(DecodeError::Json)
}

fn position_of(body: &[u8], offset: usize) -> (usize, usize) {
    let prefix = &body[..offset.min(body.len())];
    let line = prefix.iter().filter(|b| **b == b'\n').count() + 1;
    let line_start = prefix.rfind_byte(b'\n').map(|idx| idx + 1).unwrap_or(0);
    (line, offset - line_start + 1)
}

pub fn categorize_error(err: &serde_json::Error) -> ParseFailureCategory {
    let from_message = categorize_message(&err.to_string());
    if from_message == ParseFailureCategory::DepthLimit {
        return from_message;
    }
    match err.classify() {
        serde_json::error::Category::Syntax => ParseFailureCategory::Syntax,
        serde_json::error::Category::Eof => ParseFailureCategory::Eof,
        serde_json::error::Category::Data => ParseFailureCategory::Data,
        serde_json::error::Category::Io => ParseFailureCategory::Io,
    }
}

pub fn categorize_message(message: &str) -> ParseFailureCategory {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("recursion limit") {
        ParseFailureCategory::DepthLimit
    } else if lowered.contains("eof while parsing") {
        ParseFailureCategory::Eof
    } else if lowered.contains("utf-8") || lowered.contains("unicode") {
        ParseFailureCategory::Utf8
    } else if lowered.contains("expected")
        || lowered.contains("trailing")
        || lowered.contains("key must be")
    {
        ParseFailureCategory::Syntax
    } else {
        ParseFailureCategory::Unknown
    }
}

pub fn hint_for_error(err: &DecodeError, context: &str) -> String {
    format!(
        "File is not valid JSON (parse category: {}; context: {context}; line {}, column {}).",
        err.category().label(),
        err.line(),
        err.column()
    )
}

/// Render the offending line around `column`, capped at `max_bytes` of input.
pub fn snippet_at(bytes: &[u8], line: usize, column: usize, max_bytes: usize) -> Option<String> {
    if line == 0 || max_bytes == 0 {
        return None;
    }
    let body = strip_bom(bytes);
    let text = body.lines().nth(line - 1)?;
    let column = column.saturating_sub(1).min(text.len());
    let start = if text.len() <= max_bytes {
        0
    } else {
        column
            .saturating_sub(max_bytes / 2)
            .min(text.len() - max_bytes)
    };
    let end = (start + max_bytes).min(text.len());
    let snippet = text[start..end].trim().to_str_lossy().into_owned();
    if snippet.is_empty() {
        None
    } else {
        Some(snippet)
    }
}
