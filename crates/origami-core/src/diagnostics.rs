//! Diagnostic records and rendering
//!
//! Rewrite errors carry byte spans; this module turns them into something a
//! human (or a tool) can use: line/column locations, serializable
//! diagnostic records for JSON output, and rich ariadne code frames for the
//! terminal.

use std::ops::Range;
use std::path::{Path, PathBuf};

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use serde::{Deserialize, Serialize};

use crate::OrigamiError;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A position in a source file, 1-based line and column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Location {
    /// Compute the line/column of a byte offset in `source`
    pub fn from_offset(file: impl Into<PathBuf>, source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let mut line = 1u32;
        let mut column = 1u32;
        for c in source[..offset].chars() {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self {
            file: file.into(),
            line,
            column,
            offset,
        }
    }
}

/// A serializable diagnostic record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
    pub span_start: usize,
    pub span_end: usize,
}

impl Diagnostic {
    /// Build a diagnostic record from a rewrite error
    pub fn from_error(err: &OrigamiError, file: impl Into<PathBuf>, source: &str) -> Self {
        let span = err.span().unwrap_or(0..0);
        let location = Location::from_offset(file, source, span.start);
        Self {
            severity: Severity::Error,
            message: err.to_string(),
            file: location.file,
            line: location.line,
            column: location.column,
            span_start: span.start,
            span_end: span.end,
        }
    }
}

/// Render diagnostics as a JSON array for programmatic consumption
pub fn render_json(diagnostics: &[Diagnostic]) -> String {
    serde_json::to_string_pretty(diagnostics)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize: {e}\"}}"))
}

/// Render an error as an ariadne code frame over its source
pub fn render_report(err: &OrigamiError, file: &Path, source: &str, color: bool) -> String {
    let name = file.display().to_string();
    let span: Range<usize> = err.span().unwrap_or(0..0);
    let label_color = if color { Color::Red } else { Color::Primary };

    let mut buf = Vec::new();
    let result = Report::build(ReportKind::Error, (name.as_str(), span.clone()))
        .with_config(Config::default().with_color(color))
        .with_message(err.to_string())
        .with_label(
            Label::new((name.as_str(), span))
                .with_message(label_message(err))
                .with_color(label_color),
        )
        .finish()
        .write((name.as_str(), Source::from(source)), &mut buf);

    match result {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => format!("error: {err}\n"),
    }
}

fn label_message(err: &OrigamiError) -> &'static str {
    match err {
        OrigamiError::Parse { .. } => "the document fails to parse here",
        OrigamiError::MissingAttribute { .. } => "this tag is missing a required attribute",
        OrigamiError::WrongAttributeKind { .. } => "this attribute has the wrong value kind",
        OrigamiError::UnexpectedAttribute { .. } => "this tag does not admit the attribute",
        OrigamiError::MalformedChain { .. } => "no `$if` leads this sibling run",
        _ => "here",
    }
}
