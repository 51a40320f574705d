//! Line commenter.
//!
//! Takes the JSON array produced by the locator and comments out each
//! referenced line in place. Structural problems with the JSON are fatal;
//! problems with individual items are collected in the report and the
//! remaining items are still processed.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::record::ResultRecord;

/// Default comment marker (Elixir and most scripting languages).
pub const DEFAULT_MARKER: &str = "#";

/// Fatal errors: nothing was processed.
#[derive(Debug, Error)]
pub enum CommentError {
    #[error("received empty input from {source_name}; no operations performed")]
    EmptyInput { source_name: String },

    #[error("invalid JSON received from {source_name}: {source}")]
    InvalidJson {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected JSON input to be a list of objects, but got {found}")]
    NotAnArray { found: &'static str },
}

/// Why a single item could not be applied.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("skipping non-object item in JSON list: {0}")]
    NotAnObject(String),

    #[error("skipping item due to missing 'fileWithPath' or 'lineNumber': {0}")]
    MissingField(String),

    #[error("line number '{value}' for file '{path}' is not a valid integer")]
    NotAnInteger { value: String, path: PathBuf },

    #[error("line number '{value}' for file '{path}' is invalid (must be >= 1)")]
    NotPositive { value: String, path: PathBuf },

    #[error("line number {line} is out of range for file '{path}' (total lines: {total})")]
    OutOfRange { line: usize, total: usize, path: PathBuf },

    #[error("file '{path}' not found")]
    NotFound { path: PathBuf },

    #[error("error processing file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Options for commenting.
#[derive(Debug, Clone)]
pub struct CommentOptions {
    /// Marker inserted (followed by a space) at the start of the line.
    pub marker: String,
    /// Report what would change without writing files.
    pub dry_run: bool,
}

impl Default for CommentOptions {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            dry_run: false,
        }
    }
}

impl CommentOptions {
    /// The prefix inserted into lines: marker plus one space.
    pub fn prefix(&self) -> String {
        format!("{} ", self.marker)
    }
}

/// A validated (file, 1-indexed line) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentTarget {
    pub path: PathBuf,
    pub line: usize,
}

impl TryFrom<&ResultRecord> for CommentTarget {
    type Error = ItemError;

    fn try_from(record: &ResultRecord) -> Result<Self, Self::Error> {
        if record.file_with_path.is_empty() || record.line_number.is_empty() {
            return Err(ItemError::MissingField(record.to_string()));
        }
        let path = PathBuf::from(&record.file_with_path);
        let line = parse_line_number(&record.line_number, &path)?;
        Ok(CommentTarget { path, line })
    }
}

fn parse_line_number(value: &str, path: &Path) -> Result<usize, ItemError> {
    let n: i64 = value.trim().parse().map_err(|_| ItemError::NotAnInteger {
        value: value.to_string(),
        path: path.to_path_buf(),
    })?;
    if n < 1 {
        return Err(ItemError::NotPositive {
            value: value.to_string(),
            path: path.to_path_buf(),
        });
    }
    usize::try_from(n).map_err(|_| ItemError::NotAnInteger {
        value: value.to_string(),
        path: path.to_path_buf(),
    })
}

/// What happened to one target line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStatus {
    /// The marker was inserted (or would be, in a dry run).
    Modified,
    /// The line already began with the marker; the file was left alone.
    AlreadyCommented,
}

/// A failed item and its position in the input list.
#[derive(Debug)]
pub struct ItemFailure {
    pub index: usize,
    pub error: ItemError,
}

/// Summary of a commenting run.
#[derive(Debug, Default)]
pub struct CommentReport {
    pub modified: usize,
    pub already_commented: usize,
    pub failures: Vec<ItemFailure>,
}

impl CommentReport {
    /// True when every item was applied or already in place.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, index: usize, result: Result<CommentStatus, ItemError>) {
        match result {
            Ok(CommentStatus::Modified) => self.modified += 1,
            Ok(CommentStatus::AlreadyCommented) => self.already_commented += 1,
            Err(error) => {
                warn!("{}; skipping", error);
                self.failures.push(ItemFailure { index, error });
            }
        }
    }
}

/// Comment out line `line` (1-indexed) of `path`.
///
/// The line terminator, if any, is preserved. A line that already starts
/// with the marker and a space after leading whitespace is left unchanged.
pub fn comment_line(
    path: &Path,
    line: usize,
    options: &CommentOptions,
) -> Result<CommentStatus, ItemError> {
    let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;

    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let total = lines.len();
    if line == 0 || line > total {
        return Err(ItemError::OutOfRange {
            line,
            total,
            path: path.to_path_buf(),
        });
    }

    let prefix = options.prefix();
    let original = lines[line - 1];
    if original.trim_start().starts_with(&prefix) {
        info!(
            "line {} in '{}' already starts with '{}'; skipping",
            line,
            path.display(),
            prefix
        );
        return Ok(CommentStatus::AlreadyCommented);
    }

    if options.dry_run {
        info!("would prepend '{}' to line {} in '{}'", prefix, line, path.display());
        return Ok(CommentStatus::Modified);
    }

    let mut updated = String::with_capacity(content.len() + prefix.len());
    for (i, text) in lines.iter().enumerate() {
        if i == line - 1 {
            updated.push_str(&prefix);
        }
        updated.push_str(text);
    }

    fs::write(path, updated).map_err(|e| io_error(path, e))?;
    info!("prepended '{}' to line {} in '{}'", prefix, line, path.display());
    Ok(CommentStatus::Modified)
}

fn io_error(path: &Path, source: std::io::Error) -> ItemError {
    if source.kind() == std::io::ErrorKind::NotFound {
        ItemError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        ItemError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Validate one JSON list item.
fn parse_item(item: &Value) -> Result<CommentTarget, ItemError> {
    let obj = item
        .as_object()
        .ok_or_else(|| ItemError::NotAnObject(item.to_string()))?;

    let path = match obj.get("fileWithPath") {
        Some(Value::String(s)) if !s.is_empty() => PathBuf::from(s),
        _ => return Err(ItemError::MissingField(item.to_string())),
    };
    let line = match obj.get("lineNumber") {
        Some(Value::String(s)) if !s.is_empty() => parse_line_number(s, &path)?,
        Some(Value::Number(n)) => parse_line_number(&n.to_string(), &path)?,
        _ => return Err(ItemError::MissingField(item.to_string())),
    };
    Ok(CommentTarget { path, line })
}

/// Parse the locator's JSON output into per-item targets.
///
/// `source_name` describes where the text came from, for error messages.
pub fn parse_targets(
    json: &str,
    source_name: &str,
) -> Result<Vec<Result<CommentTarget, ItemError>>, CommentError> {
    if json.trim().is_empty() {
        return Err(CommentError::EmptyInput {
            source_name: source_name.to_string(),
        });
    }

    let value: Value = serde_json::from_str(json).map_err(|source| CommentError::InvalidJson {
        source_name: source_name.to_string(),
        source,
    })?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(CommentError::NotAnArray {
                found: json_type_name(&other),
            })
        }
    };

    Ok(items.iter().map(parse_item).collect())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Apply already-parsed targets.
pub fn comment_targets<I>(targets: I, options: &CommentOptions) -> CommentReport
where
    I: IntoIterator<Item = Result<CommentTarget, ItemError>>,
{
    let mut report = CommentReport::default();
    for (index, target) in targets.into_iter().enumerate() {
        let result = target.and_then(|t| {
            debug!(index, path = %t.path.display(), line = t.line, "commenting");
            comment_line(&t.path, t.line, options)
        });
        report.record(index, result);
    }
    log_summary(&report);
    report
}

/// Apply located records directly, without a JSON round trip.
pub fn comment_records(records: &[ResultRecord], options: &CommentOptions) -> CommentReport {
    comment_targets(records.iter().map(CommentTarget::try_from), options)
}

/// Parse `json` and apply every item.
pub fn comment_json(
    json: &str,
    source_name: &str,
    options: &CommentOptions,
) -> Result<CommentReport, CommentError> {
    let targets = parse_targets(json, source_name)?;
    Ok(comment_targets(targets, options))
}

fn log_summary(report: &CommentReport) {
    info!(
        "processing complete; successfully modified lines in {} instances",
        report.modified
    );
    if report.already_commented > 0 {
        info!("{} line(s) were already commented", report.already_commented);
    }
    if !report.failures.is_empty() {
        warn!(
            "encountered {} errors or skipped items; see messages above for details",
            report.failures.len()
        );
    }
}
