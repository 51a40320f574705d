//! Warning locator.
//!
//! Scans compiler output one line at a time and pairs each matched warning
//! with the source line number and file path reported beneath it. Elixir
//! prints diagnostics in this shape:
//!
//! ```text
//! warning: Foo.bar/0 is undefined or private
//!     │
//!  12 │     Foo.bar()
//!     │         ~
//!     │
//!     └─ lib/a.ex:12:9: MyApp.run/0
//! ```
//!
//! The scan is a three-state machine. Only one warning is tracked at a
//! time: a new warning that appears before the previous one completed
//! replaces it, and a sequence cut off by the end of input is dropped.

use std::io::BufRead;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::record::ResultRecord;
use crate::signature::Signature;

static LINE_NUMBER: OnceLock<Regex> = OnceLock::new();
static FILE_PATH: OnceLock<Regex> = OnceLock::new();

/// `  12 │ ...` captures `12`.
fn line_number_marker() -> &'static Regex {
    LINE_NUMBER.get_or_init(|| Regex::new(r"^\s*(\d+)\s*│").expect("static pattern is valid"))
}

/// `    └─ lib/a.ex:12:3` captures `lib/a.ex`.
fn file_path_marker() -> &'static Regex {
    FILE_PATH.get_or_init(|| {
        Regex::new(r"^\s*└─ (.*?):\d+(?::\d+)?").expect("static pattern is valid")
    })
}

/// Options for a scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Emit a debug event for every line and state transition.
    pub trace: bool,
}

impl ScanOptions {
    /// Options with per-line tracing enabled.
    pub fn traced() -> Self {
        Self { trace: true }
    }
}

/// Where the scan currently is. Each state carries only what it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ScanState {
    SeekingWarning,
    SeekingLineNumber { warning: String },
    SeekingFilePath { warning: String, line_number: String },
}

impl ScanState {
    fn label(&self) -> &'static str {
        match self {
            ScanState::SeekingWarning => "seeking-warning",
            ScanState::SeekingLineNumber { .. } => "seeking-line-number",
            ScanState::SeekingFilePath { .. } => "seeking-file-path",
        }
    }
}

/// Result of a complete scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Located sites, in input order.
    pub records: Vec<ResultRecord>,
    /// Warnings whose sequence was discarded, either because another
    /// warning interrupted it or because input ended first.
    pub abandoned: usize,
}

/// Incremental warning locator.
///
/// Feed lines with [`Locator::feed`], then call [`Locator::finish`] to
/// collect the outcome.
///
/// # Examples
///
/// ```
/// use warnscrub::locator::{Locator, ScanOptions};
/// use warnscrub::signature::Signature;
///
/// let mut locator = Locator::new(Signature::UnusedAlias, ScanOptions::default());
/// locator.feed("warning: unused alias Repo");
/// locator.feed("  3 │   alias MyApp.Repo");
/// let record = locator.feed("  └─ lib/a.ex:3:3").unwrap();
/// assert_eq!(record.file_with_path, "lib/a.ex");
/// ```
#[derive(Debug)]
pub struct Locator {
    signature: Signature,
    options: ScanOptions,
    state: ScanState,
    outcome: ScanOutcome,
}

impl Locator {
    pub fn new(signature: Signature, options: ScanOptions) -> Self {
        Self {
            signature,
            options,
            state: ScanState::SeekingWarning,
            outcome: ScanOutcome::default(),
        }
    }

    /// Process one line. Returns the record completed by this line, if any.
    ///
    /// A trailing `\n` or `\r\n` is ignored.
    pub fn feed(&mut self, raw: &str) -> Option<ResultRecord> {
        let line = raw.trim_end_matches(['\n', '\r']);
        let is_warning = self.signature.matches(line);

        if self.options.trace {
            debug!(target: "warnscrub::locator", state = self.state.label(), line, "scanning line");
        }

        let state = std::mem::replace(&mut self.state, ScanState::SeekingWarning);
        let (next, emitted) = match state {
            ScanState::SeekingWarning => {
                if is_warning {
                    self.trace("matched warning", line);
                    (ScanState::SeekingLineNumber { warning: line.to_string() }, None)
                } else {
                    (ScanState::SeekingWarning, None)
                }
            }
            ScanState::SeekingLineNumber { warning } => {
                if let Some(caps) = line_number_marker().captures(line) {
                    let line_number = caps[1].to_string();
                    self.trace("matched line number", &line_number);
                    (ScanState::SeekingFilePath { warning, line_number }, None)
                } else if is_warning {
                    self.interrupt(&warning, line);
                    (ScanState::SeekingLineNumber { warning: line.to_string() }, None)
                } else {
                    (ScanState::SeekingLineNumber { warning }, None)
                }
            }
            ScanState::SeekingFilePath { warning, line_number } => {
                if let Some(caps) = file_path_marker().captures(line) {
                    let record = ResultRecord::new(line_number, &caps[1]);
                    self.trace("recorded", &record.to_string());
                    (ScanState::SeekingWarning, Some(record))
                } else if is_warning {
                    self.interrupt(&warning, line);
                    (ScanState::SeekingLineNumber { warning: line.to_string() }, None)
                } else {
                    (ScanState::SeekingFilePath { warning, line_number }, None)
                }
            }
        };

        self.state = next;
        if let Some(record) = &emitted {
            self.outcome.records.push(record.clone());
        }
        emitted
    }

    /// End the scan. An in-progress sequence is counted as abandoned.
    pub fn finish(mut self) -> ScanOutcome {
        match &self.state {
            ScanState::SeekingWarning => {}
            ScanState::SeekingLineNumber { warning } | ScanState::SeekingFilePath { warning, .. } => {
                self.outcome.abandoned += 1;
                if self.options.trace {
                    debug!(
                        target: "warnscrub::locator",
                        state = self.state.label(),
                        warning = warning.as_str(),
                        "input ended mid-sequence"
                    );
                }
            }
        }
        self.outcome
    }

    fn interrupt(&mut self, previous: &str, line: &str) {
        self.outcome.abandoned += 1;
        if self.options.trace {
            debug!(
                target: "warnscrub::locator",
                previous,
                line,
                "new warning interrupted sequence"
            );
        }
    }

    fn trace(&self, event: &str, detail: &str) {
        if self.options.trace {
            debug!(target: "warnscrub::locator", detail, "{}", event);
        }
    }
}

/// Scan a sequence of lines.
///
/// # Examples
///
/// ```
/// use warnscrub::locator::{locate, ScanOptions};
/// use warnscrub::signature::Signature;
///
/// let lines = [
///     "warning: foo is undefined or private",
///     "  12 │ bar()",
///     "    └─ lib/a.ex:12:3",
/// ];
/// let outcome = locate(lines, Signature::UndefinedOrPrivate, &ScanOptions::default());
/// assert_eq!(outcome.records.len(), 1);
/// assert_eq!(outcome.records[0].line_number, "12");
/// ```
pub fn locate<I>(lines: I, signature: Signature, options: &ScanOptions) -> ScanOutcome
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut locator = Locator::new(signature, options.clone());
    for line in lines {
        locator.feed(line.as_ref());
    }
    report(locator.finish())
}

/// Scan lines read from `reader`.
///
/// Invalid UTF-8 is replaced rather than rejected; compiler output is not
/// always clean.
pub fn locate_reader<R: BufRead>(
    mut reader: R,
    signature: Signature,
    options: &ScanOptions,
) -> std::io::Result<ScanOutcome> {
    let mut locator = Locator::new(signature, options.clone());
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        locator.feed(&String::from_utf8_lossy(&buf));
    }
    Ok(report(locator.finish()))
}

fn report(outcome: ScanOutcome) -> ScanOutcome {
    if outcome.abandoned > 0 {
        warn!(
            abandoned = outcome.abandoned,
            "{} matched warning(s) had no line number and file path",
            outcome.abandoned
        );
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(lines: &[&str], signature: Signature) -> ScanOutcome {
        locate(lines.iter(), signature, &ScanOptions::default())
    }

    #[test]
    fn test_undefined_or_private_scenario() {
        let outcome = scan(
            &[
                "warning: foo is undefined or private",
                "  12 │ bar()",
                "    └─ lib/a.ex:12:3",
            ],
            Signature::UndefinedOrPrivate,
        );
        assert_eq!(outcome.records, vec![ResultRecord::new("12", "lib/a.ex")]);
        assert_eq!(outcome.abandoned, 0);
    }

    #[test]
    fn test_second_warning_replaces_first() {
        let outcome = scan(
            &[
                "warning: unused alias Foo",
                "warning: unused alias Bar",
                "  5 │ x",
                "    └─ lib/b.ex:5:1",
            ],
            Signature::UnusedAlias,
        );
        assert_eq!(outcome.records, vec![ResultRecord::new("5", "lib/b.ex")]);
        assert_eq!(outcome.abandoned, 1);
    }

    #[test]
    fn test_trailing_warning_is_dropped() {
        let outcome = scan(
            &["compiling 3 files", "warning: unused alias Foo"],
            Signature::UnusedAlias,
        );
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.abandoned, 1);
    }

    #[test]
    fn test_warning_cut_off_after_line_number() {
        let outcome = scan(
            &["warning: unused alias Foo", "  7 │ alias Foo"],
            Signature::UnusedAlias,
        );
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.abandoned, 1);
    }

    #[test]
    fn test_interrupt_while_seeking_path_clears_line_number() {
        let outcome = scan(
            &[
                "warning: unused alias Foo",
                "  3 │ alias Foo",
                "warning: unused alias Bar",
                "    └─ lib/ignored.ex:3:1",
                "  9 │ alias Bar",
                "    └─ lib/c.ex:9:3",
            ],
            Signature::UnusedAlias,
        );
        // The arrow line right after the interrupting warning arrives while
        // seeking a line number, so it is ignored.
        assert_eq!(outcome.records, vec![ResultRecord::new("9", "lib/c.ex")]);
        assert_eq!(outcome.abandoned, 1);
    }

    #[test]
    fn test_path_marker_before_number_marker_is_ignored() {
        let outcome = scan(
            &[
                "warning: unused alias Foo",
                "    └─ lib/early.ex:1:1",
                "  4 │ alias Foo",
                "    └─ lib/late.ex:4:3",
            ],
            Signature::UnusedAlias,
        );
        assert_eq!(outcome.records, vec![ResultRecord::new("4", "lib/late.ex")]);
    }

    #[test]
    fn test_unrelated_lines_between_markers() {
        let outcome = scan(
            &[
                "==> my_app",
                "Compiling 2 files (.ex)",
                "    warning: Repo.get/2 is undefined or private",
                "    │",
                " 41 │     Repo.get(User, id)",
                "    │          ~",
                "    │",
                "    └─ lib/my_app/accounts.ex:41:10: MyApp.Accounts.fetch/1",
                "",
                "warning: variable \"x\" is unused",
                "    │",
                "  2 │ x = 1",
                "    └─ lib/other.ex:2:1",
            ],
            Signature::UndefinedOrPrivate,
        );
        assert_eq!(
            outcome.records,
            vec![ResultRecord::new("41", "lib/my_app/accounts.ex")]
        );
    }

    #[test]
    fn test_multiple_sequences_in_order() {
        let outcome = scan(
            &[
                "warning: unused alias A",
                "  1 │ alias A",
                "  └─ lib/a.ex:1:3",
                "warning: unused alias B",
                "  2 │ alias B",
                "  └─ lib/b.ex:2",
            ],
            Signature::UnusedAlias,
        );
        assert_eq!(
            outcome.records,
            vec![ResultRecord::new("1", "lib/a.ex"), ResultRecord::new("2", "lib/b.ex")]
        );
    }

    #[test]
    fn test_path_stops_at_first_numeric_suffix() {
        let outcome = scan(
            &[
                "warning: unused alias A",
                "  8 │ alias A",
                "  └─ lib/v2:3/a.ex:8:3",
            ],
            Signature::UnusedAlias,
        );
        assert_eq!(outcome.records[0].file_with_path, "lib/v2");
    }

    #[test]
    fn test_number_marker_requires_separator_glyph() {
        let outcome = scan(
            &[
                "warning: unused alias A",
                "  8 | alias A",
                "  └─ lib/a.ex:8:3",
            ],
            Signature::UnusedAlias,
        );
        assert!(outcome.records.is_empty());
    }

    #[test]
    fn test_crlf_terminators_are_stripped() {
        let outcome = scan(
            &[
                "warning: foo is undefined or private\r\n",
                "  12 │ bar()\r\n",
                "    └─ lib/a.ex:12:3\r\n",
            ],
            Signature::UndefinedOrPrivate,
        );
        assert_eq!(outcome.records, vec![ResultRecord::new("12", "lib/a.ex")]);
    }

    #[test]
    fn test_feed_returns_completed_record() {
        let mut locator = Locator::new(Signature::UnusedAlias, ScanOptions::traced());
        assert!(locator.feed("warning: unused alias A").is_none());
        assert!(locator.feed("  1 │ alias A").is_none());
        assert_eq!(
            locator.feed("  └─ lib/a.ex:1:3"),
            Some(ResultRecord::new("1", "lib/a.ex"))
        );
        let outcome = locator.finish();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.abandoned, 0);
    }

    #[test]
    fn test_locate_reader_handles_invalid_utf8() {
        let mut input = b"warning: unused alias A\n\xff\xfe garbage\n".to_vec();
        input.extend_from_slice("  1 │ alias A\n  └─ lib/a.ex:1:3".as_bytes());
        let outcome = locate_reader(
            std::io::Cursor::new(input),
            Signature::UnusedAlias,
            &ScanOptions::default(),
        )
        .unwrap();
        assert_eq!(outcome.records, vec![ResultRecord::new("1", "lib/a.ex")]);
    }

    #[test]
    fn test_empty_input() {
        let outcome = scan(&[], Signature::UnusedAlias);
        assert_eq!(outcome, ScanOutcome::default());
    }
}
