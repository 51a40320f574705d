//! Fix pipeline: build, locate, comment.
//!
//! Runs every stage in-process. The fluent [`Fixer`] mirrors the
//! subcommands, so `warnscrub fix` behaves like piping `compile` into
//! `find` into `comment`.

use std::path::PathBuf;

use tracing::info;

use crate::commenter::{comment_records, CommentOptions, CommentReport};
use crate::compiler::{self, CompileOptions};
use crate::errors::WarnscrubError;
use crate::locator::{locate, ScanOptions, ScanOutcome};
use crate::record::ResultRecord;
use crate::signature::Signature;

/// Builder for a fix run.
///
/// # Examples
///
/// ```no_run
/// use warnscrub::pipeline::Fixer;
/// use warnscrub::signature::Signature;
///
/// let report = Fixer::new(Signature::UnusedAlias)
///     .working_dir("./my_app")
///     .dry_run(true)
///     .run()
///     .unwrap();
/// println!("{} lines to comment", report.scan.records.len());
/// ```
pub struct Fixer {
    signature: Signature,
    compile: CompileOptions,
    comment: CommentOptions,
    scan: ScanOptions,
    allow_failed_build: bool,
}

impl Fixer {
    /// Create a fixer for the given warning kind with default options.
    pub fn new(signature: Signature) -> Self {
        Self {
            signature,
            compile: CompileOptions::default(),
            comment: CommentOptions::default(),
            scan: ScanOptions::default(),
            allow_failed_build: false,
        }
    }

    /// Replace the compiler options.
    pub fn compile_options(mut self, options: CompileOptions) -> Self {
        self.compile = options;
        self
    }

    /// Replace the commenting options.
    pub fn comment_options(mut self, options: CommentOptions) -> Self {
        self.comment = options;
        self
    }

    /// Trace every scanned line.
    pub fn trace(mut self, trace: bool) -> Self {
        self.scan.trace = trace;
        self
    }

    /// Run the build (and resolve relative paths) in `dir`.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.compile.working_dir = Some(dir.into());
        self
    }

    /// Keep going when the build exits non-zero but printed output.
    ///
    /// Off by default: a broken build aborts before any file is touched.
    pub fn allow_failed_build(mut self, allow: bool) -> Self {
        self.allow_failed_build = allow;
        self
    }

    /// Report changes without writing files.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.comment.dry_run = dry_run;
        self
    }

    /// Run all stages.
    ///
    /// Returns an error when the build could not run, when it exited
    /// non-zero (unless [`Fixer::allow_failed_build`] is set and it printed
    /// something), or when any located line could not be commented.
    pub fn run(self) -> Result<FixReport, WarnscrubError> {
        info!("step 1: getting compiler warnings");
        let output = compiler::run(&self.compile)?;

        let blank = output.text.trim().is_empty();
        if !output.success() && (blank || !self.allow_failed_build) {
            return Err(WarnscrubError::BuildFailed {
                status: output
                    .code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
            });
        }
        if blank {
            info!("no compiler output received; nothing to process");
            return Ok(FixReport::new(self.signature, ScanOutcome::default(), None));
        }

        info!("step 2: identifying '{}' warnings", self.signature);
        let scan = locate(output.text.lines(), self.signature, &self.scan);
        if scan.records.is_empty() {
            info!("no '{}' warnings found; nothing to fix", self.signature);
            return Ok(FixReport::new(self.signature, scan, None));
        }

        info!("step 3: commenting out {} warning site(s)", scan.records.len());
        let records = self.resolve_paths(&scan);
        let comments = comment_records(&records, &self.comment);

        let report = FixReport::new(self.signature, scan, Some(comments));
        if let Some(failed) = report.failed() {
            return Err(WarnscrubError::ItemsFailed { failed });
        }
        info!("warning fix pipeline completed successfully");
        Ok(report)
    }

    /// Compiler paths are relative to the build directory.
    fn resolve_paths(&self, scan: &ScanOutcome) -> Vec<ResultRecord> {
        match &self.compile.working_dir {
            None => scan.records.clone(),
            Some(dir) => scan
                .records
                .iter()
                .map(|r| {
                    let mut r = r.clone();
                    r.file_with_path = dir.join(&r.file_with_path).to_string_lossy().into_owned();
                    r
                })
                .collect(),
        }
    }
}

/// Result of a fix run.
#[derive(Debug)]
pub struct FixReport {
    pub signature: Signature,
    pub scan: ScanOutcome,
    /// `None` when there was nothing to comment.
    pub comments: Option<CommentReport>,
}

impl FixReport {
    fn new(signature: Signature, scan: ScanOutcome, comments: Option<CommentReport>) -> Self {
        Self {
            signature,
            scan,
            comments,
        }
    }

    /// Number of lines modified (or that would be, in a dry run).
    pub fn modified(&self) -> usize {
        self.comments.as_ref().map_or(0, |c| c.modified)
    }

    fn failed(&self) -> Option<usize> {
        self.comments
            .as_ref()
            .map(|c| c.failures.len())
            .filter(|&n| n > 0)
    }
}
