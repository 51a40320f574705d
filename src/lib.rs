//! Warnscrub - locate compiler warnings and comment out the offending lines.
//!
//! Compiler diagnostics name the warning on one line and report the source
//! location a few lines later. Warnscrub scans that output, pairs each
//! warning of a chosen kind with its line number and file path, and can
//! then comment those lines out in place.
//!
//! # Quick Start
//!
//! ```
//! use warnscrub::locator::{locate, ScanOptions};
//! use warnscrub::signature::Signature;
//!
//! let output = "\
//! warning: unused alias Foo
//! warning: unused alias Bar
//!   5 │ x
//!     └─ lib/b.ex:5:1
//! ";
//!
//! let outcome = locate(output.lines(), Signature::UnusedAlias, &ScanOptions::default());
//! assert_eq!(outcome.records.len(), 1);
//! assert_eq!(outcome.records[0].file_with_path, "lib/b.ex");
//! ```
//!
//! # Modules
//!
//! - [`signature`] - Which warning lines start a sequence
//! - [`locator`] - The line scanner
//! - [`record`] - Located sites and their JSON shape
//! - [`input`] - Choosing where input comes from
//! - [`commenter`] - Commenting out located lines
//! - [`compiler`] - Running the build command
//! - [`pipeline`] - Build, locate and comment in one go
//! - [`output`] - Rendering results
//! - [`config`] - Optional `.warnscrub.toml`

pub mod signature;
pub mod record;
pub mod locator;
pub mod input;
pub mod errors;
pub mod commenter;
pub mod compiler;
pub mod config;
pub mod output;
pub mod pipeline;

// Re-export key types at crate root for convenience
pub use commenter::{CommentError, CommentOptions, CommentReport, ItemError};
pub use compiler::{CompileError, CompileOptions, CompileOutput};
pub use config::{Config, ConfigError};
pub use errors::WarnscrubError;
pub use input::{InputError, InputSource};
pub use locator::{locate, locate_reader, Locator, ScanOptions, ScanOutcome};
pub use output::{OutputError, OutputFormat};
pub use pipeline::{FixReport, Fixer};
pub use record::ResultRecord;
pub use signature::Signature;
