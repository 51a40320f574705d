//! Error types for warnscrub.

use crate::commenter::CommentError;
use crate::compiler::CompileError;
use crate::config::ConfigError;
use crate::input::InputError;
use crate::output::OutputError;

/// Top-level error type for warnscrub operations.
#[derive(Debug, thiserror::Error)]
pub enum WarnscrubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Comment(#[from] CommentError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),

    #[error("build command failed (exit status {status})")]
    BuildFailed { status: String },

    #[error("{failed} item(s) could not be commented")]
    ItemsFailed { failed: usize },
}

/// Map an error to its exit code.
pub fn exit_code(error: &WarnscrubError) -> i32 {
    match error {
        WarnscrubError::Io(_) => 1,
        WarnscrubError::Input(_) => 2,
        WarnscrubError::Comment(_) => 3,
        WarnscrubError::Compile(_) => 4,
        WarnscrubError::Config(_) => 5,
        WarnscrubError::Output(_) => 1,
        WarnscrubError::BuildFailed { .. } => 4,
        WarnscrubError::ItemsFailed { .. } => 1,
    }
}
