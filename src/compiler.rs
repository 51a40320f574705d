//! Compiler runner.
//!
//! Runs the build command and captures everything it printed. Warnings
//! may land on either stream, so stdout and stderr are joined (stdout
//! first) into one text blob for the locator.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info, warn};

/// Default build command.
pub fn default_command() -> Vec<String> {
    vec!["mix".to_string(), "compile".to_string()]
}

/// Default file the combined output is saved to.
pub const DEFAULT_SAVE_FILE: &str = "my_warnings.txt";

/// Errors running the build command.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("no build command configured")]
    EmptyCommand,

    #[error("the '{program}' command was not found; is it installed and in your PATH?")]
    NotFound { program: String },

    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Options for a compiler run.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Program followed by its arguments.
    pub command: Vec<String>,
    /// Directory to run in (current directory when unset).
    pub working_dir: Option<PathBuf>,
    /// Where to save the combined output, if anywhere. Relative paths
    /// are taken from `working_dir` when it is set.
    pub save_to: Option<PathBuf>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            command: default_command(),
            working_dir: None,
            save_to: Some(PathBuf::from(DEFAULT_SAVE_FILE)),
        }
    }
}

impl CompileOptions {
    /// Resolved location of the saved output.
    pub fn save_path(&self) -> Option<PathBuf> {
        let path = self.save_to.as_ref()?;
        match &self.working_dir {
            Some(dir) if path.is_relative() => Some(dir.join(path)),
            _ => Some(path.clone()),
        }
    }
}

/// Captured result of a build.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// stdout followed by stderr.
    pub text: String,
    /// Exit code; `None` if the process was killed by a signal.
    pub code: Option<i32>,
}

impl CompileOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code to forward from this process.
    pub fn exit_code(&self) -> i32 {
        match self.code {
            Some(code) => code,
            None => 1,
        }
    }
}

/// Run the build command and capture its output.
///
/// A non-zero exit is not an error here: a build with warnings-as-errors
/// still produces locatable output.
pub fn run(options: &CompileOptions) -> Result<CompileOutput, CompileError> {
    let (program, args) = options
        .command
        .split_first()
        .ok_or(CompileError::EmptyCommand)?;

    info!("running command: {}", options.command.join(" "));

    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = &options.working_dir {
        cmd.current_dir(dir);
    }

    let output = cmd.output().map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            CompileError::NotFound {
                program: program.clone(),
            }
        } else {
            CompileError::Spawn {
                program: program.clone(),
                source,
            }
        }
    })?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    let result = CompileOutput {
        text,
        code: output.status.code(),
    };
    debug!(bytes = result.text.len(), code = ?result.code, "command finished");

    if result.success() {
        info!("'{}' completed successfully", program);
    } else {
        warn!(
            "'{}' finished with a non-zero exit status ({})",
            program,
            result
                .code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string())
        );
    }

    if let Some(path) = options.save_path() {
        save(&path, &result.text);
    }

    Ok(result)
}

/// Save build output. Failure is logged and otherwise ignored.
fn save(path: &Path, text: &str) {
    match fs::write(path, text) {
        Ok(()) => info!("saved command output to '{}'", path.display()),
        Err(e) => warn!("error saving output to file '{}': {}", path.display(), e),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_combines_stdout_then_stderr() {
        let opts = CompileOptions {
            command: sh("echo out; echo err 1>&2"),
            working_dir: None,
            save_to: None,
        };
        let output = run(&opts).unwrap();
        assert_eq!(output.text, "out\nerr\n");
        assert!(output.success());
    }

    #[test]
    fn test_non_zero_exit_is_not_an_error() {
        let opts = CompileOptions {
            command: sh("echo warning; exit 3"),
            working_dir: None,
            save_to: None,
        };
        let output = run(&opts).unwrap();
        assert_eq!(output.code, Some(3));
        assert_eq!(output.exit_code(), 3);
        assert_eq!(output.text, "warning\n");
    }

    #[test]
    fn test_saves_output_in_working_dir() {
        let dir = tempdir().unwrap();
        let save_to = dir.path().join("out.txt");
        let opts = CompileOptions {
            command: sh("echo saved"),
            working_dir: Some(dir.path().to_path_buf()),
            save_to: Some(save_to.clone()),
        };
        run(&opts).unwrap();
        assert_eq!(fs::read_to_string(save_to).unwrap(), "saved\n");
    }

    #[test]
    fn test_relative_save_path_follows_working_dir() {
        let dir = tempdir().unwrap();
        let opts = CompileOptions {
            command: sh("echo relative"),
            working_dir: Some(dir.path().to_path_buf()),
            save_to: Some(PathBuf::from(DEFAULT_SAVE_FILE)),
        };
        assert_eq!(opts.save_path(), Some(dir.path().join(DEFAULT_SAVE_FILE)));

        run(&opts).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join(DEFAULT_SAVE_FILE)).unwrap(),
            "relative\n"
        );
    }

    #[test]
    fn test_unwritable_save_path_does_not_fail() {
        let dir = tempdir().unwrap();
        let opts = CompileOptions {
            command: sh("echo ok"),
            working_dir: None,
            save_to: Some(dir.path().join("missing/dir/out.txt")),
        };
        assert!(run(&opts).is_ok());
    }

    #[test]
    fn test_missing_program() {
        let opts = CompileOptions {
            command: vec!["warnscrub-definitely-not-a-program".to_string()],
            working_dir: None,
            save_to: None,
        };
        assert!(matches!(run(&opts), Err(CompileError::NotFound { .. })));
    }

    #[test]
    fn test_empty_command() {
        let opts = CompileOptions {
            command: Vec::new(),
            working_dir: None,
            save_to: None,
        };
        assert!(matches!(run(&opts), Err(CompileError::EmptyCommand)));
    }
}
