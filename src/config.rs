//! Optional project configuration.
//!
//! Read from `.warnscrub.toml` in the working directory, or from an
//! explicit path. Every field has a default, so an empty file (or no file
//! at all) is valid.
//!
//! ```toml
//! [compile]
//! command = ["mix", "compile", "--force"]
//! save_to = "my_warnings.txt"
//!
//! [find]
//! default_input = "WARNINGS.md"
//!
//! [comment]
//! marker = "#"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::commenter::{CommentOptions, DEFAULT_MARKER};
use crate::compiler::{default_command, CompileOptions, DEFAULT_SAVE_FILE};

/// File looked up in the working directory when no path is given.
pub const CONFIG_FILE: &str = ".warnscrub.toml";

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("error reading config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub compile: CompileConfig,
    pub find: FindConfig,
    pub comment: CommentConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    pub command: Vec<String>,
    /// Empty string disables saving.
    pub save_to: Option<PathBuf>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            save_to: Some(PathBuf::from(DEFAULT_SAVE_FILE)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindConfig {
    pub default_input: PathBuf,
}

impl Default for FindConfig {
    fn default() -> Self {
        Self {
            default_input: PathBuf::from("WARNINGS.md"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentConfig {
    pub marker: String,
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// With `explicit`, that file must exist. Without it, [`CONFIG_FILE`]
    /// in `dir` is used when present and defaults otherwise.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                path.to_path_buf()
            }
            None => {
                let path = dir.join(CONFIG_FILE);
                if !path.exists() {
                    debug!("no {} found; using defaults", CONFIG_FILE);
                    return Ok(Config::default());
                }
                path
            }
        };
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            command: self.compile.command.clone(),
            working_dir: None,
            save_to: self
                .compile
                .save_to
                .clone()
                .filter(|p| !p.as_os_str().is_empty()),
        }
    }

    pub fn comment_options(&self) -> CommentOptions {
        CommentOptions {
            marker: self.comment.marker.clone(),
            dry_run: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_default_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.compile.command, vec!["mix", "compile"]);
        assert_eq!(config.comment.marker, "#");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[comment]\nmarker = \"//\"\n",
        )
        .unwrap();

        let config = Config::load(None, dir.path()).unwrap();

        assert_eq!(config.comment.marker, "//");
        assert_eq!(config.find.default_input, PathBuf::from("WARNINGS.md"));
        assert_eq!(config.comment_options().prefix(), "// ");
    }

    #[test]
    fn test_empty_save_to_disables_saving() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            "[compile]\ncommand = [\"make\"]\nsave_to = \"\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), dir.path()).unwrap();
        let opts = config.compile_options();

        assert_eq!(opts.command, vec!["make"]);
        assert!(opts.save_to.is_none());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml")), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[comment\n").unwrap();
        let err = Config::load(None, dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
