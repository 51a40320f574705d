//! Input source selection.
//!
//! Commands accept their input as literal text, a named file, or piped
//! stdin, in that order of precedence. The `find` command additionally
//! falls back to a conventional default file in the working directory.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, IsTerminal, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::locator::{locate, locate_reader, ScanOptions, ScanOutcome};
use crate::signature::Signature;

/// Errors resolving or reading an input source.
#[derive(Debug, Error)]
pub enum InputError {
    #[error(
        "no input provided; use one of:\n  \
         1. text directly with --text-input\n  \
         2. an input file as a positional argument\n  \
         3. piped data (e.g. `mix compile 2>&1 | warnscrub find ...`){default}"
    )]
    Missing { default: String },

    #[error("input file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("error reading {source_name}: {source}")]
    Read {
        source_name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Where a command reads its input from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Text(String),
    File(PathBuf),
    Stdin,
    DefaultFile(PathBuf),
}

impl InputSource {
    /// Pick a source: text, then file, then piped stdin, then `default`
    /// if that file exists.
    ///
    /// `stdin_piped` is passed in so callers (and tests) decide how to
    /// probe the terminal.
    pub fn resolve(
        text: Option<String>,
        file: Option<PathBuf>,
        stdin_piped: bool,
        default: Option<&Path>,
    ) -> Result<Self, InputError> {
        if let Some(text) = text {
            return Ok(InputSource::Text(text));
        }
        if let Some(file) = file {
            return Ok(InputSource::File(file));
        }
        if stdin_piped {
            return Ok(InputSource::Stdin);
        }
        match default {
            Some(path) if path.exists() => Ok(InputSource::DefaultFile(path.to_path_buf())),
            Some(path) => Err(InputError::Missing {
                default: format!("\n  4. a '{}' file in the current directory", path.display()),
            }),
            None => Err(InputError::Missing {
                default: String::new(),
            }),
        }
    }

    /// Human description used in log and error messages.
    pub fn describe(&self) -> String {
        match self {
            InputSource::Text(_) => "direct text input".to_string(),
            InputSource::File(path) => format!("file '{}'", path.display()),
            InputSource::Stdin => "piped stdin".to_string(),
            InputSource::DefaultFile(path) => format!("default file '{}'", path.display()),
        }
    }

    /// Open the source as a buffered line reader.
    pub fn open(&self) -> Result<Box<dyn BufRead>, InputError> {
        match self {
            InputSource::Text(text) => Ok(Box::new(Cursor::new(text.clone().into_bytes()))),
            InputSource::File(path) | InputSource::DefaultFile(path) => {
                let file = File::open(path).map_err(|e| self.read_error(e))?;
                Ok(Box::new(BufReader::new(file)))
            }
            InputSource::Stdin => Ok(Box::new(BufReader::new(std::io::stdin()))),
        }
    }

    /// Read the whole source into a string.
    pub fn read_to_string(&self) -> Result<String, InputError> {
        let mut buf = String::new();
        self.open()?
            .read_to_string(&mut buf)
            .map_err(|e| self.read_error(e))?;
        Ok(buf)
    }

    /// Scan this source for warnings of kind `signature`.
    ///
    /// Literal text is split on `\n`, `\r\n` and a bare `\r`; streams are
    /// read line by line on `\n`.
    pub fn locate(
        &self,
        signature: Signature,
        options: &ScanOptions,
    ) -> Result<ScanOutcome, InputError> {
        match self {
            InputSource::Text(text) => Ok(locate(split_lines(text), signature, options)),
            _ => locate_reader(self.open()?, signature, options).map_err(|e| self.read_error(e)),
        }
    }

    /// Wrap an I/O error raised while reading this source.
    pub fn read_error(&self, source: std::io::Error) -> InputError {
        match self {
            InputSource::File(path) | InputSource::DefaultFile(path)
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                InputError::NotFound { path: path.clone() }
            }
            _ => InputError::Read {
                source_name: self.describe(),
                source,
            },
        }
    }
}

/// Split text into lines on `\n`, `\r\n` or a lone `\r`.
///
/// A trailing terminator does not produce an empty final line.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let bytes = text.as_bytes();
    let mut start = 0;
    std::iter::from_fn(move || {
        if start >= bytes.len() {
            return None;
        }
        let rest = &bytes[start..];
        match rest.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(i) => {
                let line = &text[start..start + i];
                let skip = if rest[i] == b'\r' && rest.get(i + 1) == Some(&b'\n') {
                    2
                } else {
                    1
                };
                start += i + skip;
                Some(line)
            }
            None => {
                let line = &text[start..];
                start = bytes.len();
                Some(line)
            }
        }
    })
}

/// True when stdin is not attached to a terminal.
pub fn stdin_is_piped() -> bool {
    !std::io::stdin().is_terminal()
}
