//! Output formatting for located warnings.
//!
//! JSON is the interchange format between `find` and `comment`; the text
//! format is for reading in a terminal or feeding to editors that accept
//! `path:line` locations.

use serde::Serialize;
use thiserror::Error;

use crate::record::ResultRecord;
use crate::signature::Signature;

/// Errors that can occur during output formatting.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON array of records (default).
    #[default]
    Json,
    /// One `path:line` per line.
    Text,
}

/// Render located records.
///
/// The result always ends with a newline.
pub fn format_records(records: &[ResultRecord], format: OutputFormat) -> Result<String, OutputError> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(records)?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Text => Ok(records.iter().map(|r| format!("{r}\n")).collect()),
    }
}

#[derive(Serialize)]
struct SignatureInfo {
    name: &'static str,
    description: &'static str,
}

/// Render the list of supported signatures.
pub fn format_signatures(json: bool) -> Result<String, OutputError> {
    if json {
        let infos: Vec<SignatureInfo> = Signature::all()
            .iter()
            .map(|s| SignatureInfo {
                name: s.name(),
                description: s.description(),
            })
            .collect();
        let mut out = serde_json::to_string_pretty(&infos)?;
        out.push('\n');
        Ok(out)
    } else {
        let mut out = String::from("Supported warning signatures:\n");
        for sig in Signature::all() {
            out.push_str(&format!("  {:20} {}\n", sig.name(), sig.description()));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_records_json() {
        assert_eq!(format_records(&[], OutputFormat::Json).unwrap(), "[]\n");
    }

    #[test]
    fn test_records_json_uses_two_space_indent() {
        let out = format_records(&[ResultRecord::new("12", "lib/a.ex")], OutputFormat::Json).unwrap();
        assert_eq!(
            out,
            "[\n  {\n    \"lineNumber\": \"12\",\n    \"fileWithPath\": \"lib/a.ex\"\n  }\n]\n"
        );
    }

    #[test]
    fn test_records_text() {
        let records = vec![ResultRecord::new("1", "lib/a.ex"), ResultRecord::new("2", "lib/b.ex")];
        assert_eq!(
            format_records(&records, OutputFormat::Text).unwrap(),
            "lib/a.ex:1\nlib/b.ex:2\n"
        );
    }

    #[test]
    fn test_signatures_listing() {
        let text = format_signatures(false).unwrap();
        assert!(text.contains("undefined-private"));
        assert!(text.contains("unused-alias"));

        let json: serde_json::Value = serde_json::from_str(&format_signatures(true).unwrap()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), Signature::all().len());
    }
}
