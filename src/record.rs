//! Located warning sites.

use serde::{Deserialize, Serialize};

/// A located diagnostic site: the line number and file path reported
/// under a matched warning.
///
/// Both fields are kept as text exactly as they appeared in the compiler
/// output; the commenter parses the number when it needs one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "lineNumber")]
    pub line_number: String,
    #[serde(rename = "fileWithPath")]
    pub file_with_path: String,
}

impl ResultRecord {
    pub fn new(line_number: impl Into<String>, file_with_path: impl Into<String>) -> Self {
        Self {
            line_number: line_number.into(),
            file_with_path: file_with_path.into(),
        }
    }
}

impl std::fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file_with_path, self.line_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let record = ResultRecord::new("12", "lib/a.ex");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["lineNumber"], "12");
        assert_eq!(json["fileWithPath"], "lib/a.ex");
        assert_eq!(json.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_display_is_path_colon_line() {
        assert_eq!(ResultRecord::new("5", "lib/b.ex").to_string(), "lib/b.ex:5");
    }
}
