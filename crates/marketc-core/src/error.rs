//! Error types for the market compiler
//!
//! All fallible operations return `Result<T, Error>`.
//! Syntax errors carry a source position; semantic errors carry the
//! offending value. Every error is terminal for the document being compiled.

use thiserror::Error;

/// Compiler error taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Source text does not conform to the market grammar
    #[error("Syntax error at {line}:{column}: expected {}, found {found}", .expected.join(" or "))]
    Syntax {
        line: usize,
        column: usize,
        expected: Vec<String>,
        found: String,
    },

    /// Oracle is not `0x` followed by 40 hex digits
    #[error("Invalid oracle address '{address}': expected 0x followed by 40 hex digits")]
    InvalidOracleAddress { address: String },

    /// Fee exceeds the 10% (1000 basis points) ceiling
    #[error("Fee {fee_percent}% is out of range: maximum is 10% (1000 basis points)")]
    FeeOutOfRange { fee_percent: u64 },

    /// Outcome set is anything other than exactly {Yes, No}
    #[error("Unsupported outcome set [{}]: expected exactly Yes, No", .outcomes.join(", "))]
    UnsupportedOutcomeSet { outcomes: Vec<String> },

    /// Trading mechanism is not on the whitelist
    #[error("Unsupported trading mechanism '{mechanism}'")]
    UnsupportedMechanism { mechanism: String },

    /// A template slot was unbound or held an unrenderable value
    #[error("Template render error: missing or invalid value for '{field}'")]
    TemplateRender { field: String },
}

impl Error {
    pub(crate) fn syntax(
        span: &crate::parser::tokenizer::Span,
        expected: &[&str],
        found: impl Into<String>,
    ) -> Self {
        Error::Syntax {
            line: span.line,
            column: span.column,
            expected: expected.iter().map(|s| s.to_string()).collect(),
            found: found.into(),
        }
    }

    /// Stable snake_case tag for machine-readable output
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Syntax { .. } => "syntax_error",
            Error::InvalidOracleAddress { .. } => "invalid_oracle_address",
            Error::FeeOutOfRange { .. } => "fee_out_of_range",
            Error::UnsupportedOutcomeSet { .. } => "unsupported_outcome_set",
            Error::UnsupportedMechanism { .. } => "unsupported_mechanism",
            Error::TemplateRender { .. } => "template_render_error",
        }
    }

    /// True for malformed input text, false for semantic or render failures
    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax { .. })
    }

    /// JSON form used by `--json` reports
    pub fn to_json(&self) -> serde_json::Value {
        let mut value = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Error::Syntax { line, column, expected, .. } = self {
            value["line"] = serde_json::json!(line);
            value["column"] = serde_json::json!(column);
            value["expected"] = serde_json::json!(expected);
        }
        value
    }
}

/// Result type alias for compiler operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display_lists_expected() {
        let err = Error::Syntax {
            line: 3,
            column: 7,
            expected: vec!["';'".into(), "'%'".into()],
            found: "'}'".into(),
        };
        assert_eq!(
            err.to_string(),
            "Syntax error at 3:7: expected ';' or '%', found '}'"
        );
    }

    #[test]
    fn test_kind_tags_are_distinct() {
        let errors = [
            Error::Syntax { line: 1, column: 1, expected: vec![], found: String::new() },
            Error::InvalidOracleAddress { address: "0x".into() },
            Error::FeeOutOfRange { fee_percent: 15 },
            Error::UnsupportedOutcomeSet { outcomes: vec![] },
            Error::UnsupportedMechanism { mechanism: "amm".into() },
            Error::TemplateRender { field: "question".into() },
        ];
        let kinds: std::collections::BTreeSet<_> = errors.iter().map(|e| e.kind()).collect();
        assert_eq!(kinds.len(), errors.len());
        assert!(errors[0].is_syntax());
        assert!(errors[1..].iter().all(|e| !e.is_syntax()));
    }

    #[test]
    fn test_json_includes_position_for_syntax_errors() {
        let err = Error::Syntax {
            line: 2,
            column: 5,
            expected: vec!["ADDRESS".into()],
            found: "'0xZZ'".into(),
        };
        let json = err.to_json();
        assert_eq!(json["kind"], "syntax_error");
        assert_eq!(json["line"], 2);
        assert_eq!(json["column"], 5);
        assert_eq!(json["expected"][0], "ADDRESS");

        let json = Error::FeeOutOfRange { fee_percent: 15 }.to_json();
        assert_eq!(json["kind"], "fee_out_of_range");
        assert!(json.get("line").is_none());
    }
}
