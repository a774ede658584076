//! Error and diagnostic types

use serde::{Deserialize, Serialize};

use crate::dialect::SqlDialect;
use crate::rule::{RuleId, RuleLevel};

/// Position of a node as reported by sqlparser
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Line number (1-indexed, 0 when unknown)
    pub line: usize,
}

impl Span {
    pub fn from_sqlparser(span: &sqlparser::tokenizer::Span) -> Self {
        Self {
            line: span.start.line as usize,
        }
    }

    /// Whether the parser actually recorded a position
    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

/// Status attached to a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Info,
    Warning,
    Error,
}

impl TryFrom<RuleLevel> for Status {
    type Error = ReviewError;

    fn try_from(level: RuleLevel) -> Result<Self, ReviewError> {
        match level {
            RuleLevel::Error => Ok(Status::Error),
            RuleLevel::Warning => Ok(Status::Warning),
            RuleLevel::Info => Ok(Status::Info),
            RuleLevel::Disabled => Err(ReviewError::InvalidRuleLevel(level)),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Ok => write!(f, "ok"),
            Status::Info => write!(f, "info"),
            Status::Warning => write!(f, "warning"),
            Status::Error => write!(f, "error"),
        }
    }
}

/// Review result for one finding, or the single "clean" marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub status: Status,
    pub kind: DiagnosticKind,
    pub title: String,
    pub content: String,
    /// Source line, 0 when unknown
    pub line: usize,
}

impl Diagnostic {
    pub fn new(
        status: Status,
        kind: DiagnosticKind,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            status,
            kind,
            title: title.into(),
            content: content.into(),
            line: 0,
        }
    }

    /// The result reported when a run found nothing to flag
    pub fn ok() -> Self {
        Self::new(Status::Ok, DiagnosticKind::Ok, "OK", "")
    }

    /// A statement the parser rejected
    pub fn syntax_error(message: impl Into<String>, line: usize) -> Self {
        Self::new(
            Status::Error,
            DiagnosticKind::StatementSyntaxError,
            "Syntax error",
            message,
        )
        .with_line(line)
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Get the numeric code (e.g., 411)
    pub fn code(&self) -> u16 {
        self.kind.code()
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}

/// Types of diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// 0: Nothing to report
    Ok,
    /// 201: Statement failed to parse
    StatementSyntaxError,
    /// 406: ALTER TABLE ... CHANGE COLUMN used
    ChangeColumnDisallowed,
    /// 410: Auto-increment column is not an integer type
    AutoIncrementColumnNotInteger,
    /// 411: Auto-increment column is signed
    AutoIncrementColumnSigned,
    /// 601: Table has no primary key
    TableNoPrimaryKey,
    /// 602: Table declares a foreign key
    TableHasForeignKey,
}

impl DiagnosticKind {
    pub fn code(&self) -> u16 {
        match self {
            DiagnosticKind::Ok => 0,
            DiagnosticKind::StatementSyntaxError => 201,
            DiagnosticKind::ChangeColumnDisallowed => 406,
            DiagnosticKind::AutoIncrementColumnNotInteger => 410,
            DiagnosticKind::AutoIncrementColumnSigned => 411,
            DiagnosticKind::TableNoPrimaryKey => 601,
            DiagnosticKind::TableHasForeignKey => 602,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticKind::Ok => "ok",
            DiagnosticKind::StatementSyntaxError => "statement-syntax-error",
            DiagnosticKind::ChangeColumnDisallowed => "change-column-disallowed",
            DiagnosticKind::AutoIncrementColumnNotInteger => "auto-increment-column-not-integer",
            DiagnosticKind::AutoIncrementColumnSigned => "auto-increment-column-signed",
            DiagnosticKind::TableNoPrimaryKey => "table-no-primary-key",
            DiagnosticKind::TableHasForeignKey => "table-has-foreign-key",
        }
    }
}

/// Configuration faults. Problems with the SQL itself are diagnostics, not errors.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ReviewError {
    #[error("no checker registered for rule '{rule}' on dialect {dialect}")]
    #[diagnostic(
        code(sqlreview::rule_not_found),
        help("run `sqlreview rules --dialect {dialect}` to list the available rules")
    )]
    RuleNotFound { dialect: SqlDialect, rule: RuleId },

    #[error("rule level '{0}' does not map to a diagnostic status")]
    #[diagnostic(
        code(sqlreview::invalid_rule_level),
        help("use one of: error, warning, info")
    )]
    InvalidRuleLevel(RuleLevel),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_level() {
        assert_eq!(Status::try_from(RuleLevel::Error).unwrap(), Status::Error);
        assert_eq!(
            Status::try_from(RuleLevel::Warning).unwrap(),
            Status::Warning
        );
        assert_eq!(Status::try_from(RuleLevel::Info).unwrap(), Status::Info);
        assert!(matches!(
            Status::try_from(RuleLevel::Disabled),
            Err(ReviewError::InvalidRuleLevel(RuleLevel::Disabled))
        ));
    }

    #[test]
    fn test_ok_diagnostic_shape() {
        let diag = Diagnostic::ok();
        assert!(diag.is_ok());
        assert_eq!(diag.code(), 0);
        assert_eq!(diag.title, "OK");
        assert!(diag.content.is_empty());
        assert_eq!(diag.line, 0);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&Status::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }
}
