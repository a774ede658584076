//! Rules and the checker contract
//!
//! A rule is identified by a [`RuleId`] and implemented by a [`Checker`].
//! Checkers only decide *whether* something is wrong and *what* it names;
//! the engine turns each [`Violation`] into a diagnostic with the configured
//! status and title.

mod registry;

use std::borrow::Cow;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DiagnosticKind, Span};
use crate::parser::StatementAst;

pub use registry::RuleRegistry;

/// Stable identifier of a rule, e.g. `column.auto-increment-must-unsigned`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(Cow<'static, str>);

impl RuleId {
    pub const AUTO_INCREMENT_COLUMN_MUST_UNSIGNED: RuleId =
        RuleId::from_static("column.auto-increment-must-unsigned");
    pub const AUTO_INCREMENT_COLUMN_MUST_INTEGER: RuleId =
        RuleId::from_static("column.auto-increment-must-integer");
    pub const TABLE_REQUIRE_PK: RuleId = RuleId::from_static("table.require-pk");
    pub const TABLE_NO_FOREIGN_KEY: RuleId = RuleId::from_static("table.no-foreign-key");
    pub const COLUMN_DISALLOW_CHANGE: RuleId = RuleId::from_static("column.disallow-change");

    pub const fn from_static(id: &'static str) -> Self {
        RuleId(Cow::Borrowed(id))
    }

    pub fn new(id: impl Into<String>) -> Self {
        RuleId(Cow::Owned(id.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for RuleId {
    fn from(id: &'static str) -> Self {
        RuleId::from_static(id)
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

/// Level a rule is configured at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum RuleLevel {
    Error,
    Warning,
    Info,
    Disabled,
}

impl FromStr for RuleLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(RuleLevel::Error),
            "warning" | "warn" => Ok(RuleLevel::Warning),
            "info" => Ok(RuleLevel::Info),
            "disabled" | "off" => Ok(RuleLevel::Disabled),
            _ => Err(format!(
                "Unknown rule level: '{}'. Expected one of: error, warning, info, disabled.",
                s
            )),
        }
    }
}

impl TryFrom<String> for RuleLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        value.parse()
    }
}

impl std::fmt::Display for RuleLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleLevel::Error => write!(f, "error"),
            RuleLevel::Warning => write!(f, "warning"),
            RuleLevel::Info => write!(f, "info"),
            RuleLevel::Disabled => write!(f, "disabled"),
        }
    }
}

/// Per-rule configuration supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub level: RuleLevel,
    /// Display title used on every diagnostic the rule produces
    pub title: String,
}

impl RuleConfig {
    pub fn new(level: RuleLevel, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
        }
    }
}

/// A finding inside one statement, before it becomes a diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: DiagnosticKind,
    pub table: String,
    pub column: Option<String>,
    pub message: String,
    /// Position as reported by sqlparser, relative to the statement's slice
    pub span: Option<Span>,
}

impl Violation {
    pub fn new(kind: DiagnosticKind, table: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            table: table.into(),
            column: None,
            message: message.into(),
            span: None,
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        if span.is_known() {
            self.span = Some(span);
        }
        self
    }

    /// Absolute source line of this violation within the reviewed text
    pub fn line(&self, stmt: &StatementAst) -> usize {
        match self.span {
            Some(span) => stmt.absolute_line(span.line),
            None => stmt.origin_line(),
        }
    }
}

/// Detection logic for one rule.
///
/// Checkers are shared across threads and invoked once per statement. They
/// must not keep state between calls; per-call state lives in the visitor a
/// checker builds inside [`Checker::inspect`].
pub trait Checker: Send + Sync {
    /// One-line description shown in rule listings
    fn description(&self) -> &'static str;

    /// Inspect a single statement and report what violates the rule
    fn inspect(&self, stmt: &StatementAst, config: &RuleConfig) -> Vec<Violation>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_level_parsing() {
        assert_eq!("ERROR".parse::<RuleLevel>().unwrap(), RuleLevel::Error);
        assert_eq!("warn".parse::<RuleLevel>().unwrap(), RuleLevel::Warning);
        assert_eq!("Disabled".parse::<RuleLevel>().unwrap(), RuleLevel::Disabled);
        assert!("fatal".parse::<RuleLevel>().is_err());
    }

    #[test]
    fn test_rule_config_deserializes_level_case_insensitively() {
        let config: RuleConfig =
            serde_json::from_str(r#"{"level": "WARNING", "title": "t"}"#).unwrap();
        assert_eq!(config.level, RuleLevel::Warning);
        assert_eq!(config.title, "t");

        let bad = serde_json::from_str::<RuleConfig>(r#"{"level": "loud", "title": "t"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_rule_id_equality_across_ownership() {
        assert_eq!(
            RuleId::new("table.require-pk"),
            RuleId::TABLE_REQUIRE_PK
        );
        assert_eq!(RuleId::from("x").as_str(), "x");
    }

    #[test]
    fn test_violation_ignores_unknown_span() {
        let v = Violation::new(DiagnosticKind::TableNoPrimaryKey, "t", "m")
            .with_span(Span::default());
        assert!(v.span.is_none());
    }
}
