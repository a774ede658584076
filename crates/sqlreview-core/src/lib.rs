//! sqlreview-core: rule engine for SQL schema-change review
//!
//! This library parses SQL text, walks each statement with the checker of a
//! configured rule, and reports the result as an ordered list of diagnostics.

pub mod checkers;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod parser;
pub mod rule;
pub mod types;
pub mod visit;

pub use dialect::SqlDialect;
pub use engine::{Engine, RuleReport};
pub use error::{Diagnostic, DiagnosticKind, ReviewError, Span, Status};
pub use parser::{parse_statements, ParseFailure, StatementAst};
pub use rule::{Checker, RuleConfig, RuleId, RuleLevel, RuleRegistry, Violation};
