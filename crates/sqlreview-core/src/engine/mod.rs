//! Review engine - runs a rule's checker over SQL text

use serde::Serialize;
use tracing::{debug, trace};

use crate::dialect::SqlDialect;
use crate::error::{Diagnostic, ReviewError, Status};
use crate::parser::{parse_statements, StatementAst};
use crate::rule::{Checker, RuleConfig, RuleId, RuleLevel, RuleRegistry};

/// Engine - reviews SQL text against rules from a registry
///
/// The engine holds no per-run state; one instance can serve concurrent runs.
#[derive(Debug, Clone)]
pub struct Engine<'a> {
    registry: &'a RuleRegistry,
    charset: Option<String>,
    collation: Option<String>,
}

/// Diagnostics produced by one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleReport {
    pub rule: RuleId,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> Engine<'a> {
    pub fn new(registry: &'a RuleRegistry) -> Self {
        Self {
            registry,
            charset: None,
            collation: None,
        }
    }

    /// Charset handed to the parser instead of the dialect default
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Collation handed to the parser instead of the dialect default
    pub fn with_collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Review `sql` with one rule.
    ///
    /// Returns a non-empty list: the violations in the order they were found,
    /// a single syntax-error diagnostic if the text does not parse, or a single
    /// OK diagnostic if nothing was flagged. An error is returned only when
    /// the rule cannot be resolved or its level has no status.
    pub fn run(
        &self,
        dialect: SqlDialect,
        rule: &RuleId,
        sql: &str,
        config: &RuleConfig,
    ) -> Result<Vec<Diagnostic>, ReviewError> {
        let checker = self.resolve(dialect, rule)?;
        let status = Status::try_from(config.level)?;

        let statements = match self.parse(dialect, sql) {
            Ok(statements) => statements,
            Err(diagnostic) => return Ok(vec![diagnostic]),
        };

        Ok(review(checker, status, config, &statements))
    }

    /// Review `sql` with several rules, parsing it once.
    ///
    /// Rules configured as [`RuleLevel::Disabled`] are skipped. Reports keep
    /// the order of `rules`, and each one follows the same contract as
    /// [`Engine::run`]. All rules are resolved before any parsing happens.
    pub fn run_rules(
        &self,
        dialect: SqlDialect,
        rules: &[(RuleId, RuleConfig)],
        sql: &str,
    ) -> Result<Vec<RuleReport>, ReviewError> {
        let mut resolved = Vec::new();
        for (rule, config) in rules {
            if config.level == RuleLevel::Disabled {
                trace!(%rule, "skipping disabled rule");
                continue;
            }
            let checker = self.resolve(dialect, rule)?;
            let status = Status::try_from(config.level)?;
            resolved.push((rule, config, checker, status));
        }

        let statements = self.parse(dialect, sql);

        Ok(resolved
            .into_iter()
            .map(|(rule, config, checker, status)| {
                let diagnostics = match &statements {
                    Ok(statements) => review(checker, status, config, statements),
                    Err(diagnostic) => vec![diagnostic.clone()],
                };
                RuleReport {
                    rule: rule.clone(),
                    diagnostics,
                }
            })
            .collect())
    }

    fn resolve(&self, dialect: SqlDialect, rule: &RuleId) -> Result<&'a dyn Checker, ReviewError> {
        self.registry
            .resolve(dialect, rule)
            .ok_or_else(|| ReviewError::RuleNotFound {
                dialect,
                rule: rule.clone(),
            })
    }

    /// Parse `sql`, turning a failure into the diagnostic reported for it
    fn parse(&self, dialect: SqlDialect, sql: &str) -> Result<Vec<StatementAst>, Diagnostic> {
        let charset = self
            .charset
            .as_deref()
            .unwrap_or_else(|| dialect.default_charset());
        let collation = self
            .collation
            .as_deref()
            .unwrap_or_else(|| dialect.default_collation());

        parse_statements(dialect, sql, charset, collation).map_err(|failure| {
            debug!(line = failure.line, "reporting parse failure as diagnostic");
            Diagnostic::syntax_error(failure.message, failure.line)
        })
    }
}

/// Run `checker` over every statement and map violations 1:1 to diagnostics
fn review(
    checker: &dyn Checker,
    status: Status,
    config: &RuleConfig,
    statements: &[StatementAst],
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for stmt in statements {
        for violation in checker.inspect(stmt, config) {
            let line = violation.line(stmt);
            diagnostics.push(
                Diagnostic::new(status, violation.kind, &config.title, violation.message)
                    .with_line(line),
            );
        }
    }

    debug!(
        statements = statements.len(),
        violations = diagnostics.len(),
        "review finished"
    );

    if diagnostics.is_empty() {
        diagnostics.push(Diagnostic::ok());
    }
    diagnostics
}
