//! Auto-increment column rules

use sqlparser::ast::ColumnOption;
use sqlparser::tokenizer::Token;

use crate::error::DiagnosticKind;
use crate::parser::StatementAst;
use crate::rule::{Checker, RuleConfig, Violation};
use crate::types;
use crate::visit::ColumnNode;

use super::check_columns;

/// Auto-increment columns must be declared `UNSIGNED`
pub struct AutoIncrementMustUnsigned;

impl Checker for AutoIncrementMustUnsigned {
    fn description(&self) -> &'static str {
        "Auto-increment columns must be UNSIGNED"
    }

    fn inspect(&self, stmt: &StatementAst, _config: &RuleConfig) -> Vec<Violation> {
        check_columns(stmt, |column| {
            if !is_auto_increment(column) || types::is_unsigned(column.data_type) {
                return None;
            }
            Some(column_violation(
                DiagnosticKind::AutoIncrementColumnSigned,
                column,
                format!(
                    "Auto-increment column `{}`.`{}` is not UNSIGNED type",
                    column.table_name(),
                    column.column_name()
                ),
            ))
        })
    }
}

/// Auto-increment columns must use an integer type
pub struct AutoIncrementMustInteger;

impl Checker for AutoIncrementMustInteger {
    fn description(&self) -> &'static str {
        "Auto-increment columns must use an integer type"
    }

    fn inspect(&self, stmt: &StatementAst, _config: &RuleConfig) -> Vec<Violation> {
        check_columns(stmt, |column| {
            if !is_auto_increment(column) || types::is_integer(column.data_type) {
                return None;
            }
            Some(column_violation(
                DiagnosticKind::AutoIncrementColumnNotInteger,
                column,
                format!(
                    "Auto-increment column `{}`.`{}` requires integer type, found {}",
                    column.table_name(),
                    column.column_name(),
                    types::display_name(column.data_type)
                ),
            ))
        })
    }
}

/// Whether the column carries `AUTO_INCREMENT` (MySQL) or `AUTOINCREMENT`
fn is_auto_increment(column: &ColumnNode<'_>) -> bool {
    column.options().any(|option| match option {
        ColumnOption::DialectSpecific(tokens) => tokens.iter().any(|token| {
            matches!(token, Token::Word(word)
                if word.value.eq_ignore_ascii_case("AUTO_INCREMENT")
                    || word.value.eq_ignore_ascii_case("AUTOINCREMENT"))
        }),
        _ => false,
    })
}

fn column_violation(kind: DiagnosticKind, column: &ColumnNode<'_>, message: String) -> Violation {
    Violation::new(kind, column.table_name(), message)
        .with_column(column.column_name())
        .with_span(column.span())
}
