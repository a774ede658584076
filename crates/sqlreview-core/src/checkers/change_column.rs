//! Disallow `ALTER TABLE ... CHANGE COLUMN`

use crate::error::DiagnosticKind;
use crate::parser::StatementAst;
use crate::rule::{Checker, RuleConfig, Violation};
use crate::visit::ColumnOrigin;

use super::check_columns;

/// `CHANGE COLUMN` renames and redefines in one step; reviews require
/// `RENAME COLUMN` and `MODIFY COLUMN` instead.
pub struct DisallowChangeColumn;

impl Checker for DisallowChangeColumn {
    fn description(&self) -> &'static str {
        "ALTER TABLE must not use CHANGE COLUMN"
    }

    fn inspect(&self, stmt: &StatementAst, _config: &RuleConfig) -> Vec<Violation> {
        check_columns(stmt, |column| {
            let ColumnOrigin::ChangeColumn { old_name } = column.origin else {
                return None;
            };
            Some(
                Violation::new(
                    DiagnosticKind::ChangeColumnDisallowed,
                    column.table_name(),
                    format!("\"{}\" contains CHANGE COLUMN statement", stmt.text()),
                )
                .with_column(old_name.value.as_str())
                .with_span(column.span()),
            )
        })
    }
}
