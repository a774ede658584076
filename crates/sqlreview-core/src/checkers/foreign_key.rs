//! Foreign keys are not allowed

use sqlparser::ast::{ColumnOption, TableConstraint};

use crate::error::{DiagnosticKind, Span};
use crate::parser::StatementAst;
use crate::rule::{Checker, RuleConfig, Violation};
use crate::visit::{self, walk, Descend, Node, Visitor};

pub struct NoForeignKey;

impl Checker for NoForeignKey {
    fn description(&self) -> &'static str {
        "Tables must not declare foreign keys"
    }

    fn inspect(&self, stmt: &StatementAst, _config: &RuleConfig) -> Vec<Violation> {
        let mut visitor = ForeignKeyVisitor::default();
        walk(stmt.ast(), &mut visitor);
        visitor.violations
    }
}

#[derive(Default)]
struct ForeignKeyVisitor {
    violations: Vec<Violation>,
}

impl ForeignKeyVisitor {
    fn report(&mut self, table: String, column: Option<&str>, span: Span) {
        let message = format!("Foreign key is not allowed in the table `{}`", table);
        let mut violation =
            Violation::new(DiagnosticKind::TableHasForeignKey, table, message).with_span(span);
        if let Some(column) = column {
            violation = violation.with_column(column);
        }
        self.violations.push(violation);
    }
}

impl<'a> Visitor<'a> for ForeignKeyVisitor {
    fn enter(&mut self, node: Node<'a>) -> Descend {
        match node {
            Node::Column(column) => {
                if column
                    .options()
                    .any(|option| matches!(option, ColumnOption::ForeignKey { .. }))
                {
                    self.report(
                        column.table_name(),
                        Some(column.column_name()),
                        column.span(),
                    );
                }
            }
            Node::TableConstraint {
                table,
                constraint: TableConstraint::ForeignKey { columns, .. },
            } => {
                let first = columns.first();
                let span = first
                    .map(|ident| Span::from_sqlparser(&ident.span))
                    .unwrap_or_else(|| visit::object_span(table));
                self.report(
                    visit::table_name(table),
                    first.map(|ident| ident.value.as_str()),
                    span,
                );
            }
            _ => {}
        }
        Descend::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::test_support::inspect_all;

    #[test]
    fn test_table_level_foreign_key() {
        let violations = inspect_all(
            &NoForeignKey,
            "CREATE TABLE orders (id INT PRIMARY KEY, user_id INT, \
             FOREIGN KEY (user_id) REFERENCES users(id))",
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, DiagnosticKind::TableHasForeignKey);
        assert_eq!(violations[0].table, "orders");
        assert_eq!(violations[0].column.as_deref(), Some("user_id"));
    }

    #[test]
    fn test_inline_reference() {
        let violations = inspect_all(
            &NoForeignKey,
            "CREATE TABLE orders (user_id INT REFERENCES users(id))",
        );
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn test_alter_table_add_constraint() {
        let violations = inspect_all(
            &NoForeignKey,
            "ALTER TABLE orders ADD CONSTRAINT fk_user FOREIGN KEY (user_id) REFERENCES users(id)",
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "Foreign key is not allowed in the table `orders`"
        );
    }

    #[test]
    fn test_no_foreign_key() {
        let violations = inspect_all(&NoForeignKey, "CREATE TABLE t (id INT, UNIQUE (id))");
        assert!(violations.is_empty());
    }
}
