//! Tables must declare a primary key

use sqlparser::ast::{ColumnOption, TableConstraint};

use crate::error::{DiagnosticKind, Span};
use crate::parser::StatementAst;
use crate::rule::{Checker, RuleConfig, Violation};
use crate::visit::{self, walk, Descend, Node, Visitor};

pub struct RequirePrimaryKey;

impl Checker for RequirePrimaryKey {
    fn description(&self) -> &'static str {
        "CREATE TABLE must declare a primary key"
    }

    fn inspect(&self, stmt: &StatementAst, _config: &RuleConfig) -> Vec<Violation> {
        let mut visitor = PrimaryKeyVisitor::default();
        walk(stmt.ast(), &mut visitor);
        visitor.violations
    }
}

/// Table being created and whether a primary key has been seen so far
struct OpenTable {
    name: String,
    span: Span,
    has_primary_key: bool,
}

#[derive(Default)]
struct PrimaryKeyVisitor {
    current: Option<OpenTable>,
    violations: Vec<Violation>,
}

impl<'a> Visitor<'a> for PrimaryKeyVisitor {
    fn enter(&mut self, node: Node<'a>) -> Descend {
        match node {
            Node::CreateTable(create) => {
                // Copies another table's definition; nothing to judge here
                if create.query.is_some() || create.like.is_some() {
                    return Descend::SkipChildren;
                }
                self.current = Some(OpenTable {
                    name: visit::table_name(&create.name),
                    span: visit::object_span(&create.name),
                    has_primary_key: false,
                });
            }
            Node::Column(column) => {
                let is_primary = column
                    .options()
                    .any(|option| matches!(option, ColumnOption::Unique { is_primary: true, .. }));
                if is_primary {
                    self.mark_primary_key();
                }
            }
            Node::TableConstraint {
                constraint: TableConstraint::PrimaryKey { .. },
                ..
            } => self.mark_primary_key(),
            _ => {}
        }
        Descend::Continue
    }

    fn leave(&mut self, node: Node<'a>) {
        if !matches!(node, Node::CreateTable(_)) {
            return;
        }
        if let Some(table) = self.current.take() {
            if !table.has_primary_key {
                self.violations.push(
                    Violation::new(
                        DiagnosticKind::TableNoPrimaryKey,
                        table.name.clone(),
                        format!("Table `{}` requires PRIMARY KEY", table.name),
                    )
                    .with_span(table.span),
                );
            }
        }
    }
}

impl PrimaryKeyVisitor {
    fn mark_primary_key(&mut self) {
        if let Some(table) = self.current.as_mut() {
            table.has_primary_key = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::test_support::inspect_all;

    #[test]
    fn test_missing_primary_key() {
        let violations = inspect_all(&RequirePrimaryKey, "CREATE TABLE logs (msg TEXT)");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, DiagnosticKind::TableNoPrimaryKey);
        assert_eq!(violations[0].message, "Table `logs` requires PRIMARY KEY");
        assert!(violations[0].column.is_none());
    }

    #[test]
    fn test_inline_and_table_level_primary_keys() {
        let violations = inspect_all(
            &RequirePrimaryKey,
            "CREATE TABLE a (id INT PRIMARY KEY); CREATE TABLE b (id INT, PRIMARY KEY (id))",
        );
        assert!(violations.is_empty(), "{:?}", violations);
    }

    #[test]
    fn test_create_table_like_is_skipped() {
        let violations = inspect_all(&RequirePrimaryKey, "CREATE TABLE b LIKE a");
        assert!(violations.is_empty());
    }

    #[test]
    fn test_alter_table_is_ignored() {
        let violations = inspect_all(&RequirePrimaryKey, "ALTER TABLE t ADD COLUMN x INT");
        assert!(violations.is_empty());
    }
}
