//! Built-in checkers
//!
//! Each checker implements one rule. Checkers are unit structs; any state a
//! check needs while walking lives in a visitor created per call.

mod auto_increment;
mod change_column;
mod foreign_key;
mod primary_key;

use std::sync::Arc;

use crate::dialect::SqlDialect;
use crate::parser::StatementAst;
use crate::rule::{Checker, RuleId, RuleRegistry, Violation};
use crate::visit::{walk, ColumnNode, Descend, Node, Visitor};

pub use auto_increment::{AutoIncrementMustInteger, AutoIncrementMustUnsigned};
pub use change_column::DisallowChangeColumn;
pub use foreign_key::NoForeignKey;
pub use primary_key::RequirePrimaryKey;

/// Register every built-in rule for the MySQL family
pub fn register_builtin(registry: &mut RuleRegistry) {
    let builtin: [(RuleId, Arc<dyn Checker>); 5] = [
        (
            RuleId::AUTO_INCREMENT_COLUMN_MUST_UNSIGNED,
            Arc::new(AutoIncrementMustUnsigned),
        ),
        (
            RuleId::AUTO_INCREMENT_COLUMN_MUST_INTEGER,
            Arc::new(AutoIncrementMustInteger),
        ),
        (RuleId::TABLE_REQUIRE_PK, Arc::new(RequirePrimaryKey)),
        (RuleId::TABLE_NO_FOREIGN_KEY, Arc::new(NoForeignKey)),
        (RuleId::COLUMN_DISALLOW_CHANGE, Arc::new(DisallowChangeColumn)),
    ];

    for dialect in [SqlDialect::MySQL, SqlDialect::TiDB] {
        for (rule, checker) in &builtin {
            registry.register(dialect, rule.clone(), Arc::clone(checker));
        }
    }
}

/// Run `check` on every column definition in `stmt`, collecting what it reports.
fn check_columns<F>(stmt: &StatementAst, check: F) -> Vec<Violation>
where
    F: FnMut(&ColumnNode<'_>) -> Option<Violation>,
{
    struct Columns<F> {
        check: F,
        violations: Vec<Violation>,
    }

    impl<'a, F> Visitor<'a> for Columns<F>
    where
        F: FnMut(&ColumnNode<'_>) -> Option<Violation>,
    {
        fn enter(&mut self, node: Node<'a>) -> Descend {
            if let Node::Column(column) = node {
                self.violations.extend((self.check)(&column));
            }
            Descend::Continue
        }
    }

    let mut visitor = Columns {
        check,
        violations: Vec::new(),
    };
    walk(stmt.ast(), &mut visitor);
    visitor.violations
}
