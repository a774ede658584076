//! AST traversal for checkers
//!
//! [`walk`] descends depth-first through the schema-change shapes that rules
//! care about and hands each one to a [`Visitor`] as a [`Node`]. Column
//! definitions are normalized into [`ColumnNode`] whether they come from
//! `CREATE TABLE`, `ADD COLUMN`, `CHANGE COLUMN` or `MODIFY COLUMN`.
//!
//! Statement and `ALTER TABLE` operation kinds that are not modelled here are
//! visited as their enclosing node only; they never cause an error.

use sqlparser::ast::{
    AlterTableOperation, ColumnDef, ColumnOption, ColumnOptionDef, CreateTable, DataType, Ident,
    ObjectName, Statement, TableConstraint,
};

use crate::error::Span;

/// What the walker should do after entering a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descend {
    Continue,
    SkipChildren,
}

/// A node handed to a [`Visitor`]
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    /// Every statement, modelled or not
    Statement(&'a Statement),
    CreateTable(&'a CreateTable),
    AlterTable {
        name: &'a ObjectName,
        operations: &'a [AlterTableOperation],
    },
    /// One operation of an `ALTER TABLE`
    AlterOperation {
        table: &'a ObjectName,
        operation: &'a AlterTableOperation,
    },
    Column(ColumnNode<'a>),
    TableConstraint {
        table: &'a ObjectName,
        constraint: &'a TableConstraint,
    },
}

/// Where a column definition appeared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOrigin<'a> {
    CreateTable,
    AddColumn,
    ChangeColumn { old_name: &'a Ident },
    ModifyColumn,
}

#[derive(Debug, Clone, Copy)]
enum ColumnOptions<'a> {
    Named(&'a [ColumnOptionDef]),
    Bare(&'a [ColumnOption]),
}

/// A column definition, whatever statement shape it came from
#[derive(Debug, Clone, Copy)]
pub struct ColumnNode<'a> {
    pub table: &'a ObjectName,
    pub name: &'a Ident,
    pub data_type: &'a DataType,
    pub origin: ColumnOrigin<'a>,
    options: ColumnOptions<'a>,
}

impl<'a> ColumnNode<'a> {
    fn from_def(table: &'a ObjectName, def: &'a ColumnDef, origin: ColumnOrigin<'a>) -> Self {
        Self {
            table,
            name: &def.name,
            data_type: &def.data_type,
            origin,
            options: ColumnOptions::Named(&def.options),
        }
    }

    fn from_parts(
        table: &'a ObjectName,
        name: &'a Ident,
        data_type: &'a DataType,
        options: &'a [ColumnOption],
        origin: ColumnOrigin<'a>,
    ) -> Self {
        Self {
            table,
            name,
            data_type,
            origin,
            options: ColumnOptions::Bare(options),
        }
    }

    /// Column options in source order
    pub fn options(&self) -> impl Iterator<Item = &'a ColumnOption> + 'a {
        let (named, bare): (&'a [ColumnOptionDef], &'a [ColumnOption]) = match self.options {
            ColumnOptions::Named(defs) => (defs, &[]),
            ColumnOptions::Bare(options) => (&[], options),
        };
        named.iter().map(|def| &def.option).chain(bare.iter())
    }

    /// Unqualified table name as written
    pub fn table_name(&self) -> String {
        table_name(self.table)
    }

    pub fn column_name(&self) -> &'a str {
        &self.name.value
    }

    /// Position of the column identifier
    pub fn span(&self) -> Span {
        Span::from_sqlparser(&self.name.span)
    }
}

/// Last part of a possibly qualified object name, e.g. `t` for `db.t`
pub fn table_name(name: &ObjectName) -> String {
    name.0
        .last()
        .map(|ident| ident.value.clone())
        .unwrap_or_else(|| name.to_string())
}

/// Position of an object name's last part
pub fn object_span(name: &ObjectName) -> Span {
    name.0
        .last()
        .map(|ident| Span::from_sqlparser(&ident.span))
        .unwrap_or_default()
}

/// Hooks called while walking a statement
pub trait Visitor<'a> {
    /// Called before a node's children; return [`Descend::SkipChildren`] to
    /// leave them unvisited.
    fn enter(&mut self, node: Node<'a>) -> Descend;

    /// Called after a node's children, for every entered node
    fn leave(&mut self, _node: Node<'a>) {}
}

/// Walk `statement` depth-first, children in source order.
pub fn walk<'a, V>(statement: &'a Statement, visitor: &mut V)
where
    V: Visitor<'a> + ?Sized,
{
    visit(Node::Statement(statement), visitor);
}

fn visit<'a, V>(node: Node<'a>, visitor: &mut V)
where
    V: Visitor<'a> + ?Sized,
{
    if visitor.enter(node) == Descend::Continue {
        for child in children(node) {
            visit(child, visitor);
        }
    }
    visitor.leave(node);
}

fn children(node: Node<'_>) -> Vec<Node<'_>> {
    match node {
        Node::Statement(Statement::CreateTable(create)) => vec![Node::CreateTable(create)],
        Node::Statement(Statement::AlterTable {
            name, operations, ..
        }) => vec![Node::AlterTable {
            name,
            operations: operations.as_slice(),
        }],
        Node::Statement(_) => Vec::new(),

        Node::CreateTable(create) => {
            let table = &create.name;
            create
                .columns
                .iter()
                .map(|def| Node::Column(ColumnNode::from_def(table, def, ColumnOrigin::CreateTable)))
                .chain(
                    create
                        .constraints
                        .iter()
                        .map(|constraint| Node::TableConstraint { table, constraint }),
                )
                .collect()
        }

        Node::AlterTable { name, operations } => operations
            .iter()
            .map(|operation| Node::AlterOperation {
                table: name,
                operation,
            })
            .collect(),

        Node::AlterOperation { table, operation } => match operation {
            AlterTableOperation::AddColumn { column_def, .. } => vec![Node::Column(
                ColumnNode::from_def(table, column_def, ColumnOrigin::AddColumn),
            )],
            AlterTableOperation::ChangeColumn {
                old_name,
                new_name,
                data_type,
                options,
                ..
            } => vec![Node::Column(ColumnNode::from_parts(
                table,
                new_name,
                data_type,
                options,
                ColumnOrigin::ChangeColumn { old_name },
            ))],
            AlterTableOperation::ModifyColumn {
                col_name,
                data_type,
                options,
                ..
            } => vec![Node::Column(ColumnNode::from_parts(
                table,
                col_name,
                data_type,
                options,
                ColumnOrigin::ModifyColumn,
            ))],
            AlterTableOperation::AddConstraint(constraint) => {
                vec![Node::TableConstraint { table, constraint }]
            }
            _ => Vec::new(),
        },

        Node::Column(_) | Node::TableConstraint { .. } => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqlparser::dialect::MySqlDialect;
    use sqlparser::parser::Parser;

    /// Records every enter/leave as a short label
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        skip_create_table: bool,
    }

    fn label(node: Node<'_>) -> String {
        match node {
            Node::Statement(_) => "stmt".to_string(),
            Node::CreateTable(create) => format!("create {}", create.name),
            Node::AlterTable { name, .. } => format!("alter {}", name),
            Node::AlterOperation { .. } => "op".to_string(),
            Node::Column(column) => format!("column {}", column.column_name()),
            Node::TableConstraint { .. } => "constraint".to_string(),
        }
    }

    impl<'a> Visitor<'a> for Recorder {
        fn enter(&mut self, node: Node<'a>) -> Descend {
            self.events.push(format!("+{}", label(node)));
            if self.skip_create_table && matches!(node, Node::CreateTable(_)) {
                Descend::SkipChildren
            } else {
                Descend::Continue
            }
        }

        fn leave(&mut self, node: Node<'a>) {
            self.events.push(format!("-{}", label(node)));
        }
    }

    fn record(sql: &str, skip_create_table: bool) -> Vec<String> {
        let statements = Parser::parse_sql(&MySqlDialect {}, sql).unwrap();
        let mut recorder = Recorder {
            skip_create_table,
            ..Default::default()
        };
        for statement in &statements {
            walk(statement, &mut recorder);
        }
        recorder.events
    }

    #[test]
    fn test_create_table_order() {
        let events = record("CREATE TABLE t (a INT, b INT, PRIMARY KEY (a))", false);
        assert_eq!(
            events,
            vec![
                "+stmt",
                "+create t",
                "+column a",
                "-column a",
                "+column b",
                "-column b",
                "+constraint",
                "-constraint",
                "-create t",
                "-stmt",
            ]
        );
    }

    #[test]
    fn test_skip_children_still_leaves() {
        let events = record("CREATE TABLE t (a INT)", true);
        assert_eq!(events, vec!["+stmt", "+create t", "-create t", "-stmt"]);
    }

    #[test]
    fn test_alter_table_column_shapes() {
        let events = record(
            "ALTER TABLE t ADD COLUMN a INT, MODIFY COLUMN b BIGINT, CHANGE COLUMN c d INT",
            false,
        );
        let columns: Vec<&String> = events.iter().filter(|e| e.starts_with("+column")).collect();
        assert_eq!(columns, vec!["+column a", "+column b", "+column d"]);
    }

    #[test]
    fn test_unmodelled_shapes_are_skipped() {
        let events = record("ALTER TABLE t RENAME TO u", false);
        assert_eq!(
            events,
            vec!["+stmt", "+alter t", "+op", "-op", "-alter t", "-stmt"]
        );

        let events = record("SELECT 1", false);
        assert_eq!(events, vec!["+stmt", "-stmt"]);
    }

    #[test]
    fn test_column_node_options_cover_both_shapes() {
        struct Options(Vec<usize>);
        impl<'a> Visitor<'a> for Options {
            fn enter(&mut self, node: Node<'a>) -> Descend {
                if let Node::Column(column) = node {
                    self.0.push(column.options().count());
                }
                Descend::Continue
            }
        }

        let statements = Parser::parse_sql(
            &MySqlDialect {},
            "CREATE TABLE t (a INT NOT NULL DEFAULT 1); ALTER TABLE t MODIFY COLUMN a INT NOT NULL",
        )
        .unwrap();
        let mut options = Options(Vec::new());
        for statement in &statements {
            walk(statement, &mut options);
        }
        assert_eq!(options.0, vec![2, 1]);
    }

    #[test]
    fn test_table_name_drops_qualifier() {
        let statements =
            Parser::parse_sql(&MySqlDialect {}, "CREATE TABLE db.orders (id INT)").unwrap();
        let Statement::CreateTable(create) = &statements[0] else {
            panic!("expected CREATE TABLE");
        };
        assert_eq!(table_name(&create.name), "orders");
    }
}
