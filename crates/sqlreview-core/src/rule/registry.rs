//! Rule registry - maps (dialect, rule) to a checker
//!
//! The registry is filled once while the process starts and only read
//! afterwards, so it can be shared between threads without locking.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use crate::checkers;
use crate::dialect::SqlDialect;
use crate::rule::{Checker, RuleId};

#[derive(Default)]
pub struct RuleRegistry {
    /// Dialect -> rule -> checker, in registration order
    checkers: IndexMap<SqlDialect, IndexMap<RuleId, Arc<dyn Checker>>>,
}

impl RuleRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in rule
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        checkers::register_builtin(&mut registry);
        registry
    }

    /// Register `checker` for `rule` on `dialect`.
    ///
    /// # Panics
    ///
    /// Registering the same (dialect, rule) pair twice is a programming error
    /// and panics.
    pub fn register(&mut self, dialect: SqlDialect, rule: RuleId, checker: Arc<dyn Checker>) {
        let rules = self.checkers.entry(dialect).or_default();
        if rules.contains_key(&rule) {
            panic!("rule '{}' is already registered for dialect {}", rule, dialect);
        }
        trace!(%dialect, %rule, "registered checker");
        rules.insert(rule, checker);
    }

    /// Look up the checker for `rule` on `dialect`
    pub fn resolve(&self, dialect: SqlDialect, rule: &RuleId) -> Option<&dyn Checker> {
        self.checkers
            .get(&dialect)
            .and_then(|rules| rules.get(rule))
            .map(|checker| checker.as_ref())
    }

    pub fn contains(&self, dialect: SqlDialect, rule: &RuleId) -> bool {
        self.resolve(dialect, rule).is_some()
    }

    /// Rules registered for `dialect`, in registration order
    pub fn rules_for(
        &self,
        dialect: SqlDialect,
    ) -> impl Iterator<Item = (&RuleId, &Arc<dyn Checker>)> {
        self.checkers
            .get(&dialect)
            .into_iter()
            .flat_map(IndexMap::iter)
    }

    /// Number of registered (dialect, rule) pairs
    pub fn len(&self) -> usize {
        self.checkers.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (dialect, rules) in &self.checkers {
            map.entry(dialect, &rules.keys().collect::<Vec<_>>());
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::StatementAst;
    use crate::rule::{RuleConfig, Violation};

    struct NeverFires;

    impl Checker for NeverFires {
        fn description(&self) -> &'static str {
            "never fires"
        }

        fn inspect(&self, _stmt: &StatementAst, _config: &RuleConfig) -> Vec<Violation> {
            Vec::new()
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = RuleRegistry::new();
        registry.register(SqlDialect::MySQL, RuleId::new("test.rule"), Arc::new(NeverFires));

        assert!(registry.contains(SqlDialect::MySQL, &RuleId::from_static("test.rule")));
        assert!(!registry.contains(SqlDialect::TiDB, &RuleId::from_static("test.rule")));
        assert!(registry
            .resolve(SqlDialect::MySQL, &RuleId::from_static("other"))
            .is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let registry = RuleRegistry::builtin();
        let rule = RuleId::AUTO_INCREMENT_COLUMN_MUST_UNSIGNED;
        let first = registry.resolve(SqlDialect::MySQL, &rule).unwrap();
        let second = registry.resolve(SqlDialect::MySQL, &rule).unwrap();
        assert!(std::ptr::eq(
            first as *const _ as *const (),
            second as *const _ as *const ()
        ));
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_registration_panics() {
        let mut registry = RuleRegistry::new();
        registry.register(SqlDialect::MySQL, RuleId::new("dup"), Arc::new(NeverFires));
        registry.register(SqlDialect::MySQL, RuleId::new("dup"), Arc::new(NeverFires));
    }

    #[test]
    fn test_same_rule_on_two_dialects_is_allowed() {
        let mut registry = RuleRegistry::new();
        let checker: Arc<dyn Checker> = Arc::new(NeverFires);
        registry.register(SqlDialect::MySQL, RuleId::new("shared"), checker.clone());
        registry.register(SqlDialect::TiDB, RuleId::new("shared"), checker);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_builtin_rules_listed_in_registration_order() {
        let registry = RuleRegistry::builtin();
        let ids: Vec<&str> = registry
            .rules_for(SqlDialect::MySQL)
            .map(|(id, _)| id.as_str())
            .collect();
        assert_eq!(ids[0], "column.auto-increment-must-unsigned");
        assert_eq!(registry.rules_for(SqlDialect::PostgreSQL).count(), 0);
    }
}
