//! SQL dialect support

use serde::{Deserialize, Serialize};
use sqlparser::dialect::{Dialect, MySqlDialect, PostgreSqlDialect};
use std::str::FromStr;

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    MySQL,
    /// MySQL-compatible; shares the MySQL grammar and rule set
    TiDB,
    PostgreSQL,
}

impl SqlDialect {
    pub const ALL: [SqlDialect; 3] = [SqlDialect::MySQL, SqlDialect::TiDB, SqlDialect::PostgreSQL];

    /// Get the sqlparser dialect for parsing
    pub fn parser_dialect(&self) -> Box<dyn Dialect> {
        match self {
            SqlDialect::MySQL | SqlDialect::TiDB => Box::new(MySqlDialect {}),
            SqlDialect::PostgreSQL => Box::new(PostgreSqlDialect {}),
        }
    }

    /// Whether this dialect belongs to the MySQL grammar family
    pub fn is_mysql_family(&self) -> bool {
        matches!(self, SqlDialect::MySQL | SqlDialect::TiDB)
    }

    /// Charset assumed when the caller does not provide one
    pub fn default_charset(&self) -> &'static str {
        match self {
            SqlDialect::MySQL | SqlDialect::TiDB => "utf8mb4",
            SqlDialect::PostgreSQL => "UTF8",
        }
    }

    /// Collation assumed when the caller does not provide one
    pub fn default_collation(&self) -> &'static str {
        match self {
            SqlDialect::MySQL | SqlDialect::TiDB => "utf8mb4_general_ci",
            SqlDialect::PostgreSQL => "",
        }
    }
}

impl FromStr for SqlDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mysql8" => Ok(SqlDialect::MySQL),
            "tidb" => Ok(SqlDialect::TiDB),
            "postgresql" | "postgres" | "pg" => Ok(SqlDialect::PostgreSQL),
            _ => Err(format!(
                "Unknown dialect: '{}'. Supported dialects: mysql, tidb, postgresql.",
                s
            )),
        }
    }
}

impl std::fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlDialect::MySQL => write!(f, "mysql"),
            SqlDialect::TiDB => write!(f, "tidb"),
            SqlDialect::PostgreSQL => write!(f, "postgresql"),
        }
    }
}
