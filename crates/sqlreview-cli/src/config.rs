//! Configuration file handling

use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use sqlreview_core::{RuleConfig, RuleId, RuleLevel, RuleRegistry, SqlDialect};
use std::path::{Path, PathBuf};

use crate::args::OutputFormat;

/// Configuration for sqlreview
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// SQL file paths or patterns to review
    #[serde(default)]
    pub files: Vec<String>,

    /// SQL dialect (mysql, tidb, postgresql)
    #[serde(default)]
    pub dialect: Option<String>,

    /// Output format (human, json, sarif)
    #[serde(default)]
    pub format: Option<String>,

    /// Charset passed to the parser
    #[serde(default)]
    pub charset: Option<String>,

    /// Collation passed to the parser
    #[serde(default)]
    pub collation: Option<String>,

    /// Rules to run; empty means every registered rule at error level
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

/// One `[[rules]]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleEntry {
    pub id: String,
    #[serde(default = "default_level")]
    pub level: RuleLevel,
    /// Title shown on diagnostics; defaults to the rule id
    #[serde(default)]
    pub title: Option<String>,
}

fn default_level() -> RuleLevel {
    RuleLevel::Error
}

impl RuleEntry {
    /// Parse a `--rule` argument of the form `ID` or `ID=LEVEL`
    pub fn from_arg(arg: &str) -> Result<Self, String> {
        let (id, level) = match arg.split_once('=') {
            Some((id, level)) => (id, level.parse()?),
            None => (arg, default_level()),
        };
        let id = id.trim();
        if id.is_empty() {
            return Err(format!("Invalid rule argument: '{}'", arg));
        }
        Ok(Self {
            id: id.to_string(),
            level,
            title: None,
        })
    }

    pub fn to_rule(&self) -> (RuleId, RuleConfig) {
        let title = self.title.clone().unwrap_or_else(|| self.id.clone());
        (RuleId::new(&self.id), RuleConfig::new(self.level, title))
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).into_diagnostic()?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).into_diagnostic()
    }

    /// Try to find and load sqlreview.toml in current directory or parent directories
    pub fn find_and_load() -> Result<Option<Self>> {
        let mut current_dir = std::env::current_dir().into_diagnostic()?;

        loop {
            let config_path = current_dir.join("sqlreview.toml");
            if config_path.exists() {
                tracing::debug!(path = %config_path.display(), "loading configuration");
                return Ok(Some(Self::from_file(&config_path)?));
            }

            // Try parent directory
            if !current_dir.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Merge CLI arguments into configuration
    /// CLI arguments take precedence over config file values
    pub fn merge_with_args(mut self, overrides: ArgOverrides) -> Self {
        if !overrides.files.is_empty() {
            self.files = overrides
                .files
                .iter()
                .map(|p| p.display().to_string())
                .collect();
        }

        if overrides.dialect.is_some() {
            self.dialect = overrides.dialect;
        }

        if let Some(fmt) = overrides.format {
            self.format = Some(format!("{:?}", fmt).to_lowercase());
        }

        if overrides.charset.is_some() {
            self.charset = overrides.charset;
        }

        if overrides.collation.is_some() {
            self.collation = overrides.collation;
        }

        if !overrides.rules.is_empty() {
            self.rules = overrides.rules;
        }

        self
    }

    pub fn dialect(&self) -> Result<SqlDialect> {
        match &self.dialect {
            Some(name) => name.parse().map_err(|e: String| miette::miette!(e)),
            None => Ok(SqlDialect::default()),
        }
    }

    pub fn output_format(&self) -> Result<OutputFormat> {
        match &self.format {
            Some(name) => name.parse().map_err(|e: String| miette::miette!(e)),
            None => Ok(OutputFormat::Human),
        }
    }

    /// Rules to run for `dialect`, in configuration order
    pub fn rules(&self, registry: &RuleRegistry, dialect: SqlDialect) -> Vec<(RuleId, RuleConfig)> {
        if self.rules.is_empty() {
            return registry
                .rules_for(dialect)
                .map(|(id, _)| (id.clone(), RuleConfig::new(RuleLevel::Error, id.to_string())))
                .collect();
        }
        self.rules.iter().map(RuleEntry::to_rule).collect()
    }
}

/// Values given on the command line
#[derive(Debug, Default)]
pub struct ArgOverrides {
    pub files: Vec<PathBuf>,
    pub dialect: Option<String>,
    pub format: Option<OutputFormat>,
    pub charset: Option<String>,
    pub collation: Option<String>,
    pub rules: Vec<RuleEntry>,
}
