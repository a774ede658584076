//! sqlreview CLI - rule-based review of SQL schema changes

mod args;
mod config;
mod output;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use sqlreview_core::{parse_statements, Engine, RuleRegistry, SqlDialect, Status};

use crate::args::{Args, Command};
use crate::config::{ArgOverrides, Config, RuleEntry};
use crate::output::OutputFormatter;

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match (args.quiet, args.verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    match run(args) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let quiet = args.quiet;

    match args.command {
        Command::Check {
            files,
            config: config_path,
            dialect,
            rules,
            charset,
            collation,
            format,
        } => {
            // Load configuration
            let config = if let Some(path) = config_path {
                Config::from_file(&path)?
            } else {
                Config::find_and_load()?.unwrap_or_default()
            };

            let rules = rules
                .iter()
                .map(|arg| RuleEntry::from_arg(arg))
                .collect::<Result<Vec<_>, String>>()
                .map_err(|e| miette::miette!(e))?;

            // Merge CLI args with config (CLI takes precedence)
            let config = config.merge_with_args(ArgOverrides {
                files,
                dialect,
                format,
                charset,
                collation,
                rules,
            });

            let dialect = config.dialect()?;
            let output_format = config.output_format()?;
            let sql_files = collect_files(&config.files)?;

            if sql_files.is_empty() {
                miette::bail!(
                    "No SQL files specified. Use positional arguments or configure in sqlreview.toml"
                );
            }

            let registry = RuleRegistry::builtin();
            let rules = config.rules(&registry, dialect);

            let mut engine = Engine::new(&registry);
            if let Some(charset) = &config.charset {
                engine = engine.with_charset(charset);
            }
            if let Some(collation) = &config.collation {
                engine = engine.with_collation(collation);
            }

            let mut total_errors = 0;
            let mut total_warnings = 0;

            for sql_file in &sql_files {
                let content = fs::read_to_string(sql_file).into_diagnostic()?;
                let reports = engine.run_rules(dialect, &rules, &content)?;

                let formatter = OutputFormatter::new(output_format, sql_file.display().to_string());
                formatter.print_reports(&reports, &content)?;

                for diag in reports.iter().flat_map(|r| &r.diagnostics) {
                    match diag.status {
                        Status::Error => total_errors += 1,
                        Status::Warning => total_warnings += 1,
                        _ => {}
                    }
                }
            }

            // Print summary
            if !quiet {
                if total_errors > 0 || total_warnings > 0 {
                    eprintln!();
                    eprintln!(
                        "Found {} error(s), {} warning(s) in {} file(s)",
                        total_errors,
                        total_warnings,
                        sql_files.len()
                    );
                } else {
                    eprintln!("All {} file(s) passed review", sql_files.len());
                }
            }

            Ok(total_errors > 0)
        }

        Command::Rules { dialect } => {
            let dialect: SqlDialect = dialect.parse().map_err(|e: String| miette::miette!(e))?;
            let registry = RuleRegistry::builtin();

            println!("Rules for {}:", dialect);
            for (id, checker) in registry.rules_for(dialect) {
                println!("  {:<40} {}", id, checker.description());
            }

            Ok(false)
        }

        Command::Parse { file, dialect } => {
            // Parse and display statements (for debugging)
            let content = fs::read_to_string(&file).into_diagnostic()?;
            let dialect: SqlDialect = dialect.parse().map_err(|e: String| miette::miette!(e))?;

            match parse_statements(
                dialect,
                &content,
                dialect.default_charset(),
                dialect.default_collation(),
            ) {
                Ok(statements) => {
                    for (i, stmt) in statements.iter().enumerate() {
                        println!("Statement {} (line {}):", i + 1, stmt.origin_line());
                        println!("{:#?}", stmt.ast());
                        println!();
                    }
                }
                Err(failure) => {
                    eprintln!("Parse error at line {}: {}", failure.line, failure.message);
                    return Ok(true);
                }
            }

            Ok(false)
        }
    }
}

/// Expand glob patterns; plain paths are kept as given
fn collect_files(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        if pattern.contains('*') {
            for path in glob::glob(pattern).into_diagnostic()?.flatten() {
                files.push(path);
            }
        } else {
            files.push(PathBuf::from(pattern));
        }
    }
    Ok(files)
}
