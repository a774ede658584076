//! Output formatting

use miette::{IntoDiagnostic, Result};
use sqlreview_core::{Diagnostic, RuleReport, Status};

use crate::args::OutputFormat;

/// Output formatter for rule reports of one file
pub struct OutputFormatter {
    format: OutputFormat,
    file_name: String,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, file_name: String) -> Self {
        Self { format, file_name }
    }

    /// Print reports in the configured format
    pub fn print_reports(&self, reports: &[RuleReport], source: &str) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                self.print_human(reports, source);
                Ok(())
            }
            OutputFormat::Json => self.print_json(reports),
            OutputFormat::Sarif => self.print_sarif(reports),
        }
    }

    fn print_human(&self, reports: &[RuleReport], source: &str) {
        for (rule, diag) in findings(reports) {
            let status_str = match diag.status {
                Status::Error => "\x1b[31merror\x1b[0m",
                Status::Warning => "\x1b[33mwarning\x1b[0m",
                Status::Info => "\x1b[34minfo\x1b[0m",
                Status::Ok => "\x1b[32mok\x1b[0m",
            };

            eprintln!("{}[{}]: {}", status_str, diag.code(), diag.content);

            if diag.line > 0 {
                eprintln!("  --> {}:{}", self.file_name, diag.line);
                if let Some(source_line) = get_source_line(source, diag.line) {
                    eprintln!("   |");
                    eprintln!("{:>3} | {}", diag.line, source_line);
                    eprintln!("   |");
                }
            }

            if diag.title == rule {
                eprintln!("   = rule: {}", rule);
            } else {
                eprintln!("   = rule: {} ({})", rule, diag.title);
            }

            eprintln!();
        }
    }

    fn print_json(&self, reports: &[RuleReport]) -> Result<()> {
        let output = serde_json::json!({
            "file": self.file_name,
            "reports": reports
        });
        println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
        Ok(())
    }

    fn print_sarif(&self, reports: &[RuleReport]) -> Result<()> {
        println!(
            "{}",
            serde_json::to_string_pretty(&self.sarif(reports)).into_diagnostic()?
        );
        Ok(())
    }

    fn sarif(&self, reports: &[RuleReport]) -> serde_json::Value {
        let results: Vec<serde_json::Value> = findings(reports)
            .map(|(rule, d)| {
                let mut location = serde_json::json!({
                    "physicalLocation": {
                        "artifactLocation": {
                            "uri": self.file_name
                        }
                    }
                });
                if d.line > 0 {
                    location["physicalLocation"]["region"] =
                        serde_json::json!({ "startLine": d.line });
                }

                serde_json::json!({
                    "ruleId": rule,
                    "level": sarif_level(d.status),
                    "message": {
                        "text": d.content
                    },
                    "properties": {
                        "code": d.code(),
                        "kind": d.kind.name(),
                        "title": d.title
                    },
                    "locations": [location]
                })
            })
            .collect();

        serde_json::json!({
            "$schema": "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
            "version": "2.1.0",
            "runs": [{
                "tool": {
                    "driver": {
                        "name": "sqlreview",
                        "version": env!("CARGO_PKG_VERSION")
                    }
                },
                "results": results
            }]
        })
    }
}

/// Non-OK diagnostics paired with the id of the rule that produced them
fn findings(reports: &[RuleReport]) -> impl Iterator<Item = (&str, &Diagnostic)> {
    reports.iter().flat_map(|report| {
        report
            .diagnostics
            .iter()
            .filter(|d| !d.is_ok())
            .map(move |d| (report.rule.as_str(), d))
    })
}

fn sarif_level(status: Status) -> &'static str {
    match status {
        Status::Error => "error",
        Status::Warning => "warning",
        Status::Info | Status::Ok => "note",
    }
}

/// Get a specific line from source (1-indexed)
fn get_source_line(source: &str, line: usize) -> Option<&str> {
    source.lines().nth(line.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sqlreview_core::{DiagnosticKind, RuleId};

    fn reports() -> Vec<RuleReport> {
        vec![
            RuleReport {
                rule: RuleId::TABLE_REQUIRE_PK,
                diagnostics: vec![Diagnostic::ok()],
            },
            RuleReport {
                rule: RuleId::AUTO_INCREMENT_COLUMN_MUST_UNSIGNED,
                diagnostics: vec![Diagnostic::new(
                    Status::Warning,
                    DiagnosticKind::AutoIncrementColumnSigned,
                    "unsigned ids",
                    "Auto-increment column `t`.`id` is not UNSIGNED type",
                )
                .with_line(3)],
            },
        ]
    }

    #[test]
    fn test_findings_skip_ok() {
        let reports = reports();
        let found: Vec<&str> = findings(&reports).map(|(rule, _)| rule).collect();
        assert_eq!(found, vec!["column.auto-increment-must-unsigned"]);
    }

    #[test]
    fn test_sarif_result() {
        let formatter = OutputFormatter::new(OutputFormat::Sarif, "m/001.sql".to_string());
        let sarif = formatter.sarif(&reports());
        let result = &sarif["runs"][0]["results"][0];
        assert_eq!(result["ruleId"], "column.auto-increment-must-unsigned");
        assert_eq!(result["level"], "warning");
        assert_eq!(result["properties"]["code"], 411);
        assert_eq!(
            result["locations"][0]["physicalLocation"]["region"]["startLine"],
            3
        );
        assert_eq!(sarif["runs"][0]["results"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_source_line() {
        assert_eq!(get_source_line("a\nb\nc", 2), Some("b"));
        assert_eq!(get_source_line("a", 5), None);
    }
}
