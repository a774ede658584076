//! Statement parser - splits SQL text into statements and parses each one
//!
//! Every statement is parsed from its own slice of the input so that line
//! numbers reported by sqlparser can be rebased onto the full text.

use sqlparser::ast::Statement;
use sqlparser::parser::Parser;
use tracing::{debug, trace};

use crate::dialect::SqlDialect;

/// One parsed statement together with where it came from
#[derive(Debug, Clone)]
pub struct StatementAst {
    ast: Statement,
    text: String,
    /// Line of the first non-trivia character of the statement
    line: usize,
    /// Line on which the slice handed to sqlparser starts
    base_line: usize,
}

impl StatementAst {
    pub fn ast(&self) -> &Statement {
        &self.ast
    }

    /// Original source text of this statement, without surrounding trivia
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 1-based line on which the statement starts
    pub fn origin_line(&self) -> usize {
        self.line
    }

    /// Convert a line reported by sqlparser for this statement into a line of
    /// the full input. Unknown positions (0) map to the statement start.
    pub fn absolute_line(&self, relative: usize) -> usize {
        if relative == 0 {
            self.line
        } else {
            self.base_line + relative - 1
        }
    }
}

/// The parser rejected the input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseFailure {
    pub message: String,
    /// Absolute line of the failure, or of the failing statement's start
    pub line: usize,
}

/// Parse `sql` into statements, in source order.
///
/// Parsing is all-or-nothing: the first statement that fails aborts the
/// whole parse.
pub fn parse_statements(
    dialect: SqlDialect,
    sql: &str,
    charset: &str,
    collation: &str,
) -> Result<Vec<StatementAst>, ParseFailure> {
    debug!(%dialect, charset, collation, bytes = sql.len(), "parsing statements");

    let parser_dialect = dialect.parser_dialect();
    let mut statements = Vec::new();
    let mut line = 1;
    let mut cursor = 0;

    for raw in split_sql_statements(sql, dialect) {
        line += count_newlines(&sql[cursor..raw.offset]);
        cursor = raw.offset;
        let base_line = line;

        let lead = leading_trivia_len(raw.text, dialect);
        let origin_line = base_line + count_newlines(&raw.text[..lead]);
        let text = raw.text[lead..].trim_end();

        let parsed = Parser::parse_sql(parser_dialect.as_ref(), raw.text).map_err(|e| {
            let line_start = sql[..raw.offset].rfind('\n').map_or(0, |i| i + 1);
            let lead_columns = sql[line_start..raw.offset].chars().count();
            let message = e.to_string();
            let (message, line) = match rebase_position(&message, base_line, lead_columns) {
                Some(rebased) => rebased,
                None => (message, origin_line),
            };
            debug!(line, %message, "statement failed to parse");
            ParseFailure { message, line }
        })?;

        for ast in parsed {
            trace!(line = origin_line, "parsed statement");
            statements.push(StatementAst {
                ast,
                text: text.to_string(),
                line: origin_line,
                base_line,
            });
        }
    }

    Ok(statements)
}

/// A statement-sized slice of the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawStatement<'a> {
    /// Byte offset of the slice in the full input
    offset: usize,
    text: &'a str,
}

/// Split SQL text into individual statements by semicolons,
/// respecting string literals, quoted identifiers and comments.
fn split_sql_statements(sql: &str, dialect: SqlDialect) -> Vec<RawStatement<'_>> {
    let mysql = dialect.is_mysql_family();
    let mut statements = Vec::new();
    let mut start = 0;
    let bytes = sql.as_bytes();
    let len = bytes.len();
    let mut i = 0;

    while i < len {
        match bytes[i] {
            b'\'' | b'"' => {
                i = skip_quoted(bytes, i, mysql);
            }
            b'`' if mysql => {
                i = skip_quoted(bytes, i, false);
            }
            b'$' if !mysql => {
                // Check for dollar-quoted string ($$...$$ or $tag$...$tag$)
                if let Some(tag_end) = find_dollar_tag_end(sql, i) {
                    let tag = &sql[i..=tag_end];
                    i = tag_end + 1;
                    // Find the closing tag
                    if let Some(close_pos) = sql[i..].find(tag) {
                        i += close_pos + tag.len();
                    } else {
                        i = len; // unterminated, consume rest
                    }
                } else {
                    i += 1;
                }
            }
            b'-' if i + 1 < len && bytes[i + 1] == b'-' => {
                i = skip_line_comment(bytes, i);
            }
            b'#' if mysql => {
                i = skip_line_comment(bytes, i);
            }
            b'/' if i + 1 < len && bytes[i + 1] == b'*' => {
                i = skip_block_comment(bytes, i);
            }
            b';' => {
                let stmt = &sql[start..i];
                if !stmt.trim().is_empty() {
                    statements.push(RawStatement {
                        offset: start,
                        text: stmt,
                    });
                }
                start = i + 1;
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    // Handle last statement (without trailing semicolon)
    let last = &sql[start..];
    if !last.trim().is_empty() {
        statements.push(RawStatement {
            offset: start,
            text: last,
        });
    }

    statements
}

/// Skip a quoted literal or identifier starting at `start`; returns the index
/// just past the closing quote. Doubled quotes are always escapes, backslash
/// escapes only when `backslash_escapes` is set.
fn skip_quoted(bytes: &[u8], start: usize, backslash_escapes: bool) -> usize {
    let quote = bytes[start];
    let len = bytes.len();
    let mut i = start + 1;
    while i < len {
        let b = bytes[i];
        if backslash_escapes && b == b'\\' {
            i += 2;
        } else if b == quote {
            i += 1;
            if i < len && bytes[i] == quote {
                i += 1; // escaped quote
            } else {
                return i;
            }
        } else {
            i += 1;
        }
    }
    len
}

fn skip_line_comment(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
    }
    i
}

fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    let len = bytes.len();
    let mut i = start + 2;
    while i + 1 < len {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return i + 2;
        }
        i += 1;
    }
    len
}

/// Find the end of a dollar-quote tag starting at position `start`.
/// Returns the index of the closing `$` if a valid tag is found.
fn find_dollar_tag_end(sql: &str, start: usize) -> Option<usize> {
    let bytes = sql.as_bytes();
    let len = bytes.len();
    // Tag is $<identifier>$ or just $$
    let mut i = start + 1;
    if i < len && bytes[i] == b'$' {
        return Some(i); // $$ tag
    }
    // Look for $identifier$
    while i < len && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    if i < len && bytes[i] == b'$' {
        Some(i)
    } else {
        None
    }
}

/// Byte length of whitespace and comments before the statement proper
fn leading_trivia_len(text: &str, dialect: SqlDialect) -> usize {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut i = 0;
    loop {
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i + 1 < len && bytes[i] == b'-' && bytes[i + 1] == b'-' {
            i = skip_line_comment(bytes, i);
        } else if i < len && bytes[i] == b'#' && dialect.is_mysql_family() {
            i = skip_line_comment(bytes, i);
        } else if i + 1 < len && bytes[i] == b'/' && bytes[i + 1] == b'*' {
            i = skip_block_comment(bytes, i);
        } else {
            return i;
        }
    }
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}

const POSITION_MARKER: &str = " at Line: ";

/// Rewrite the trailing "at Line: N, Column: M" of a sqlparser message from
/// slice-relative to absolute coordinates, returning the new message and line.
///
/// Columns only shift on the slice's first line, which starts `lead_columns`
/// characters into its source line.
fn rebase_position(
    message: &str,
    base_line: usize,
    lead_columns: usize,
) -> Option<(String, usize)> {
    let at = message.rfind(POSITION_MARKER)?;
    let (line, column) = message[at + POSITION_MARKER.len()..].split_once(", Column: ")?;
    let line: usize = line.parse().ok().filter(|line| *line > 0)?;
    let column: usize = column.trim_end().parse().ok()?;

    let line_abs = base_line + line - 1;
    let column_abs = if line == 1 { column + lead_columns } else { column };
    Some((
        format!(
            "{}{}{}, Column: {}",
            &message[..at],
            POSITION_MARKER,
            line_abs,
            column_abs
        ),
        line_abs,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(sql: &str, dialect: SqlDialect) -> Vec<&str> {
        split_sql_statements(sql, dialect)
            .into_iter()
            .map(|raw| raw.text.trim())
            .collect()
    }

    #[test]
    fn test_split_sql_statements() {
        let sql = "CREATE TABLE a (id INT); CREATE TABLE b (id INT);";
        assert_eq!(texts(sql, SqlDialect::MySQL).len(), 2);
    }

    #[test]
    fn test_split_preserves_string_literals() {
        let sql = "SELECT 'hello; world'; CREATE TABLE t (id INT);";
        let stmts = texts(sql, SqlDialect::MySQL);
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].contains("hello; world"));
    }

    #[test]
    fn test_split_respects_backticks_and_escapes() {
        let sql = "CREATE TABLE `a;b` (id INT); SELECT 'it\\'s; fine'; SELECT 1";
        let stmts = texts(sql, SqlDialect::MySQL);
        assert_eq!(stmts.len(), 3, "{:?}", stmts);
        assert!(stmts[0].contains("`a;b`"));
        assert!(stmts[1].contains("fine"));
    }

    #[test]
    fn test_split_skips_comments() {
        let sql = "-- first; still comment\nSELECT 1; # mysql; comment\nSELECT 2 /* ; */;";
        let stmts = texts(sql, SqlDialect::MySQL);
        assert_eq!(stmts.len(), 2, "{:?}", stmts);
    }

    #[test]
    fn test_split_dollar_quotes_postgres_only() {
        let sql = "CREATE FUNCTION f() RETURNS INT AS $$ SELECT 1; $$ LANGUAGE sql; SELECT 2";
        assert_eq!(texts(sql, SqlDialect::PostgreSQL).len(), 2);
    }

    #[test]
    fn test_statement_lines() {
        let sql = "CREATE TABLE a (id INT);\n\n-- note\nCREATE TABLE b (\n  id INT\n);";
        let stmts = parse_statements(SqlDialect::MySQL, sql, "utf8mb4", "").unwrap();
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].origin_line(), 1);
        assert_eq!(stmts[1].origin_line(), 4);
        assert!(stmts[1].text().starts_with("CREATE TABLE b"));
        // sqlparser counts from the start of the slice, which begins on line 1
        assert_eq!(stmts[1].absolute_line(5), 5);
        assert_eq!(stmts[1].absolute_line(0), 4);
    }

    #[test]
    fn test_empty_and_comment_only_input() {
        assert!(parse_statements(SqlDialect::MySQL, "", "", "")
            .unwrap()
            .is_empty());
        assert!(parse_statements(SqlDialect::MySQL, "  -- nothing\n", "", "")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_parse_failure_reports_absolute_line() {
        let sql = "CREATE TABLE a (id INT);\nCREATE TABLE b (id INT,,);";
        let failure = parse_statements(SqlDialect::MySQL, sql, "", "").unwrap_err();
        assert_eq!(failure.line, 2);
        assert!(!failure.message.is_empty());
    }

    #[test]
    fn test_failure_message_agrees_with_line() {
        let sql = "CREATE TABLE a (id INT);\nCREATE TABLE b (id INT);\nCREATE TABLE c (\n  id INT,,\n);";
        let failure = parse_statements(SqlDialect::MySQL, sql, "", "").unwrap_err();
        assert_eq!(failure.line, 4);
        assert!(
            failure.message.ends_with("at Line: 4, Column: 10"),
            "unexpected message: {}",
            failure.message
        );
    }

    #[test]
    fn test_rebase_position() {
        // later line of the slice: only the line moves
        assert_eq!(
            rebase_position("sql parser error: Expected: x, found: y at Line: 3, Column: 7", 5, 20),
            Some((
                "sql parser error: Expected: x, found: y at Line: 7, Column: 7".to_string(),
                7
            ))
        );
        // first line of the slice: the column shifts by what precedes it
        assert_eq!(
            rebase_position("sql parser error: Expected: identifier, found: ( at Line: 1, Column: 15", 1, 24),
            Some((
                "sql parser error: Expected: identifier, found: ( at Line: 1, Column: 39".to_string(),
                1
            ))
        );
        assert_eq!(rebase_position("sql parser error: something", 1, 0), None);
    }
}
