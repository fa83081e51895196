//! SQL Classifier (§4.6).
//!
//! Extracts inline SQL from a DB-client invocation and classifies it as
//! read-only or not, including dialect-specific meta-commands.

use crate::models::CommandInvocation;

const PSQL_META_ALLOW: &[&str] = &[
    "d", "dt", "di", "ds", "dv", "dn", "df", "dg", "du", "l", "conninfo", "pset", "x", "echo",
    "sf", "sv", "g", "if", "timing", "encoding", "copyright", "h",
];

const PSQL_META_DENY: &[&str] = &["!", "copy", "i", "o", "w"];

const SQLITE_DOT_ALLOW: &[&str] = &[
    "schema", "tables", "databases", "indexes", "headers", "mode", "width", "show", "dump",
    "help", "version", "timer", "stats", "separator", "nullvalue",
];

const SQLITE_DOT_DENY: &[&str] = &[
    "import", "restore", "open", "output", "save", "backup", "read", "system", "shell",
];

/// Extract the inline SQL string from a DB-client invocation, if any.
///
/// `psql`/`mysql`/`sqlite3` get their own dialect-specific extraction; a
/// user-configured extra DB client (`[commands].db_clients`) has no known
/// dialect, so it's extracted with the union of the known clients'
/// inline-SQL flags — the common convention across them.
pub fn extract_sql(cmd: &CommandInvocation) -> Option<String> {
    match cmd.name.as_str() {
        "psql" => extract_flag_value(cmd.tail(), &["-c", "--command"]),
        "mysql" => extract_flag_value(cmd.tail(), &["-e", "--execute"]),
        "sqlite3" => extract_sqlite_sql(cmd.tail()),
        _ => extract_flag_value(cmd.tail(), &["-c", "--command", "-e", "--execute"]),
    }
}

fn extract_flag_value(args: &[String], flags: &[&str]) -> Option<String> {
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if flags.contains(&arg) {
            return args.get(i + 1).cloned();
        }
        for flag in flags {
            if let Some(val) = arg.strip_prefix(&format!("{flag}=")) {
                return Some(val.to_string());
            }
        }
        i += 1;
    }
    None
}

/// sqlite3 takes `[opts…] db_file SQL` — SQL is the second positional after
/// skipping value-flag pairs (`-cmd`, `-separator`, `-newline`).
fn extract_sqlite_sql(args: &[String]) -> Option<String> {
    const VALUE_FLAGS: &[&str] = &["-cmd", "-separator", "-newline"];
    let mut positionals = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if VALUE_FLAGS.contains(&arg) {
            i += 2;
            continue;
        }
        if arg.starts_with('-') {
            i += 1;
            continue;
        }
        positionals.push(arg.to_string());
        i += 1;
    }
    positionals.get(1).cloned()
}

/// Classify SQL (or a dialect meta-command) as read-only.
pub fn is_read_only(sql: &str) -> bool {
    let trimmed = sql.trim();
    if trimmed.is_empty() {
        return true;
    }

    if let Some(rest) = trimmed.strip_prefix('\\') {
        return classify_meta(rest, PSQL_META_ALLOW, PSQL_META_DENY);
    }

    if let Some(rest) = trimmed.strip_prefix('.') {
        return classify_meta(rest, SQLITE_DOT_ALLOW, SQLITE_DOT_DENY);
    }

    if trimmed.len() >= 6 && trimmed[..6].eq_ignore_ascii_case("pragma") {
        let rest = &trimmed[6..];
        return !rest.contains('=');
    }

    classify_statements(trimmed)
}

fn classify_meta(rest: &str, allow: &[&str], deny: &[&str]) -> bool {
    let word = rest
        .split(|c: char| c == '+' || c.is_whitespace())
        .next()
        .unwrap_or("")
        .to_string();
    if deny.contains(&word.as_str()) {
        return false;
    }
    allow.contains(&word.as_str())
}

/// Every top-level (semicolon-separated) statement must be a read-only kind.
fn classify_statements(sql: &str) -> bool {
    let statements: Vec<&str> = sql
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if statements.is_empty() {
        return true;
    }
    statements.iter().all(|stmt| statement_kind_is_read_only(stmt))
}

fn statement_kind_is_read_only(stmt: &str) -> bool {
    let first_word = stmt
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    matches!(first_word.as_str(), "select" | "with" | "show" | "values")
}
