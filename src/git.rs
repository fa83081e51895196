//! Git Policy (§4.5).

use crate::models::{CommandInvocation, Decision};
use std::collections::HashSet;
use std::sync::LazyLock;

static GLOBAL_OPTS_WITH_VALUE: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["-C", "-c", "--git-dir", "--work-tree"].into_iter().collect());

static ALWAYS_DESTRUCTIVE: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["reset", "clean"].into_iter().collect());

static SAFE_SUBCOMMANDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "status", "log", "diff", "show", "branch", "tag", "remote", "describe", "rev-parse",
        "rev-list", "ls-files", "ls-tree", "cat-file", "reflog", "shortlog", "blame", "bisect",
        "name-rev", "cherry", "count-objects", "fsck", "verify-pack", "whatchanged", "add",
        "commit", "stash", "fetch", "pull", "merge", "cherry-pick", "revert", "notes",
        "worktree", "checkout", "switch", "restore", "gc", "prune", "repack",
        // Branch-gated (see below), not unconditionally safe, but must reach
        // that gate rather than being rejected as unknown.
        "push", "rebase",
    ]
    .into_iter()
    .collect()
});

const DEFAULT_PROTECTED_BRANCHES: &[&str] = &["main", "master", "staging", "production", "prod"];

fn is_dangerous_config_key(key: &str) -> bool {
    const EXACT: &[&str] = &[
        "core.fsmonitor",
        "core.sshcommand",
        "core.hookspath",
        "diff.external",
        "credential.helper",
    ];
    let lower = key.to_ascii_lowercase();
    if EXACT.contains(&lower.as_str()) {
        return true;
    }
    if let Some(rest) = lower.strip_prefix("pager.") {
        return !rest.is_empty();
    }
    if let Some(rest) = lower.strip_prefix("alias.") {
        return !rest.is_empty();
    }
    if lower.starts_with("filter.") && (lower.ends_with(".clean") || lower.ends_with(".smudge")) {
        return true;
    }
    false
}

struct Parsed<'a> {
    subcommand: Option<&'a str>,
    rest: &'a [String],
    configs: Vec<&'a str>,
}

/// Consume flags between `git` and the subcommand (§4.5 para 1).
fn parse(tail: &[String]) -> Parsed<'_> {
    let mut i = 0;
    let mut configs = Vec::new();
    while i < tail.len() {
        let arg = tail[i].as_str();
        if arg == "-c" || arg == "--config" {
            if let Some(v) = tail.get(i + 1) {
                configs.push(v.as_str());
            }
            i += 2;
            continue;
        }
        if GLOBAL_OPTS_WITH_VALUE.contains(arg) {
            i += 2;
            continue;
        }
        if let Some(rest) = arg.strip_prefix("--config=") {
            configs.push(rest);
            i += 1;
            continue;
        }
        if GLOBAL_OPTS_WITH_VALUE
            .iter()
            .any(|opt| arg.starts_with(&format!("{opt}=")))
        {
            i += 1;
            continue;
        }
        if arg.starts_with('-') {
            i += 1;
            continue;
        }
        break;
    }
    let subcommand = tail.get(i).map(String::as_str);
    let rest = if i < tail.len() { &tail[i + 1..] } else { &[] };
    Parsed { subcommand, rest, configs }
}

pub fn evaluate(cmd: &CommandInvocation, protected_branches: &[String]) -> Decision {
    let parsed = parse(cmd.tail());

    for kv in &parsed.configs {
        if let Some((key, _)) = kv.split_once('=') {
            if is_dangerous_config_key(key) {
                return Decision::ask(format!("git: dangerous config key {key}"));
            }
        }
    }

    let Some(subcommand) = parsed.subcommand else {
        return Decision::allow_with_reason("git: bare invocation");
    };

    if subcommand == "config" {
        for arg in parsed.rest {
            if arg.starts_with('-') {
                continue;
            }
            if is_dangerous_config_key(arg) {
                return Decision::ask(format!("git config: dangerous key {arg}"));
            }
        }
        return Decision::allow_with_reason("git config: safe key");
    }

    if ALWAYS_DESTRUCTIVE.contains(subcommand) {
        return Decision::ask(format!("git {subcommand}: always destructive"));
    }

    if !SAFE_SUBCOMMANDS.contains(subcommand) {
        return Decision::ask(format!("git {subcommand}: unknown subcommand"));
    }

    if let Some(reason) = destructive_flag_override(subcommand, parsed.rest) {
        return Decision::ask(reason);
    }

    if matches!(subcommand, "push" | "rebase") {
        let all_branches: Vec<&str> = DEFAULT_PROTECTED_BRANCHES
            .iter()
            .copied()
            .chain(protected_branches.iter().map(String::as_str))
            .collect();
        for arg in parsed.rest {
            if arg.starts_with('-') {
                continue;
            }
            let last = arg.rsplit(':').next().unwrap_or(arg);
            if all_branches.contains(&last) {
                return Decision::ask(format!("git {subcommand}: touches protected branch {last}"));
            }
        }
    }

    Decision::allow_with_reason(format!("git {subcommand}: safe"))
}

fn destructive_flag_override(subcommand: &str, rest: &[String]) -> Option<String> {
    match subcommand {
        "push" => rest
            .iter()
            .any(|a| matches!(a.as_str(), "--force" | "-f" | "--force-with-lease" | "--force-if-includes"))
            .then(|| "git push: force flag".to_string()),
        "checkout" | "restore" => rest
            .iter()
            .any(|a| a == ".")
            .then(|| format!("git {subcommand}: bare '.' overwrites working tree")),
        "branch" => rest
            .iter()
            .any(|a| matches!(a.as_str(), "-D" | "-d" | "--force"))
            .then(|| "git branch: delete/force flag".to_string()),
        "stash" => rest
            .iter()
            .any(|a| matches!(a.as_str(), "drop" | "clear"))
            .then(|| "git stash: drop/clear".to_string()),
        _ => None,
    }
}
