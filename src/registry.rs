//! Safe-Command Registry (§4.3).
//!
//! Static program-name sets. Tuning knobs, not algorithms: a command landing
//! here because it can execute arbitrary code via a flag (`python -c`) or
//! proxy other programs (`xargs`, `find -exec`) is a bug, not a style choice.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Read-only/display-only utilities plus task runners that never accept
/// inline-code flags. Safe regardless of arguments.
pub static ALWAYS_SAFE: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "grep", "rg", "ripgrep", "ag", "ack", "sort", "head", "tail", "wc", "jq", "yq", "cat",
        "ls", "file", "stat", "diff", "cmp", "echo", "printf", "date", "cal", "pwd", "whoami",
        "id", "groups", "uname", "hostname", "env", "printenv", "true", "false", "seq", "expr",
        "basename", "dirname", "readlink", "realpath", "du", "df", "ps", "top", "uptime", "w",
        "who", "free", "nproc", "lscpu", "lsblk", "ping", "dig", "nslookup", "host", "whois",
        "tree", "fd", "locate", "which", "whereis", "type", "cut", "uniq", "tr", "column",
        "paste", "join", "comm", "fold", "fmt", "nl", "rev", "tac", "expand", "unexpand", "pr",
        "hexdump", "xxd", "base64", "od", "strings", "man", "info", "gh", "bun", "npm", "npx",
        "shfmt",
    ]
    .into_iter()
    .collect()
});

/// Transparent wrappers (§4.2) — change process lifetime/scheduling, not
/// semantics. The Wrapper Unwrapper owns their flag-skipping rules.
pub static TRANSPARENT_WRAPPERS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["nohup", "nice", "timeout"].into_iter().collect());

/// Names requiring a named inspector (§4.7).
pub static INSPECTED: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "git", "xargs", "source", ".", "find", "sed", "awk", "gawk", "mawk", "nawk", "kill",
        "chmod", "docker", "node", "python", "python3",
    ]
    .into_iter()
    .collect()
});

/// Database clients whose inline SQL is classified by the SQL Classifier
/// (§4.6).
pub static DB_CLIENTS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["psql", "mysql", "sqlite3"].into_iter().collect());

/// Environment variable names that can hijack process behavior regardless of
/// the command they're attached to (§4.3).
pub static DANGEROUS_ENV_VARS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "LD_PRELOAD",
        "LD_LIBRARY_PATH",
        "DYLD_INSERT_LIBRARIES",
        "DYLD_LIBRARY_PATH",
        "BASH_ENV",
        "ENV",
        "PROMPT_COMMAND",
    ]
    .into_iter()
    .collect()
});

/// Path-aware commands (§4.4) whose positional arguments name files, split
/// by the `Operation` they perform.
pub static PATH_AWARE_READERS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "cat", "head", "tail", "less", "more", "file", "stat", "wc", "strings", "diff", "xxd",
        "od", "hexdump", "md5sum", "sha1sum", "sha256sum", "sha512sum", "cksum",
    ]
    .into_iter()
    .collect()
});

pub static PATH_AWARE_WRITERS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    ["cp", "mv", "mkdir", "touch", "tee", "ln", "install"]
        .into_iter()
        .collect()
});

pub static PATH_AWARE_DELETERS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["rm", "rmdir", "unlink"].into_iter().collect());

pub static PATH_AWARE_PERMISSIONS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["chmod", "chown", "chgrp"].into_iter().collect());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arbitrary_code_flags_are_not_always_safe() {
        assert!(!ALWAYS_SAFE.contains("python"));
        assert!(!ALWAYS_SAFE.contains("node"));
        assert!(!ALWAYS_SAFE.contains("xargs"));
        assert!(!ALWAYS_SAFE.contains("find"));
    }

    #[test]
    fn inspected_and_safe_are_disjoint() {
        for name in INSPECTED.iter() {
            assert!(!ALWAYS_SAFE.contains(name), "{name} in both sets");
        }
    }
}
