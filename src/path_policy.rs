//! Path Policy (§4.4).
//!
//! Glob-based access control over three severity tiers, plus the rules for
//! which commands treat their positional arguments as file paths at all.

use crate::models::Operation;
use crate::registry::{
    PATH_AWARE_DELETERS, PATH_AWARE_PERMISSIONS, PATH_AWARE_READERS, PATH_AWARE_WRITERS,
};
use glob::Pattern;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Protected,
    ReadOnly,
    NoDelete,
}

#[derive(Debug, Clone, Default)]
pub struct PathRules {
    pub protected: Vec<String>,
    pub read_only: Vec<String>,
    pub no_delete: Vec<String>,
}

impl PathRules {
    /// The defaults baked in regardless of user configuration (§4.4).
    pub fn defaults() -> Self {
        Self {
            protected: [
                "**/.env",
                "**/.env.*",
                "**/credentials*",
                "**/secret*",
                "~/.ssh/**",
                "~/.aws/**",
                "~/.gnupg/**",
                "**/*.pem",
                "**/*id_rsa*",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            read_only: Vec::new(),
            no_delete: Vec::new(),
        }
    }

    /// User config lists *extend* defaults; never replace them.
    pub fn extend_with(&mut self, protected: &[String], read_only: &[String], no_delete: &[String]) {
        self.protected.extend(protected.iter().cloned());
        self.read_only.extend(read_only.iter().cloned());
        self.no_delete.extend(no_delete.iter().cloned());
    }
}

/// §4.4.1-4: check one `(path, operation)` pair.
pub fn check(path: &str, op: Operation, rules: &PathRules) -> Result<(), String> {
    let resolved = resolve(path);

    if any_match(&rules.protected, &resolved) {
        return Err(format!("{path}: matches a protected path"));
    }
    if matches!(op, Operation::Write | Operation::Delete) && any_match(&rules.read_only, &resolved)
    {
        return Err(format!("{path}: matches a read-only path"));
    }
    if op == Operation::Delete && any_match(&rules.no_delete, &resolved) {
        return Err(format!("{path}: matches a no-delete path"));
    }
    Ok(())
}

fn any_match(globs: &[String], resolved: &str) -> bool {
    globs.iter().any(|pattern| {
        let expanded = if pattern.starts_with("~/") {
            dirs::home_dir()
                .map(|h| format!("{}/{}", h.display(), &pattern[2..]))
                .unwrap_or_else(|| pattern.clone())
        } else {
            pattern.clone()
        };
        Pattern::new(&expanded)
            .map(|p| p.matches(resolved))
            .unwrap_or(false)
    })
}

/// Resolve `~` to the home directory and make the path absolute (relative to
/// cwd) without touching the filesystem. Matching is always case-sensitive.
pub fn resolve(path: &str) -> String {
    let expanded = if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .map(|h| h.join(rest))
            .unwrap_or_else(|| PathBuf::from(path))
    } else if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(path))
    } else {
        PathBuf::from(path)
    };

    if expanded.is_absolute() {
        normalize(&expanded)
    } else {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        normalize(&cwd.join(expanded))
    }
}

fn normalize(path: &Path) -> String {
    use std::path::Component;
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out.to_string_lossy().to_string()
}

/// §4.4.5: which programs treat their positional args as paths, and which
/// `Operation` they perform.
pub fn path_aware_operation(name: &str) -> Option<Operation> {
    if PATH_AWARE_DELETERS.contains(name) {
        Some(Operation::Delete)
    } else if PATH_AWARE_READERS.contains(name) {
        Some(Operation::Read)
    } else if PATH_AWARE_WRITERS.contains(name) || PATH_AWARE_PERMISSIONS.contains(name) {
        Some(Operation::Write)
    } else {
        None
    }
}

/// §4.4.5 arg filtering: skip flags, skip args that don't look like paths.
pub fn candidate_paths(args: &[String]) -> Vec<&String> {
    args.iter()
        .filter(|a| !a.starts_with('-'))
        .filter(|a| a.contains('/') || a.starts_with('.') || a.starts_with('~'))
        .collect()
}
