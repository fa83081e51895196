//! Configuration loader (§6 config surface, SPEC_FULL §2.2).
//!
//! TOML on disk, all sections optional. A missing or malformed file falls
//! back to defaults silently — `ConfigLoadFailure` never produces `Ask`.

use crate::path_policy::PathRules;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub commands: CommandsSection,
    #[serde(default)]
    pub git: GitSection,
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub audit: AuditSection,
    #[serde(default)]
    pub debug: DebugSection,
}

#[derive(Debug, Deserialize, Default)]
pub struct CommandsSection {
    #[serde(default)]
    pub safe: Vec<String>,
    #[serde(default)]
    pub db_clients: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct GitSection {
    #[serde(default)]
    pub protected_branches: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PathsSection {
    #[serde(default)]
    pub protected: Vec<String>,
    #[serde(default)]
    pub read_only: Vec<String>,
    #[serde(default)]
    pub no_delete: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AuditSection {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct DebugSection {
    #[serde(default)]
    pub enabled: bool,
}

impl Config {
    /// Resolve the config path: `HALL_PASS_CONFIG` override, else
    /// `~/.hall-pass/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("HALL_PASS_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|h| h.join(".hall-pass/config.toml"))
    }

    /// Load from the default/overridden path. Missing file, unreadable
    /// file, or malformed TOML all fall back to `Config::default()`.
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Config::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Build the merged path-policy ruleset: defaults extended by config.
    pub fn path_rules(&self) -> PathRules {
        let mut rules = PathRules::defaults();
        rules.extend_with(
            &self.paths.protected,
            &self.paths.read_only,
            &self.paths.no_delete,
        );
        rules
    }

    pub fn safe_names(&self) -> HashSet<String> {
        self.commands.safe.iter().cloned().collect()
    }

    pub fn db_client_names(&self) -> HashSet<String> {
        self.commands.db_clients.iter().cloned().collect()
    }

    pub fn protected_branches(&self) -> &[String] {
        &self.git.protected_branches
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug.enabled || std::env::var("HALL_PASS_DEBUG").as_deref() == Ok("1")
    }

    /// Resolve the audit log path: config `[audit].path`, else
    /// `~/.hall-pass/audit.log`.
    pub fn audit_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.audit.path {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|h| h.join(".hall-pass/audit.log"))
    }
}
