//! Audit log writer (SPEC_FULL §2.3).
//!
//! One JSON object per line. Write failures are swallowed — the audit log
//! must never affect the verdict already handed back to the host.

use crate::models::Decision;
use chrono::Utc;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
struct AuditEntry<'a> {
    ts: String,
    tool: &'a str,
    input: &'a str,
    decision: &'static str,
    reason: Option<&'a str>,
    layer: &'static str,
}

fn decision_fields(decision: &Decision) -> (&'static str, Option<&str>, &'static str) {
    match decision {
        Decision::Allow(reason) => ("allow", reason.as_deref(), "evaluator"),
        Decision::Ask { reason, guidance } if guidance.is_some() => {
            ("feedback", Some(reason.as_str()), "guidance")
        }
        Decision::Ask { reason, .. } => ("prompt", Some(reason.as_str()), "evaluator"),
        Decision::Pass => ("allow", None, "default"),
    }
}

/// Append one entry. Any I/O error (missing directory, permission denied,
/// full disk) is swallowed.
pub fn record(path: &Path, tool: &str, input: &str, decision: &Decision) {
    let (decision_str, reason, layer) = decision_fields(decision);
    let entry = AuditEntry {
        ts: Utc::now().to_rfc3339(),
        tool,
        input,
        decision: decision_str,
        reason,
        layer,
    };

    let Ok(line) = serde_json::to_string(&entry) else {
        return;
    };

    let file = OpenOptions::new().create(true).append(true).open(path);
    if let Ok(mut file) = file {
        let _ = writeln!(file, "{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn writes_one_json_line_per_call() {
        let file = NamedTempFile::new().unwrap();
        record(file.path(), "Bash", "git status", &Decision::allow_with_reason("safe"));
        record(file.path(), "Bash", "rm -rf /", &Decision::ask("destructive"));

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"allow\""));
        assert!(lines[1].contains("\"prompt\""));
    }

    #[test]
    fn unwritable_path_does_not_panic() {
        record(
            Path::new("/nonexistent-dir-xyz/audit.log"),
            "Bash",
            "echo hi",
            &Decision::Pass,
        );
    }

    #[test]
    fn guidance_decision_recorded_as_feedback() {
        let file = NamedTempFile::new().unwrap();
        record(
            file.path(),
            "Bash",
            "python3 -c json",
            &Decision::ask_with_guidance("scripting", "use jq"),
        );
        let content = std::fs::read_to_string(file.path()).unwrap();
        assert!(content.contains("\"feedback\""));
    }
}
