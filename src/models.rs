//! Core types for the authorization engine.

use serde::{Deserialize, Serialize};

/// A single command invocation extracted from the shell parse tree.
///
/// `name` is the basename of the program (path-stripped: `/usr/bin/grep`
/// becomes `grep`). `args` starts with `name` itself, matching what the shell
/// parser hands the process's argv.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandInvocation {
    pub name: String,
    pub args: Vec<String>,
    pub assigns: Vec<(String, String)>,
}

impl CommandInvocation {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        let name = name.into();
        let mut full_args = vec![name.clone()];
        full_args.extend(args);
        Self {
            name,
            args: full_args,
            assigns: Vec::new(),
        }
    }

    /// Arguments after the program name itself.
    pub fn tail(&self) -> &[String] {
        &self.args[1.min(self.args.len())..]
    }

    /// Build a new invocation with a different head, keeping the rest of the
    /// argv and the original assigns. Used by the wrapper unwrapper.
    pub fn with_head(name: String, rest: Vec<String>, assigns: Vec<(String, String)>) -> Self {
        let mut args = vec![name.clone()];
        args.extend(rest);
        Self { name, args, assigns }
    }
}

/// I/O direction of a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectOp {
    Read,
    Write,
}

/// A file redirection target found anywhere in the parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub path: String,
    pub op: RedirectOp,
}

/// Everything pulled out of one command string.
#[derive(Debug, Clone, Default)]
pub struct ParsedCommand {
    pub invocations: Vec<CommandInvocation>,
    pub redirects: Vec<Redirect>,
    /// True when the string parsed to nothing but inline variable
    /// assignments (`FOO=bar BAZ=qux`) — that's `Allow`, not a parse
    /// failure, even though `invocations` is empty.
    pub bare_assignments_only: bool,
}

/// File-path operation kind, used by the Path Policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    Delete,
}

/// Permission decision. `Ask` carries an optional guidance string (§4.8)
/// that the host surfaces to the assistant as `additionalContext`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(Option<String>),
    Ask {
        reason: String,
        guidance: Option<String>,
    },
    Pass,
}

impl Decision {
    pub fn allow() -> Self {
        Decision::Allow(None)
    }

    pub fn allow_with_reason(reason: impl Into<String>) -> Self {
        Decision::Allow(Some(reason.into()))
    }

    pub fn ask(reason: impl Into<String>) -> Self {
        Decision::Ask {
            reason: reason.into(),
            guidance: None,
        }
    }

    pub fn ask_with_guidance(reason: impl Into<String>, guidance: impl Into<String>) -> Self {
        Decision::Ask {
            reason: reason.into(),
            guidance: Some(guidance.into()),
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }
}

// === Host I/O ===

/// Input envelope from the host (§6).
#[derive(Debug, Deserialize, Default)]
pub struct ToolInput {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub file_path: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct HookInput {
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: ToolInput,
}

/// Output envelope to the host (§6). `Pass` is encoded by printing nothing,
/// so there is no variant for it here.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookOutput {
    pub hook_specific_output: HookSpecificOutput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    pub hook_event_name: String,
    pub permission_decision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_decision_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
}

impl HookOutput {
    pub fn from_decision(decision: &Decision) -> Option<Self> {
        let (permission_decision, reason, guidance) = match decision {
            Decision::Allow(reason) => ("allow".to_string(), reason.clone(), None),
            Decision::Ask { reason, guidance } => {
                ("ask".to_string(), Some(reason.clone()), guidance.clone())
            }
            Decision::Pass => return None,
        };
        Some(HookOutput {
            hook_specific_output: HookSpecificOutput {
                hook_event_name: "PreToolUse".to_string(),
                permission_decision,
                permission_decision_reason: reason,
                additional_context: guidance,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_invocation_tail() {
        let c = CommandInvocation::new("git", vec!["status".into()]);
        assert_eq!(c.name, "git");
        assert_eq!(c.tail(), ["status"]);
    }

    #[test]
    fn test_pass_has_no_output() {
        assert!(HookOutput::from_decision(&Decision::Pass).is_none());
    }

    #[test]
    fn test_allow_serializes() {
        let out = HookOutput::from_decision(&Decision::allow_with_reason("safe")).unwrap();
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("\"allow\""));
        assert!(json.contains("safe"));
        assert!(!json.contains("additionalContext"));
    }

    #[test]
    fn test_ask_with_guidance_serializes() {
        let out = HookOutput::from_decision(&Decision::ask_with_guidance("use jq", "try: jq ."))
            .unwrap();
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("\"ask\""));
        assert!(json.contains("additionalContext"));
    }
}
