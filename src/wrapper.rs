//! Wrapper Unwrapper (§4.2).
//!
//! `nohup`, `nice`, `timeout` change how a command runs, never what it does.
//! Unwrapping recurses so `nohup nice bun test` collapses to `bun`.

use crate::models::CommandInvocation;
use crate::registry::TRANSPARENT_WRAPPERS;

/// Unwrap transparent wrappers until the inner command is reached (or the
/// wrapper has no discernible inner command, in which case the original
/// invocation is returned unchanged).
pub fn unwrap(cmd: &CommandInvocation) -> CommandInvocation {
    if !TRANSPARENT_WRAPPERS.contains(cmd.name.as_str()) {
        return cmd.clone();
    }

    let tail = cmd.tail();
    let inner = match cmd.name.as_str() {
        "nohup" => unwrap_nohup(tail),
        "nice" => unwrap_nice(tail),
        "timeout" => unwrap_timeout(tail),
        _ => None,
    };

    match inner {
        Some((name, rest)) => {
            let next = CommandInvocation::with_head(name, rest, cmd.assigns.clone());
            unwrap(&next)
        }
        None => cmd.clone(),
    }
}

fn unwrap_nohup(tail: &[String]) -> Option<(String, Vec<String>)> {
    let (name, rest) = tail.split_first()?;
    Some((basename(name), rest.to_vec()))
}

fn unwrap_nice(tail: &[String]) -> Option<(String, Vec<String>)> {
    let mut i = 0;
    while i < tail.len() {
        let arg = tail[i].as_str();
        if arg == "-n" {
            i += 2;
            continue;
        }
        if let Some(rest) = arg.strip_prefix("-n") {
            if !rest.is_empty() {
                i += 1;
                continue;
            }
        }
        if let Some(rest) = arg.strip_prefix("--adjustment") {
            if rest.starts_with('=') {
                i += 1;
                continue;
            }
            if rest.is_empty() {
                i += 2;
                continue;
            }
        }
        // BSD form: -<N>, a bare negative/positive number flag.
        if arg.len() > 1 && arg.starts_with('-') && arg[1..].chars().all(|c| c.is_ascii_digit()) {
            i += 1;
            continue;
        }
        break;
    }
    let name = tail.get(i)?;
    Some((basename(name), tail[i + 1..].to_vec()))
}

fn unwrap_timeout(tail: &[String]) -> Option<(String, Vec<String>)> {
    let mut i = 0;
    while i < tail.len() {
        let arg = tail[i].as_str();
        match arg {
            "-s" | "--signal" | "-k" | "--kill-after" => {
                i += 2;
                continue;
            }
            "--preserve-status" | "--foreground" | "-v" | "--verbose" => {
                i += 1;
                continue;
            }
            _ => {}
        }
        if arg.starts_with("--signal=")
            || arg.starts_with("--kill-after=")
            || (arg.starts_with("-s") && arg.len() > 2)
            || (arg.starts_with("-k") && arg.len() > 2)
        {
            i += 1;
            continue;
        }
        break;
    }
    // One positional DURATION, then the inner command.
    if i >= tail.len() {
        return None;
    }
    i += 1;
    let name = tail.get(i)?;
    Some((basename(name), tail[i + 1..].to_vec()))
}

fn basename(s: &str) -> String {
    s.rsplit('/').next().unwrap_or(s).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(s: &str) -> CommandInvocation {
        crate::parser::parse(s).unwrap().invocations.remove(0)
    }

    #[test]
    fn nohup_unwraps() {
        let u = unwrap(&cmd("nohup bun test"));
        assert_eq!(u.name, "bun");
        assert_eq!(u.tail(), ["test"]);
    }

    #[test]
    fn nice_with_n_flag_unwraps() {
        let u = unwrap(&cmd("nice -n 10 bun test"));
        assert_eq!(u.name, "bun");
    }

    #[test]
    fn nice_bsd_form_unwraps() {
        let u = unwrap(&cmd("nice -10 bun test"));
        assert_eq!(u.name, "bun");
    }

    #[test]
    fn timeout_with_flags_unwraps() {
        let u = unwrap(&cmd("timeout -k 5 --preserve-status 30 bun test"));
        assert_eq!(u.name, "bun");
        assert_eq!(u.tail(), ["test"]);
    }

    #[test]
    fn nested_wrappers_collapse_to_innermost() {
        let u = unwrap(&cmd("nohup nice timeout 5 bun test"));
        assert_eq!(u.name, "bun");
    }

    #[test]
    fn non_wrapper_passes_through() {
        let u = unwrap(&cmd("git status"));
        assert_eq!(u.name, "git");
    }

    #[test]
    fn assigns_carry_through() {
        let u = unwrap(&cmd("FOO=bar nohup bun test"));
        assert_eq!(u.assigns, vec![("FOO".to_string(), "bar".to_string())]);
    }

    #[test]
    fn wrapper_with_no_inner_command_returns_original() {
        let u = unwrap(&cmd("nohup"));
        assert_eq!(u.name, "nohup");
    }
}
