//! Named Inspectors (§4.7).
//!
//! Keyed dispatch by program name to a small pure function per inspector.
//! `xargs` and `find -exec` recurse back into the evaluator through
//! [`crate::evaluator::Context`] rather than calling it directly, so this
//! module has no dependency on `evaluator`.

use crate::evaluator::Context;
use crate::git;
use crate::models::{CommandInvocation, Decision};

pub fn inspect(cmd: &CommandInvocation, ctx: &Context) -> Decision {
    match cmd.name.as_str() {
        "git" => git::evaluate(cmd, ctx.protected_branches),
        "xargs" => xargs(cmd, ctx),
        "source" | "." => Decision::ask("source: arbitrary script execution"),
        "find" => find(cmd, ctx),
        "sed" => sed(cmd),
        "awk" | "gawk" | "mawk" | "nawk" => awk(cmd),
        "kill" => kill(cmd),
        "chmod" => chmod(cmd),
        "docker" => docker(cmd),
        "node" => node(cmd),
        "python" | "python3" => python(cmd),
        _ => Decision::allow_with_reason(format!("{}: no inspector concerns", cmd.name)),
    }
}

const XARGS_VALUE_FLAGS: &[&str] = &["-I", "-L", "-n", "-P", "-d", "-s", "-a", "-R"];

fn xargs(cmd: &CommandInvocation, ctx: &Context) -> Decision {
    let tail = cmd.tail();
    let mut i = 0;
    while i < tail.len() {
        let arg = tail[i].as_str();
        if XARGS_VALUE_FLAGS.contains(&arg) {
            i += 2;
            continue;
        }
        if arg.starts_with('-') {
            i += 1;
            continue;
        }
        break;
    }
    if i >= tail.len() {
        return Decision::allow_with_reason("xargs: no sub-command, defaults to echo");
    }
    let sub = CommandInvocation::new(tail[i].clone(), tail[i + 1..].to_vec());
    escalate_proxied_pass((ctx.evaluate)(&sub, ctx), "xargs", &sub.name)
}

/// A recursed-into sub-command with no opinion (`Pass`) is still being
/// proxied by this command; an unknown command reached via `xargs` or
/// `find -exec` is exactly the risk these inspectors exist to catch, so
/// `Pass` must not surface past them.
fn escalate_proxied_pass(decision: Decision, proxy: &str, sub_name: &str) -> Decision {
    match decision {
        Decision::Pass => Decision::ask(format!("{proxy}: proxied command {sub_name} is unrecognized")),
        other => other,
    }
}

fn find(cmd: &CommandInvocation, ctx: &Context) -> Decision {
    let tail = cmd.tail();
    let mut i = 0;
    while i < tail.len() {
        let arg = tail[i].as_str();
        if arg == "-delete" || arg == "-ok" {
            return Decision::ask("find: -delete/-ok");
        }
        if arg == "-exec" || arg == "-execdir" {
            let mut j = i + 1;
            while j < tail.len() && tail[j] != ";" && tail[j] != "+" {
                j += 1;
            }
            let exec_args = &tail[i + 1..j];
            if let Some((name, rest)) = exec_args.split_first() {
                let sub = CommandInvocation::new(name.clone(), rest.to_vec());
                let decision = escalate_proxied_pass((ctx.evaluate)(&sub, ctx), "find -exec", &sub.name);
                if !decision.is_allow() {
                    return decision;
                }
            }
            i = j + 1;
            continue;
        }
        i += 1;
    }
    Decision::allow_with_reason("find: no destructive clauses")
}

fn sed(cmd: &CommandInvocation) -> Decision {
    let in_place = cmd
        .tail()
        .iter()
        .any(|a| a == "-i" || a.starts_with("-i"));
    if in_place {
        Decision::ask("sed: in-place edit")
    } else {
        Decision::allow_with_reason("sed: no in-place edit")
    }
}

fn awk(cmd: &CommandInvocation) -> Decision {
    let dangerous = cmd.tail().iter().any(|a| {
        a.contains("system(") || a.contains("system (") || a.contains("| getline") || a.contains("|getline")
    });
    if dangerous {
        Decision::ask("awk: system() or getline pipe")
    } else {
        Decision::allow_with_reason("awk: no system()/getline")
    }
}

fn kill(cmd: &CommandInvocation) -> Decision {
    let tail = cmd.tail();
    let mut i = 0;
    if let Some(first) = tail.first() {
        if first == "-s" {
            i += 2;
        } else if first.starts_with('-') {
            i += 1;
        }
    }
    for pid in &tail[i.min(tail.len())..] {
        if pid == "1" || pid == "-1" {
            return Decision::ask("kill: targets pid 1 or -1");
        }
    }
    Decision::allow_with_reason("kill: no dangerous pid")
}

fn chmod(cmd: &CommandInvocation) -> Decision {
    for arg in cmd.tail() {
        if arg.starts_with('-') {
            continue;
        }
        if let Some(d) = chmod_risk(arg) {
            return d;
        }
        break;
    }
    Decision::allow_with_reason("chmod: safe mode")
}

fn chmod_risk(mode: &str) -> Option<Decision> {
    if mode.chars().all(|c| c.is_ascii_digit()) && (3..=4).contains(&mode.len()) {
        let normalized = if mode.len() == 3 {
            format!("0{mode}")
        } else {
            mode.to_string()
        };
        let digits: Vec<u32> = normalized.chars().map(|c| c.to_digit(10).unwrap_or(0)).collect();
        if digits[0] > 0 {
            return Some(Decision::ask(format!("chmod {mode}: special bits set")));
        }
        if digits[3] >= 6 {
            return Some(Decision::ask(format!("chmod {mode}: world-writable")));
        }
        return Some(Decision::allow_with_reason(format!("chmod {mode}: safe")));
    }

    if mode.contains("+s") {
        return Some(Decision::ask(format!("chmod {mode}: setuid/setgid")));
    }
    for scope in ['o', 'a'] {
        if mode.contains(&format!("{scope}+w")) {
            return Some(Decision::ask(format!("chmod {mode}: world-writable")));
        }
    }
    None
}

const DOCKER_SAFE_SUBCOMMANDS: &[&str] = &[
    "ps", "images", "logs", "inspect", "stats", "top", "version", "info", "network", "volume",
    "system", "build", "pull", "tag", "login", "logout", "compose", "container", "image", "stop",
    "rm", "rmi", "restart",
];

fn docker(cmd: &CommandInvocation) -> Decision {
    let tail = cmd.tail();
    let Some(subcommand) = tail.first() else {
        return Decision::allow_with_reason("docker: no subcommand");
    };
    let rest = &tail[1..];

    if matches!(subcommand.as_str(), "run" | "exec") {
        let mut dangerous = false;
        let mut i = 0;
        while i < rest.len() {
            let a = rest[i].as_str();
            if a == "--privileged" || a == "--pid=host" || a == "--net=host" || a == "--network=host" {
                dangerous = true;
                break;
            }
            if let Some(value) = a.strip_prefix("-v=").or_else(|| a.strip_prefix("--volume=")) {
                if value.starts_with("/:/") {
                    dangerous = true;
                    break;
                }
            } else if a == "-v" || a == "--volume" {
                if rest.get(i + 1).is_some_and(|v| v.starts_with("/:/")) {
                    dangerous = true;
                    break;
                }
                i += 1;
            } else if (a.starts_with("-v") || a.starts_with("--volume")) && a.contains("/:/") {
                dangerous = true;
                break;
            }
            i += 1;
        }
        return if dangerous {
            Decision::ask(format!("docker {subcommand}: dangerous host access flag"))
        } else {
            Decision::allow_with_reason(format!("docker {subcommand}: no host-escape flags"))
        };
    }

    if DOCKER_SAFE_SUBCOMMANDS.contains(&subcommand.as_str()) {
        Decision::allow_with_reason(format!("docker {subcommand}: safe subcommand"))
    } else {
        Decision::ask(format!("docker {subcommand}: unknown subcommand"))
    }
}

fn node(cmd: &CommandInvocation) -> Decision {
    let inline = cmd
        .tail()
        .iter()
        .any(|a| matches!(a.as_str(), "-e" | "--eval" | "-p" | "--print"));
    if inline {
        Decision::ask("node: inline script")
    } else {
        Decision::allow_with_reason("node: no inline script flags")
    }
}

fn python(cmd: &CommandInvocation) -> Decision {
    let inline = cmd.tail().iter().any(|a| a == "-c");
    if inline {
        Decision::ask("python: inline script (-c)")
    } else {
        Decision::allow_with_reason("python: no -c")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(s: &str) -> CommandInvocation {
        crate::parser::parse(s).unwrap().invocations.remove(0)
    }

    fn eval(s: &str) -> Decision {
        let protected = Vec::new();
        let safe = Default::default();
        let db_clients = Default::default();
        let rules = crate::path_policy::PathRules::defaults();
        let ctx = Context::new(&protected, &safe, &db_clients, &rules);
        inspect(&cmd(s), &ctx)
    }

    #[test]
    fn xargs_recurses_into_unsafe_rm() {
        assert!(matches!(eval("xargs rm -rf"), Decision::Ask { .. }));
    }

    #[test]
    fn xargs_with_no_subcommand_allows() {
        assert!(eval("xargs").is_allow());
    }

    #[test]
    fn xargs_skips_value_flags() {
        assert!(!eval("xargs -I {} rm -rf {}").is_allow());
    }

    #[test]
    fn find_exec_recurses() {
        assert!(eval(r"find . -name *.ts -exec grep -l foo {} ;").is_allow());
    }

    #[test]
    fn find_delete_asks() {
        assert!(!eval("find . -delete").is_allow());
    }

    #[test]
    fn find_exec_unrecognized_command_asks() {
        assert!(matches!(
            eval(r"find . -name *.sh -exec some-unknown-command {} ;"),
            Decision::Ask { .. }
        ));
    }

    #[test]
    fn source_always_asks() {
        assert!(!eval("source script.sh").is_allow());
    }

    #[test]
    fn sed_in_place_asks() {
        assert!(!eval("sed -i s/a/b/ f.txt").is_allow());
    }

    #[test]
    fn sed_in_place_suffix_form_asks() {
        assert!(!eval("sed -i.bak s/a/b/ f.txt").is_allow());
    }

    #[test]
    fn sed_stream_allows() {
        assert!(eval("sed s/a/b/ f.txt").is_allow());
    }

    #[test]
    fn awk_system_call_asks() {
        assert!(!eval(r#"awk "{system(\"rm -rf /\")}""#).is_allow());
    }

    #[test]
    fn awk_plain_allows() {
        assert!(eval("awk {print $1}").is_allow());
    }

    #[test]
    fn kill_pid_1_asks() {
        assert!(!eval("kill 1").is_allow());
    }

    #[test]
    fn kill_normal_pid_allows() {
        assert!(eval("kill 12345").is_allow());
    }

    #[test]
    fn chmod_777_asks() {
        assert!(!eval("chmod 777 f.sh").is_allow());
    }

    #[test]
    fn chmod_644_allows() {
        assert!(eval("chmod 644 f.sh").is_allow());
    }

    #[test]
    fn chmod_4755_asks() {
        assert!(!eval("chmod 4755 f.sh").is_allow());
    }

    #[test]
    fn chmod_1777_asks() {
        assert!(!eval("chmod 1777 dir").is_allow());
    }

    #[test]
    fn docker_run_privileged_asks() {
        assert!(!eval("docker run --privileged ubuntu").is_allow());
    }

    #[test]
    fn docker_ps_allows() {
        assert!(eval("docker ps").is_allow());
    }

    #[test]
    fn docker_unknown_subcommand_asks() {
        assert!(!eval("docker frobnicate").is_allow());
    }

    #[test]
    fn docker_run_root_volume_split_tokens_asks() {
        assert!(!eval("docker run -v /:/host ubuntu").is_allow());
    }

    #[test]
    fn docker_run_root_volume_long_flag_equals_asks() {
        assert!(!eval("docker run --volume=/:/host ubuntu").is_allow());
    }

    #[test]
    fn docker_run_benign_volume_allows() {
        assert!(eval("docker run -v /home/user/app:/app ubuntu").is_allow());
    }

    #[test]
    fn node_eval_flag_asks() {
        assert!(!eval(r#"node -e "console.log(1)""#).is_allow());
    }

    #[test]
    fn python_c_flag_asks() {
        assert!(!eval(r#"python3 -c "print(1)""#).is_allow());
    }
}
