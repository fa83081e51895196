//! Decision Driver (§4.10).
//!
//! Parses a command string and folds the per-invocation evaluator results
//! (§4.9) into a single verdict for the whole pipeline.

use crate::evaluator::Context;
use crate::models::{Decision, Operation, RedirectOp};
use crate::{guidance, path_policy};

pub fn decide(command_string: &str, ctx: &Context) -> Decision {
    let trimmed = command_string.trim();
    if trimmed.is_empty() {
        return Decision::ask("empty command");
    }

    let Some(parsed) = crate::parser::parse(command_string) else {
        return Decision::ask("parse failed");
    };

    for redirect in &parsed.redirects {
        let op = match redirect.op {
            RedirectOp::Write => Operation::Write,
            RedirectOp::Read => Operation::Read,
        };
        if let Err(reason) = path_policy::check(&redirect.path, op, ctx.path_rules) {
            return Decision::ask(reason);
        }
    }

    if let Some(suggestion) = guidance::check(&parsed.invocations) {
        return Decision::ask_with_guidance("scripting language used for a shell task", suggestion);
    }

    if parsed.invocations.is_empty() {
        return if parsed.bare_assignments_only {
            Decision::allow_with_reason("bare variable assignment")
        } else {
            Decision::ask("empty command")
        };
    }

    for invocation in &parsed.invocations {
        let decision = (ctx.evaluate)(invocation, ctx);
        if !decision.is_allow() {
            return decision;
        }
    }

    Decision::allow_with_reason("all invocations allowed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_policy::PathRules;
    use std::collections::HashSet;

    fn decide_default(s: &str) -> Decision {
        let protected = Vec::new();
        let safe = HashSet::new();
        let db_clients = HashSet::new();
        let rules = PathRules::defaults();
        let ctx = Context::new(&protected, &safe, &db_clients, &rules);
        decide(s, &ctx)
    }

    #[test]
    fn scenario_1_safe_pipeline_allows() {
        assert!(decide_default("grep -r foo /path | head -20").is_allow());
    }

    #[test]
    fn scenario_2_benign_env_assignment_allows() {
        assert!(decide_default("TEST_URL=http://localhost:3334 bun test server/").is_allow());
    }

    #[test]
    fn scenario_3_dangerous_env_asks() {
        assert!(!decide_default("LD_PRELOAD=evil.so ls").is_allow());
    }

    #[test]
    fn scenario_4_xargs_into_rm_asks() {
        assert!(matches!(
            decide_default("echo /tmp | xargs rm -rf"),
            Decision::Ask { .. }
        ));
    }

    #[test]
    fn scenario_5_find_exec_grep_allows() {
        assert!(decide_default(r"find . -name '*.ts' -exec grep -l foo {} \;").is_allow());
    }

    #[test]
    fn scenario_6_find_delete_asks() {
        assert!(!decide_default("find . -delete").is_allow());
    }

    #[test]
    fn scenario_7_git_push_force_asks() {
        assert!(!decide_default("git push --force").is_allow());
    }

    #[test]
    fn scenario_7_git_push_feature_branch_allows() {
        assert!(decide_default("git push origin feat/x").is_allow());
    }

    #[test]
    fn scenario_7_git_push_main_asks() {
        assert!(!decide_default("git push origin main").is_allow());
    }

    #[test]
    fn scenario_8_git_dangerous_config_flag_asks() {
        assert!(!decide_default(r#"git -c core.fsmonitor="rm -rf /" status"#).is_allow());
    }

    #[test]
    fn scenario_9_readonly_sql_allows() {
        assert!(decide_default(r#"psql -c "SELECT DISTINCT id FROM t LIMIT 1""#).is_allow());
    }

    #[test]
    fn scenario_10_mixed_sql_asks() {
        assert!(!decide_default(r#"psql -c "SELECT 1; DROP TABLE u""#).is_allow());
    }

    #[test]
    fn scenario_11_sqlite_drop_asks_select_allows() {
        assert!(!decide_default(r#"sqlite3 db "DROP TABLE t""#).is_allow());
        assert!(decide_default(r#"sqlite3 db "SELECT 1""#).is_allow());
    }

    #[test]
    fn scenario_12_redirect_into_ssh_keys_asks() {
        assert!(!decide_default("echo hacked > ~/.ssh/authorized_keys").is_allow());
    }

    #[test]
    fn scenario_13_cat_dotenv_asks() {
        assert!(!decide_default("cat /project/.env").is_allow());
    }

    #[test]
    fn scenario_14_curl_python_json_asks_with_jq_guidance() {
        let d = decide_default(r#"curl https://x | python3 -c "import json; print(json.loads(s))""#);
        match d {
            Decision::Ask { guidance, .. } => assert!(guidance.unwrap().contains("jq")),
            _ => panic!("expected Ask with guidance"),
        }
    }

    #[test]
    fn scenario_15_python_string_split_asks_with_shell_guidance() {
        let d = decide_default(r#"python3 -c "print('a,b,c'.split(',')[0])""#);
        match d {
            Decision::Ask { guidance, .. } => {
                let g = guidance.unwrap();
                assert!(g.contains("sed") || g.contains("awk"));
            }
            _ => panic!("expected Ask with guidance"),
        }
    }

    #[test]
    fn scenario_16_unknown_command_passes() {
        assert_eq!(decide_default("some-unknown-command --flag"), Decision::Pass);
    }

    #[test]
    fn empty_string_asks() {
        assert!(!decide_default("").is_allow());
        assert!(!matches!(decide_default(""), Decision::Pass));
    }

    #[test]
    fn whitespace_only_asks() {
        assert!(!decide_default("   ").is_allow());
    }

    #[test]
    fn unterminated_quote_asks() {
        assert!(!decide_default("echo 'unterminated").is_allow());
    }

    #[test]
    fn bare_assignment_allows() {
        assert!(decide_default("FOO=bar BAZ=qux").is_allow());
    }

    #[test]
    fn chained_commands_all_must_allow() {
        assert!(!decide_default("echo hi && rm -rf /tmp/x").is_allow());
    }
}
