//! Guidance ("Feedback") Rules (§4.8).
//!
//! Operate on the whole pipeline, not a single invocation. First match wins;
//! the JSON rule is checked before the string-manipulation rule so JSON code
//! isn't double-flagged.

use crate::models::CommandInvocation;

const JSON_KEYWORDS: &[&str] = &[
    "json",
    "JSON",
    "json.load",
    "json.loads",
    "json.dump",
    "json.dumps",
    "JSON.parse",
    "JSON.stringify",
];

const STRING_OP_KEYWORDS: &[&str] = &[
    ".split(",
    ".strip(",
    ".replace(",
    ".join(",
    ".upper()",
    ".lower()",
    ".startswith(",
    ".endswith(",
    ".find(",
    ".count(",
    ".trim(",
    ".toUpperCase(",
    ".toLowerCase(",
    ".startsWith(",
    ".endsWith(",
    ".indexOf(",
    ".includes(",
    "re.sub(",
    "re.match(",
    "re.search(",
    "re.findall(",
];

/// Extract the inline script code passed to python/python3 (`-c`) or node
/// (`-e`/`--eval`/`-p`/`--print`), if any.
fn inline_code(cmd: &CommandInvocation) -> Option<&str> {
    match cmd.name.as_str() {
        "python" | "python3" => flag_value(cmd.tail(), &["-c"]),
        "node" => flag_value(cmd.tail(), &["-e", "--eval", "-p", "--print"]),
        _ => None,
    }
}

fn flag_value<'a>(args: &'a [String], flags: &[&str]) -> Option<&'a str> {
    let mut i = 0;
    while i < args.len() {
        if flags.contains(&args[i].as_str()) {
            return args.get(i + 1).map(String::as_str);
        }
        i += 1;
    }
    None
}

fn has_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Run the guidance rules over a pipeline. Returns a suggestion string on
/// the first match.
pub fn check(pipeline: &[CommandInvocation]) -> Option<String> {
    for cmd in pipeline {
        let Some(code) = inline_code(cmd) else {
            continue;
        };

        if has_any(code, JSON_KEYWORDS) {
            let network = pipeline
                .iter()
                .any(|c| matches!(c.name.as_str(), "curl" | "wget"));
            return Some(if network {
                "This pipeline fetches data over the network and then parses JSON in a \
                 scripting language — `jq` does both the parsing and the filtering in one \
                 step without a language runtime: `curl ... | jq '.'`."
                    .to_string()
            } else {
                "Parsing JSON with a scripting language here — `jq` is built for this and \
                 avoids spinning up a runtime just to filter a JSON document."
                    .to_string()
            });
        }

        if has_any(code, STRING_OP_KEYWORDS) {
            return Some(
                "This string manipulation can likely be done with shell builtins like \
                 `sed`, `awk`, `tr`, or `cut` instead of a scripting language."
                    .to_string(),
            );
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline(cmds: &[&str]) -> Vec<CommandInvocation> {
        cmds.iter()
            .map(|s| crate::parser::parse(s).unwrap().invocations.remove(0))
            .collect()
    }

    #[test]
    fn python_json_parse_triggers_jq_suggestion() {
        let p = pipeline(&[r#"python3 -c "import json; print(json.loads(s))""#]);
        let suggestion = check(&p).unwrap();
        assert!(suggestion.contains("jq"));
    }

    #[test]
    fn curl_pipe_python_json_mentions_network() {
        let p = pipeline(&["curl https://x", r#"python3 -c "print(json.loads(s))""#]);
        let suggestion = check(&p).unwrap();
        assert!(suggestion.contains("jq"));
        assert!(suggestion.to_lowercase().contains("network"));
    }

    #[test]
    fn node_eval_json_parse_triggers() {
        let p = pipeline(&[r#"node -e "console.log(JSON.parse(x))""#]);
        assert!(check(&p).unwrap().contains("jq"));
    }

    #[test]
    fn python_string_split_triggers_shell_suggestion() {
        let p = pipeline(&[r#"python3 -c "print('a,b,c'.split(',')[0])""#]);
        let suggestion = check(&p).unwrap();
        assert!(suggestion.contains("sed") || suggestion.contains("awk"));
    }

    #[test]
    fn json_rule_wins_over_string_rule_when_both_present() {
        let p = pipeline(&[r#"python3 -c "json.loads(s).split(',')""#]);
        let suggestion = check(&p).unwrap();
        assert!(suggestion.contains("jq"));
    }

    #[test]
    fn unrelated_command_has_no_guidance() {
        let p = pipeline(&["git status"]);
        assert!(check(&p).is_none());
    }

    #[test]
    fn python_without_matching_code_has_no_guidance() {
        let p = pipeline(&[r#"python3 -c "print(1+1)""#]);
        assert!(check(&p).is_none());
    }
}
