//! CLI bootstrap (SPEC_FULL §2.1).
//!
//! Reads one JSON request from stdin, dispatches on `tool_name`, and prints
//! the hook output envelope. `Pass` prints nothing. A malformed envelope is
//! the one case that exits nonzero without producing a decision (§7).

use hall_pass::config::Config;
use hall_pass::evaluator::Context;
use hall_pass::models::{Decision, HookInput, HookOutput, Operation};
use hall_pass::{audit, debug, driver, path_policy};
use std::io::Read;
use std::process::ExitCode;

fn main() -> ExitCode {
    if std::env::args().nth(1).as_deref() == Some("--version") {
        println!("hall-pass {}", env!("GIT_VERSION"));
        return ExitCode::SUCCESS;
    }

    let mut body = String::new();
    if std::io::stdin().read_to_string(&mut body).is_err() {
        return ExitCode::FAILURE;
    }

    let Ok(input) = serde_json::from_str::<HookInput>(&body) else {
        return ExitCode::FAILURE;
    };

    let config = Config::load();
    let debug_enabled = config.debug_enabled();
    let safe_names = config.safe_names();
    let db_client_names = config.db_client_names();
    let path_rules = config.path_rules();
    let protected_branches = config.protected_branches().to_vec();
    let ctx = Context::new(&protected_branches, &safe_names, &db_client_names, &path_rules);

    let decision = match input.tool_name.as_str() {
        "Bash" => {
            debug::log(debug_enabled, &format!("evaluating: {}", input.tool_input.command));
            driver::decide(&input.tool_input.command, &ctx)
        }
        "Write" | "Edit" => {
            let path = &input.tool_input.file_path;
            debug::log(debug_enabled, &format!("path-checking: {path}"));
            match path_policy::check(path, Operation::Write, &path_rules) {
                Ok(()) => Decision::allow_with_reason("path not protected"),
                Err(reason) => Decision::ask(reason),
            }
        }
        _ => Decision::Pass,
    };

    if config.audit.enabled {
        if let Some(audit_path) = config.audit_path() {
            audit::record(&audit_path, &input.tool_name, &body, &decision);
        }
    }

    if let Some(output) = HookOutput::from_decision(&decision) {
        if let Ok(json) = serde_json::to_string(&output) {
            println!("{json}");
        }
    }

    ExitCode::SUCCESS
}
