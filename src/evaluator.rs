//! Evaluator Pipeline (§4.9).
//!
//! Exact order, first non-`Allow` wins: unwrap → dangerous env → guidance →
//! path check → safelist → named inspector → DB client → `Pass`.

use crate::models::{CommandInvocation, Decision};
use crate::path_policy::PathRules;
use crate::registry::{ALWAYS_SAFE, DANGEROUS_ENV_VARS, DB_CLIENTS, INSPECTED};
use crate::{guidance, inspectors, path_policy, sql, wrapper};
use std::collections::HashSet;

/// Carries the static configuration and a recursion entry point so
/// inspectors (`xargs`, `find -exec`) can evaluate a sub-invocation without
/// depending on this module.
pub struct Context<'a> {
    pub protected_branches: &'a [String],
    pub safe_names: &'a HashSet<String>,
    pub db_client_names: &'a HashSet<String>,
    pub path_rules: &'a PathRules,
    pub evaluate: fn(&CommandInvocation, &Context) -> Decision,
}

impl<'a> Context<'a> {
    pub fn new(
        protected_branches: &'a [String],
        safe_names: &'a HashSet<String>,
        db_client_names: &'a HashSet<String>,
        path_rules: &'a PathRules,
    ) -> Self {
        Context {
            protected_branches,
            safe_names,
            db_client_names,
            path_rules,
            evaluate: evaluate_invocation,
        }
    }
}

pub fn evaluate_invocation(cmd: &CommandInvocation, ctx: &Context) -> Decision {
    let unwrapped = wrapper::unwrap(cmd);

    for (name, _) in &unwrapped.assigns {
        if DANGEROUS_ENV_VARS.contains(name.as_str()) {
            return Decision::ask(format!("dangerous environment variable: {name}"));
        }
    }

    if let Some(suggestion) = guidance::check(std::slice::from_ref(&unwrapped)) {
        return Decision::ask_with_guidance("scripting language used for a shell task", suggestion);
    }

    if let Some(op) = path_policy::path_aware_operation(&unwrapped.name) {
        for path in path_policy::candidate_paths(unwrapped.tail()) {
            if let Err(reason) = path_policy::check(path, op, ctx.path_rules) {
                return Decision::ask(reason);
            }
        }
    }

    if ALWAYS_SAFE.contains(unwrapped.name.as_str()) || ctx.safe_names.contains(&unwrapped.name) {
        return Decision::allow_with_reason(format!("{}: safelisted", unwrapped.name));
    }

    if INSPECTED.contains(unwrapped.name.as_str()) {
        return inspectors::inspect(&unwrapped, ctx);
    }

    if DB_CLIENTS.contains(unwrapped.name.as_str()) || ctx.db_client_names.contains(&unwrapped.name) {
        return match sql::extract_sql(&unwrapped) {
            Some(stmt) if sql::is_read_only(&stmt) => {
                Decision::allow_with_reason(format!("{}: read-only SQL", unwrapped.name))
            }
            Some(_) => Decision::ask(format!("{}: non-read-only SQL", unwrapped.name)),
            None => Decision::ask(format!("{}: interactive session, can't classify", unwrapped.name)),
        };
    }

    Decision::Pass
}
