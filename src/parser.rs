//! Shell Parser Adapter (§4.1).
//!
//! Turns a command string into a flat list of `CommandInvocation`s plus a
//! flat list of `Redirect`s, using `tree-sitter-bash` for a real parse
//! instead of regex heuristics. Quoting tricks (`'rm' -rf /`, `"git "
//! 'status'`) collapse to the same invocation as the unquoted form because
//! we read the AST, not the source text.

use crate::models::{CommandInvocation, ParsedCommand, Redirect, RedirectOp};
use std::sync::{LazyLock, Mutex};
use tree_sitter::{Node, Parser, TreeCursor};
use tree_sitter_bash::LANGUAGE;

static PARSER: LazyLock<Mutex<Parser>> = LazyLock::new(|| {
    let mut parser = Parser::new();
    parser
        .set_language(&LANGUAGE.into())
        .expect("failed to load bash grammar");
    Mutex::new(parser)
});

/// Redirect operator tokens that target a file path. `>&` / `<&` (fd
/// duplication, e.g. `2>&1`) are deliberately excluded — their destination
/// is another file descriptor, not a path.
fn redirect_op(token: &str) -> Option<RedirectOp> {
    match token {
        ">" | ">>" | ">|" | "&>" | "&>>" => Some(RedirectOp::Write),
        "<" => Some(RedirectOp::Read),
        _ => None,
    }
}

/// Parse a command string. Returns `None` on a genuine parse failure (the
/// AST contains an error node) — the driver must treat that as `Ask`, never
/// `Allow`.
pub fn parse(command_string: &str) -> Option<ParsedCommand> {
    let tree = {
        let mut parser = PARSER.lock().unwrap();
        parser.parse(command_string, None)?
    };

    let root = tree.root_node();
    if root.has_error() {
        return None;
    }

    let mut result = ParsedCommand::default();
    let mut cursor = tree.walk();
    visit(&mut cursor, command_string, &mut result);
    Some(result)
}

fn visit(cursor: &mut TreeCursor, source: &str, out: &mut ParsedCommand) {
    let node = cursor.node();
    match node.kind() {
        "command" => {
            let mut nested = ParsedCommand::default();
            if let Some(inv) = extract_command(node, source, &mut nested) {
                out.invocations.push(inv);
            }
            out.invocations.extend(nested.invocations);
            out.redirects.extend(nested.redirects);
        }
        "redirected_statement" => {
            for child in node.children(cursor) {
                if child.kind() == "file_redirect" {
                    extract_redirect(child, source, out);
                }
            }
            if let Some(body) = node.child_by_field_name("body") {
                let mut c = body.walk();
                visit(&mut c, source, out);
            }
        }
        "variable_assignments" => {
            out.bare_assignments_only = true;
        }
        _ => {
            if cursor.goto_first_child() {
                loop {
                    visit(cursor, source, out);
                    if !cursor.goto_next_sibling() {
                        break;
                    }
                }
                cursor.goto_parent();
            }
        }
    }
}

fn extract_redirect(node: Node, source: &str, out: &mut ParsedCommand) {
    let Some(dest) = node.child_by_field_name("destination") else {
        return;
    };
    // The operator is the unnamed child sitting before `destination`
    // (and after an optional `descriptor` field).
    let mut cursor = node.walk();
    let op_token = node
        .children(&mut cursor)
        .find(|c| !c.is_named() && redirect_op(text(*c, source).as_str()).is_some());
    let Some(op_token) = op_token else {
        return;
    };
    let Some(op) = redirect_op(&text(op_token, source)) else {
        return;
    };
    let path = extract_word(dest, source);
    if !path.is_empty() {
        out.redirects.push(Redirect { path, op });
    }
}

fn extract_command(node: Node, source: &str, nested: &mut ParsedCommand) -> Option<CommandInvocation> {
    let mut assigns = Vec::new();
    let mut args: Vec<String> = Vec::new();

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "variable_assignment" => {
                if let Some((k, v)) = extract_assignment(child, source) {
                    assigns.push((k, v));
                }
            }
            "command_name" => {
                if let Some(name_node) = child.named_child(0) {
                    args.push(extract_word(name_node, source));
                } else {
                    args.push(text(child, source));
                }
            }
            "command_substitution" | "process_substitution" => {
                let mut c = child.walk();
                visit(&mut c, source, nested);
                args.push(text(child, source));
            }
            _ if child.is_named() => {
                args.push(extract_word(child, source));
            }
            _ => {}
        }
    }

    if args.is_empty() {
        return None;
    }

    let raw_name = args.remove(0);
    let name = basename(&raw_name);
    let mut full_args = vec![basename(&raw_name)];
    full_args.extend(args);
    Some(CommandInvocation {
        name,
        args: full_args,
        assigns,
    })
}

fn extract_assignment(node: Node, source: &str) -> Option<(String, String)> {
    let name = node.child_by_field_name("name")?;
    let value = node.child_by_field_name("value");
    let name = text(name, source);
    let value = value.map_or_else(String::new, |v| extract_word(v, source));
    Some((name, value))
}

/// Extract the text of a word-like node, unquoting strings and flattening
/// concatenations (`"foo"bar` -> `foobar`).
fn extract_word(node: Node, source: &str) -> String {
    match node.kind() {
        "string" => {
            let mut cursor = node.walk();
            node.children(&mut cursor)
                .filter(|c| c.kind() == "string_content" || c.kind() == "simple_expansion")
                .map(|c| text(c, source))
                .collect()
        }
        "raw_string" => {
            let s = text(node, source);
            s.trim_matches('\'').to_string()
        }
        "concatenation" => {
            let mut cursor = node.walk();
            node.children(&mut cursor)
                .map(|c| extract_word(c, source))
                .collect()
        }
        _ => text(node, source),
    }
}

fn text(node: Node, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or("").to_string()
}

fn basename(s: &str) -> String {
    s.rsplit('/').next().unwrap_or(s).to_string()
}
