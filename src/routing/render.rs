//! Diagnostic enumeration of the route tree.
//!
//! Produces an indented listing of the trie: literal children in sorted
//! order, then pattern matchers in registration order. Runs under the same
//! read-lock discipline as matching (see [`Router::render`]).
//!
//! [`Router::render`]: crate::routing::Router::render

use std::fmt::Write;

use crate::routing::trie::RouteNode;

const INDENT: &str = "    ";

pub(crate) fn render_node<H>(
    node: &RouteNode<H>,
    indent: &str,
    describe: &dyn Fn(&H) -> Vec<String>,
    out: &mut String,
) {
    let mut keys: Vec<&String> = node.children.keys().collect();
    keys.sort();
    for key in keys {
        let child = &node.children[key];
        write_entry(out, indent, key, child, describe);
        render_node(child, &format!("{indent}{INDENT}"), describe, out);
    }
    for matcher in &node.matchers {
        let label = format!(
            "{}{{{}}}{}",
            matcher.prefix, matcher.field.name, matcher.suffix
        );
        write_entry(out, indent, &label, &matcher.child, describe);
        render_node(&matcher.child, &format!("{indent}{INDENT}"), describe, out);
    }
}

fn write_entry<H>(
    out: &mut String,
    indent: &str,
    label: &str,
    node: &RouteNode<H>,
    describe: &dyn Fn(&H) -> Vec<String>,
) {
    let trailer = if node.directory { "/" } else { "" };
    match node.handlers.as_ref().map(describe) {
        Some(methods) if !methods.is_empty() => {
            let _ = writeln!(out, "{indent}/{label}{trailer} [{}]", methods.join(", "));
        }
        _ => {
            let _ = writeln!(out, "{indent}/{label}{trailer}");
        }
    }
}
