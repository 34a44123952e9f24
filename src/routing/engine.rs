//! The matching engine: depth-first trie traversal with backtracking.
//!
//! # Responsibilities
//! - Resolve ordered request-path segments against the trie
//! - Prefer literal children over pattern matchers at every level
//! - Tie-break qualifying matchers by registration order
//! - Fall back to the nearest enclosing directory route
//!
//! # Design Decisions
//! - A value-parse failure disqualifies only the offending matcher and
//!   scanning continues; it is never a request error
//! - Capture patches are prepended on the way back up, so the final list
//!   is ordered root-to-leaf
//! - A node reached with no segments left is an exact candidate even when
//!   it carries no handlers (the HTTP layer answers 405 for those)

use crate::metadata::template::CapturePatch;
use crate::routing::trie::RouteNode;

/// A resolved route: the terminal node plus captures collected along the
/// matched path.
pub struct Matched<'a, H> {
    pub node: &'a RouteNode<H>,
    pub patches: Vec<CapturePatch>,
}

/// Outcome of resolving a request path against the trie.
pub enum MatchOutcome<'a, H> {
    /// The full path matched a registered node.
    Exact(Matched<'a, H>),

    /// No full match, but a directory route encloses the path.
    Fallback(Matched<'a, H>),

    /// No registered route covers the path.
    Miss,
}

pub(crate) fn resolve<'a, H>(root: &'a RouteNode<H>, segments: &[&str]) -> MatchOutcome<'a, H> {
    match walk(root, segments) {
        (Some(exact), _) => MatchOutcome::Exact(exact),
        (None, Some(fallback)) => MatchOutcome::Fallback(fallback),
        (None, None) => MatchOutcome::Miss,
    }
}

/// Recursive walk returning (exact match, fallback candidate).
///
/// An exact match deeper in the tree wins immediately; the first fallback
/// discovered at each level is remembered and only used when nothing below
/// produces an exact match.
fn walk<'a, H>(
    node: &'a RouteNode<H>,
    segments: &[&str],
) -> (Option<Matched<'a, H>>, Option<Matched<'a, H>>) {
    let Some((head, rest)) = segments.split_first() else {
        return (
            Some(Matched {
                node,
                patches: Vec::new(),
            }),
            None,
        );
    };

    let mut fallback = None;

    // Literal children first: an exact match here beats any matcher.
    if let Some(child) = node.children.get(*head) {
        let (exact, deeper) = walk(child, rest);
        if exact.is_some() {
            return (exact, None);
        }
        fallback = deeper;
    }

    for matcher in &node.matchers {
        let Some(after_prefix) = head.strip_prefix(matcher.prefix.as_str()) else {
            continue;
        };
        let Some(captured) = after_prefix.strip_suffix(matcher.suffix.as_str()) else {
            continue;
        };
        let Some(value) = matcher.field.kind.parse(captured) else {
            continue;
        };
        let patch = CapturePatch {
            field: matcher.field.name,
            value,
        };
        let (exact, deeper) = walk(&matcher.child, rest);
        if let Some(mut matched) = exact {
            matched.patches.insert(0, patch);
            return (Some(matched), None);
        }
        if fallback.is_none() {
            if let Some(mut deeper) = deeper {
                deeper.patches.insert(0, patch);
                fallback = Some(deeper);
            }
        }
    }

    if fallback.is_none() && node.directory {
        return (
            None,
            Some(Matched {
                node,
                patches: Vec::new(),
            }),
        );
    }
    (None, fallback)
}
