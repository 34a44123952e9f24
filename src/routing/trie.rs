//! The routing trie.
//!
//! # Responsibilities
//! - Own the tree of literal children and ordered pattern matchers
//! - Extend the tree along a parsed pattern at registration
//! - Deduplicate structurally identical matchers within one parent
//!
//! # Design Decisions
//! - Nodes are generic over the handler payload `H`, keeping method
//!   dispatch out of the matching core
//! - Matchers dedup on (prefix, suffix, field kind); the variable name is
//!   not part of the key, so same-shaped variables share a child and the
//!   first-registered name captures through that branch

use std::collections::HashMap;
use std::sync::Arc;

use crate::metadata::schema::{FieldSpec, FieldTable};
use crate::metadata::template::MetadataTemplate;
use crate::routing::error::RouteError;
use crate::routing::pattern::Segment;

/// A node in the routing trie.
///
/// Literal children are matched by exact segment text and take precedence;
/// pattern matchers are scanned in registration order.
#[derive(Debug)]
pub struct RouteNode<H> {
    pub(crate) children: HashMap<String, RouteNode<H>>,
    pub(crate) matchers: Vec<PatternMatcher<H>>,
    pub(crate) handlers: Option<H>,
    pub(crate) template: Option<MetadataTemplate>,

    /// Set when the registered path ended in '/'; this node then serves as
    /// a fallback for paths below it.
    pub(crate) directory: bool,

    /// Pattern this node was registered under, for diagnostics.
    pub(crate) pattern: Option<Arc<str>>,
}

/// A single-variable segment matcher: literal prefix and suffix around the
/// captured text, plus the field the capture writes to.
#[derive(Debug)]
pub(crate) struct PatternMatcher<H> {
    pub(crate) prefix: String,
    pub(crate) suffix: String,
    pub(crate) field: FieldSpec,
    pub(crate) child: RouteNode<H>,
}

impl<H> RouteNode<H> {
    pub(crate) fn new() -> Self {
        RouteNode {
            children: HashMap::new(),
            matchers: Vec::new(),
            handlers: None,
            template: None,
            directory: false,
            pattern: None,
        }
    }

    /// Handler payload attached at registration, if any.
    pub fn handlers(&self) -> Option<&H> {
        self.handlers.as_ref()
    }

    /// Metadata template attached at registration, if any.
    pub fn template(&self) -> Option<&MetadataTemplate> {
        self.template.as_ref()
    }

    /// Pattern text this node was registered under, if it is a terminal.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// Whether the node was registered with a trailing slash.
    pub fn is_directory(&self) -> bool {
        self.directory
    }

    /// Walk (and extend) the trie along the parsed segments, returning the
    /// terminal node.
    ///
    /// Literal segments descend into the child map, creating nodes as
    /// needed. Capture segments first scan the matcher list for a
    /// structurally identical entry and reuse its child; otherwise a new
    /// matcher is appended, preserving registration order for tie-breaks.
    pub(crate) fn extend(
        &mut self,
        segments: &[Segment],
        table: Option<&FieldTable>,
        pattern: &str,
    ) -> Result<&mut RouteNode<H>, RouteError> {
        let mut node = self;
        for segment in segments {
            node = match segment {
                Segment::Literal(text) => node
                    .children
                    .entry(text.clone())
                    .or_insert_with(RouteNode::new),
                Segment::Capture {
                    prefix,
                    name,
                    suffix,
                } => {
                    let Some(table) = table else {
                        return Err(RouteError::MissingTemplate(pattern.to_string()));
                    };
                    let Some(field) = table.lookup(name) else {
                        return Err(RouteError::UnknownVariable(name.clone()));
                    };
                    let found = node.matchers.iter().position(|m| {
                        m.prefix == *prefix && m.suffix == *suffix && m.field.kind == field.kind
                    });
                    let index = match found {
                        Some(index) => index,
                        None => {
                            node.matchers.push(PatternMatcher {
                                prefix: prefix.clone(),
                                suffix: suffix.clone(),
                                field,
                                child: RouteNode::new(),
                            });
                            node.matchers.len() - 1
                        }
                    };
                    &mut node.matchers[index].child
                }
            };
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture_fields;
    use crate::routing::pattern;

    #[derive(Debug, Default, Clone)]
    struct Meta {
        x: String,
        y: String,
        count: u8,
    }

    capture_fields!(Meta {
        "x" => x as Str,
        "y" => y as Str,
        "count" => count as U8,
    });

    fn extend(root: &mut RouteNode<&'static str>, pat: &str, table: &FieldTable) {
        let parsed = pattern::parse(pat).unwrap();
        root.extend(&parsed.segments, Some(table), pat).unwrap();
    }

    #[test]
    fn identical_matchers_are_reused() {
        let table = FieldTable::build::<Meta>().unwrap();
        let mut root: RouteNode<&'static str> = RouteNode::new();
        extend(&mut root, "/{x}", &table);
        extend(&mut root, "/{x}/more", &table);
        assert_eq!(root.matchers.len(), 1);
        assert!(root.matchers[0].child.children.contains_key("more"));
    }

    #[test]
    fn same_shape_different_name_shares_a_child() {
        let table = FieldTable::build::<Meta>().unwrap();
        let mut root: RouteNode<&'static str> = RouteNode::new();
        extend(&mut root, "/{x}", &table);
        extend(&mut root, "/{y}/deep", &table);
        // Both are bare string captures, so they collapse into one matcher
        // carrying the first-registered field.
        assert_eq!(root.matchers.len(), 1);
        assert_eq!(root.matchers[0].field.name, "x");
    }

    #[test]
    fn different_kinds_stay_separate() {
        let table = FieldTable::build::<Meta>().unwrap();
        let mut root: RouteNode<&'static str> = RouteNode::new();
        extend(&mut root, "/{x}", &table);
        extend(&mut root, "/{count}", &table);
        assert_eq!(root.matchers.len(), 2);
    }

    #[test]
    fn different_affixes_stay_separate() {
        let table = FieldTable::build::<Meta>().unwrap();
        let mut root: RouteNode<&'static str> = RouteNode::new();
        extend(&mut root, "/v{x}", &table);
        extend(&mut root, "/{x}", &table);
        extend(&mut root, "/{x}.json", &table);
        assert_eq!(root.matchers.len(), 3);
    }

    #[test]
    fn capture_without_table_is_rejected() {
        let mut root: RouteNode<&'static str> = RouteNode::new();
        let parsed = pattern::parse("/{x}").unwrap();
        let err = root.extend(&parsed.segments, None, "/{x}").unwrap_err();
        assert_eq!(err, RouteError::MissingTemplate("/{x}".to_string()));
    }

    #[test]
    fn unknown_variable_is_rejected() {
        let table = FieldTable::build::<Meta>().unwrap();
        let mut root: RouteNode<&'static str> = RouteNode::new();
        let parsed = pattern::parse("/{nope}").unwrap();
        let err = root
            .extend(&parsed.segments, Some(&table), "/{nope}")
            .unwrap_err();
        assert_eq!(err, RouteError::UnknownVariable("nope".to_string()));
    }
}
