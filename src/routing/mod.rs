//! The routing core: trie registration and path matching.
//!
//! # Responsibilities
//! - Compile route patterns into the trie (configuration time)
//! - Resolve request paths against it (request time)
//! - Cache one descriptor table per distinct metadata type
//!
//! # Design Decisions
//! - One `RwLock` guards the trie and the descriptor registry together;
//!   registration takes the write guard, every match traversal holds one
//!   read guard for the entire recursive walk
//! - `match_path` hands the outcome to a caller closure under the guard,
//!   so borrowed nodes never outlive it
//! - The core is generic over the handler payload `H`; method dispatch
//!   lives in the `http` layer

pub mod engine;
pub mod error;
pub mod pattern;
pub mod render;
pub mod trie;

use std::any::TypeId;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::metadata::schema::{FieldTable, Metadata};
use crate::metadata::template::MetadataTemplate;

pub use engine::{MatchOutcome, Matched};
pub use error::RouteError;
pub use pattern::{ParsedPattern, Segment};
pub use trie::RouteNode;

/// Shared-state router: a trie of routes plus the per-type descriptor
/// registry, behind a single reader-writer lock.
pub struct Router<H> {
    state: RwLock<RouterState<H>>,
}

struct RouterState<H> {
    root: RouteNode<H>,

    /// Descriptor tables, built once per distinct metadata type. Owned by
    /// the router and guarded by the registration lock.
    tables: HashMap<TypeId, Arc<FieldTable>>,
}

impl<H> Router<H> {
    pub fn new() -> Self {
        Router {
            state: RwLock::new(RouterState {
                root: RouteNode::new(),
                tables: HashMap::new(),
            }),
        }
    }

    /// Register a route whose captures bind into clones of `template`.
    ///
    /// The template instance is snapshotted as the prototype for every
    /// request matching this route. Re-registering an exact path replaces
    /// the previous handler set and template (logged as a warning).
    pub fn register<M: Metadata>(
        &self,
        pattern: &str,
        template: M,
        handlers: H,
    ) -> Result<(), RouteError> {
        let parsed = pattern::parse(pattern)?;
        let mut state = self.state.write();
        let table = state.table_for::<M>()?;
        let node = state
            .root
            .extend(&parsed.segments, Some(table.as_ref()), pattern)?;
        if node.handlers.is_some() {
            tracing::warn!(pattern, "route re-registered, replacing handlers");
        }
        node.directory = parsed.directory;
        node.handlers = Some(handlers);
        node.template = Some(MetadataTemplate::new(template));
        node.pattern = Some(Arc::from(pattern));
        Ok(())
    }

    /// Register a route with no metadata template.
    ///
    /// Patterns with capture segments are rejected: a capture needs a
    /// template to bind into.
    pub fn register_static(&self, pattern: &str, handlers: H) -> Result<(), RouteError> {
        let parsed = pattern::parse(pattern)?;
        let mut state = self.state.write();
        let node = state.root.extend(&parsed.segments, None, pattern)?;
        if node.handlers.is_some() {
            tracing::warn!(pattern, "route re-registered, replacing handlers");
        }
        node.directory = parsed.directory;
        node.handlers = Some(handlers);
        node.template = None;
        node.pattern = Some(Arc::from(pattern));
        Ok(())
    }

    /// Resolve a request path and hand the outcome to `f`.
    ///
    /// The closure runs under one read guard held for the entire walk, so a
    /// concurrent registration can never interleave partway through it.
    /// Request segmentation keeps empty segments: "/" is one empty segment
    /// and "/a/" is `["a", ""]`.
    pub fn match_path<R>(&self, path: &str, f: impl FnOnce(MatchOutcome<'_, H>) -> R) -> R {
        let state = self.state.read();
        let outcome = match path.strip_prefix('/') {
            Some(rest) => {
                let segments: Vec<&str> = rest.split('/').collect();
                engine::resolve(&state.root, &segments)
            }
            None => MatchOutcome::Miss,
        };
        f(outcome)
    }

    /// Enumerate the route tree for diagnostics, under a read guard.
    ///
    /// `describe` labels a node's handler payload (e.g. its method names).
    pub fn render(&self, describe: impl Fn(&H) -> Vec<String>) -> String {
        let state = self.state.read();
        let mut out = String::new();
        render::render_node(&state.root, "", &describe, &mut out);
        out
    }
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> RouterState<H> {
    fn table_for<M: Metadata>(&mut self) -> Result<Arc<FieldTable>, RouteError> {
        match self.tables.entry(TypeId::of::<M>()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let table = Arc::new(FieldTable::build::<M>()?);
                Ok(entry.insert(table).clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture_fields;
    use crate::metadata::FieldValue;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Meta {
        id: u64,
    }

    capture_fields!(Meta {
        "id" => id as U64,
    });

    #[test]
    fn reregistration_replaces_handlers_and_template() {
        let router: Router<&'static str> = Router::new();
        router
            .register("/users/{id}", Meta { id: 1 }, "first")
            .unwrap();
        router
            .register("/users/{id}", Meta { id: 2 }, "second")
            .unwrap();

        router.match_path("/users/0", |outcome| match outcome {
            MatchOutcome::Exact(m) => {
                assert_eq!(m.node.handlers(), Some(&"second"));
                let bound = m.node.template().unwrap().bind(m.patches);
                // Uncaptured defaults come from the latest template...
                let meta = bound.downcast::<Meta>().unwrap();
                // ...but the capture overwrote it.
                assert_eq!(meta.id, 0);
            }
            _ => panic!("expected exact match"),
        });
    }

    #[test]
    fn descriptor_tables_are_cached_per_type() {
        let router: Router<u32> = Router::new();
        router.register("/a/{id}", Meta::default(), 1).unwrap();
        router.register("/b/{id}", Meta::default(), 2).unwrap();
        let state = router.state.read();
        assert_eq!(state.tables.len(), 1);
    }

    #[test]
    fn registration_errors_propagate() {
        let router: Router<u32> = Router::new();
        assert_eq!(
            router.register("no-slash", Meta::default(), 0),
            Err(RouteError::MissingLeadingSlash("no-slash".to_string()))
        );
        assert_eq!(
            router.register_static("/{id}", 0),
            Err(RouteError::MissingTemplate("/{id}".to_string()))
        );
        assert_eq!(
            router.register("/x/{name}", Meta::default(), 0),
            Err(RouteError::UnknownVariable("name".to_string()))
        );
    }

    #[test]
    fn match_and_bind_end_to_end() {
        let router: Router<&'static str> = Router::new();
        router
            .register("/users/{id}", Meta::default(), "user")
            .unwrap();
        let meta = router.match_path("/users/42", |outcome| match outcome {
            MatchOutcome::Exact(m) => m
                .node
                .template()
                .unwrap()
                .bind(m.patches)
                .downcast::<Meta>()
                .map(|b| *b)
                .unwrap(),
            _ => panic!("expected exact match"),
        });
        assert_eq!(meta, Meta { id: 42 });
        // Sanity check of the raw patch too.
        router.match_path("/users/42", |outcome| {
            if let MatchOutcome::Exact(m) = outcome {
                assert_eq!(m.patches[0].value, FieldValue::U64(42));
            }
        });
    }
}
