//! Trie-based HTTP request router with typed path-variable capture.
//!
//! Route patterns are absolute paths whose segments are either literals or
//! single-variable captures like `{id}`, optionally wrapped in a literal
//! prefix and suffix (`/files/doc-{id}.txt`). Captured text parses into a
//! declared field of a caller-supplied metadata struct; a parse failure
//! disqualifies that branch instead of producing a type error downstream.
//! Literal segments always win over captures, and a pattern registered with
//! a trailing slash serves as a fallback for everything below it.
//!
//! [`routing::Router`] is the transport-agnostic core; [`http::Mux`] binds
//! it to hyper with per-method typed handlers.
//!
//! ```
//! use pathmux::capture_fields;
//! use pathmux::http::{get, Bypass, Mux, RouteRequest};
//!
//! #[derive(Debug, Default, Clone)]
//! struct UserMeta {
//!     id: u64,
//! }
//!
//! capture_fields!(UserMeta {
//!     "id" => id as U64,
//! });
//!
//! let mux = Mux::new();
//! mux.handle(
//!     "/users/{id}",
//!     UserMeta::default(),
//!     [get(|req: RouteRequest<(), UserMeta>| async move {
//!         Ok(Bypass(req.metadata.id))
//!     })],
//! )?;
//! # Ok::<(), pathmux::routing::RouteError>(())
//! ```

pub mod http;
pub mod metadata;
pub mod routing;

pub use http::Mux;
pub use metadata::{FieldKind, FieldValue, Metadata};
pub use routing::{RouteError, Router};
