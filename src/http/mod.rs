//! HTTP layer: typed method handlers, response shaping, and the mux.
//!
//! The routing core in [`crate::routing`] is transport-agnostic; this module
//! binds it to hyper. [`Mux`] owns a `Router<MethodTable>`, dispatches each
//! request to the handler registered for its method, and encodes every error
//! as an `{"error": message}` JSON body.

pub mod error;
pub mod handler;
pub mod respond;
pub mod server;

pub use error::HttpError;
pub use handler::{
    delete, get, head, options, patch, patch_raw, post, post_raw, put, put_raw, trace,
    BoundMetadata, MethodHandler, MethodTable, RequestBody, RouteRequest,
};
pub use respond::{json_response, Bypass, Respond};
pub use server::{BeforeHook, Mux};
