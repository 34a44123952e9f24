//! Typed per-method handlers.
//!
//! # Responsibilities
//! - Wrap user handler functions into type-erased async handlers
//! - Decode request bodies (JSON or raw bytes) before the handler runs
//! - Downcast bound route metadata to the handler's concrete type
//!
//! # Design Decisions
//! - GET/HEAD/DELETE/OPTIONS/TRACE take no body; POST/PUT/PATCH decode
//!   JSON, with `_raw` variants for untouched bytes
//! - A metadata type mismatch between route and handler is a configuration
//!   bug surfaced as a 500, never a panic

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, Request, Response};
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use serde::de::DeserializeOwned;

use crate::http::error::HttpError;
use crate::http::respond::Respond;
use crate::metadata::Metadata;

/// Type-erased request body. The server boxes hyper's `Incoming` into this;
/// tests can box any in-memory body the same way.
pub type RequestBody = BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

/// A metadata instance bound for one request, type-erased.
pub type BoundMetadata = Box<dyn Any + Send>;

type HandlerFuture = Pin<Box<dyn Future<Output = Result<Response<Full<Bytes>>, HttpError>> + Send>>;
type HandlerFn = Arc<dyn Fn(Request<RequestBody>, Option<BoundMetadata>) -> HandlerFuture + Send + Sync>;

/// Per-request view passed to typed handlers.
pub struct RouteRequest<B, M> {
    /// Decoded request body (`()` for bodyless methods).
    pub body: B,

    /// This request's clone of the route metadata, captures applied.
    pub metadata: M,

    /// Request head: method, URI, headers, extensions.
    pub parts: http::request::Parts,
}

/// Handles one HTTP method on a route.
///
/// Built by the method constructors ([`get`], [`post`], ...); attach
/// opaque data for the pre-dispatch hook with [`MethodHandler::with_data`].
#[derive(Clone)]
pub struct MethodHandler {
    method: Method,
    handler: HandlerFn,
    data: Option<Arc<dyn Any + Send + Sync>>,
}

impl MethodHandler {
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Attach opaque per-handler data, passed to the mux's before hook.
    pub fn with_data<D: Any + Send + Sync>(mut self, data: D) -> Self {
        self.data = Some(Arc::new(data));
        self
    }

    pub(crate) fn data(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.data.as_deref()
    }

    pub(crate) fn call(
        &self,
        request: Request<RequestBody>,
        metadata: Option<BoundMetadata>,
    ) -> HandlerFuture {
        (self.handler)(request, metadata)
    }
}

impl std::fmt::Debug for MethodHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodHandler")
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// Method dispatch table attached to a terminal route node.
///
/// Registering two handlers for the same method keeps the later one.
pub struct MethodTable {
    handlers: HashMap<Method, MethodHandler>,
}

impl MethodTable {
    pub(crate) fn from_handlers(handlers: impl IntoIterator<Item = MethodHandler>) -> Self {
        let mut table = HashMap::new();
        for handler in handlers {
            table.insert(handler.method.clone(), handler);
        }
        MethodTable { handlers: table }
    }

    pub fn get(&self, method: &Method) -> Option<&MethodHandler> {
        self.handlers.get(method)
    }

    /// Method names in sorted order, for diagnostics.
    pub fn methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = self.handlers.keys().map(|m| m.to_string()).collect();
        methods.sort();
        methods
    }
}

fn typed_metadata<M: Metadata>(metadata: Option<BoundMetadata>) -> Result<M, HttpError> {
    match metadata {
        None => Ok(M::default()),
        Some(boxed) => boxed.downcast::<M>().map(|m| *m).map_err(|_| {
            tracing::error!("handler metadata type does not match route template");
            HttpError::internal()
        }),
    }
}

async fn collect_body(body: RequestBody) -> Result<Bytes, HttpError> {
    body.collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(|err| HttpError::bad_request(format!("failed to read request body: {err}")))
}

fn bodyless<M, F, Fut, R>(method: Method, f: F) -> MethodHandler
where
    M: Metadata,
    F: Fn(RouteRequest<(), M>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, HttpError>> + Send + 'static,
    R: Respond + 'static,
{
    let f = Arc::new(f);
    let handler: HandlerFn = Arc::new(move |request, metadata| {
        let f = f.clone();
        Box::pin(async move {
            let (parts, _body) = request.into_parts();
            let metadata = typed_metadata::<M>(metadata)?;
            let reply = f(RouteRequest {
                body: (),
                metadata,
                parts,
            })
            .await?;
            reply.respond()
        })
    });
    MethodHandler {
        method,
        handler,
        data: None,
    }
}

fn json_body<B, M, F, Fut, R>(method: Method, f: F) -> MethodHandler
where
    B: DeserializeOwned + Send + 'static,
    M: Metadata,
    F: Fn(RouteRequest<B, M>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, HttpError>> + Send + 'static,
    R: Respond + 'static,
{
    let f = Arc::new(f);
    let handler: HandlerFn = Arc::new(move |request, metadata| {
        let f = f.clone();
        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let bytes = collect_body(body).await?;
            let body: B = serde_json::from_slice(&bytes)
                .map_err(|err| HttpError::bad_request(format!("json decoding failed: {err}")))?;
            let metadata = typed_metadata::<M>(metadata)?;
            let reply = f(RouteRequest {
                body,
                metadata,
                parts,
            })
            .await?;
            reply.respond()
        })
    });
    MethodHandler {
        method,
        handler,
        data: None,
    }
}

fn raw_body<M, F, Fut, R>(method: Method, f: F) -> MethodHandler
where
    M: Metadata,
    F: Fn(RouteRequest<Bytes, M>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, HttpError>> + Send + 'static,
    R: Respond + 'static,
{
    let f = Arc::new(f);
    let handler: HandlerFn = Arc::new(move |request, metadata| {
        let f = f.clone();
        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let bytes = collect_body(body).await?;
            let metadata = typed_metadata::<M>(metadata)?;
            let reply = f(RouteRequest {
                body: bytes,
                metadata,
                parts,
            })
            .await?;
            reply.respond()
        })
    });
    MethodHandler {
        method,
        handler,
        data: None,
    }
}

macro_rules! bodyless_constructor {
    ($(#[$doc:meta])* $name:ident, $method:ident) => {
        $(#[$doc])*
        pub fn $name<M, F, Fut, R>(f: F) -> MethodHandler
        where
            M: Metadata,
            F: Fn(RouteRequest<(), M>) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = Result<R, HttpError>> + Send + 'static,
            R: Respond + 'static,
        {
            bodyless(Method::$method, f)
        }
    };
}

bodyless_constructor!(
    /// Handle GET requests.
    get, GET
);
bodyless_constructor!(
    /// Handle HEAD requests.
    head, HEAD
);
bodyless_constructor!(
    /// Handle DELETE requests.
    delete, DELETE
);
bodyless_constructor!(
    /// Handle OPTIONS requests.
    options, OPTIONS
);
bodyless_constructor!(
    /// Handle TRACE requests.
    trace, TRACE
);

macro_rules! json_constructor {
    ($(#[$doc:meta])* $name:ident, $method:ident) => {
        $(#[$doc])*
        pub fn $name<B, M, F, Fut, R>(f: F) -> MethodHandler
        where
            B: DeserializeOwned + Send + 'static,
            M: Metadata,
            F: Fn(RouteRequest<B, M>) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = Result<R, HttpError>> + Send + 'static,
            R: Respond + 'static,
        {
            json_body(Method::$method, f)
        }
    };
}

json_constructor!(
    /// Handle POST requests, decoding the body as JSON.
    post, POST
);
json_constructor!(
    /// Handle PUT requests, decoding the body as JSON.
    put, PUT
);
json_constructor!(
    /// Handle PATCH requests, decoding the body as JSON.
    patch, PATCH
);

macro_rules! raw_constructor {
    ($(#[$doc:meta])* $name:ident, $method:ident) => {
        $(#[$doc])*
        pub fn $name<M, F, Fut, R>(f: F) -> MethodHandler
        where
            M: Metadata,
            F: Fn(RouteRequest<Bytes, M>) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = Result<R, HttpError>> + Send + 'static,
            R: Respond + 'static,
        {
            raw_body(Method::$method, f)
        }
    };
}

raw_constructor!(
    /// Handle POST requests, passing the body through as raw bytes.
    post_raw, POST
);
raw_constructor!(
    /// Handle PUT requests, passing the body through as raw bytes.
    put_raw, PUT
);
raw_constructor!(
    /// Handle PATCH requests, passing the body through as raw bytes.
    patch_raw, PATCH
);
