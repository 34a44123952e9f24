//! Request multiplexer and hyper server adapter.
//!
//! # Responsibilities
//! - Own the routing trie and dispatch requests to method handlers
//! - Bind route metadata per request before the handler runs
//! - Run the pre-dispatch hook (authorization-style checks)
//! - Serve connections with hyper (HTTP/1 and HTTP/2)
//!
//! # Design Decisions
//! - Matching and binding happen under one read guard; only owned data
//!   (cloned handler, bound metadata box) crosses the lock boundary
//! - 404 and 405 are expected outcomes encoded as JSON error bodies, not
//!   internal failures
//! - Cancellation and timeouts belong to the host server, not the mux

use std::any::Any;
use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Request, Response};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use tokio::net::TcpListener;
use uuid::Uuid;

use crate::http::error::HttpError;
use crate::http::handler::{BoundMetadata, MethodHandler, MethodTable, RequestBody};
use crate::http::respond::error_response;
use crate::metadata::Metadata;
use crate::routing::{MatchOutcome, RouteError, Router};

/// Pre-dispatch hook, run after metadata binding and before the handler.
///
/// Receives the request, the bound metadata (mutable, so the hook can
/// enrich it), and the matched handler's opaque data. An `Err` short-
/// circuits dispatch with that error's status.
pub type BeforeHook = Arc<
    dyn Fn(
            &Request<RequestBody>,
            Option<&mut (dyn Any + Send)>,
            Option<&(dyn Any + Send + Sync)>,
        ) -> Result<(), HttpError>
        + Send
        + Sync,
>;

/// Request multiplexer: routes inbound request paths to registered
/// per-method handlers.
///
/// Registration happens at configuration time; a `Mux` wrapped in an `Arc`
/// is then shared across connection tasks.
pub struct Mux {
    router: Router<MethodTable>,
    before: Option<BeforeHook>,
    default_content_type: Option<HeaderValue>,
}

enum Decision {
    NotFound,
    MethodNotAllowed,
    Run {
        handler: MethodHandler,
        metadata: Option<BoundMetadata>,
    },
}

impl Mux {
    pub fn new() -> Self {
        Mux {
            router: Router::new(),
            before: None,
            default_content_type: None,
        }
    }

    /// Register a route whose captures bind into clones of `template`.
    pub fn handle<M: Metadata>(
        &self,
        pattern: &str,
        template: M,
        handlers: impl IntoIterator<Item = MethodHandler>,
    ) -> Result<(), RouteError> {
        self.router
            .register(pattern, template, MethodTable::from_handlers(handlers))
    }

    /// Register a route with no metadata template (no capture segments).
    pub fn handle_static(
        &self,
        pattern: &str,
        handlers: impl IntoIterator<Item = MethodHandler>,
    ) -> Result<(), RouteError> {
        self.router
            .register_static(pattern, MethodTable::from_handlers(handlers))
    }

    /// Install the pre-dispatch hook.
    pub fn set_before<F>(&mut self, hook: F)
    where
        F: Fn(
                &Request<RequestBody>,
                Option<&mut (dyn Any + Send)>,
                Option<&(dyn Any + Send + Sync)>,
            ) -> Result<(), HttpError>
            + Send
            + Sync
            + 'static,
    {
        self.before = Some(Arc::new(hook));
    }

    /// Content type applied to responses that do not set one.
    pub fn set_default_content_type(&mut self, content_type: &'static str) {
        self.default_content_type = Some(HeaderValue::from_static(content_type));
    }

    /// Indented listing of the registered route tree, for diagnostics.
    pub fn routes(&self) -> String {
        self.router.render(MethodTable::methods)
    }

    /// Dispatch one request: match, bind metadata, run the hook, invoke
    /// the handler, encode errors.
    pub async fn dispatch(&self, request: Request<RequestBody>) -> Response<Full<Bytes>> {
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let request_id = Uuid::new_v4();
        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            "dispatching request"
        );

        let decision = self.router.match_path(&path, |outcome| {
            let matched = match outcome {
                MatchOutcome::Exact(matched) => matched,
                MatchOutcome::Fallback(matched) => matched,
                MatchOutcome::Miss => return Decision::NotFound,
            };
            let Some(handler) = matched.node.handlers().and_then(|table| table.get(&method))
            else {
                return Decision::MethodNotAllowed;
            };
            let metadata = matched
                .node
                .template()
                .map(|template| template.bind(matched.patches));
            Decision::Run {
                handler: handler.clone(),
                metadata,
            }
        });

        let (handler, mut metadata) = match decision {
            Decision::NotFound => {
                tracing::debug!(request_id = %request_id, path = %path, "no route matched");
                return error_response(&HttpError::not_found());
            }
            Decision::MethodNotAllowed => {
                return error_response(&HttpError::method_not_allowed());
            }
            Decision::Run { handler, metadata } => (handler, metadata),
        };

        if let Some(before) = &self.before {
            if let Err(err) = before(&request, metadata.as_deref_mut(), handler.data()) {
                return error_response(&err);
            }
        }

        let mut response = match handler.call(request, metadata).await {
            Ok(response) => response,
            Err(err) => {
                if err.status().is_server_error() {
                    tracing::error!(
                        request_id = %request_id,
                        path = %path,
                        error = %err,
                        "handler failed"
                    );
                }
                error_response(&err)
            }
        };
        if let Some(content_type) = &self.default_content_type {
            response
                .headers_mut()
                .entry(CONTENT_TYPE)
                .or_insert_with(|| content_type.clone());
        }
        response
    }

    /// Accept connections and serve each with hyper's auto (HTTP/1+2)
    /// builder, one task per connection.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "mux server starting");

        loop {
            let (stream, peer) = listener.accept().await?;
            let conn_mux = self.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |request: Request<Incoming>| {
                    let mux = conn_mux.clone();
                    async move {
                        let request = request.map(|body| {
                            body.map_err(|err| {
                                Box::new(err) as Box<dyn std::error::Error + Send + Sync>
                            })
                            .boxed()
                        });
                        Ok::<_, Infallible>(mux.dispatch(request).await)
                    }
                });
                if let Err(err) = auto::Builder::new(TokioExecutor::new())
                    .serve_connection(io, service)
                    .await
                {
                    tracing::debug!(peer = %peer, error = %err, "connection closed with error");
                }
            });
        }
    }
}

impl Default for Mux {
    fn default() -> Self {
        Self::new()
    }
}
