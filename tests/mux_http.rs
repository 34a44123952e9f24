//! End-to-end tests: a real listener, hyper serving, reqwest on the wire.

use std::sync::Arc;

use pathmux::capture_fields;
use pathmux::http::{get, post, Bypass, HttpError, Mux, RouteRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Bind an ephemeral port, serve `mux` on it, return the base URL.
async fn start(mux: Mux) -> String {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(Arc::new(mux).serve(listener));
    format!("http://{addr}")
}

#[derive(Debug, Default, Clone)]
struct FileMeta {
    id: u32,
    owner: String,
}

capture_fields!(FileMeta {
    "id" => id as U32,
    "owner" => owner as Str,
});

#[derive(Debug, Default, Clone)]
struct ByteMeta {
    n: u8,
}

capture_fields!(ByteMeta {
    "n" => n as U8,
});

#[tokio::test]
async fn captures_with_prefix_and_suffix() {
    let mux = Mux::new();
    mux.handle(
        "/files/{owner}/doc-{id}.txt",
        FileMeta::default(),
        [get(|req: RouteRequest<(), FileMeta>| async move {
            Ok(json!({"owner": req.metadata.owner, "id": req.metadata.id}))
        })],
    )
    .unwrap();
    let base = start(mux).await;

    let body: serde_json::Value = reqwest::get(format!("{base}/files/alice/doc-42.txt"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"owner": "alice", "id": 42}));

    // Affixes are part of the match, not decoration.
    let response = reqwest::get(format!("{base}/files/alice/doc-42.pdf"))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn capture_respects_the_field_width() {
    let mux = Mux::new();
    mux.handle(
        "/bytes/{n}",
        ByteMeta::default(),
        [get(|req: RouteRequest<(), ByteMeta>| async move {
            Ok(Bypass(req.metadata.n))
        })],
    )
    .unwrap();
    let base = start(mux).await;

    let response = reqwest::get(format!("{base}/bytes/255")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "255");

    // 256 does not fit in a u8, so the route does not match at all.
    let response = reqwest::get(format!("{base}/bytes/256")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn json_round_trip_on_the_wire() {
    #[derive(Serialize, Deserialize, Clone)]
    struct Order {
        sku: String,
        quantity: u32,
    }

    let mux = Mux::new();
    mux.handle_static(
        "/orders",
        [post(|req: RouteRequest<Order, ()>| async move {
            if req.body.quantity == 0 {
                return Err(HttpError::bad_request("quantity must be positive"));
            }
            Ok(Bypass(req.body))
        })],
    )
    .unwrap();
    let base = start(mux).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/orders"))
        .json(&json!({"sku": "A-1", "quantity": 3}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"sku": "A-1", "quantity": 3}));

    let response = client
        .post(format!("{base}/orders"))
        .json(&json!({"sku": "A-1", "quantity": 0}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "quantity must be positive"}));

    let response = client
        .post(format!("{base}/orders"))
        .body("{broken")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_routes_and_methods() {
    let mux = Mux::new();
    mux.handle_static(
        "/ping",
        [get(|_req: RouteRequest<(), ()>| async move { Ok(Bypass("pong")) })],
    )
    .unwrap();
    let base = start(mux).await;
    let client = reqwest::Client::new();

    let response = reqwest::get(format!("{base}/pong")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "Not Found"}));

    let response = client
        .delete(format!("{base}/ping"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn directory_route_catches_deeper_paths() {
    let mux = Mux::new();
    mux.handle_static(
        "/static/",
        [get(|req: RouteRequest<(), ()>| async move {
            Ok(Bypass(req.parts.uri.path().to_string()))
        })],
    )
    .unwrap();
    let base = start(mux).await;

    let response = reqwest::get(format!("{base}/static/css/site.css"))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), r#""/static/css/site.css""#);
}

#[tokio::test]
async fn literal_segments_beat_captures() {
    let mux = Mux::new();
    mux.handle(
        "/users/{id}",
        FileMeta::default(),
        [get(|req: RouteRequest<(), FileMeta>| async move {
            Ok(Bypass(format!("user {}", req.metadata.id)))
        })],
    )
    .unwrap();
    mux.handle_static(
        "/users/me",
        [get(|_req: RouteRequest<(), ()>| async move { Ok(Bypass("self")) })],
    )
    .unwrap();
    let base = start(mux).await;

    let response = reqwest::get(format!("{base}/users/me")).await.unwrap();
    assert_eq!(response.text().await.unwrap(), r#""self""#);
    let response = reqwest::get(format!("{base}/users/7")).await.unwrap();
    assert_eq!(response.text().await.unwrap(), r#""user 7""#);
}

#[tokio::test]
async fn before_hook_gates_requests() {
    let mut mux = Mux::new();
    mux.set_before(|request, _metadata, _data| {
        match request.headers().get("x-api-key") {
            Some(key) if key == "letmein" => Ok(()),
            _ => Err(HttpError::new(
                http::StatusCode::UNAUTHORIZED,
                "missing or bad api key",
            )),
        }
    });
    mux.handle_static(
        "/admin",
        [get(|_req: RouteRequest<(), ()>| async move { Ok(Bypass("ok")) })],
    )
    .unwrap();
    let base = start(mux).await;
    let client = reqwest::Client::new();

    let response = client.get(format!("{base}/admin")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    let response = client
        .get(format!("{base}/admin"))
        .header("x-api-key", "letmein")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}
