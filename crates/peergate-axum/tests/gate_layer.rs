//! End-to-end tests for the gate layer in front of an axum router

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use peergate_axum::{MaybePeer, PeerGateLayer, RequirePeer};
use peergate_core::{AllowedPeerConfig, CachePolicy, GateError, Peer, PeerAuthenticator};
use tower::ServiceExt;

async fn whoami(peer: RequirePeer) -> String {
    peer.id().to_string()
}

async fn greet(peer: MaybePeer) -> String {
    match peer.0 {
        Some(peer) => format!("hello {}", peer.id()),
        None => "hello stranger".to_string(),
    }
}

fn gate() -> PeerGateLayer {
    let authenticator = PeerAuthenticator::new(
        [Peer::new("foo", "bar"), Peer::new("admin", "s3cret")]
            .into_iter()
            .collect(),
    );
    PeerGateLayer::new(Arc::new(authenticator)).with_realm("internal")
}

fn app(gate: PeerGateLayer) -> Router {
    Router::new()
        .route("/whoami", get(whoami))
        .route("/admin/whoami", get(whoami))
        .layer(gate)
        .route("/greet", get(greet))
}

fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

fn request(uri: &str, authorization: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_missing_credentials_get_challenge() {
    let response = app(gate())
        .oneshot(request("/whoami", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers()[header::WWW_AUTHENTICATE],
        "Basic realm=\"internal\""
    );

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_known_peer_reaches_handler() {
    let response = app(gate())
        .oneshot(request("/whoami", Some(basic("foo", "bar"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "foo");
}

#[tokio::test]
async fn test_wrong_password_is_challenged() {
    let response = app(gate())
        .oneshot(request("/whoami", Some(basic("foo", "baz"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn test_cross_paired_credentials_are_challenged() {
    let response = app(gate())
        .oneshot(request("/whoami", Some(basic("foo", "s3cret"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_basic_scheme_is_challenged() {
    let response = app(gate())
        .oneshot(request("/whoami", Some("Bearer abc.def".to_string())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_authorizer_can_forbid() {
    let gate = gate().with_authorizer(|peer: &Peer, parts: &axum::http::request::Parts| {
        !parts.uri.path().starts_with("/admin") || peer.id() == "admin"
    });

    let response = app(gate.clone())
        .oneshot(request("/admin/whoami", Some(basic("foo", "bar"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));

    let response = app(gate)
        .oneshot(request("/admin/whoami", Some(basic("admin", "s3cret"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "admin");
}

#[tokio::test]
async fn test_routes_outside_the_gate_stay_open() {
    let response = app(gate())
        .oneshot(request("/greet", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "hello stranger");
}

#[tokio::test]
async fn test_require_peer_without_gate_is_unauthenticated() {
    let app = Router::new().route("/whoami", get(whoami));

    let response = app.oneshot(request("/whoami", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));
}

fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../peergate-core")
}

#[tokio::test]
async fn test_from_config_with_static_secrets() {
    let config = AllowedPeerConfig::new()
        .with_realm("fixtures")
        .with_secret_coordinates("mock:/tests/fixtures/fake_allowed_peers.json")
        .with_static_root(fixture_root())
        .with_cache_policy(CachePolicy::new().with_maximum_size(16));

    let gate = PeerGateLayer::from_config(&config, None).await.unwrap();
    assert_eq!(gate.realm(), "fixtures");

    let response = app(gate.clone())
        .oneshot(request("/whoami", Some(basic("mock_user", "some_secret"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "mock_user");

    let response = app(gate)
        .oneshot(request("/whoami", Some(basic("mock_user", "another_secret"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers()[header::WWW_AUTHENTICATE],
        "Basic realm=\"fixtures\""
    );
}

#[tokio::test]
async fn test_from_config_without_backend_rejects_remote_coordinates() {
    let config = AllowedPeerConfig::new().with_secret_coordinates("prod/peers");

    let err = PeerGateLayer::from_config(&config, None).await.err().unwrap();
    assert!(matches!(err, GateError::Configuration(_)));
}
