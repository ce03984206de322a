//! Tests for the HTTP authorization endpoint

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use centrifuge_bridge::auth::{identity_fn, ExtensionIdentity, Identity, IdentityProvider};
use centrifuge_bridge::server::{auth_router, auth_router_at, AuthState, AUTH_PATH};
use centrifuge_bridge::ChannelAuthorizer;
use common::{token_for, ListPolicy, RecordingBus};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Identity from an `x-user` header, standing in for host session middleware
fn header_identity() -> Arc<dyn IdentityProvider> {
    Arc::new(identity_fn(|parts| {
        parts
            .headers
            .get("x-user")
            .and_then(|v| v.to_str().ok())
            .map(Identity::new)
    }))
}

fn app(granted: &[&'static str]) -> (Router, Arc<RecordingBus>, Arc<ListPolicy>) {
    let bus = Arc::new(RecordingBus::new());
    let policy = Arc::new(ListPolicy::granting(granted));
    let authorizer = ChannelAuthorizer::new(bus.clone(), policy.clone());

    (
        auth_router(AuthState::new(authorizer, header_identity())),
        bus,
        policy,
    )
}

fn auth_request(user: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::post(AUTH_PATH).header(header::CONTENT_TYPE, "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user", user);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn json_body(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_auth_grants_and_denies() {
    let (app, _bus, _policy) = app(&["news"]);

    let response = app
        .oneshot(auth_request(
            Some("1"),
            r#"{"client": "abc", "channels": ["news", "$private"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "news": {"sign": token_for("abc"), "info": {}},
            "$private": {"status": 403},
        })
    );
}

#[tokio::test]
async fn test_auth_returns_signer_info() {
    let bus = Arc::new(RecordingBus::signing_with_info("k", json!("v")));
    let policy = Arc::new(ListPolicy::granting(&["news"]));
    let app = auth_router(AuthState::new(
        ChannelAuthorizer::new(bus, policy),
        header_identity(),
    ));

    let response = app
        .oneshot(auth_request(Some("1"), r#"{"client": "abc", "channels": ["news"]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"news": {"sign": token_for("abc"), "info": {"k": "v"}}})
    );
}

#[tokio::test]
async fn test_auth_scalar_channel() {
    let (app, _bus, policy) = app(&["news"]);

    let response = app
        .oneshot(auth_request(Some("1"), r#"{"client": "abc", "channels": "news"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"news": {"sign": token_for("abc"), "info": {}}})
    );
    assert_eq!(policy.seen(), vec!["news".to_string()]);
}

#[tokio::test]
async fn test_auth_defaults_for_missing_fields() {
    let (app, bus, _policy) = app(&[]);

    let response = app.oneshot(auth_request(Some("1"), "")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({}));
    assert_eq!(bus.sign_count(), 0);
}

#[tokio::test]
async fn test_auth_client_defaults_to_empty() {
    let (app, bus, _policy) = app(&["news"]);

    let response = app
        .oneshot(auth_request(Some("1"), r#"{"channels": ["news"]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(*bus.signs.lock().unwrap(), vec![(String::new(), 0)]);
}

#[tokio::test]
async fn test_auth_without_user_is_401_with_empty_body() {
    let (app, bus, policy) = app(&["news"]);

    let response = app
        .oneshot(auth_request(None, r#"{"client": "abc", "channels": ["news"]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_bytes(response).await.is_empty());
    assert_eq!(policy.call_count(), 0);
    assert_eq!(bus.sign_count(), 0);
}

#[tokio::test]
async fn test_auth_malformed_body_is_400() {
    let (app, _bus, _policy) = app(&["news"]);

    let response = app
        .oneshot(auth_request(Some("1"), "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("invalid request"));
}

#[tokio::test]
async fn test_auth_policy_failure_is_500() {
    let (app, _bus, _policy) = app(&["news"]);

    let response = app
        .oneshot(auth_request(Some("1"), r#"{"channels": ["broken"]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({"error": {"message": "channel policy failed: database down"}})
    );
}

#[tokio::test]
async fn test_auth_custom_path_and_extension_identity() {
    let bus = Arc::new(RecordingBus::new());
    let policy = Arc::new(ListPolicy::granting(&["news"]));
    let authorizer = ChannelAuthorizer::new(bus.clone(), policy.clone());
    let app = auth_router_at(
        "/centrifugo/auth",
        AuthState::new(authorizer, Arc::new(ExtensionIdentity)),
    );

    let mut request = Request::post("/centrifugo/auth")
        .body(Body::from(r#"{"client": "xyz", "channels": ["news"]}"#))
        .unwrap();
    request.extensions_mut().insert(Identity::new("9"));

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"news": {"sign": token_for("xyz"), "info": {}}})
    );
}

#[tokio::test]
async fn test_auth_rejects_get() {
    let (app, _bus, _policy) = app(&["news"]);

    let response = app
        .oneshot(Request::get(AUTH_PATH).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
