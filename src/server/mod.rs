//! HTTP surface for channel authorization
//!
//! Hosts mount [`auth_router`] next to their own routes, with whatever
//! middleware establishes the user in front of it.

use crate::auth::{AuthBody, AuthorizationRequest, AuthResponse, IdentityProvider};
use crate::broadcaster::ChannelAuthorizer;
use crate::error::{BridgeError, Result};

use axum::{
    extract::{Request, State},
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tracing::debug;

/// Default path of the authorization endpoint
pub const AUTH_PATH: &str = "/broadcasting/auth";

/// Upper bound on an authorization request body
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared state for the authorization handler
#[derive(Clone)]
pub struct AuthState {
    pub authorizer: ChannelAuthorizer,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AuthState {
    pub fn new(authorizer: ChannelAuthorizer, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            authorizer,
            identity,
        }
    }
}

/// Router serving `POST /broadcasting/auth`
pub fn auth_router(state: AuthState) -> Router {
    auth_router_at(AUTH_PATH, state)
}

/// Router serving the authorization endpoint at a custom path
pub fn auth_router_at(path: &str, state: AuthState) -> Router {
    Router::new()
        .route(path, post(auth_handler))
        .with_state(state)
}

async fn auth_handler(
    State(state): State<AuthState>,
    request: Request,
) -> Result<Json<AuthResponse>> {
    let (parts, body) = request.into_parts();

    let Some(user) = state.identity.identify(&parts) else {
        debug!(uri = %parts.uri, "Authorization request without user");
        return Err(BridgeError::Unauthorized);
    };

    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| BridgeError::InvalidRequest(e.to_string()))?;

    let body = parse_body(&bytes)?;
    let request = AuthorizationRequest::from_body(Some(user), body);

    let response = state.authorizer.authenticate(&request).await?;
    Ok(Json(response))
}

/// Decode the JSON body; an empty body means every field takes its default
fn parse_body(bytes: &[u8]) -> Result<AuthBody> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(AuthBody::default());
    }

    serde_json::from_slice(bytes).map_err(|e| BridgeError::InvalidRequest(e.to_string()))
}
