//! Error types for the bridge

use crate::bus::BusError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// The request carries no authenticated user
    #[error("unauthorized")]
    Unauthorized,

    /// The bus rejected or failed a broadcast
    #[error("{0}")]
    BroadcastFailed(String),

    /// The connection signer failed
    #[error("connection signing failed: {0}")]
    Signer(#[source] BusError),

    /// A channel policy failed for a reason other than rejecting access
    #[error("channel policy failed: {0}")]
    Policy(String),

    /// The inbound request could not be decoded
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    pub fn status(&self) -> StatusCode {
        match self {
            BridgeError::Unauthorized => StatusCode::UNAUTHORIZED,
            BridgeError::BroadcastFailed(_) => StatusCode::BAD_GATEWAY,
            BridgeError::Signer(_) | BridgeError::Policy(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BridgeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let BridgeError::Unauthorized = self {
            return status.into_response();
        }

        let body = Json(json!({
            "error": {
                "message": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}
