//! Message bus collaborators
//!
//! The bridge talks to the pub/sub server through [`MessageBusClient`]. The
//! concrete [`CentrifugoClient`] speaks the Centrifugo server HTTP API and
//! hands token signing to an injected [`ConnectionSigner`].

mod centrifugo;
mod config;

pub use centrifugo::CentrifugoClient;
pub use config::{CentrifugoConfig, ConfigError};

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// User id handed to the signer for every connection token
pub const ANONYMOUS_USER_ID: u64 = 0;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no connection signer configured")]
    SignerUnavailable,

    #[error("signing failed: {0}")]
    Signer(String),
}

/// Interface to the external pub/sub server
#[async_trait]
pub trait MessageBusClient: Send + Sync {
    /// Publish one payload to several channels.
    ///
    /// The reply reports failure through an `error` field; `Err` is reserved
    /// for faults that kept the call from completing.
    async fn broadcast(
        &self,
        channels: &[String],
        payload: &Map<String, Value>,
    ) -> Result<Value, BusError>;

    /// Produce a connection token. The signer may add entries to `info`,
    /// which are returned to the client alongside the token.
    async fn sign_connection(
        &self,
        client_id: &str,
        user_id: u64,
        info: &mut Map<String, Value>,
    ) -> Result<String, BusError>;
}

/// Issues connection tokens. The signing scheme belongs to the host.
#[async_trait]
pub trait ConnectionSigner: Send + Sync {
    async fn sign(
        &self,
        client_id: &str,
        user_id: u64,
        info: &mut Map<String, Value>,
    ) -> Result<String, BusError>;
}
