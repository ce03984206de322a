//! Centrifuge bridge - channel authorization and event broadcasting for Centrifugo
//!
//! Answers client subscription requests with per-channel connection tokens,
//! deciding access through application-defined policies, and publishes
//! application events to the pub/sub server's channels.

pub mod auth;
pub mod broadcaster;
pub mod bus;
pub mod channels;
pub mod error;
pub mod server;

pub use auth::{AuthResponse, AuthorizationRequest, ChannelAccessPolicy, Identity, PolicyError};
pub use broadcaster::ChannelAuthorizer;
pub use bus::{BusError, CentrifugoClient, CentrifugoConfig, ConnectionSigner, MessageBusClient};
pub use error::BridgeError;
