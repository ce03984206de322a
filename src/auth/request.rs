//! Authorization requests and the identities attached to them

use crate::channels::ChannelList;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An authenticated user as seen by the host application.
///
/// The bridge never interprets it beyond handing it to channel policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    id: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    attributes: Map<String, Value>,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Map::new(),
        }
    }

    /// Attach a free-form attribute (role, team, ...) for policies to inspect
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

/// Body of a channel authorization request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthBody {
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub channels: Option<ChannelList>,
}

/// A client's request to subscribe to one or more channels
#[derive(Debug, Clone, Default)]
pub struct AuthorizationRequest {
    user: Option<Identity>,
    client: String,
    channels: Vec<String>,
}

impl AuthorizationRequest {
    pub fn new(user: Option<Identity>) -> Self {
        Self {
            user,
            client: String::new(),
            channels: Vec::new(),
        }
    }

    /// Build from a decoded body, applying the defaults for absent fields
    pub fn from_body(user: Option<Identity>, body: AuthBody) -> Self {
        Self {
            user,
            client: body.client.unwrap_or_default(),
            channels: body.channels.unwrap_or_default().into_vec(),
        }
    }

    pub fn with_client(mut self, client: impl Into<String>) -> Self {
        self.client = client.into();
        self
    }

    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = channels.into_iter().map(Into::into).collect();
        self
    }

    pub fn user(&self) -> Option<&Identity> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn client(&self) -> &str {
        &self.client
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }
}

/// Resolves the authenticated user of an inbound HTTP request
pub trait IdentityProvider: Send + Sync {
    fn identify(&self, parts: &Parts) -> Option<Identity>;
}

/// Reads an [`Identity`] that host middleware stored in the request extensions
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionIdentity;

impl IdentityProvider for ExtensionIdentity {
    fn identify(&self, parts: &Parts) -> Option<Identity> {
        parts.extensions.get::<Identity>().cloned()
    }
}

/// Adapter turning a closure into an [`IdentityProvider`]
pub struct IdentityFn<F>(F);

/// Wrap a closure as an [`IdentityProvider`]
pub fn identity_fn<F>(f: F) -> IdentityFn<F>
where
    F: Fn(&Parts) -> Option<Identity> + Send + Sync,
{
    IdentityFn(f)
}

impl<F> IdentityProvider for IdentityFn<F>
where
    F: Fn(&Parts) -> Option<Identity> + Send + Sync,
{
    fn identify(&self, parts: &Parts) -> Option<Identity> {
        (self.0)(parts)
    }
}
