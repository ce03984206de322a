//! Channel authorization and event broadcasting

use crate::auth::{
    AuthResponse, AuthorizationRequest, ChannelAccessPolicy, ChannelAuthorization, PolicyError,
};
use crate::bus::{MessageBusClient, ANONYMOUS_USER_ID};
use crate::channels::{bare_name, ChannelFormatter, PlainChannels};
use crate::error::{BridgeError, Result};

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Key under which the event name travels in every broadcast payload
pub const EVENT_KEY: &str = "event";

/// Authorizes channel subscriptions and publishes events to the bus
#[derive(Clone)]
pub struct ChannelAuthorizer {
    bus: Arc<dyn MessageBusClient>,
    policy: Arc<dyn ChannelAccessPolicy>,
    formatter: Arc<dyn ChannelFormatter>,
}

impl ChannelAuthorizer {
    pub fn new(bus: Arc<dyn MessageBusClient>, policy: Arc<dyn ChannelAccessPolicy>) -> Self {
        Self {
            bus,
            policy,
            formatter: Arc::new(PlainChannels),
        }
    }

    /// Map channel names onto the bus's names when publishing
    pub fn with_formatter(mut self, formatter: Arc<dyn ChannelFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Answer a subscription request with one reply per requested channel.
    ///
    /// Fails with [`BridgeError::Unauthorized`] before touching the policy or
    /// the signer when the request carries no user.
    pub async fn authenticate(&self, request: &AuthorizationRequest) -> Result<AuthResponse> {
        if !request.is_authenticated() {
            return Err(BridgeError::Unauthorized);
        }

        let mut response = AuthResponse::new();

        for channel in request.channels() {
            let granted = self.can_access(request, channel).await?;
            let reply = self.reply_for_client(granted, request.client()).await?;

            debug!(
                channel = %channel,
                client = request.client(),
                granted = granted,
                "Channel authorization decided"
            );

            response.insert(channel.clone(), reply);
        }

        Ok(response)
    }

    /// Broadcast `event` with `payload` to every channel in one bus call.
    pub async fn publish(
        &self,
        channels: &[String],
        event: &str,
        payload: Option<Map<String, Value>>,
    ) -> Result<()> {
        let mut payload = payload.unwrap_or_default();
        payload.insert(EVENT_KEY.to_string(), Value::String(event.to_string()));

        let wire_channels = self.formatter.format_all(channels);

        let outcome = match self.bus.broadcast(&wire_channels, &payload).await {
            Ok(reply) => broadcast_error(&reply),
            Err(e) => Some(e.to_string()),
        };

        match outcome {
            None => {
                info!(event = event, channel_count = wire_channels.len(), "Event broadcast");
                Ok(())
            }
            Some(message) => {
                warn!(event = event, error = %message, "Broadcast failed");
                Err(BridgeError::BroadcastFailed(message))
            }
        }
    }

    async fn can_access(&self, request: &AuthorizationRequest, channel: &str) -> Result<bool> {
        match self.policy.can_access(request, bare_name(channel)).await {
            Ok(granted) => Ok(granted),
            Err(PolicyError::Rejected { status, message }) => {
                debug!(
                    channel = %channel,
                    status = status,
                    reason = %message,
                    "Channel policy rejected access"
                );
                Ok(false)
            }
            Err(PolicyError::Failed(message)) => Err(BridgeError::Policy(message)),
        }
    }

    async fn reply_for_client(&self, granted: bool, client: &str) -> Result<ChannelAuthorization> {
        if !granted {
            return Ok(ChannelAuthorization::denied());
        }

        let mut info = Map::new();
        let sign = self
            .bus
            .sign_connection(client, ANONYMOUS_USER_ID, &mut info)
            .await
            .map_err(BridgeError::Signer)?;

        Ok(ChannelAuthorization::granted(sign, info))
    }
}

/// Extract a failure message from a broadcast reply, `None` on success
fn broadcast_error(reply: &Value) -> Option<String> {
    let Value::Object(fields) = reply else {
        return Some(format!("unexpected broadcast reply: {}", reply));
    };

    // A null error field means no error
    let error = fields.get("error").filter(|e| !e.is_null())?;

    Some(match error {
        Value::String(message) => message.clone(),
        Value::Object(detail) => match detail.get("message") {
            Some(Value::String(message)) => message.clone(),
            _ => error.to_string(),
        },
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_broadcast_error_success() {
        assert_eq!(broadcast_error(&json!({"ok": true})), None);
        assert_eq!(broadcast_error(&json!({})), None);
        assert_eq!(broadcast_error(&json!({"result": {"responses": []}})), None);
        assert_eq!(broadcast_error(&json!({"error": null})), None);
    }

    #[test]
    fn test_broadcast_error_messages() {
        assert_eq!(broadcast_error(&json!({"error": "boom"})), Some("boom".to_string()));
        assert_eq!(
            broadcast_error(&json!({"error": {"code": 102, "message": "unknown channel"}})),
            Some("unknown channel".to_string())
        );
        assert_eq!(
            broadcast_error(&json!({"error": {"code": 102}})),
            Some(r#"{"code":102}"#.to_string())
        );
        assert_eq!(broadcast_error(&json!({"error": 500})), Some("500".to_string()));
    }

    #[test]
    fn test_broadcast_error_not_an_object() {
        assert_eq!(
            broadcast_error(&json!(true)),
            Some("unexpected broadcast reply: true".to_string())
        );
        assert_eq!(
            broadcast_error(&Value::Null),
            Some("unexpected broadcast reply: null".to_string())
        );
    }
}
