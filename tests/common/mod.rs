//! Shared fakes for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use centrifuge_bridge::auth::{AuthorizationRequest, ChannelAccessPolicy, PolicyError};
use centrifuge_bridge::bus::{BusError, MessageBusClient};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A bus that records every call and replies with canned answers
pub struct RecordingBus {
    pub broadcasts: Mutex<Vec<(Vec<String>, Map<String, Value>)>>,
    pub signs: Mutex<Vec<(String, u64)>>,
    reply: Mutex<Option<Value>>,
    fail_signing: bool,
    sign_info: Map<String, Value>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self {
            broadcasts: Mutex::new(Vec::new()),
            signs: Mutex::new(Vec::new()),
            reply: Mutex::new(Some(json!({"ok": true}))),
            fail_signing: false,
            sign_info: Map::new(),
        }
    }

    /// Reply to broadcasts with `reply`
    pub fn replying(reply: Value) -> Self {
        let bus = Self::new();
        *bus.reply.lock().unwrap() = Some(reply);
        bus
    }

    /// Fail broadcasts at the transport level
    pub fn unreachable() -> Self {
        let bus = Self::new();
        *bus.reply.lock().unwrap() = None;
        bus
    }

    pub fn failing_signer() -> Self {
        Self {
            fail_signing: true,
            ..Self::new()
        }
    }

    /// Have the signer attach `key: value` to every granted channel's info
    pub fn signing_with_info(key: &str, value: Value) -> Self {
        let mut bus = Self::new();
        bus.sign_info.insert(key.to_string(), value);
        bus
    }

    pub fn sign_count(&self) -> usize {
        self.signs.lock().unwrap().len()
    }
}

/// Deterministic token for a client
pub fn token_for(client_id: &str) -> String {
    format!("token-{}", client_id)
}

#[async_trait]
impl MessageBusClient for RecordingBus {
    async fn broadcast(
        &self,
        channels: &[String],
        payload: &Map<String, Value>,
    ) -> Result<Value, BusError> {
        self.broadcasts
            .lock()
            .unwrap()
            .push((channels.to_vec(), payload.clone()));

        let reply = self.reply.lock().unwrap().clone();
        match reply {
            Some(reply) => Ok(reply),
            None => Err(BusError::Status {
                status: 503,
                body: "unavailable".to_string(),
            }),
        }
    }

    async fn sign_connection(
        &self,
        client_id: &str,
        user_id: u64,
        info: &mut Map<String, Value>,
    ) -> Result<String, BusError> {
        if self.fail_signing {
            return Err(BusError::Signer("key missing".to_string()));
        }

        self.signs
            .lock()
            .unwrap()
            .push((client_id.to_string(), user_id));
        info.extend(self.sign_info.clone());
        Ok(token_for(client_id))
    }
}

/// Policy granting a fixed set of bare names, rejecting `rejected`, failing on `broken`
pub struct ListPolicy {
    pub granted: Vec<&'static str>,
    pub calls: Mutex<Vec<String>>,
    pub count: AtomicUsize,
}

impl ListPolicy {
    pub fn granting(granted: &[&'static str]) -> Self {
        Self {
            granted: granted.to_vec(),
            calls: Mutex::new(Vec::new()),
            count: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelAccessPolicy for ListPolicy {
    async fn can_access(
        &self,
        _request: &AuthorizationRequest,
        channel: &str,
    ) -> Result<bool, PolicyError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(channel.to_string());

        match channel {
            "rejected" => Err(PolicyError::rejected("not a member")),
            "broken" => Err(PolicyError::Failed("database down".to_string())),
            other => Ok(self.granted.iter().any(|g| *g == other)),
        }
    }
}
