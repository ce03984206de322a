//! Per-channel authorization replies

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Status reported for a channel the request may not join
pub const FORBIDDEN_STATUS: u16 = 403;

/// Outcome for a single requested channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelAuthorization {
    /// Access granted, with the signer's token and whatever info it attached
    Granted { sign: String, info: Map<String, Value> },
    /// Access denied
    Denied { status: u16 },
}

impl ChannelAuthorization {
    pub fn granted(sign: String, info: Map<String, Value>) -> Self {
        ChannelAuthorization::Granted { sign, info }
    }

    pub fn denied() -> Self {
        ChannelAuthorization::Denied {
            status: FORBIDDEN_STATUS,
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, ChannelAuthorization::Granted { .. })
    }
}

/// Replies keyed by the channel name exactly as the client requested it.
///
/// Serializes as a JSON object. A channel requested twice keeps its first
/// position and the latest reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthResponse {
    entries: Vec<(String, ChannelAuthorization)>,
    index: HashMap<String, usize>,
}

impl AuthResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, channel: String, reply: ChannelAuthorization) {
        match self.index.get(&channel) {
            Some(&position) => self.entries[position].1 = reply,
            None => {
                self.index.insert(channel.clone(), self.entries.len());
                self.entries.push((channel, reply));
            }
        }
    }

    pub fn get(&self, channel: &str) -> Option<&ChannelAuthorization> {
        self.index
            .get(channel)
            .map(|&position| &self.entries[position].1)
    }

    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChannelAuthorization)> {
        self.entries.iter().map(|(name, reply)| (name.as_str(), reply))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AuthResponse {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (channel, reply) in &self.entries {
            map.serialize_entry(channel, reply)?;
        }
        map.end()
    }
}
