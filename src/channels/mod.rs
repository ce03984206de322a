//! Channel naming and pattern matching
//!
//! Channels are plain strings as the bus sees them: `news`, `chat:lobby`,
//! `orders.42`. A leading `$` marks a private channel:
//! - `$orders.42` is authorized against the bare name `orders.42`
//! - the reply to the client is still keyed by `$orders.42`
//!
//! Patterns may end with a single `*` wildcard:
//! - `orders.*` matches `orders.42`, `orders.42.items`
//! - `chat:*` matches `chat:lobby`
//! - `*` matches everything

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Marker prefix for private channels
pub const PRIVATE_PREFIX: char = '$';

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel pattern cannot be empty")]
    Empty,

    #[error("wildcard '*' can only appear at the end of a pattern")]
    WildcardNotAtEnd,
}

/// Strip a single leading private marker, if present
pub fn bare_name(channel: &str) -> &str {
    channel.strip_prefix(PRIVATE_PREFIX).unwrap_or(channel)
}

/// Check whether the channel carries the private marker
pub fn is_private(channel: &str) -> bool {
    channel.starts_with(PRIVATE_PREFIX)
}

/// Channels as they arrive on the wire: a single name or a list of names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelList {
    One(String),
    Many(Vec<String>),
}

impl ChannelList {
    /// Normalize into an ordered list of names
    pub fn into_vec(self) -> Vec<String> {
        match self {
            ChannelList::One(name) => vec![name],
            ChannelList::Many(names) => names,
        }
    }
}

impl Default for ChannelList {
    fn default() -> Self {
        ChannelList::Many(Vec::new())
    }
}

impl From<ChannelList> for Vec<String> {
    fn from(list: ChannelList) -> Self {
        list.into_vec()
    }
}

/// Maps application channel names onto the bus's channel names.
///
/// Implementations must be injective: two different application channels
/// never share a wire name.
pub trait ChannelFormatter: Send + Sync {
    fn format(&self, channel: &str) -> String;

    fn format_all(&self, channels: &[String]) -> Vec<String> {
        channels.iter().map(|c| self.format(c)).collect()
    }
}

/// Passes channel names through unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainChannels;

impl ChannelFormatter for PlainChannels {
    fn format(&self, channel: &str) -> String {
        channel.to_string()
    }
}

/// Prepends a fixed namespace, e.g. `app:` turns `news` into `app:news`
#[derive(Debug, Clone)]
pub struct PrefixedChannels {
    prefix: String,
}

impl PrefixedChannels {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl ChannelFormatter for PrefixedChannels {
    fn format(&self, channel: &str) -> String {
        format!("{}{}", self.prefix, channel)
    }
}

/// A channel pattern that may include a trailing wildcard
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelPattern {
    /// The prefix before the wildcard (or full name if no wildcard)
    prefix: String,
    /// Whether this pattern ends with a wildcard
    is_wildcard: bool,
}

impl ChannelPattern {
    /// Parse a channel pattern (may end with `*`)
    pub fn parse(pattern: &str) -> Result<Self, ChannelError> {
        if pattern.is_empty() {
            return Err(ChannelError::Empty);
        }

        let (prefix, is_wildcard) = match pattern.strip_suffix('*') {
            Some(prefix) => (prefix, true),
            None => (pattern, false),
        };

        if prefix.contains('*') {
            return Err(ChannelError::WildcardNotAtEnd);
        }

        Ok(Self {
            prefix: prefix.to_string(),
            is_wildcard,
        })
    }

    /// Check if this pattern matches a (bare) channel name
    pub fn matches(&self, channel: &str) -> bool {
        self.captures(channel).is_some()
    }

    /// Match the channel and return the part covered by the wildcard.
    ///
    /// Exact patterns capture the empty string. A wildcard never matches an
    /// empty remainder: `orders.*` does not match `orders.`.
    pub fn captures<'a>(&self, channel: &'a str) -> Option<&'a str> {
        if self.is_wildcard {
            channel
                .strip_prefix(self.prefix.as_str())
                .filter(|rest| !rest.is_empty())
        } else if channel == self.prefix {
            Some("")
        } else {
            None
        }
    }

    /// Get the prefix (without wildcard)
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Check if this is a wildcard pattern
    pub fn is_wildcard(&self) -> bool {
        self.is_wildcard
    }
}

impl fmt::Display for ChannelPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_wildcard {
            write!(f, "{}*", self.prefix)
        } else {
            write!(f, "{}", self.prefix)
        }
    }
}
