//! Channel access policies

use crate::auth::request::{AuthorizationRequest, Identity};
use crate::channels::{ChannelError, ChannelPattern};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The policy refused access outright. Treated as a denial for the channel.
    #[error("access rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The policy itself failed. Aborts the whole authorization request.
    #[error("policy failure: {0}")]
    Failed(String),
}

impl PolicyError {
    pub fn rejected(message: impl Into<String>) -> Self {
        PolicyError::Rejected {
            status: 403,
            message: message.into(),
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, PolicyError::Rejected { .. })
    }
}

/// Application-defined decision on whether a request may join a channel.
///
/// `channel` is always the bare name, with any private marker removed.
#[async_trait]
pub trait ChannelAccessPolicy: Send + Sync {
    async fn can_access(
        &self,
        request: &AuthorizationRequest,
        channel: &str,
    ) -> Result<bool, PolicyError>;
}

/// Adapter turning a synchronous closure into a [`ChannelAccessPolicy`]
pub struct PolicyFn<F>(F);

/// Wrap a closure as a [`ChannelAccessPolicy`]
pub fn policy_fn<F>(f: F) -> PolicyFn<F>
where
    F: Fn(&AuthorizationRequest, &str) -> Result<bool, PolicyError> + Send + Sync,
{
    PolicyFn(f)
}

#[async_trait]
impl<F> ChannelAccessPolicy for PolicyFn<F>
where
    F: Fn(&AuthorizationRequest, &str) -> Result<bool, PolicyError> + Send + Sync,
{
    async fn can_access(
        &self,
        request: &AuthorizationRequest,
        channel: &str,
    ) -> Result<bool, PolicyError> {
        (self.0)(request, channel)
    }
}

/// What a matching rule decides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleVerdict {
    /// Any authenticated user may join
    Allow,
    /// Nobody may join
    Deny,
    /// Only the user whose id equals the wildcard part, e.g. `user.*` and `user.42`
    Owner,
}

impl fmt::Display for RuleVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleVerdict::Allow => write!(f, "allow"),
            RuleVerdict::Deny => write!(f, "deny"),
            RuleVerdict::Owner => write!(f, "owner"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid rule '{0}': expected '<verdict>:<pattern>'")]
    InvalidFormat(String),

    #[error("invalid verdict '{0}': must be allow, deny or owner")]
    InvalidVerdict(String),

    #[error(transparent)]
    Pattern(#[from] ChannelError),
}

/// A single rule: verdict + channel pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRule {
    pub verdict: RuleVerdict,
    pub pattern: ChannelPattern,
}

impl ChannelRule {
    pub fn new(verdict: RuleVerdict, pattern: ChannelPattern) -> Self {
        Self { verdict, pattern }
    }

    /// Decide for the channel, or `None` if the pattern doesn't match
    pub fn evaluate(&self, user: Option<&Identity>, channel: &str) -> Option<bool> {
        let captured = self.pattern.captures(channel)?;

        Some(match self.verdict {
            RuleVerdict::Allow => true,
            RuleVerdict::Deny => false,
            RuleVerdict::Owner => user.is_some_and(|u| !captured.is_empty() && u.id() == captured),
        })
    }
}

impl fmt::Display for ChannelRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.verdict, self.pattern)
    }
}

impl FromStr for ChannelRule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (verdict, pattern) = s
            .split_once(':')
            .ok_or_else(|| RuleError::InvalidFormat(s.to_string()))?;

        let verdict = match verdict.to_lowercase().as_str() {
            "allow" => RuleVerdict::Allow,
            "deny" => RuleVerdict::Deny,
            "owner" => RuleVerdict::Owner,
            other => return Err(RuleError::InvalidVerdict(other.to_string())),
        };

        Ok(Self::new(verdict, ChannelPattern::parse(pattern)?))
    }
}

impl Serialize for ChannelRule {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChannelRule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An ordered rule list; the first matching rule decides, no match denies
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelRules {
    rules: Vec<ChannelRule>,
}

impl ChannelRules {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule
    pub fn add(&mut self, rule: ChannelRule) {
        // Avoid duplicates
        if !self.rules.iter().any(|r| r == &rule) {
            self.rules.push(rule);
        }
    }

    pub fn add_all(&mut self, rules: impl IntoIterator<Item = ChannelRule>) {
        for rule in rules {
            self.add(rule);
        }
    }

    pub fn allow(mut self, pattern: ChannelPattern) -> Self {
        self.add(ChannelRule::new(RuleVerdict::Allow, pattern));
        self
    }

    pub fn deny(mut self, pattern: ChannelPattern) -> Self {
        self.add(ChannelRule::new(RuleVerdict::Deny, pattern));
        self
    }

    pub fn owner(mut self, pattern: ChannelPattern) -> Self {
        self.add(ChannelRule::new(RuleVerdict::Owner, pattern));
        self
    }

    pub fn evaluate(&self, user: Option<&Identity>, channel: &str) -> bool {
        self.rules
            .iter()
            .find_map(|r| r.evaluate(user, channel))
            .unwrap_or(false)
    }

    pub fn rules(&self) -> &[ChannelRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<ChannelRule> for ChannelRules {
    fn from_iter<T: IntoIterator<Item = ChannelRule>>(iter: T) -> Self {
        let mut rules = ChannelRules::new();
        rules.add_all(iter);
        rules
    }
}

#[async_trait]
impl ChannelAccessPolicy for ChannelRules {
    async fn can_access(
        &self,
        request: &AuthorizationRequest,
        channel: &str,
    ) -> Result<bool, PolicyError> {
        Ok(self.evaluate(request.user(), channel))
    }
}
