//! Channel authorization
//!
//! - `request`: the inbound request, the identity on it, identity providers
//! - `policy`: application-defined access decisions, rule-based policies
//! - `response`: per-channel replies sent back to the client
//!
//! Rule verdicts:
//! - `allow`: any authenticated user
//! - `deny`: nobody
//! - `owner`: the user whose id equals the wildcard part of the channel

mod policy;
mod request;
mod response;

pub use policy::{
    policy_fn, ChannelAccessPolicy, ChannelRule, ChannelRules, PolicyError, PolicyFn, RuleError,
    RuleVerdict,
};
pub use request::{
    identity_fn, AuthBody, AuthorizationRequest, ExtensionIdentity, Identity, IdentityFn,
    IdentityProvider,
};
pub use response::{AuthResponse, ChannelAuthorization, FORBIDDEN_STATUS};
