//! Token request, policy, and issuance types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A request to mint one project access token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRequest {
    /// Project the token is scoped to
    pub resource_id: i64,

    /// Token name shown in GitLab
    pub name: String,

    /// Requested scopes (unchecked until validation)
    pub scopes: Vec<String>,

    /// Access level tier, a multiple of 10
    pub access_level: i64,

    /// Absolute expiry; `None` uses the service default lifetime
    pub expires_at: Option<DateTime<Utc>>,
}

/// Limits applied to every token request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyLimits {
    /// Maximum lifetime; zero means no ceiling
    pub max_ttl: Duration,

    /// Raises the highest permitted tier from maintainer (40) to owner (50)
    pub allow_owner_level: bool,
}

/// A token returned by the issuer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub resource_id: i64,
    pub name: String,
    pub scopes: Vec<String>,
    pub access_level: i64,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Token creation response body
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub id: i64,
    pub name: String,
    pub scopes: Vec<String>,
    pub access_level: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            id: issued.resource_id,
            name: issued.name,
            scopes: issued.scopes,
            access_level: issued.access_level,
            expires_at: issued.expires_at,
        }
    }
}
