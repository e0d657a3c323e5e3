//! Platform abstraction traits
//!
//! These traits define the boundary between the platform-agnostic core and
//! the concrete runtime (HTTP server, test harness, ...).

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::token::{IssuedToken, TokenRequest};

/// HTTP client for outbound requests (GitLab API)
#[async_trait(?Send)]
pub trait HttpClient {
    async fn post(&self, url: &str, headers: &[(&str, &str)], body: &[u8]) -> Result<HttpResponse>;
}

/// HTTP response from an outbound request
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Parse body as UTF-8 string
    pub fn text(&self) -> std::result::Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.clone())
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Clock for current time (enables testing with deterministic timestamps)
pub trait Clock {
    fn now_secs(&self) -> u64;
}

/// Environment/secrets access
pub trait Environment {
    fn get_var(&self, name: &str) -> Result<String>;
    fn get_secret(&self, name: &str) -> Result<String>;
}

/// Mints project access tokens on the external service.
///
/// Only ever called with a request that already passed validation.
#[async_trait(?Send)]
pub trait TokenIssuer {
    async fn create_project_access_token(&self, request: &TokenRequest) -> Result<IssuedToken>;
}
