//! Mock implementations of platform traits for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{ApiError, Result};
use crate::platform::{Clock, Environment, HttpClient, HttpResponse, TokenIssuer};
use crate::token::{IssuedToken, TokenRequest};

/// An outbound request captured by [`MockHttp`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Mock HTTP client with pre-configured responses
pub struct MockHttp {
    responses: Vec<(String, HttpResponse)>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockHttp {
    pub fn new(responses: Vec<(String, HttpResponse)>) -> Self {
        Self {
            responses,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait(?Send)]
impl HttpClient for MockHttp {
    async fn post(&self, url: &str, headers: &[(&str, &str)], body: &[u8]) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.to_vec(),
        });

        for (pattern, response) in &self.responses {
            if url.contains(pattern) {
                return Ok(HttpResponse {
                    status: response.status,
                    body: response.body.clone(),
                });
            }
        }
        Err(ApiError::upstream_error(format!("no mock response for POST {}", url)))
    }
}

/// Mock clock with a fixed timestamp
pub struct MockClock(pub u64);

impl Clock for MockClock {
    fn now_secs(&self) -> u64 {
        self.0
    }
}

/// Mock environment backed by an in-memory HashMap
pub struct MockEnv {
    vars: HashMap<String, String>,
    secrets: HashMap<String, String>,
}

impl MockEnv {
    pub fn new(vars: HashMap<String, String>, secrets: HashMap<String, String>) -> Self {
        Self { vars, secrets }
    }
}

impl Environment for MockEnv {
    fn get_var(&self, name: &str) -> Result<String> {
        self.vars
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::internal(format!("variable '{}' not found", name)))
    }

    fn get_secret(&self, name: &str) -> Result<String> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::internal(format!("secret '{}' not found", name)))
    }
}

/// Mock issuer that records every request it receives
pub struct MockIssuer {
    token: String,
    failure: Mutex<Option<ApiError>>,
    calls: Mutex<Vec<TokenRequest>>,
}

impl MockIssuer {
    /// Issuer that echoes the request back with the given secret
    pub fn succeeding(token: &str) -> Self {
        Self {
            token: token.to_string(),
            failure: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Issuer whose first call fails with the given error
    pub fn failing(error: ApiError) -> Self {
        Self {
            token: String::new(),
            failure: Mutex::new(Some(error)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<TokenRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait(?Send)]
impl TokenIssuer for MockIssuer {
    async fn create_project_access_token(&self, request: &TokenRequest) -> Result<IssuedToken> {
        self.calls.lock().unwrap().push(request.clone());

        if let Some(error) = self.failure.lock().unwrap().take() {
            return Err(error);
        }

        Ok(IssuedToken {
            token: self.token.clone(),
            resource_id: request.resource_id,
            name: request.name.clone(),
            scopes: request.scopes.clone(),
            access_level: request.access_level,
            expires_at: request.expires_at,
        })
    }
}
