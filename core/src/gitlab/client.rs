//! GitLab project access token client

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::platform::{HttpClient, TokenIssuer};
use crate::token::{IssuedToken, TokenRequest};

const USER_AGENT: &str = "gitlab-pat";

/// Issues project access tokens against one GitLab instance
pub struct GitLabClient<'a> {
    base_url: String,
    token: String,
    http: &'a dyn HttpClient,
}

/// Body of `POST /projects/:id/access_tokens`
#[derive(Serialize)]
struct CreateTokenBody<'a> {
    name: &'a str,
    scopes: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    access_level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<String>,
}

/// Project access token as returned by GitLab
#[derive(Deserialize)]
struct ProjectAccessToken {
    #[allow(dead_code)]
    id: u64,
    name: String,
    scopes: Vec<String>,
    #[serde(default)]
    access_level: i64,
    #[serde(default)]
    expires_at: Option<String>,
    token: String,
}

impl<'a> GitLabClient<'a> {
    pub fn new(base_url: &str, token: &str, http: &'a dyn HttpClient) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            http,
        }
    }

    fn access_tokens_url(&self, project_id: i64) -> String {
        format!("{}/api/v4/projects/{}/access_tokens", self.base_url, project_id)
    }
}

#[async_trait(?Send)]
impl TokenIssuer for GitLabClient<'_> {
    async fn create_project_access_token(&self, request: &TokenRequest) -> Result<IssuedToken> {
        // Zero leaves the access level to GitLab's default.
        let body = CreateTokenBody {
            name: &request.name,
            scopes: &request.scopes,
            access_level: Some(request.access_level).filter(|level| *level != 0),
            expires_at: request
                .expires_at
                .map(|at| at.format("%Y-%m-%d").to_string()),
        };
        let body_bytes = serde_json::to_vec(&body)
            .map_err(|e| ApiError::internal(format!("failed to encode request: {}", e)))?;

        let url = self.access_tokens_url(request.resource_id);
        let headers = [
            ("PRIVATE-TOKEN", self.token.as_str()),
            ("Content-Type", "application/json"),
            ("Accept", "application/json"),
            ("User-Agent", USER_AGENT),
        ];

        let response = self
            .http
            .post(&url, &headers, &body_bytes)
            .await
            .map_err(|e| ApiError::upstream_error(format!("failed to call GitLab API: {}", e)))?;

        match response.status {
            200 | 201 => {}
            401 => return Err(ApiError::invalid_token("GitLab rejected the configured API token")),
            403 => {
                return Err(ApiError::permission_denied(format!(
                    "not allowed to create access tokens for project {}",
                    request.resource_id
                )))
            }
            404 => {
                return Err(ApiError::not_found(format!(
                    "project {} not found",
                    request.resource_id
                )))
            }
            status => {
                let error_body = response.text().unwrap_or_else(|_| "unknown error".to_string());
                return Err(ApiError::upstream_error(format!(
                    "GitLab API error ({}): {}",
                    status, error_body
                )));
            }
        }

        let created: ProjectAccessToken = response
            .json()
            .map_err(|e| ApiError::upstream_error(format!("failed to parse response: {}", e)))?;

        let expires_at = created
            .expires_at
            .as_deref()
            .map(parse_gitlab_date)
            .transpose()?;

        Ok(IssuedToken {
            token: created.token,
            resource_id: request.resource_id,
            name: created.name,
            scopes: created.scopes,
            access_level: created.access_level,
            expires_at,
        })
    }
}

/// Parse a GitLab expiry, either a bare date or an RFC 3339 timestamp
fn parse_gitlab_date(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::upstream_error(format!("invalid expires_at in response: '{}'", raw)))
}
