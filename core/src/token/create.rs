//! Project access token creation
//!
//! Loads backend configuration, extracts and validates the request, and
//! only then calls the issuer.

use tracing::{debug, warn};

use super::fields::TokenFields;
use super::scope::access_level_name;
use super::types::{PolicyLimits, TokenRequest, TokenResponse};
use super::validate::validate;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::gitlab::GitLabClient;
use crate::platform::{Clock, Environment, HttpClient, TokenIssuer};

/// Handle a token creation request
pub async fn handle(
    fields: TokenFields,
    env: &dyn Environment,
    http: &dyn HttpClient,
    clock: &dyn Clock,
) -> Result<TokenResponse> {
    let config = Config::from_env(env)?;

    let request = TokenRequest::from_fields(fields);

    let client = GitLabClient::new(&config.base_url, &config.token, http);
    issue(&request, &config.policy_limits(), &client, clock).await
}

/// Validate a request and, if it passes, mint the token
pub async fn issue(
    request: &TokenRequest,
    limits: &PolicyLimits,
    issuer: &dyn TokenIssuer,
    clock: &dyn Clock,
) -> Result<TokenResponse> {
    if let Err(errors) = validate(request, limits, clock) {
        warn!(
            id = request.resource_id,
            violations = errors.len(),
            "rejected token request"
        );
        return Err(ApiError::ValidationFailed(errors));
    }

    debug!(
        id = request.resource_id,
        name = %request.name,
        scopes = ?request.scopes,
        access_level = request.access_level,
        role = access_level_name(request.access_level).unwrap_or("unknown"),
        "generating access token"
    );

    let issued = issuer
        .create_project_access_token(request)
        .await
        .map_err(|e| match e {
            ApiError::UpstreamError { message } => {
                ApiError::upstream_error(format!("failed to create a token - {}", message))
            }
            other => other,
        })?;

    Ok(issued.into())
}
