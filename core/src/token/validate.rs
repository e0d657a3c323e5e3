//! Token request validation against policy limits
//!
//! Every check runs on every call. Failures are collected into a
//! [`ValidationErrors`] so the caller sees all of them at once.

use chrono::{DateTime, Utc};
use std::fmt;

use super::scope::{Scope, MAX_TIER, MAX_TIER_WITH_OWNER};
use super::types::{PolicyLimits, TokenRequest};
use crate::platform::Clock;

/// Category of a single validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    InvalidId,
    EmptyName,
    EmptyScopes,
    InvalidScopes,
    InvalidAccessLevel,
    ExpiryExceedsMaxTtl,
}

/// One failed check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Ordered collection of violations from one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    pub fn kinds(&self) -> Vec<ViolationKind> {
        self.violations.iter().map(|v| v.kind).collect()
    }

    /// `Ok` when nothing was collected
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

/// Validate a request against policy limits at the current time
pub fn validate(
    request: &TokenRequest,
    limits: &PolicyLimits,
    clock: &dyn Clock,
) -> Result<(), ValidationErrors> {
    let now = i64::try_from(clock.now_secs())
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    validate_at(request, limits, now)
}

/// Validate a request against policy limits given a specific "now"
pub fn validate_at(
    request: &TokenRequest,
    limits: &PolicyLimits,
    now: DateTime<Utc>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    check_resource_id(request, &mut errors);
    check_name(request, &mut errors);
    check_scopes(request, &mut errors);
    check_access_level(request, limits.allow_owner_level, &mut errors);
    check_expiry(request, limits, now, &mut errors);

    errors.into_result()
}

fn check_resource_id(request: &TokenRequest, errors: &mut ValidationErrors) {
    if request.resource_id <= 0 {
        errors.push(Violation::new(
            ViolationKind::InvalidId,
            "id is empty or invalid",
        ));
    }
}

fn check_name(request: &TokenRequest, errors: &mut ValidationErrors) {
    if request.name.is_empty() {
        errors.push(Violation::new(ViolationKind::EmptyName, "name is empty"));
    }
}

// The per-name check is skipped for an empty list, so at most one scope
// violation is reported per pass.
fn check_scopes(request: &TokenRequest, errors: &mut ValidationErrors) {
    if request.scopes.is_empty() {
        errors.push(Violation::new(
            ViolationKind::EmptyScopes,
            "scopes are empty",
        ));
        return;
    }

    let unknown: Vec<&str> = request
        .scopes
        .iter()
        .map(String::as_str)
        .filter(|s| s.parse::<Scope>().is_err())
        .collect();

    if !unknown.is_empty() {
        errors.push(Violation::new(
            ViolationKind::InvalidScopes,
            format!(
                "scopes are not valid: [{}], valid scopes are: [{}]",
                unknown.join(", "),
                Scope::vocabulary()
            ),
        ));
    }
}

// Allowed values: 0, 10, 20, 30, 40, and 50 when the owner tier is allowed.
fn check_access_level(request: &TokenRequest, allow_owner_level: bool, errors: &mut ValidationErrors) {
    let max_tier = if allow_owner_level {
        MAX_TIER_WITH_OWNER
    } else {
        MAX_TIER
    };

    let level = request.access_level;
    let tier = level / 10;
    if level < 0 || tier > max_tier || level % 10 != 0 {
        errors.push(Violation::new(
            ViolationKind::InvalidAccessLevel,
            "invalid access level",
        ));
    }
}

fn check_expiry(
    request: &TokenRequest,
    limits: &PolicyLimits,
    now: DateTime<Utc>,
    errors: &mut ValidationErrors,
) {
    let Some(expires_at) = request.expires_at else {
        return;
    };
    if limits.max_ttl.is_zero() {
        return;
    }

    // A ceiling past the representable range cannot be exceeded.
    let Some(max_expires_at) = chrono::Duration::from_std(limits.max_ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
    else {
        return;
    };

    if expires_at > max_expires_at {
        errors.push(Violation::new(
            ViolationKind::ExpiryExceedsMaxTtl,
            format!(
                "requested expires_at '{}' exceeds configured maximum ttl of '{}'s, expires at or before '{}'",
                expires_at,
                limits.max_ttl.as_secs(),
                max_expires_at
            ),
        ));
    }
}
