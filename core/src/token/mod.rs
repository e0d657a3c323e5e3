//! Project access token module
//!
//! Extraction of inbound fields, policy validation, and token creation.

pub mod create;
mod fields;
mod scope;
mod types;
mod validate;

pub use fields::TokenFields;
pub use scope::{access_level_name, Scope, MAX_TIER, MAX_TIER_WITH_OWNER};
pub use types::{IssuedToken, PolicyLimits, TokenRequest, TokenResponse};
pub use validate::{validate, validate_at, ValidationErrors, Violation, ViolationKind};
