//! gitlab-pat-core: Platform-agnostic core for GitLab project access tokens
//!
//! This crate turns untrusted token requests into validated, policy-compliant
//! token specifications and mints them through GitLab. It depends only on
//! abstract platform traits (HttpClient, Clock, Environment, TokenIssuer) and
//! never imports platform-specific code.

pub mod config;
pub mod error;
pub mod gitlab;
pub mod platform;
pub mod token;

#[cfg(test)]
pub mod test_support;
