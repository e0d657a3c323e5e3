//! GitLab API module
//!
//! Issues project access tokens through the GitLab REST API.

mod client;

pub use client::GitLabClient;
