//! Project access token scopes and access level tiers

use std::fmt;
use std::str::FromStr;

/// Scopes a project access token may be granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Api,
    ReadApi,
    ReadRegistry,
    WriteRegistry,
    ReadRepository,
    WriteRepository,
}

impl Scope {
    pub const ALL: [Scope; 6] = [
        Scope::Api,
        Scope::ReadApi,
        Scope::ReadRegistry,
        Scope::WriteRegistry,
        Scope::ReadRepository,
        Scope::WriteRepository,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Api => "api",
            Scope::ReadApi => "read_api",
            Scope::ReadRegistry => "read_registry",
            Scope::WriteRegistry => "write_registry",
            Scope::ReadRepository => "read_repository",
            Scope::WriteRepository => "write_repository",
        }
    }

    /// Comma-separated list of every recognized scope name
    pub fn vocabulary() -> String {
        Self::ALL
            .iter()
            .map(Scope::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| format!("unknown scope '{}'", s))
    }
}

/// Highest tier index without the owner gate (maintainer)
pub const MAX_TIER: i64 = 4;

/// Highest tier index with the owner gate (owner)
pub const MAX_TIER_WITH_OWNER: i64 = 5;

/// Human-readable role for an access level, if it names one
pub fn access_level_name(level: i64) -> Option<&'static str> {
    match level {
        0 => Some("no access"),
        10 => Some("guest"),
        20 => Some("reporter"),
        30 => Some("developer"),
        40 => Some("maintainer"),
        50 => Some("owner"),
        _ => None,
    }
}
