use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;

/// Closed set of platform roles.
///
/// Roles carry no rank. Whether a role may do something is decided by explicit
/// rules in [`super::gate`] and [`super::permission`], never by comparing roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Agent,
    Client,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Agent, Role::Client];

    /// Parse a stored or user-supplied role name.
    ///
    /// Only the three canonical names are accepted (ASCII case-insensitive,
    /// surrounding whitespace ignored). Anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(value))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Agent => "AGENT",
            Role::Client => "CLIENT",
        }
    }
}

/// True when `value` names one of the platform roles.
pub fn is_role(value: &str) -> bool {
    Role::parse(value).is_some()
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| AppError::bad_request(format!("unknown role: {s}")))
    }
}
