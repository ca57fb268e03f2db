use std::collections::BTreeSet;
use std::sync::OnceLock;

use serde::Serialize;
use utoipa::ToSchema;

use super::role::Role;
use super::session::SessionHolder;
use crate::errors::{AppError, AppResult};

pub const DEFAULT_LOGIN_DESTINATION: &str = "/login";

/// Roles allowed to reach a destination. An empty set admits nobody.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredRoleSet(BTreeSet<Role>);

impl RequiredRoleSet {
    pub fn of(roles: impl IntoIterator<Item = Role>) -> Self {
        Self(roles.into_iter().collect())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Every role, i.e. any principal with a valid role.
    pub fn any_authenticated() -> Self {
        Self::of(Role::ALL)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    Unauthenticated,
    InsufficientRole,
    NoRolesRequired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Decision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
}

impl Decision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            redirect_to: None,
            reason: None,
        }
    }

    pub fn deny(reason: DenyReason, redirect_to: impl Into<String>) -> Self {
        Self {
            allowed: false,
            redirect_to: Some(redirect_to.into()),
            reason: Some(reason),
        }
    }

    /// Turn a deny into the error handlers return; callers stop before rendering.
    pub fn into_result(self) -> AppResult<()> {
        if self.allowed {
            return Ok(());
        }
        Err(AppError::Denied {
            reason: self.reason.unwrap_or(DenyReason::Unauthenticated),
            redirect_to: self
                .redirect_to
                .unwrap_or_else(|| DEFAULT_LOGIN_DESTINATION.to_string()),
        })
    }
}

/// Receives the redirect a denied navigation produces.
pub trait Navigator {
    fn navigate(&self, destination: &str);
}

/// Pre-navigation allow/deny check against the current session.
#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    login_destination: String,
}

impl AuthorizationGate {
    pub fn new(login_destination: impl Into<String>) -> Self {
        Self {
            login_destination: login_destination.into(),
        }
    }

    /// Reads `AUTH_LOGIN_PATH` once; falls back to `/login`.
    pub fn from_env() -> Self {
        static LOGIN: OnceLock<String> = OnceLock::new();
        let login = LOGIN.get_or_init(|| {
            std::env::var("AUTH_LOGIN_PATH")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_LOGIN_DESTINATION.to_string())
        });
        Self::new(login.clone())
    }

    pub fn login_destination(&self) -> &str {
        &self.login_destination
    }

    /// Decide whether the session may reach a destination requiring `required`.
    ///
    /// Evaluated fresh on every call. Insufficient roles are sent to the login
    /// destination as well; there is no separate forbidden page.
    pub fn authorize(&self, session: &SessionHolder, required: &RequiredRoleSet) -> Decision {
        if required.is_empty() {
            tracing::debug!("empty required role set, denying");
            return Decision::deny(DenyReason::NoRolesRequired, &self.login_destination);
        }

        let Some(role) = session.current_role() else {
            tracing::debug!("no session role, denying");
            return Decision::deny(DenyReason::Unauthenticated, &self.login_destination);
        };

        if required.contains(role) {
            tracing::debug!(role = %role, "role admitted");
            Decision::allow()
        } else {
            tracing::debug!(role = %role, required = ?required, "role not admitted");
            Decision::deny(DenyReason::InsufficientRole, &self.login_destination)
        }
    }

    /// Like [`authorize`](Self::authorize), and performs the redirect on deny.
    pub fn guard(
        &self,
        session: &SessionHolder,
        required: &RequiredRoleSet,
        navigator: &dyn Navigator,
    ) -> Decision {
        let decision = self.authorize(session, required);
        if let Some(destination) = decision.redirect_to.as_deref() {
            navigator.navigate(destination);
        }
        decision
    }
}

impl Default for AuthorizationGate {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN_DESTINATION)
    }
}
