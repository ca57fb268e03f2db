//! Authorization module - roles, sessions, route gate and record permissions
//!
//! This module implements the role-gated access model:
//! - Closed role set (ADMIN, AGENT, CLIENT) with no implied rank
//! - Session holder with synchronous listeners and replay-latest subscriptions
//! - Route gate that fails closed (no session, malformed principal, empty role set)
//! - Per-record edit/delete rules

mod gate;
mod permission;
mod principal;
mod role;
mod session;

pub use gate::{
    AuthorizationGate, Decision, DenyReason, Navigator, RequiredRoleSet, DEFAULT_LOGIN_DESTINATION,
};
pub use permission::{ActionFlags, PermissionEvaluator, RecordOwnership};
pub use principal::Principal;
pub use role::{is_role, Role};
pub use session::SessionHolder;

/// Role sets attached to the service's destinations.
pub mod destinations {
    use super::{RequiredRoleSet, Role};

    pub fn property_catalog() -> RequiredRoleSet {
        RequiredRoleSet::any_authenticated()
    }

    pub fn property_management() -> RequiredRoleSet {
        RequiredRoleSet::of([Role::Admin])
    }

    pub fn user_management() -> RequiredRoleSet {
        RequiredRoleSet::of([Role::Admin, Role::Agent])
    }

    pub fn reports() -> RequiredRoleSet {
        RequiredRoleSet::of([Role::Admin, Role::Agent])
    }

    pub fn account() -> RequiredRoleSet {
        RequiredRoleSet::any_authenticated()
    }
}
