use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::role::Role;

/// Principal represents the authenticated actor held by a session.
///
/// `role` is `None` when the stored role is missing or unrecognised. Such a
/// principal is treated exactly like an absent session by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    pub id: Uuid,
    pub role: Option<Role>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl Principal {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            role: None,
            name: String::new(),
            email: String::new(),
        }
    }

    /// Build a principal from a raw role value as stored, never failing.
    pub fn from_raw_role(id: Uuid, raw_role: Option<&str>) -> Self {
        let role = raw_role.and_then(Role::parse);
        if role.is_none() {
            tracing::warn!(principal_id = %id, raw_role = ?raw_role, "principal has no valid role");
        }
        Self {
            role,
            ..Self::new(id)
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }
}
