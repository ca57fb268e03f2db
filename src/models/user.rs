use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::authz::{ActionFlags, Principal, RecordOwnership, Role};
use crate::errors::AppError;
use crate::query::{FieldFilter, FieldValue, Filterable};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub provider: String,
    pub provider_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecordOwnership for User {
    fn owning_role(&self) -> Option<Role> {
        Some(self.role)
    }
}

const USER_FILTERS: &[FieldFilter] = &[
    FieldFilter::Search {
        key: "search",
        fields: &["name", "email"],
    },
    FieldFilter::Role {
        key: "role",
        field: "role",
    },
    FieldFilter::Exact {
        key: "provider",
        field: "provider",
    },
];

impl Filterable for User {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "name" => FieldValue::Text(&self.name),
            "email" => FieldValue::Text(&self.email),
            "role" => FieldValue::Text(self.role.as_str()),
            "provider" => FieldValue::Text(&self.provider),
            _ => FieldValue::Missing,
        }
    }

    fn filter_schema() -> &'static [FieldFilter] {
        USER_FILTERS
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub provider: String,
    pub provider_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl DbUser {
    /// Session principal for this row; an unknown stored role yields a roleless principal.
    pub fn to_principal(&self) -> Principal {
        Principal::from_raw_role(self.id, Some(self.role.as_str()))
            .with_name(self.name.clone())
            .with_email(self.email.clone())
    }
}

impl TryFrom<DbUser> for User {
    type Error = AppError;

    fn try_from(value: DbUser) -> Result<Self, Self::Error> {
        let Some(role) = Role::parse(&value.role) else {
            tracing::warn!(user_id = %value.id, role = %value.role, "stored user has an unknown role");
            return Err(AppError::internal("stored user record is invalid"));
        };

        Ok(User {
            id: value.id,
            name: value.name,
            email: value.email,
            role,
            provider: value.provider,
            provider_id: value.provider_id,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

/// Rows that convert cleanly; an unknown stored role drops the row instead of failing the listing.
pub fn valid_users(rows: Vec<DbUser>) -> Vec<User> {
    rows.into_iter().filter_map(|row| User::try_from(row).ok()).collect()
}

/// A user row as listed to staff, with the actions the caller may take on it.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserView {
    #[serde(flatten)]
    pub user: User,
    pub actions: ActionFlags,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "Laura Gómez")]
    pub name: String,
    #[schema(example = "laura@example.com")]
    pub email: String,
    #[schema(example = "S3cureP@ssw0rd")]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "laura@example.com")]
    pub email: String,
    #[schema(example = "S3cureP@ssw0rd")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserCreateRequest {
    #[schema(example = "Carlos Ruiz")]
    pub name: String,
    #[schema(example = "carlos@example.com")]
    pub email: String,
    #[schema(example = "S3cureP@ssw0rd")]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}
