use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{Principal, Role, SessionHolder};
use crate::db;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: Arc<Vec<u8>>,
    pub exp_hours: i64,
}

impl JwtConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let secret = std::env::var("JWT_SECRET").map_err(|_| AppError::configuration("JWT_SECRET not set"))?;
        let exp_hours = std::env::var("JWT_EXP_HOURS")
            .map(|val| val.parse::<i64>())
            .unwrap_or(Ok(24))
            .map_err(|_| AppError::configuration("JWT_EXP_HOURS must be a valid integer"))?;

        Ok(Self::new(secret, exp_hours))
    }

    pub fn new(secret: impl Into<String>, exp_hours: i64) -> Self {
        Self {
            secret: Arc::new(secret.into().into_bytes()),
            exp_hours,
        }
    }

    pub fn encode(&self, user_id: Uuid, role: Role) -> Result<String, AppError> {
        use chrono::{Duration, Utc};

        let now = Utc::now();
        let exp = now + Duration::hours(self.exp_hours);

        let claims = Claims {
            sub: user_id,
            role: Some(role.to_string()),
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(&self.secret))
            .map_err(|err| AppError::token(err.to_string()))
    }

    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map(|data| data.claims)
            .map_err(|err| AppError::token(err.to_string()))
    }
}

/// Token claims. `role` is informational for clients; the stored role is authoritative.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

/// Resolves the principal behind a verified token subject.
#[async_trait]
pub trait PrincipalSource: Send + Sync {
    async fn principal(&self, user_id: Uuid) -> AppResult<Option<Principal>>;
}

/// Looks principals up in the users table so role changes apply immediately.
#[derive(Debug, Clone)]
pub struct SqlitePrincipalSource {
    pool: SqlitePool,
}

impl SqlitePrincipalSource {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalSource for SqlitePrincipalSource {
    async fn principal(&self, user_id: Uuid) -> AppResult<Option<Principal>> {
        let user = db::users::find_by_id(&self.pool, user_id).await?;
        Ok(user.map(|u| u.to_principal()))
    }
}

/// Per-request session seeded from the bearer token.
///
/// Never rejects: a missing, invalid or orphaned token leaves the session empty
/// and the authorization gate turns that into a redirect.
#[derive(Debug)]
pub struct CurrentSession(pub SessionHolder);

impl std::ops::Deref for CurrentSession {
    type Target = SessionHolder;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = SessionHolder::new();

        let Some(token) = bearer_token(parts) else {
            return Ok(Self(session));
        };

        let claims = match state.jwt.decode(token) {
            Ok(claims) => claims,
            Err(err) => {
                tracing::debug!(error = %err, "ignoring invalid bearer token");
                return Ok(Self(session));
            }
        };

        if let Some(principal) = state.principals.principal(claims.sub).await? {
            session.set_principal(principal);
        }

        Ok(Self(session))
    }
}
