use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app::AppState;
use crate::authz::{destinations, Principal, Role};
use crate::db::users::{self, NewUser};
use crate::errors::{AppError, AppResult};
use crate::jwt::CurrentSession;
use crate::models::user::{AuthResponse, LoginRequest, RegisterRequest, User};
use crate::utils::verify_password;

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    message: String,
}

/// Self-registration always yields a CLIENT; staff accounts are created through `/users`.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Invalid email or password too short"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    if payload.name.trim().is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }

    let db_user = users::insert(
        &state.pool,
        NewUser {
            name: payload.name.trim(),
            email: &payload.email,
            password: &payload.password,
            role: Role::Client,
            provider: "local",
        },
    )
    .await?;

    let user: User = db_user.try_into()?;
    let token = state.jwt.encode(user.id, user.role)?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let db_user = users::find_by_email(&state.pool, &payload.email)
        .await?
        .ok_or_else(|| AppError::unauthorized("invalid credentials"))?;

    if db_user.provider != "local" {
        return Err(AppError::unauthorized("account uses federated sign-in"));
    }

    let password_ok = verify_password(&payload.password, &db_user.password_hash)?;
    if !password_ok {
        return Err(AppError::unauthorized("invalid credentials"));
    }

    // No valid stored role means no session.
    let user = User::try_from(db_user).map_err(|_| AppError::unauthorized("invalid credentials"))?;
    let token = state.jwt.encode(user.id, user.role)?;
    tracing::info!(user_id = %user.id, role = %user.role, "login");

    Ok(Json(AuthResponse { token, user }))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current principal", body = Principal),
        (status = 401, description = "No session, redirect to login")
    ),
    security(("bearerAuth" = []))
)]
pub async fn me(State(state): State<AppState>, session: CurrentSession) -> AppResult<Json<Principal>> {
    let principal = state.admit(&session, &destinations::account())?;
    Ok(Json(principal))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Logout acknowledged")),
    security(("bearerAuth" = []))
)]
/// Tokens are stateless, so the server keeps nothing to revoke; the client
/// drops its token. Demotions and deletions still apply to live tokens because
/// every request re-reads the stored account.
pub async fn logout() -> AppResult<Json<MessageResponse>> {
    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}
