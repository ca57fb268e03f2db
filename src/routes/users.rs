use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{destinations, Principal, RecordOwnership, Role};
use crate::db::users::{self, NewUser};
use crate::errors::{AppError, AppResult};
use crate::jwt::CurrentSession;
use crate::models::user::{valid_users, User, UserCreateRequest, UserUpdateRequest, UserView};
use crate::query::{self, Criteria};
use crate::utils::normalize_email;

/// A not-yet-existing user, judged by the role it would be created with.
struct PendingUser(Role);

impl RecordOwnership for PendingUser {
    fn owning_role(&self) -> Option<Role> {
        Some(self.0)
    }
}

fn view(state: &AppState, actor: &Principal, user: User) -> UserView {
    let actions = state.permissions.action_flags(actor.role, &user);
    UserView { user, actions }
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive text in name or email"),
        ("role" = Option<String>, Query, description = "Role name (ADMIN, AGENT, CLIENT), case-insensitive"),
        ("provider" = Option<String>, Query, description = "Exact identity provider")
    ),
    responses(
        (status = 200, description = "Users with the caller's row actions", body = [UserView]),
        (status = 403, description = "Role may not manage users")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    session: CurrentSession,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Vec<UserView>>> {
    let actor = state.admit(&session, &destinations::user_management())?;

    let all = valid_users(users::list(&state.pool).await?);

    let views = query::filter_owned(all, &Criteria::from_query(params))
        .into_iter()
        .map(|user| view(&state, &actor, user))
        .collect();

    Ok(Json(views))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 200, description = "User detail", body = UserView)),
    security(("bearerAuth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserView>> {
    let actor = state.admit(&session, &destinations::user_management())?;
    let user: User = users::fetch(&state.pool, id).await?.try_into()?;
    Ok(Json(view(&state, &actor, user)))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = UserCreateRequest,
    responses(
        (status = 201, description = "User created", body = UserView),
        (status = 403, description = "Caller may not create a user with this role")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(payload): Json<UserCreateRequest>,
) -> AppResult<(StatusCode, Json<UserView>)> {
    let actor = state.admit(&session, &destinations::user_management())?;

    if !state.permissions.can_mutate(actor.role, Some(&PendingUser(payload.role))) {
        return Err(AppError::forbidden(format!("not allowed to create {} users", payload.role)));
    }
    if payload.name.trim().is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }

    let db_user = users::insert(
        &state.pool,
        NewUser {
            name: payload.name.trim(),
            email: &payload.email,
            password: &payload.password,
            role: payload.role,
            provider: "local",
        },
    )
    .await?;

    let user: User = db_user.try_into()?;
    Ok((StatusCode::CREATED, Json(view(&state, &actor, user))))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UserUpdateRequest,
    responses(
        (status = 200, description = "User updated", body = UserView),
        (status = 403, description = "Caller may not edit this user")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserUpdateRequest>,
) -> AppResult<Json<UserView>> {
    let actor = state.admit(&session, &destinations::user_management())?;
    let mut db_user = users::fetch(&state.pool, id).await?;
    let current: User = db_user.clone().try_into()?;

    if !state.permissions.can_mutate(actor.role, Some(&current)) {
        return Err(AppError::forbidden("not allowed to edit this user"));
    }

    if let Some(role) = payload.role {
        // Promotion is a mutation of a record owned by the target role as well.
        if !state.permissions.can_mutate(actor.role, Some(&PendingUser(role))) {
            return Err(AppError::forbidden(format!("not allowed to assign role {role}")));
        }
        db_user.role = role.to_string();
    }
    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::bad_request("name must not be empty"));
        }
        db_user.name = name.trim().to_string();
    }
    if let Some(email) = payload.email {
        let email = normalize_email(&email)?;
        users::ensure_email_available(&state.pool, &email, Some(db_user.id)).await?;
        db_user.email = email;
    }

    let user: User = users::update(&state.pool, &db_user).await?.try_into()?;
    tracing::info!(user_id = %user.id, actor = %actor.id, "user updated");
    Ok(Json(view(&state, &actor, user)))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "User soft deleted"),
        (status = 403, description = "Caller may not delete this user")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let actor = state.admit(&session, &destinations::user_management())?;
    let user: User = users::fetch(&state.pool, id).await?.try_into()?;

    if user.id == actor.id {
        return Err(AppError::conflict("cannot delete your own account"));
    }
    if !state.permissions.can_delete(actor.role, Some(&user)) {
        return Err(AppError::forbidden("not allowed to delete this user"));
    }

    users::soft_delete(&state.pool, user.id).await?;
    tracing::info!(user_id = %user.id, actor = %actor.id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
