use sqlx::SqlitePool;
use uuid::Uuid;

use crate::authz::Role;
use crate::errors::{AppError, AppResult};
use crate::models::user::DbUser;
use crate::utils::{hash_password, normalize_email, utc_now};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, provider, provider_id, created_at, updated_at, deleted_at";

pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
    pub provider: &'a str,
}

pub async fn find_by_id(pool: &SqlitePool, user_id: Uuid) -> AppResult<Option<DbUser>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ? AND deleted_at IS NULL");
    Ok(sqlx::query_as::<_, DbUser>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await?)
}

pub async fn fetch(pool: &SqlitePool, user_id: Uuid) -> AppResult<DbUser> {
    find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> AppResult<Option<DbUser>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ? AND deleted_at IS NULL");
    Ok(sqlx::query_as::<_, DbUser>(&sql)
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await?)
}

/// All live users in creation order.
pub async fn list(pool: &SqlitePool) -> AppResult<Vec<DbUser>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY created_at, rowid");
    Ok(sqlx::query_as::<_, DbUser>(&sql).fetch_all(pool).await?)
}

pub async fn ensure_email_available(pool: &SqlitePool, email: &str, except: Option<Uuid>) -> AppResult<()> {
    if let Some(existing) = find_by_email(pool, email).await? {
        if Some(existing.id) != except {
            return Err(AppError::conflict("email already in use"));
        }
    }
    Ok(())
}

pub async fn insert(pool: &SqlitePool, new_user: NewUser<'_>) -> AppResult<DbUser> {
    let email = normalize_email(new_user.email)?;
    ensure_email_available(pool, &email, None).await?;

    let password_hash = hash_password(new_user.password)?;
    let now = utc_now();
    let user_id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role, provider, provider_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(new_user.name)
    .bind(&email)
    .bind(password_hash)
    .bind(new_user.role.as_str())
    .bind(new_user.provider)
    .bind(Option::<String>::None)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    tracing::info!(user_id = %user_id, role = %new_user.role, "user created");
    fetch(pool, user_id).await
}

pub async fn update(pool: &SqlitePool, user: &DbUser) -> AppResult<DbUser> {
    sqlx::query("UPDATE users SET name = ?, email = ?, role = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL")
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.role)
        .bind(utc_now())
        .bind(user.id)
        .execute(pool)
        .await?;

    fetch(pool, user.id).await
}

pub async fn soft_delete(pool: &SqlitePool, user_id: Uuid) -> AppResult<()> {
    let now = utc_now();
    let affected = sqlx::query("UPDATE users SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL")
        .bind(now)
        .bind(now)
        .bind(user_id)
        .execute(pool)
        .await?;

    if affected.rows_affected() == 0 {
        return Err(AppError::not_found("user not found"));
    }
    Ok(())
}

/// Create an ADMIN account unless the email is already taken.
pub async fn ensure_admin(pool: &SqlitePool, name: &str, email: &str, password: &str) -> AppResult<DbUser> {
    if let Some(existing) = find_by_email(pool, email).await? {
        return Ok(existing);
    }

    insert(
        pool,
        NewUser {
            name,
            email,
            password,
            role: Role::Admin,
            provider: "local",
        },
    )
    .await
}
