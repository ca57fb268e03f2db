use sqlx::SqlitePool;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::property::{DbProperty, Property, PropertyCreateRequest, PropertyStatus};
use crate::utils::utc_now;

const PROPERTY_COLUMNS: &str =
    "id, title, description, location, price, bedrooms, property_type, status, created_at, updated_at, deleted_at";

/// Live listings in insertion order; the query engine keeps this order.
/// Rows with an unknown stored type or status are skipped.
pub async fn list(pool: &SqlitePool) -> AppResult<Vec<Property>> {
    let sql = format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE deleted_at IS NULL ORDER BY created_at, rowid");
    Ok(sqlx::query_as::<_, DbProperty>(&sql)
        .fetch_all(pool)
        .await?
        .into_iter()
        .filter_map(|row| Property::try_from(row).ok())
        .collect())
}

pub async fn title_exists(pool: &SqlitePool, title: &str) -> AppResult<bool> {
    let found = sqlx::query("SELECT 1 FROM properties WHERE title = ? AND deleted_at IS NULL")
        .bind(title)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

pub async fn fetch(pool: &SqlitePool, property_id: Uuid) -> AppResult<Property> {
    let sql = format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = ? AND deleted_at IS NULL");
    sqlx::query_as::<_, DbProperty>(&sql)
        .bind(property_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("property not found"))?
        .try_into()
}

pub async fn insert(pool: &SqlitePool, payload: &PropertyCreateRequest) -> AppResult<Property> {
    validate(&payload.title, &payload.location, payload.price, payload.bedrooms)?;

    let now = utc_now();
    let property_id = Uuid::new_v4();
    let status = payload.status.unwrap_or(PropertyStatus::Available);

    sqlx::query(
        "INSERT INTO properties (id, title, description, location, price, bedrooms, property_type, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(property_id)
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.location)
    .bind(payload.price)
    .bind(payload.bedrooms)
    .bind(payload.property_type.as_str())
    .bind(status.as_str())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    fetch(pool, property_id).await
}

pub async fn update(pool: &SqlitePool, property: &Property) -> AppResult<Property> {
    validate(&property.title, &property.location, property.price, property.bedrooms)?;

    sqlx::query(
        "UPDATE properties SET title = ?, description = ?, location = ?, price = ?, bedrooms = ?, property_type = ?, status = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(&property.title)
    .bind(&property.description)
    .bind(&property.location)
    .bind(property.price)
    .bind(property.bedrooms)
    .bind(property.property_type.as_str())
    .bind(property.status.as_str())
    .bind(utc_now())
    .bind(property.id)
    .execute(pool)
    .await?;

    fetch(pool, property.id).await
}

pub async fn soft_delete(pool: &SqlitePool, property_id: Uuid) -> AppResult<()> {
    let now = utc_now();
    let affected = sqlx::query("UPDATE properties SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL")
        .bind(now)
        .bind(now)
        .bind(property_id)
        .execute(pool)
        .await?;

    if affected.rows_affected() == 0 {
        return Err(AppError::not_found("property not found"));
    }
    Ok(())
}

fn validate(title: &str, location: &str, price: i64, bedrooms: Option<i64>) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::bad_request("title must not be empty"));
    }
    if location.trim().is_empty() {
        return Err(AppError::bad_request("location must not be empty"));
    }
    if price < 0 {
        return Err(AppError::bad_request("price must not be negative"));
    }
    if bedrooms.is_some_and(|b| b < 0) {
        return Err(AppError::bad_request("bedrooms must not be negative"));
    }
    Ok(())
}
