use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::destinations;
use crate::db::properties;
use crate::errors::{AppError, AppResult};
use crate::jwt::CurrentSession;
use crate::models::property::{Property, PropertyCreateRequest, PropertyUpdateRequest};
use crate::query::{self, Criteria};

#[utoipa::path(
    get,
    path = "/properties",
    tag = "Properties",
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive text in title or description"),
        ("location" = Option<String>, Query, description = "Location contains this text"),
        ("minPrice" = Option<i64>, Query, description = "Inclusive lower price bound"),
        ("maxPrice" = Option<i64>, Query, description = "Inclusive upper price bound"),
        ("minBedrooms" = Option<i64>, Query, description = "Inclusive lower bedroom bound"),
        ("maxBedrooms" = Option<i64>, Query, description = "Inclusive upper bedroom bound"),
        ("type" = Option<String>, Query, description = "Exact property type"),
        ("status" = Option<String>, Query, description = "Exact status")
    ),
    responses(
        (status = 200, description = "Matching listings in catalogue order", body = [Property]),
        (status = 401, description = "No session, redirect to login")
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_properties(
    State(state): State<AppState>,
    session: CurrentSession,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<Vec<Property>>> {
    state.admit(&session, &destinations::property_catalog())?;
    let catalog = properties::list(&state.pool).await?;
    Ok(Json(query::filter_owned(catalog, &Criteria::from_query(params))))
}

/// Same as listing, with criteria in the body so set-valued fields can carry several values.
#[utoipa::path(
    post,
    path = "/properties/search",
    tag = "Properties",
    request_body = Criteria,
    responses(
        (status = 200, description = "Matching listings in catalogue order", body = [Property]),
        (status = 401, description = "No session, redirect to login")
    ),
    security(("bearerAuth" = []))
)]
pub async fn search_properties(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(criteria): Json<serde_json::Value>,
) -> AppResult<Json<Vec<Property>>> {
    state.admit(&session, &destinations::property_catalog())?;
    let catalog = properties::list(&state.pool).await?;
    Ok(Json(query::filter_owned(catalog, &Criteria::from_json(criteria))))
}

#[utoipa::path(
    get,
    path = "/properties/{id}",
    tag = "Properties",
    params(("id" = Uuid, Path, description = "Property id")),
    responses((status = 200, description = "Property detail", body = Property)),
    security(("bearerAuth" = []))
)]
pub async fn get_property(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Property>> {
    state.admit(&session, &destinations::property_catalog())?;
    Ok(Json(properties::fetch(&state.pool, id).await?))
}

#[utoipa::path(
    post,
    path = "/properties",
    tag = "Properties",
    request_body = PropertyCreateRequest,
    responses(
        (status = 201, description = "Property created", body = Property),
        (status = 403, description = "Role may not manage listings")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_property(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(payload): Json<PropertyCreateRequest>,
) -> AppResult<(StatusCode, Json<Property>)> {
    let actor = state.admit(&session, &destinations::property_management())?;
    let property = properties::insert(&state.pool, &payload).await?;
    tracing::info!(property_id = %property.id, actor = %actor.id, "property created");
    Ok((StatusCode::CREATED, Json(property)))
}

#[utoipa::path(
    put,
    path = "/properties/{id}",
    tag = "Properties",
    params(("id" = Uuid, Path, description = "Property id")),
    request_body = PropertyUpdateRequest,
    responses(
        (status = 200, description = "Property updated", body = Property),
        (status = 403, description = "Role may not manage listings")
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_property(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<Uuid>,
    Json(payload): Json<PropertyUpdateRequest>,
) -> AppResult<Json<Property>> {
    let actor = state.admit(&session, &destinations::property_management())?;
    let mut property = properties::fetch(&state.pool, id).await?;

    if !state.permissions.can_mutate(actor.role, Some(&property)) {
        return Err(AppError::forbidden("not allowed to edit this property"));
    }

    if let Some(title) = payload.title {
        property.title = title;
    }
    if payload.description.is_some() {
        property.description = payload.description;
    }
    if let Some(location) = payload.location {
        property.location = location;
    }
    if let Some(price) = payload.price {
        property.price = price;
    }
    if payload.bedrooms.is_some() {
        property.bedrooms = payload.bedrooms;
    }
    if let Some(property_type) = payload.property_type {
        property.property_type = property_type;
    }
    if let Some(status) = payload.status {
        property.status = status;
    }

    let property = properties::update(&state.pool, &property).await?;
    tracing::info!(property_id = %property.id, actor = %actor.id, "property updated");
    Ok(Json(property))
}

#[utoipa::path(
    delete,
    path = "/properties/{id}",
    tag = "Properties",
    params(("id" = Uuid, Path, description = "Property id")),
    responses(
        (status = 204, description = "Property soft deleted"),
        (status = 403, description = "Role may not manage listings")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_property(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let actor = state.admit(&session, &destinations::property_management())?;
    let property = properties::fetch(&state.pool, id).await?;

    if !state.permissions.can_delete(actor.role, Some(&property)) {
        return Err(AppError::forbidden("not allowed to delete this property"));
    }

    properties::soft_delete(&state.pool, property.id).await?;
    tracing::info!(property_id = %property.id, actor = %actor.id, "property deleted");
    Ok(StatusCode::NO_CONTENT)
}
