use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Map, Value};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{authz, models, query, routes};

#[derive(OpenApi)]
#[openapi(
	paths(
		routes::health::health,
		routes::auth::register,
		routes::auth::login,
		routes::auth::me,
		routes::auth::logout,
		routes::properties::list_properties,
		routes::properties::search_properties,
		routes::properties::get_property,
		routes::properties::create_property,
		routes::properties::update_property,
		routes::properties::delete_property,
		routes::users::list_users,
		routes::users::get_user,
		routes::users::create_user,
		routes::users::update_user,
		routes::users::delete_user,
		routes::reports::summary
	),
	components(
		schemas(
			authz::Role,
			authz::Principal,
			authz::ActionFlags,
			authz::Decision,
			authz::DenyReason,
			query::Criteria,
			models::user::User,
			models::user::UserView,
			models::user::AuthResponse,
			models::user::LoginRequest,
			models::user::RegisterRequest,
			models::user::UserCreateRequest,
			models::user::UserUpdateRequest,
			models::property::Property,
			models::property::PropertyType,
			models::property::PropertyStatus,
			models::property::PropertyCreateRequest,
			models::property::PropertyUpdateRequest,
			models::report::DashboardSummary,
			models::report::PriceStats,
			routes::health::HealthResponse,
			routes::auth::MessageResponse
		)
	),
	tags(
		(name = "Auth", description = "Authentication endpoints"),
		(name = "Properties", description = "Listing catalogue and management"),
		(name = "Users", description = "User administration"),
		(name = "Reports", description = "Dashboard aggregates"),
		(name = "Health", description = "Service health")
	)
)]
pub struct ApiDoc;

pub fn build_openapi(port: u16) -> anyhow::Result<utoipa::openapi::OpenApi> {
	let mut doc = serde_json::to_value(ApiDoc::openapi())?;

	ensure_security_components(&mut doc);
	ensure_servers(&mut doc, port);

	Ok(serde_json::from_value(doc)?)
}

pub fn swagger_routes(doc: utoipa::openapi::OpenApi) -> anyhow::Result<Router> {
	let swagger_config = utoipa_swagger_ui::Config::new(["/api-docs/openapi.json"])
		.try_it_out_enabled(true)
		.with_credentials(true)
		.persist_authorization(true);

	let doc_json = Arc::new(serde_json::to_value(&doc)?);

	let json_route = {
		let doc_json = Arc::clone(&doc_json);
		get(move || {
			let doc_json = Arc::clone(&doc_json);
			async move { Json((*doc_json).clone()) }
		})
	};

	Ok(Router::new()
		.route("/api-docs/openapi.json", json_route)
		.merge(SwaggerUi::new("/docs").config(swagger_config)))
}

fn object_entry<'a>(value: &'a mut Value, key: &str) -> Option<&'a mut Map<String, Value>> {
	value
		.as_object_mut()?
		.entry(key)
		.or_insert_with(|| Value::Object(Map::new()))
		.as_object_mut()
}

fn ensure_security_components(doc: &mut Value) {
	let Some(components) = object_entry(doc, "components") else {
		return;
	};
	let schemes = components
		.entry("securitySchemes")
		.or_insert_with(|| Value::Object(Map::new()));
	if let Some(schemes) = schemes.as_object_mut() {
		schemes.entry("bearerAuth").or_insert_with(|| {
			json!({
				"type": "http",
				"scheme": "bearer",
				"bearerFormat": "JWT"
			})
		});
	}
}

fn ensure_servers(doc: &mut Value, port: u16) {
	if let Some(root) = doc.as_object_mut() {
		root.insert(
			"servers".to_string(),
			json!([{ "url": format!("http://localhost:{port}"), "description": "Local server" }]),
		);
	}
}
