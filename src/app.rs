use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::authz::{AuthorizationGate, PermissionEvaluator, Principal, RequiredRoleSet, SessionHolder};
use crate::errors::{AppError, AppResult};
use crate::jwt::{JwtConfig, PrincipalSource, SqlitePrincipalSource};
use crate::routes::{auth, health, properties, reports, users};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt: Arc<JwtConfig>,
    pub gate: Arc<AuthorizationGate>,
    pub permissions: PermissionEvaluator,
    pub principals: Arc<dyn PrincipalSource>,
}

impl AppState {
    pub fn new(pool: SqlitePool, jwt: JwtConfig, gate: AuthorizationGate) -> Self {
        Self {
            principals: Arc::new(SqlitePrincipalSource::new(pool.clone())),
            pool,
            jwt: Arc::new(jwt),
            gate: Arc::new(gate),
            permissions: PermissionEvaluator::new(),
        }
    }

    /// Run the gate for `required` and hand back the admitted principal.
    pub fn admit(&self, session: &SessionHolder, required: &RequiredRoleSet) -> AppResult<Principal> {
        self.gate.authorize(session, required).into_result()?;
        session
            .current()
            .ok_or_else(|| AppError::internal("admitted session lost its principal"))
    }
}

pub async fn create_app(pool: SqlitePool) -> Result<Router, AppError> {
    let jwt_config = JwtConfig::from_env()?;
    let state = AppState::new(pool, jwt_config, AuthorizationGate::from_env());
    Ok(router(state))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout));

    let property_routes = Router::new()
        .route("/", get(properties::list_properties).post(properties::create_property))
        .route("/search", post(properties::search_properties))
        .route(
            "/:id",
            get(properties::get_property)
                .put(properties::update_property)
                .delete(properties::delete_property),
        );

    let user_routes = Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        );

    let report_routes = Router::new().route("/summary", get(reports::summary));

    Router::new()
        .route("/api/health", get(health::health))
        .nest("/auth", auth_routes)
        .nest("/properties", property_routes)
        .nest("/users", user_routes)
        .nest("/reports", report_routes)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
