use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;

use crate::app::AppState;
use crate::authz::destinations;
use crate::db::{properties, users};
use crate::errors::AppResult;
use crate::jwt::CurrentSession;
use crate::models::report::DashboardSummary;
use crate::models::user::valid_users;
use crate::query::{self, Criteria};

/// Dashboard aggregates; accepts the same filters as `/properties`.
#[utoipa::path(
    get,
    path = "/reports/summary",
    tag = "Reports",
    responses(
        (status = 200, description = "Dashboard aggregates", body = DashboardSummary),
        (status = 403, description = "Role may not see reports")
    ),
    security(("bearerAuth" = []))
)]
pub async fn summary(
    State(state): State<AppState>,
    session: CurrentSession,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<DashboardSummary>> {
    state.admit(&session, &destinations::reports())?;

    let catalog = properties::list(&state.pool).await?;
    let matched = query::filter_refs(&catalog, &Criteria::from_query(params));

    let people = valid_users(users::list(&state.pool).await?);

    Ok(Json(DashboardSummary::build(&matched, &people)))
}
