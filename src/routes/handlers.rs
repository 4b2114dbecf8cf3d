use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    error::ApiError,
    routes::{
        dto::{RouteInfo, RouteQuery},
        repo,
    },
    state::AppState,
};

pub fn route_routes() -> Router<AppState> {
    Router::new()
        .route("/routes", get(list_routes))
        .route("/routes/:id", get(get_route))
}

#[instrument(skip(state))]
pub async fn list_routes(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<Vec<RouteInfo>>, ApiError> {
    let routes = repo::list(&state.db, query.name.as_deref()).await?;
    Ok(Json(routes))
}

#[instrument(skip(state))]
pub async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RouteInfo>, ApiError> {
    let route = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::RouteNotFound)?;
    Ok(Json(route))
}
