use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::jwt::AuthClaims,
    error::{ApiError, ApiJson},
    locations::{
        dto::{LocationAck, LocationUpdate, LocationsResponse},
        repo,
    },
    state::AppState,
};

pub fn location_routes() -> Router<AppState> {
    Router::new().route("/jeepney-location", post(update_location).get(list_locations))
}

#[instrument(skip(state, claims, payload))]
pub async fn update_location(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    ApiJson(payload): ApiJson<LocationUpdate>,
) -> Result<Json<LocationAck>, ApiError> {
    let (Some(driver_id), Some(lat), Some(lng)) = (payload.driver_id, payload.lat, payload.lng)
    else {
        return Err(ApiError::InvalidPayload("Invalid data."));
    };

    if !claims.owns_driver(driver_id) {
        warn!(token_id = claims.id, driver_id, "location update for another driver");
        return Err(ApiError::Forbidden);
    }

    let location = repo::upsert(&state.db, driver_id, lat, lng).await?;
    info!(driver_id, lat, lng, "location updated");
    Ok(Json(LocationAck {
        message: "Location updated.",
        location,
    }))
}

#[instrument(skip(state))]
pub async fn list_locations(
    State(state): State<AppState>,
) -> Result<Json<LocationsResponse>, ApiError> {
    let rows = repo::list(&state.db).await?;
    let locations = rows
        .into_iter()
        .map(|row| (row.driver_id, row.into()))
        .collect();
    Ok(Json(LocationsResponse { locations }))
}
