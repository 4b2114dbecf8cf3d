use std::collections::HashMap;

use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::jwt::AuthClaims,
    error::{ApiError, ApiJson},
    state::AppState,
    status::dto::{DriverStatus, StatusAck, StatusEntry, StatusUpdate},
};

pub fn status_routes() -> Router<AppState> {
    Router::new().route("/driver-status", post(update_status).get(list_statuses))
}

#[instrument(skip(state, claims, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    ApiJson(payload): ApiJson<StatusUpdate>,
) -> Result<Json<StatusAck>, ApiError> {
    let Some(driver_id) = payload.driver_id else {
        return Err(ApiError::InvalidPayload("Invalid data."));
    };
    let status: DriverStatus = payload.status.as_deref().unwrap_or("").parse()?;

    if !claims.owns_driver(driver_id) {
        return Err(ApiError::Forbidden);
    }

    let entry = state.statuses.set(driver_id, status);
    info!(driver_id, status = %status, "driver status updated");
    Ok(Json(StatusAck {
        message: "Status updated.",
        status: entry,
    }))
}

#[instrument(skip(state))]
pub async fn list_statuses(State(state): State<AppState>) -> Json<HashMap<i32, StatusEntry>> {
    Json(state.statuses.fresh())
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::Body,
        extract::{ConnectInfo, FromRef},
        http::{header, Request, StatusCode},
        Extension, Router,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{
        app::build_app,
        auth::{jwt::JwtKeys, role::Role},
        status::board::{ManualClock, StatusBoard},
    };

    const WINDOW: Duration = Duration::from_secs(120);

    fn test_app(clock: Arc<ManualClock>) -> (Router, AppState) {
        let mut state = AppState::fake();
        state.statuses = StatusBoard::new(clock, WINDOW);
        // The rate limiter keys on the peer address, which requests
        // driven through oneshot do not carry by themselves.
        let app = build_app(state.clone()).layer(Extension(ConnectInfo(SocketAddr::from((
            [127, 0, 0, 1],
            9100,
        )))));
        (app, state)
    }

    fn bearer(state: &AppState, id: i32, role: Role) -> String {
        let token = JwtKeys::from_ref(state).sign(id, role).expect("sign");
        format!("Bearer {token}")
    }

    fn post_status(auth: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/driver-status")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(body.to_string())).expect("request")
    }

    fn get_statuses() -> Request<Body> {
        Request::builder()
            .uri("/api/driver-status")
            .body(Body::empty())
            .expect("request")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn report_then_read_back() {
        let (app, state) = test_app(ManualClock::new(50_000));
        let auth = bearer(&state, 7, Role::Driver);

        let response = app
            .clone()
            .oneshot(post_status(
                Some(&auth),
                serde_json::json!({ "driverId": 7, "status": "On Route" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let ack = body_json(response).await;
        assert_eq!(ack["message"], "Status updated.");
        assert_eq!(ack["status"]["status"], "On Route");
        assert_eq!(ack["status"]["timestamp"], 50_000);

        let response = app.oneshot(get_statuses()).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let listed = body_json(response).await;
        assert_eq!(listed["7"]["status"], "On Route");
        assert_eq!(listed["7"]["timestamp"], 50_000);
    }

    #[tokio::test]
    async fn client_timestamps_are_ignored() {
        let clock = ManualClock::new(90_000);
        let (app, state) = test_app(Arc::clone(&clock));
        let auth = bearer(&state, 3, Role::Driver);

        let response = app
            .oneshot(post_status(
                Some(&auth),
                serde_json::json!({ "driverId": 3, "status": "Docking", "timestamp": 1 }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"]["timestamp"], 90_000);
    }

    #[tokio::test]
    async fn stale_entries_disappear_from_reads() {
        let clock = ManualClock::new(0);
        let (app, state) = test_app(Arc::clone(&clock));
        let auth = bearer(&state, 7, Role::Driver);

        let response = app
            .clone()
            .oneshot(post_status(
                Some(&auth),
                serde_json::json!({ "driverId": 7, "status": "Loading" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        clock.advance(WINDOW.as_millis() as i64 + 1);

        let response = app.oneshot(get_statuses()).await.expect("response");
        let listed = body_json(response).await;
        assert_eq!(listed, serde_json::json!({}));
    }

    #[tokio::test]
    async fn missing_driver_id_is_invalid_data() {
        let (app, state) = test_app(ManualClock::new(0));
        let auth = bearer(&state, 7, Role::Driver);

        let response = app
            .oneshot(post_status(
                Some(&auth),
                serde_json::json!({ "status": "Docking" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Invalid data.");
    }

    #[tokio::test]
    async fn unknown_status_label_is_rejected() {
        let (app, state) = test_app(ManualClock::new(0));
        let auth = bearer(&state, 7, Role::Driver);

        let response = app
            .oneshot(post_status(
                Some(&auth),
                serde_json::json!({ "driverId": 7, "status": "Flying" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Invalid status.");
    }

    #[tokio::test]
    async fn missing_status_is_rejected() {
        let (app, state) = test_app(ManualClock::new(0));
        let auth = bearer(&state, 7, Role::Driver);

        let response = app
            .oneshot(post_status(Some(&auth), serde_json::json!({ "driverId": 7 })))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["message"], "Invalid status.");
    }

    #[tokio::test]
    async fn reporting_for_another_driver_is_forbidden() {
        let (app, state) = test_app(ManualClock::new(0));
        let auth = bearer(&state, 7, Role::Driver);

        let response = app
            .oneshot(post_status(
                Some(&auth),
                serde_json::json!({ "driverId": 8, "status": "Docking" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn commuter_tokens_cannot_report() {
        let (app, state) = test_app(ManualClock::new(0));
        let auth = bearer(&state, 7, Role::Commuter);

        let response = app
            .oneshot(post_status(
                Some(&auth),
                serde_json::json!({ "driverId": 7, "status": "Docking" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn reporting_requires_a_bearer_token() {
        let (app, _) = test_app(ManualClock::new(0));

        let response = app
            .oneshot(post_status(
                None,
                serde_json::json!({ "driverId": 7, "status": "Docking" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await["message"],
            "Missing Authorization header."
        );
    }

    #[tokio::test]
    async fn garbage_tokens_are_unauthorized() {
        let (app, _) = test_app(ManualClock::new(0));

        let response = app
            .oneshot(post_status(
                Some("Bearer not-a-jwt"),
                serde_json::json!({ "driverId": 7, "status": "Docking" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await["message"],
            "Invalid or expired token."
        );
    }

    #[tokio::test]
    async fn the_read_side_is_public() {
        let (app, _) = test_app(ManualClock::new(0));
        let response = app.oneshot(get_statuses()).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
