use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;

use crate::state::AppState;
use crate::{auth, locations, routes, status};

/// Per-client request budget for the API at large, per minute.
const API_RATE_PER_MIN: u32 = 120;
/// The location feed gets a higher allowance since every active driver
/// posts a position every couple of seconds.
const LOCATION_RATE_PER_MIN: u32 = 600;

pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    // Budgets are keyed per client IP, honouring forwarded headers
    // since the service normally sits behind a tunnel or proxy.
    let api_limit = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(SmartIpKeyExtractor)
            .per_millisecond(60_000 / API_RATE_PER_MIN as u64)
            .burst_size(API_RATE_PER_MIN)
            .use_headers()
            .finish()
            .expect("rate limit config"),
    );
    let location_limit = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(SmartIpKeyExtractor)
            .per_millisecond(60_000 / LOCATION_RATE_PER_MIN as u64)
            .burst_size(LOCATION_RATE_PER_MIN)
            .use_headers()
            .finish()
            .expect("rate limit config"),
    );

    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(status::router())
                .merge(routes::router())
                .route("/health", get(health))
                .layer(GovernorLayer { config: api_limit })
                .merge(locations::router().layer(GovernorLayer {
                    config: location_limit,
                })),
        )
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            error!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}

pub async fn serve(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    // Peer addresses feed the rate limiter keys.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        extract::ConnectInfo,
        http::{header, Request, StatusCode},
        Extension,
    };
    use tower::ServiceExt;

    use super::*;

    fn test_app() -> Router {
        build_app(AppState::fake()).layer(Extension(ConnectInfo(SocketAddr::from((
            [127, 0, 0, 1],
            9000,
        )))))
    }

    async fn get_status_feed(app: &Router) -> StatusCode {
        app.clone()
            .oneshot(
                Request::builder()
                    .uri("/api/driver-status")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response")
            .status()
    }

    async fn post_location_unauthed(app: &Router) -> StatusCode {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/jeepney-location")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"driverId":7,"lat":14.8,"lng":120.8}"#))
                    .expect("request"),
            )
            .await
            .expect("response")
            .status()
    }

    #[tokio::test]
    async fn bursts_past_the_api_budget_are_throttled() {
        let app = test_app();
        for _ in 0..API_RATE_PER_MIN {
            assert_eq!(get_status_feed(&app).await, StatusCode::OK);
        }
        // Cells replenish while the loop runs, so allow a few strays
        // before the limiter kicks in.
        let mut throttled = false;
        for _ in 0..5 {
            if get_status_feed(&app).await == StatusCode::TOO_MANY_REQUESTS {
                throttled = true;
                break;
            }
        }
        assert!(throttled);
    }

    #[tokio::test]
    async fn the_location_feed_runs_on_a_higher_budget() {
        let app = test_app();
        // Well past the general budget: every post still reaches the
        // handler stack and dies on auth, not on the limiter.
        for _ in 0..LOCATION_RATE_PER_MIN {
            assert_eq!(
                post_location_unauthed(&app).await,
                StatusCode::UNAUTHORIZED
            );
        }
        let mut throttled = false;
        for _ in 0..10 {
            if post_location_unauthed(&app).await == StatusCode::TOO_MANY_REQUESTS {
                throttled = true;
                break;
            }
        }
        assert!(throttled);
    }
}
