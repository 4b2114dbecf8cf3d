use crate::state::AppState;
use axum::Router;

pub mod board;
pub mod dto;
pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::status_routes())
}
