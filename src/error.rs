use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::auth::dto::AccountSummary;

/// Every failure a handler can surface, with the exact message the
/// mobile and web clients match on.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid role type.")]
    InvalidRole,
    #[error("{0}")]
    InvalidPayload(&'static str),
    #[error("Invalid status.")]
    InvalidStatus,
    #[error("Missing Authorization header.")]
    MissingAuth,
    #[error("Invalid or expired token.")]
    InvalidToken,
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Forbidden: you may only update your own location.")]
    Forbidden,
    #[error("Email already registered.")]
    DuplicateEmail(Option<AccountSummary>),
    #[error("Route not found.")]
    RouteNotFound,
    #[error("Server error.")]
    Database(#[from] sqlx::Error),
    #[error("Server error.")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRole | ApiError::InvalidPayload(_) | ApiError::InvalidStatus => {
                StatusCode::BAD_REQUEST
            }
            ApiError::MissingAuth | ApiError::InvalidToken | ApiError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::DuplicateEmail(_) => StatusCode::CONFLICT,
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Details of 500s go to the log, never to the caller.
        match &self {
            ApiError::Database(e) => error!(error = %e, "database error"),
            ApiError::Internal(e) => error!(error = %e, "internal error"),
            _ => {}
        }

        let status = self.status();
        let message = self.to_string();
        let body = match self {
            ApiError::DuplicateEmail(existing) => json!({ "message": message, "user": existing }),
            _ => json!({ "message": message }),
        };
        (status, Json(body)).into_response()
    }
}

/// `Json<T>` wrapper whose rejection is the flat `400 Invalid data.`
/// the clients expect, instead of axum's default 422 with a parser trace.
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                debug!(error = %rejection, "request body rejected");
                Err(ApiError::InvalidPayload("Invalid data."))
            }
        }
    }
}
