use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AccountSummary, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo,
        role::Role,
    },
    error::{ApiError, ApiJson},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register/:role", post(register))
        .route("/login/:role", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Path(role): Path<String>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let role: Role = role.parse()?;

    let Some(email) = payload.email.filter(|v| !v.is_empty()) else {
        return Err(ApiError::InvalidPayload("Email and password are required."));
    };
    let Some(password) = payload.password.filter(|v| !v.is_empty()) else {
        return Err(ApiError::InvalidPayload("Email and password are required."));
    };

    let password_hash =
        hash_password(&password).map_err(|e| ApiError::Internal(anyhow::Error::new(e)))?;

    // An empty name is stored as NULL, same as no name at all.
    let name = payload.name.as_deref().filter(|v| !v.is_empty());
    let inserted = repo::insert(&state.db, role, &email, &password_hash, name).await?;

    match inserted {
        Some(user) => {
            info!(role = %role, id = user.id, email = %user.email, "account registered");
            Ok((
                StatusCode::CREATED,
                Json(RegisterResponse {
                    message: format!("{role} registered successfully."),
                    user,
                }),
            ))
        }
        None => {
            warn!(role = %role, email = %email, "email already registered");
            // The conflict body echoes the account that holds the email.
            let existing = repo::find_by_email(&state.db, role, &email)
                .await?
                .map(|account| AccountSummary {
                    id: account.id,
                    email: account.email,
                    name: account.name,
                });
            Err(ApiError::DuplicateEmail(existing))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Path(role): Path<String>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let role: Role = role.parse()?;

    let Some(email) = payload.email.filter(|v| !v.is_empty()) else {
        return Err(ApiError::InvalidPayload("Email and password are required."));
    };
    let Some(password) = payload.password.filter(|v| !v.is_empty()) else {
        return Err(ApiError::InvalidPayload("Email and password are required."));
    };

    let account = match repo::find_by_email(&state.db, role, &email).await? {
        Some(a) => a,
        None => {
            warn!(role = %role, email = %email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let ok = verify_password(&password, &account.password_hash)
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e)))?;
    if !ok {
        warn!(role = %role, id = account.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(account.id, role)?;

    info!(role = %role, id = account.id, "login successful");
    Ok(Json(LoginResponse {
        message: "Login successful.".into(),
        token,
        driver_id: (role == Role::Driver).then_some(account.id),
        user_id: (role == Role::Commuter).then_some(account.id),
        role,
    }))
}
