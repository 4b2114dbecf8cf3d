use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::role::Role;

/// Request body for registration. Fields stay optional so a missing or
/// empty value maps to the flat 400 the clients expect rather than a
/// deserialization error.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public part of an account returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AccountSummary {
    pub id: i32,
    pub email: String,
    pub name: Option<String>,
}

/// Response for a successful registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: AccountSummary,
}

/// Response for a successful login. Exactly one of `driverId` and
/// `userId` is present, depending on the role logged into.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    #[serde(rename = "driverId", skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<i32>,
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i32>,
    pub role: Role,
}
