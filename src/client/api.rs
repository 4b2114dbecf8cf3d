use std::collections::HashMap;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::{
    auth::{dto::LoginResponse, role::Role},
    geo::LatLng,
    locations::dto::{LocationEntry, LocationsResponse},
    routes::dto::RouteInfo,
    status::dto::{DriverStatus, StatusEntry},
};

/// Error body every endpoint uses.
#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the token (or its absence). Callers treat
    /// this as fatal; everything else is worth retrying.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("api error ({status}): {message}")]
    Api { status: StatusCode, message: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Thin typed client over the HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<ApiMessage>()
            .await
            .map(|m| m.message)
            .unwrap_or_else(|_| status.to_string());
        if status == StatusCode::UNAUTHORIZED {
            Err(ClientError::Unauthorized(message))
        } else {
            Err(ClientError::Api { status, message })
        }
    }

    pub async fn login(
        &self,
        role: Role,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, ClientError> {
        let response = self
            .http
            .post(self.url(&format!("/api/login/{role}")))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn post_location(
        &self,
        token: &str,
        driver_id: i32,
        position: LatLng,
    ) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.url("/api/jeepney-location"))
            .bearer_auth(token)
            .json(&json!({ "driverId": driver_id, "lat": position.lat, "lng": position.lng }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn post_status(
        &self,
        token: &str,
        driver_id: i32,
        status: DriverStatus,
    ) -> Result<(), ClientError> {
        let response = self
            .http
            .post(self.url("/api/driver-status"))
            .bearer_auth(token)
            .json(&json!({ "driverId": driver_id, "status": status }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn fetch_locations(&self) -> Result<HashMap<i32, LocationEntry>, ClientError> {
        let response = self
            .http
            .get(self.url("/api/jeepney-location"))
            .send()
            .await?;
        let feed: LocationsResponse = Self::check(response).await?.json().await?;
        Ok(feed.locations)
    }

    pub async fn fetch_statuses(&self) -> Result<HashMap<i32, StatusEntry>, ClientError> {
        let response = self.http.get(self.url("/api/driver-status")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn fetch_routes(&self, name: Option<&str>) -> Result<Vec<RouteInfo>, ClientError> {
        let mut request = self.http.get(self.url("/api/routes"));
        if let Some(name) = name {
            request = request.query(&[("name", name)]);
        }
        Ok(Self::check(request.send().await?).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:3000/");
        assert_eq!(client.url("/api/routes"), "http://localhost:3000/api/routes");
    }
}
