use crate::circuit_breaker::{create_profile_api_circuit_breaker, ProfileApiCircuitBreaker};
use crate::errors::AppError;
use failsafe::{CircuitBreaker, Error as BreakerError};
use serde_json::Value;
use std::time::Duration;

/// Client for the upstream profile API.
///
/// Returns the raw, envelope-ambiguous JSON payload; normalization into a
/// canonical [`crate::models::ProfileRecord`] happens at the call site so the
/// client stays a dumb transport.
#[derive(Clone)]
pub struct ProfileApiClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    breaker: ProfileApiCircuitBreaker,
}

impl ProfileApiClient {
    /// Creates a new `ProfileApiClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the profile API.
    /// * `token` - The API token for authentication.
    pub fn new(base_url: String, token: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::UpstreamApiError(format!("Failed to create profile API client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            token,
            breaker: create_profile_api_circuit_breaker(),
        })
    }

    /// Fetches a user's profile, circuit-breaker protected.
    ///
    /// While the breaker is open, calls fail fast without touching the
    /// network.
    pub async fn fetch_profile(&self, user_id: &str) -> Result<Value, AppError> {
        if !self.breaker.is_call_permitted() {
            tracing::warn!(
                "Profile API circuit open, failing fast for user {}",
                user_id
            );
            return Err(AppError::UpstreamApiError(
                "Profile API temporarily unavailable".to_string(),
            ));
        }

        let result = self.do_fetch(user_id).await;

        // Feed the outcome back into the breaker so consecutive upstream
        // failures trip it. A 404 is a valid answer, not an outage.
        let breaker_outcome: Result<(), ()> = match &result {
            Err(AppError::UpstreamApiError(_)) => Err(()),
            _ => Ok(()),
        };
        if let Err(BreakerError::Rejected) = self.breaker.call(move || breaker_outcome) {
            tracing::warn!("Profile API circuit rejected call for user {}", user_id);
        }

        result
    }

    async fn do_fetch(&self, user_id: &str) -> Result<Value, AppError> {
        let url = format!("{}/users/{}/profile", self.base_url, user_id);
        tracing::info!("Fetching profile for user {} from {}", user_id, url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| {
                AppError::UpstreamApiError(format!("Profile API request failed: {}", e))
            })?;

        if response.status().as_u16() == 404 {
            return Err(AppError::NotFound(format!(
                "Profile for user {} not found",
                user_id
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UpstreamApiError(format!(
                "Profile API returned {}: {}",
                status, error_text
            )));
        }

        let data = response.json().await.map_err(|e| {
            AppError::UpstreamApiError(format!("Failed to parse profile API response: {}", e))
        })?;

        Ok(data)
    }
}
