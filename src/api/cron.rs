use axum::{
    extract::State,
    http::{ HeaderMap, StatusCode },
    response::{ IntoResponse, Response },
    Json,
};
use serde::Serialize;
use sha2::{ Digest, Sha256 };

use crate::alert_checker::EvaluationReport;
use crate::error::AppError;

use super::auth::bearer_token;
use super::AppState;

#[derive(Debug, Serialize)]
pub struct CronResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<EvaluationReport>,
}

impl CronResponse {
    fn failed(error: &str) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.to_string()),
            report: None,
        }
    }
}

/// Compares SHA-256 digests of both values in constant time, so the
/// comparison does not leak how much of the secret matched.
fn secret_matches(provided: Option<&str>, secret: &str) -> bool {
    let Some(provided) = provided else {
        return false;
    };
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(secret.as_bytes());

    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b)) == 0
}

/// Runs one alert evaluation pass. Mounted for both GET and POST so any
/// external scheduler can call it.
pub async fn check_alerts(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(secret) = state.cron_secret.as_deref() {
        if !secret_matches(bearer_token(&headers), secret) {
            tracing::warn!("Rejected alert check with missing or wrong secret");
            return (StatusCode::UNAUTHORIZED, Json(CronResponse::failed("Unauthorized"))).into_response();
        }
    }

    match state.evaluator.run().await {
        Ok(report) =>
            Json(CronResponse {
                success: true,
                message: Some("Alerts checked successfully".to_string()),
                error: None,
                report: Some(report),
            }).into_response(),
        Err(AppError::EvaluationInProgress) =>
            (
                StatusCode::CONFLICT,
                Json(CronResponse::failed("Alert check already in progress")),
            ).into_response(),
        Err(e) => {
            tracing::error!("Alert check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CronResponse::failed("Failed to check alerts")),
            ).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_matches() {
        assert!(secret_matches(Some("s3cret"), "s3cret"));
        assert!(!secret_matches(Some("s3cre"), "s3cret"));
        assert!(!secret_matches(Some("s3cret "), "s3cret"));
        assert!(!secret_matches(None, "s3cret"));
    }
}
