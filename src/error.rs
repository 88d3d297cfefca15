use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")] Database(#[from] sea_orm::DbErr),

    #[error("Invalid input: {0}")] InvalidInput(String),

    #[error("Invalid address")]
    InvalidAddress,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Wallet not found")]
    WalletNotFound,

    #[error("Not found: {0}")] NotFound(String),

    #[error("Unauthorized: {0}")] Unauthorized(String),

    #[error("RPC error: {0}")] Rpc(String),

    #[error("External service error: {0}")] External(String),

    #[error("An alert evaluation is already running")]
    EvaluationInProgress,

    #[error("Configuration error: {0}")] Config(String),

    #[error("Internal error: {0}")] Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn to_error_response(&self) -> ErrorResponse {
        let (code, message, field) = match self {
            AppError::Database(e) => ("DATABASE_ERROR", e.to_string(), None),
            AppError::InvalidInput(msg) => ("INVALID_INPUT", msg.clone(), None),
            AppError::InvalidAddress =>
                (
                    "INVALID_ADDRESS",
                    "Please enter a valid wallet address starting with 0x".to_string(),
                    Some("address".to_string()),
                ),
            AppError::InvalidEmail =>
                (
                    "INVALID_EMAIL",
                    "Please enter a valid email address".to_string(),
                    Some("email".to_string()),
                ),
            AppError::WalletNotFound => ("WALLET_NOT_FOUND", "Wallet not found".to_string(), None),
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone(), None),
            AppError::Unauthorized(msg) => ("UNAUTHORIZED", msg.clone(), None),
            AppError::Rpc(msg) => ("RPC_ERROR", msg.clone(), None),
            AppError::External(msg) => ("EXTERNAL_ERROR", msg.clone(), None),
            AppError::EvaluationInProgress =>
                ("EVALUATION_IN_PROGRESS", self.to_string(), None),
            AppError::Config(msg) => ("CONFIG_ERROR", msg.clone(), None),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone(), None),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        }
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            AppError::WalletNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            | AppError::InvalidInput(_)
            | AppError::InvalidAddress
            | AppError::InvalidEmail => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::EvaluationInProgress => StatusCode::CONFLICT,
            AppError::Rpc(_) | AppError::External(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let response = self.to_error_response();
        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_validation_errors_are_bad_requests() {
        assert_eq!(AppError::InvalidAddress.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidEmail.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InvalidInput("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_response_carries_field() {
        let response = AppError::InvalidAddress.to_error_response();
        assert_eq!(response.error.code, "INVALID_ADDRESS");
        assert_eq!(response.error.field.as_deref(), Some("address"));

        let response = AppError::Unauthorized("Invalid login credentials".to_string())
            .to_error_response();
        assert_eq!(response.error.message, "Invalid login credentials");
        assert!(response.error.field.is_none());
    }
}
