use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::clarity::DecodeError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("HTTP error {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Service unavailable")]
    ServiceUnavailable,

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Request cancelled by user")]
    UserCancelled,

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::NetworkFailure(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NetworkFailure(_) => (StatusCode::BAD_GATEWAY, "NETWORK_FAILURE"),
            AppError::HttpError { .. } => (StatusCode::BAD_GATEWAY, "UPSTREAM_HTTP_ERROR"),
            AppError::RateLimitExceeded => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED"),
            AppError::ServiceUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            AppError::NotConnected => (StatusCode::UNAUTHORIZED, "NOT_CONNECTED"),
            AppError::InvalidAmount(_) => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
            AppError::UserCancelled => (StatusCode::CONFLICT, "USER_CANCELLED"),
            AppError::Wallet(_) => (StatusCode::BAD_GATEWAY, "WALLET_ERROR"),
            AppError::Decode(_) => (StatusCode::BAD_GATEWAY, "DECODE_ERROR"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Io(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let details = match &self {
            AppError::HttpError { status, .. } => Some(serde_json::json!({ "upstream_status": status })),
            _ => None,
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details,
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_cancelled_is_distinct_from_wallet_failure() {
        // Memastikan pembatalan user punya kode sendiri
        let (_, cancelled) = AppError::UserCancelled.status_and_code();
        let (_, failed) = AppError::Wallet("boom".into()).status_and_code();
        assert_eq!(cancelled, "USER_CANCELLED");
        assert_ne!(cancelled, failed);
    }

    #[test]
    fn rate_limit_maps_to_429() {
        let (status, _) = AppError::RateLimitExceeded.status_and_code();
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn http_error_message_carries_status_and_body() {
        let err = AppError::HttpError {
            status: 404,
            body: "no such contract".into(),
        };
        assert_eq!(err.to_string(), "HTTP error 404: no such contract");
    }
}
