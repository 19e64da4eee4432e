//! Custom error types for the gateway API endpoints
//!
//! Page navigations are never answered with these: the route guard turns
//! every failure into a redirect. Only the JSON API uses them.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// No usable session
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated with a role that has no access at all
    #[error("Forbidden")]
    Forbidden,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match self {
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden => StatusCode::FORBIDDEN,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Type alias for gateway API results
pub type ApiResult<T> = Result<T, GatewayError>;
