//! Custom error types for the common library
//!
//! This module defines the errors raised while reading session tokens.
//! Callers at the request boundary convert every one of them into a
//! fail-closed decision; none of them is ever shown to an end user.

use thiserror::Error;

/// Error raised while extracting claims from a session token
#[derive(Error, Debug)]
pub enum TokenError {
    /// The token is not made of three dot-separated segments
    #[error("Token is missing its payload segment")]
    MissingPayload,

    /// The payload segment is not valid base64
    #[error("Token payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded payload is not valid JSON
    #[error("Token payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The decoded payload is JSON but not an object
    #[error("Token payload is not a JSON object")]
    NotAnObject,

    /// Signature or structure check failed in the verifying decoder
    #[error("Token verification failed: {0}")]
    Verification(#[from] jsonwebtoken::errors::Error),
}

/// Error raised while building a verifier from configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Key material could not be read or parsed
    #[error("Invalid key material: {0}")]
    InvalidKey(String),
}

/// Type alias for Result with TokenError
pub type TokenResult<T> = Result<T, TokenError>;
