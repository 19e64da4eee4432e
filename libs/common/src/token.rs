//! Session token inspection
//!
//! A session token is a compact three-segment string (header, payload,
//! signature). This module only reads the payload: it base64-decodes the
//! middle segment, parses it as JSON and extracts the role and expiry
//! claims. No signature is checked here, see [`crate::verify`] for the
//! verifying decoder.
//!
//! All timestamps leave this module in milliseconds since the Unix epoch.

use base64::{
    Engine, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde_json::Value;

use crate::error::{TokenError, TokenResult};

/// Name of the cookie carrying the session token
pub const AUTH_COOKIE: &str = "auth-token";

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_encode_padding(false)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// Issuers emit URL-safe payloads, older clients emitted the standard alphabet
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Claims the access guard cares about
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenClaims {
    /// Numeric role identifier, absent when missing or unparseable
    pub role_id: Option<i64>,
    /// Expiry in milliseconds since the Unix epoch
    pub expires_at_ms: Option<i64>,
}

impl TokenClaims {
    /// Extract claims from an already decoded JSON payload
    pub fn from_payload(payload: &Value) -> TokenResult<Self> {
        let object = payload.as_object().ok_or(TokenError::NotAnObject)?;

        Ok(TokenClaims {
            role_id: object.get("role_id").and_then(parse_role_id),
            expires_at_ms: object.get("exp").and_then(seconds_to_millis),
        })
    }

    /// Whether the token lifetime has ended at `now_ms`.
    ///
    /// A token without an `exp` claim never expires from the guard's point
    /// of view.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expires_at_ms.is_some_and(|exp| exp <= now_ms)
    }

    /// Milliseconds left before expiry, clamped at zero
    pub fn time_left_ms(&self, now_ms: i64) -> Option<i64> {
        self.expires_at_ms.map(|exp| exp.saturating_sub(now_ms).max(0))
    }
}

/// Decode the payload segment of `token` and return its claims.
pub fn inspect(token: &str) -> TokenResult<TokenClaims> {
    let payload = decode_payload(token)?;
    TokenClaims::from_payload(&payload)
}

/// Decode the payload segment of `token` into JSON without interpreting it
pub fn decode_payload(token: &str) -> TokenResult<Value> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::MissingPayload);
    };

    if payload.is_empty() {
        return Err(TokenError::MissingPayload);
    }

    let bytes = URL_SAFE_LENIENT
        .decode(payload)
        .or_else(|_| STANDARD_LENIENT.decode(payload))?;

    Ok(serde_json::from_slice(&bytes)?)
}

fn parse_role_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn seconds_to_millis(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };

    match n.as_i64() {
        Some(secs) => Some(secs.saturating_mul(1000)),
        None => n
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|secs| (secs * 1000.0).round() as i64),
    }
}
