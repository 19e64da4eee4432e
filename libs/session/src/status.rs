//! Session status as reported by the session-status endpoint
//!
//! The wire document is `{ authenticated, expiresAt, timeLeft }` with
//! `expiresAt` in Unix seconds (or null) and `timeLeft` in milliseconds.
//! Inside the process everything is kept in milliseconds.

use common::TokenClaims;
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::Number;

use crate::error::StatusResult;

/// Normalized result of one status query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub expires_at_ms: Option<i64>,
    pub time_left_ms: i64,
}

/// JSON body exchanged with the session-status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusBody {
    pub authenticated: bool,
    #[serde(default, deserialize_with = "optional_whole_number")]
    pub expires_at: Option<i64>,
    #[serde(deserialize_with = "whole_number")]
    pub time_left: i64,
}

/// Integral value of a JSON number, fractions truncated toward zero
fn truncate_number(number: &Number) -> Option<i64> {
    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|value| value.is_finite())
            .map(|value| value.trunc() as i64)
    })
}

fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let number = Number::deserialize(deserializer)?;
    truncate_number(&number).ok_or_else(|| D::Error::custom(format!("number out of range: {}", number)))
}

fn optional_whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    match Option::<Number>::deserialize(deserializer)? {
        Some(number) => truncate_number(&number)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("number out of range: {}", number))),
        None => Ok(None),
    }
}

impl SessionStatus {
    /// Status of a request that carries no usable session
    pub fn signed_out() -> Self {
        SessionStatus {
            authenticated: false,
            expires_at_ms: None,
            time_left_ms: 0,
        }
    }

    /// Status of the session described by `claims` at `now_ms`.
    ///
    /// Only a token naming a role and carrying an unexpired `exp` counts as
    /// an authenticated session; without `exp` there is no lifetime to report.
    pub fn from_claims(claims: &TokenClaims, now_ms: i64) -> Self {
        match (claims.role_id, claims.expires_at_ms) {
            (Some(_), Some(expires_at_ms)) if expires_at_ms > now_ms => SessionStatus {
                authenticated: true,
                expires_at_ms: Some(expires_at_ms),
                time_left_ms: expires_at_ms - now_ms,
            },
            _ => Self::signed_out(),
        }
    }

    /// Parse a response body, clamping `timeLeft` at zero
    pub fn parse(body: &[u8]) -> StatusResult<Self> {
        let body: SessionStatusBody = serde_json::from_slice(body)?;
        Ok(body.into())
    }

    pub fn to_body(&self) -> SessionStatusBody {
        SessionStatusBody {
            authenticated: self.authenticated,
            expires_at: self.expires_at_ms.map(|ms| ms.div_euclid(1000)),
            time_left: self.time_left_ms.max(0),
        }
    }
}

impl From<SessionStatusBody> for SessionStatus {
    fn from(body: SessionStatusBody) -> Self {
        SessionStatus {
            authenticated: body.authenticated,
            expires_at_ms: body.expires_at.map(|secs| secs.saturating_mul(1000)),
            time_left_ms: body.time_left.max(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatusError;
    use serde_json::json;

    #[test]
    fn test_parse_converts_expiry_to_millis() {
        let status = SessionStatus::parse(
            br#"{"authenticated":true,"expiresAt":1700000600,"timeLeft":600000}"#,
        )
        .unwrap();
        assert!(status.authenticated);
        assert_eq!(status.expires_at_ms, Some(1_700_000_600_000));
        assert_eq!(status.time_left_ms, 600_000);
    }

    #[test]
    fn test_parse_clamps_negative_time_left() {
        let status =
            SessionStatus::parse(br#"{"authenticated":true,"expiresAt":null,"timeLeft":-5}"#)
                .unwrap();
        assert_eq!(status.time_left_ms, 0);
        assert_eq!(status.expires_at_ms, None);
    }

    #[test]
    fn test_parse_accepts_fractional_numbers() {
        let status = SessionStatus::parse(
            br#"{"authenticated":true,"expiresAt":1700000600.5,"timeLeft":300000.0}"#,
        )
        .unwrap();
        assert!(status.authenticated);
        assert_eq!(status.expires_at_ms, Some(1_700_000_600_000));
        assert_eq!(status.time_left_ms, 300_000);

        let status =
            SessionStatus::parse(br#"{"authenticated":true,"expiresAt":null,"timeLeft":-12.7}"#)
                .unwrap();
        assert_eq!(status.time_left_ms, 0);

        let status = SessionStatus::parse(br#"{"authenticated":false,"timeLeft":0}"#).unwrap();
        assert_eq!(status, SessionStatus::signed_out());
    }

    #[test]
    fn test_parse_rejects_malformed_bodies() {
        let bodies: [&[u8]; 4] = [
            b"<html>",
            br#"{"authenticated":"yes","expiresAt":null,"timeLeft":0}"#,
            br#"{"authenticated":true}"#,
            br#"{"authenticated":true,"expiresAt":null,"timeLeft":"300000"}"#,
        ];
        for body in bodies {
            assert!(matches!(
                SessionStatus::parse(body),
                Err(StatusError::Malformed(_))
            ));
        }
    }

    #[test]
    fn test_body_uses_camel_case_and_seconds() {
        let status = SessionStatus {
            authenticated: true,
            expires_at_ms: Some(1_700_000_600_999),
            time_left_ms: 42,
        };
        assert_eq!(
            serde_json::to_value(status.to_body()).unwrap(),
            json!({"authenticated": true, "expiresAt": 1_700_000_600i64, "timeLeft": 42})
        );
    }

    #[test]
    fn test_from_claims() {
        let now = 1_000_000;
        let live = TokenClaims {
            role_id: Some(1),
            expires_at_ms: Some(now + 90_000),
        };
        assert_eq!(
            SessionStatus::from_claims(&live, now),
            SessionStatus {
                authenticated: true,
                expires_at_ms: Some(now + 90_000),
                time_left_ms: 90_000,
            }
        );

        let expired = TokenClaims {
            role_id: Some(1),
            expires_at_ms: Some(now),
        };
        assert_eq!(
            SessionStatus::from_claims(&expired, now),
            SessionStatus::signed_out()
        );

        let no_role = TokenClaims {
            role_id: None,
            expires_at_ms: Some(now + 1),
        };
        assert!(!SessionStatus::from_claims(&no_role, now).authenticated);

        let no_exp = TokenClaims {
            role_id: Some(2),
            expires_at_ms: None,
        };
        assert!(!SessionStatus::from_claims(&no_exp, now).authenticated);
    }
}
