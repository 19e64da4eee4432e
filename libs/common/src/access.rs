//! Route access guard
//!
//! Single-pass, fail-closed decision for one navigation: public paths go
//! through, protected paths need a token whose claims name a role, whose
//! expiry has not passed and whose allow-list covers the path.

use std::sync::Arc;

use tracing::debug;

use crate::{
    roles::AccessPolicy,
    verify::{ClaimsVerifier, UnverifiedClaims},
};

/// Why a request was sent back to the login surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    MissingToken,
    InvalidToken,
    MissingRole,
    Expired,
    /// The role has no allow-list to land on
    UnknownRole,
}

/// Outcome of [`AccessGuard::check`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Path is not protected
    AllowPublic,
    /// Authenticated and authorized for the path
    Allow { role_id: i64 },
    /// Redirect to the login path
    RedirectToLogin(DenyReason),
    /// Authenticated but not authorized: redirect to the role's landing path
    Redirect(String),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::AllowPublic | AccessDecision::Allow { .. })
    }
}

/// Guard evaluating requests against an [`AccessPolicy`]
#[derive(Clone)]
pub struct AccessGuard {
    policy: Arc<AccessPolicy>,
    verifier: Arc<dyn ClaimsVerifier>,
}

impl AccessGuard {
    pub fn new(policy: AccessPolicy, verifier: Arc<dyn ClaimsVerifier>) -> Self {
        Self {
            policy: Arc::new(policy),
            verifier,
        }
    }

    /// Guard that trusts token payloads without signature checks
    pub fn unverified(policy: AccessPolicy) -> Self {
        Self::new(policy, Arc::new(UnverifiedClaims::new()))
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn verifier(&self) -> &dyn ClaimsVerifier {
        self.verifier.as_ref()
    }

    /// Decide what happens to a navigation to `path`.
    ///
    /// `now_ms` is the current wall-clock time in milliseconds since the
    /// Unix epoch, the same unit token expiry is expressed in.
    pub fn check(&self, path: &str, token: Option<&str>, now_ms: i64) -> AccessDecision {
        if !self.policy.is_protected(path) {
            return AccessDecision::AllowPublic;
        }

        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return self.deny(path, DenyReason::MissingToken);
        };

        let claims = match self.verifier.claims(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("Unusable session token for {}: {}", path, e);
                return self.deny(path, DenyReason::InvalidToken);
            }
        };

        let Some(role_id) = claims.role_id else {
            return self.deny(path, DenyReason::MissingRole);
        };

        if claims.is_expired_at(now_ms) {
            return self.deny(path, DenyReason::Expired);
        }

        if self.policy.is_allowed(role_id, path) {
            return AccessDecision::Allow { role_id };
        }

        match self.policy.allowed_prefixes(role_id).first() {
            Some(landing) => {
                debug!("Role {} not allowed on {}, sending to {}", role_id, path, landing);
                AccessDecision::Redirect(landing.clone())
            }
            None => self.deny(path, DenyReason::UnknownRole),
        }
    }

    fn deny(&self, path: &str, reason: DenyReason) -> AccessDecision {
        debug!("Denied {}: {:?}", path, reason);
        AccessDecision::RedirectToLogin(reason)
    }
}
