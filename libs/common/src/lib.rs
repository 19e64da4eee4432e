//! Common library for the SIGESTEI session services
//!
//! This crate provides the pieces shared by the gateway and the session
//! watcher: session token inspection, the claims verification seam, the
//! role allow-list table and the route access guard.
//!
//! ```rust
//! use common::{AccessDecision, AccessGuard, AccessPolicy};
//!
//! let guard = AccessGuard::unverified(AccessPolicy::sigestei());
//! assert_eq!(guard.check("/login", None, 0), AccessDecision::AllowPublic);
//! ```

pub mod access;
pub mod error;
pub mod roles;
pub mod token;
pub mod verify;

pub use access::{AccessDecision, AccessGuard, DenyReason};
pub use roles::{AccessPolicy, Role};
pub use token::{AUTH_COOKIE, TokenClaims};
pub use verify::{ClaimsVerifier, JwtClaimsVerifier, UnverifiedClaims};
