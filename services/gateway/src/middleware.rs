//! Route guard middleware
//!
//! Runs in front of every route. Denials are answered with a temporary
//! redirect and never with an error page.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use common::{AUTH_COOKIE, AccessDecision};
use tracing::debug;

use crate::state::AppState;

/// Role of the session that passed the guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedRole(pub i64);

/// Enforce authentication and role access on the requested path
pub async fn route_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let token = jar.get(AUTH_COOKIE).map(|cookie| cookie.value());
    let now_ms = Utc::now().timestamp_millis();

    match state.guard.check(req.uri().path(), token, now_ms) {
        AccessDecision::AllowPublic => next.run(req).await,
        AccessDecision::Allow { role_id } => {
            req.extensions_mut().insert(AuthenticatedRole(role_id));
            next.run(req).await
        }
        AccessDecision::RedirectToLogin(reason) => {
            debug!("Redirecting {} to login: {:?}", req.uri().path(), reason);
            Redirect::temporary(state.guard.policy().login_path()).into_response()
        }
        AccessDecision::Redirect(landing) => Redirect::temporary(&landing).into_response(),
    }
}
