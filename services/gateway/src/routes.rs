//! Gateway routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::Uri,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::{CookieJar, cookie::Cookie};
use chrono::Utc;
use common::{AUTH_COOKIE, Role};
use serde_json::json;
use session::SessionStatus;
use tracing::debug;

use crate::{
    error::{ApiResult, GatewayError},
    middleware::{AuthenticatedRole, route_guard},
    state::AppState,
};

/// Create the router for the gateway
///
/// The route guard wraps every route, the fallback included.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/login", get(login_page))
        .route("/api/auth/session", get(session_status))
        .route("/api/auth/me", get(current_role))
        .route("/api/auth/logout", post(logout))
        .fallback(page)
        .layer(middleware::from_fn_with_state(state.clone(), route_guard))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "gateway"
    }))
}

/// Login surface placeholder; the login collaborator is served elsewhere
pub async fn login_page() -> impl IntoResponse {
    Json(json!({
        "page": "/login",
        "message": "Sign in to continue"
    }))
}

/// Any other page, served once the guard let the request through
pub async fn page(uri: Uri, role: Option<Extension<AuthenticatedRole>>) -> impl IntoResponse {
    Json(json!({
        "page": uri.path(),
        "roleId": role.map(|Extension(AuthenticatedRole(id))| id),
    }))
}

/// Session status for the current cookie: `{ authenticated, expiresAt, timeLeft }`
pub async fn session_status(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let now_ms = Utc::now().timestamp_millis();

    let status = jar
        .get(AUTH_COOKIE)
        .and_then(|cookie| state.guard.verifier().claims(cookie.value()).ok())
        .map(|claims| SessionStatus::from_claims(&claims, now_ms))
        .unwrap_or_else(SessionStatus::signed_out);

    Json(status.to_body())
}

/// Role and allowed paths of the current session
pub async fn current_role(State(state): State<AppState>, jar: CookieJar) -> ApiResult<impl IntoResponse> {
    let token = jar.get(AUTH_COOKIE).ok_or(GatewayError::Unauthorized)?;

    let claims = state.guard.verifier().claims(token.value()).map_err(|e| {
        debug!("Rejected session token: {}", e);
        GatewayError::Unauthorized
    })?;

    if claims.is_expired_at(Utc::now().timestamp_millis()) {
        return Err(GatewayError::Unauthorized);
    }

    let role_id = claims.role_id.ok_or(GatewayError::Unauthorized)?;
    let policy = state.guard.policy();
    let allowed = policy.allowed_prefixes(role_id);
    if allowed.is_empty() {
        return Err(GatewayError::Forbidden);
    }

    Ok(Json(json!({
        "roleId": role_id,
        "role": Role::from_id(role_id),
        "landingPath": policy.landing_path(role_id),
        "allowedPaths": allowed,
    })))
}

/// Drop the session cookie
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));
    (
        jar,
        Json(json!({"message": "Logged out successfully"})),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    use common::{AccessGuard, AccessPolicy};
    use reqwest::{StatusCode, header};
    use serde_json::Value;
    use session::{HttpStatusSource, StatusError, StatusSource};
    use tokio::net::TcpListener;

    async fn spawn_app() -> String {
        let state = AppState::new(AccessGuard::unverified(AccessPolicy::sigestei()));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap()
    }

    fn token(role_id: i64, expires_in_secs: i64) -> String {
        let payload = json!({
            "role_id": role_id,
            "exp": Utc::now().timestamp() + expires_in_secs,
        });
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload.to_string())
        )
    }

    fn cookie(token: &str) -> String {
        format!("{}={}", AUTH_COOKIE, token)
    }

    fn location(response: &reqwest::Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let base = spawn_app().await;
        let response = client().get(format!("{}/health", base)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_page_without_cookie_redirects_to_login() {
        let base = spawn_app().await;
        let response = client()
            .get(format!("{}/dashboard", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_malformed_and_expired_cookies_redirect_to_login() {
        let base = spawn_app().await;
        for bad in ["garbage".to_string(), token(1, -60)] {
            let response = client()
                .get(format!("{}/viewInventory", base))
                .header(header::COOKIE, cookie(&bad))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
            assert_eq!(location(&response), "/login");
        }
    }

    #[tokio::test]
    async fn test_end_user_is_sent_to_landing_page_and_admin_passes() {
        let base = spawn_app().await;

        let response = client()
            .get(format!("{}/viewInventory", base))
            .header(header::COOKIE, cookie(&token(4, 3600)))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/viewRequests");

        let response = client()
            .get(format!("{}/viewInventory", base))
            .header(header::COOKIE, cookie(&token(1, 3600)))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"page": "/viewInventory", "roleId": 1}));
    }

    #[tokio::test]
    async fn test_public_page_has_no_role() {
        let base = spawn_app().await;
        let response = client()
            .get(format!("{}/about", base))
            .header(header::COOKIE, cookie(&token(1, 3600)))
            .send()
            .await
            .unwrap();
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"page": "/about", "roleId": null}));
    }

    #[tokio::test]
    async fn test_session_status_reports_time_left() {
        let base = spawn_app().await;

        let response = client()
            .get(format!("{}/api/auth/session", base))
            .header(header::COOKIE, cookie(&token(2, 300)))
            .send()
            .await
            .unwrap();
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["authenticated"], true);
        let time_left = body["timeLeft"].as_i64().unwrap();
        assert!(time_left > 290_000 && time_left <= 300_000, "{}", time_left);
        assert!(body["expiresAt"].is_i64());

        let response = client()
            .get(format!("{}/api/auth/session", base))
            .send()
            .await
            .unwrap();
        let body: Value = response.json().await.unwrap();
        assert_eq!(
            body,
            json!({"authenticated": false, "expiresAt": null, "timeLeft": 0})
        );
    }

    #[tokio::test]
    async fn test_http_status_source_reads_gateway() {
        let base = spawn_app().await;
        let url = format!("{}/api/auth/session", base);

        let status = HttpStatusSource::new(url.clone(), token(3, 120))
            .fetch()
            .await
            .unwrap();
        assert!(status.authenticated);
        assert!(status.time_left_ms > 0 && status.time_left_ms <= 120_000);

        let status = HttpStatusSource::new(url, "garbage").fetch().await.unwrap();
        assert_eq!(status, SessionStatus::signed_out());

    }

    #[tokio::test]
    async fn test_http_status_source_reports_failures() {
        let base = spawn_app().await;

        let rejected = HttpStatusSource::new(format!("{}/api/auth/me", base), "garbage")
            .fetch()
            .await;
        assert!(
            matches!(rejected, Err(StatusError::Status(401))),
            "{:?}",
            rejected
        );

        // Public fallback page answers 200 with a body of another shape
        let wrong_shape = HttpStatusSource::new(format!("{}/api/auth/nowhere", base), token(3, 120))
            .fetch()
            .await;
        assert!(
            matches!(wrong_shape, Err(StatusError::Malformed(_))),
            "{:?}",
            wrong_shape
        );
    }

    #[tokio::test]
    async fn test_current_role() {
        let base = spawn_app().await;

        let response = client()
            .get(format!("{}/api/auth/me", base))
            .header(header::COOKIE, cookie(&token(3, 3600)))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["role"], "Technician");
        assert_eq!(body["landingPath"], "/viewRequests");

        let response = client()
            .get(format!("{}/api/auth/me", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = client()
            .get(format!("{}/api/auth/me", base))
            .header(header::COOKIE, cookie(&token(9, 3600)))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_logout_removes_cookie() {
        let base = spawn_app().await;
        let response = client()
            .post(format!("{}/api/auth/logout", base))
            .header(header::COOKIE, cookie(&token(1, 3600)))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(set_cookie.starts_with("auth-token="), "{}", set_cookie);
        assert!(set_cookie.contains("Max-Age=0"), "{}", set_cookie);
    }
}
