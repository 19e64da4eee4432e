//! Session-status collaborators

use std::future::Future;

use common::AUTH_COOKIE;
use reqwest::{Client, header::COOKIE};
use tracing::debug;

use crate::{
    error::{StatusError, StatusResult},
    status::SessionStatus,
};

/// Something that can answer "am I still logged in, and for how long"
pub trait StatusSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = StatusResult<SessionStatus>> + Send;
}

/// Queries the session-status endpoint over HTTP with the session cookie.
///
/// No timeout is configured on top of the client's defaults.
#[derive(Clone)]
pub struct HttpStatusSource {
    client: Client,
    url: String,
    token: String,
}

impl HttpStatusSource {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url, token)
    }

    pub fn with_client(client: Client, url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            token: token.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl StatusSource for HttpStatusSource {
    async fn fetch(&self) -> StatusResult<SessionStatus> {
        let response = self
            .client
            .get(&self.url)
            .header(COOKIE, format!("{}={}", AUTH_COOKIE, self.token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatusError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let session = SessionStatus::parse(&body)?;
        debug!(
            "Session status: authenticated={} time_left_ms={}",
            session.authenticated, session.time_left_ms
        );
        Ok(session)
    }
}
