//! Watcher configuration

use anyhow::Result;
use session::MonitorConfig;

/// Watcher configuration
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Session-status endpoint
    pub status_url: String,
    /// Value of the session cookie
    pub token: String,
    /// Where "go to login" sends the user
    pub login_url: String,
    pub monitor: MonitorConfig,
}

impl WatcherConfig {
    /// Create a new WatcherConfig from environment variables
    ///
    /// # Environment Variables
    /// - `AUTH_TOKEN`: session token to watch (required)
    /// - `SESSION_STATUS_URL`: default "http://localhost:3000/api/auth/session"
    /// - `LOGIN_URL`: default "http://localhost:3000/login"
    /// - monitor cadence overrides, see [`MonitorConfig::from_env`]
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("AUTH_TOKEN")
            .map_err(|_| anyhow::anyhow!("AUTH_TOKEN environment variable not set"))?;

        let status_url = std::env::var("SESSION_STATUS_URL")
            .unwrap_or_else(|_| "http://localhost:3000/api/auth/session".to_string());
        let login_url =
            std::env::var("LOGIN_URL").unwrap_or_else(|_| "http://localhost:3000/login".to_string());

        Ok(WatcherConfig {
            status_url,
            token,
            login_url,
            monitor: MonitorConfig::from_env(),
        })
    }
}
