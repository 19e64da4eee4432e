//! Client-side session expiry tracking
//!
//! [`monitor::SessionMonitor`] polls the session-status endpoint and feeds
//! [`notifier::ExpirationNotifier`], which decides when the user is warned
//! that their session is about to end.

pub mod error;
pub mod monitor;
pub mod notifier;
pub mod source;
pub mod status;

pub use error::StatusError;
pub use monitor::{ExpiryUpdate, MonitorConfig, MonitorPhase, MonitorReport, SessionMonitor};
pub use notifier::{ExpirationNotifier, NoticeEffect, NoticeEvent, NoticeState, format_time_left};
pub use source::{HttpStatusSource, StatusSource};
pub use status::{SessionStatus, SessionStatusBody};
