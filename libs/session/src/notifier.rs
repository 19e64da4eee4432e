//! Expiration warning state machine
//!
//! Consumes [`ExpiryUpdate`]s from the monitor plus the two user actions
//! and decides whether the "session about to expire" warning is visible.
//! The warning appears at most once per expiry episode; a dismissal lasts
//! until the episode ends (`is_expiring` goes back to false).

use crate::monitor::ExpiryUpdate;

/// Visibility of the warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoticeState {
    #[default]
    Hidden,
    Shown,
    /// Acknowledged for the current episode
    Dismissed,
}

/// Input to [`ExpirationNotifier::apply`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeEvent {
    Status(ExpiryUpdate),
    /// "Continue working"
    Continue,
    /// "Go to login"
    GoToLogin,
}

/// What the surface showing the warning has to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeEffect {
    None,
    Show,
    Hide,
    /// Still shown, countdown changed
    Refresh,
    /// Leave the page for the login surface
    NavigateToLogin,
}

/// Snapshot of the warning state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpirationWarning {
    pub is_expiring: bool,
    pub time_left_ms: i64,
    pub dismissed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ExpirationNotifier {
    state: NoticeState,
    last: ExpiryUpdate,
    closed: bool,
}

impl ExpirationNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> NoticeState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == NoticeState::Shown
    }

    /// True once the user chose to go to the login surface
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn warning(&self) -> ExpirationWarning {
        ExpirationWarning {
            is_expiring: self.last.is_expiring,
            time_left_ms: self.last.time_left_ms,
            dismissed: self.state == NoticeState::Dismissed,
        }
    }

    /// Remaining time as `M:SS` while the warning is shown
    pub fn countdown(&self) -> Option<String> {
        self.is_visible()
            .then(|| format_time_left(self.last.time_left_ms))
    }

    pub fn apply(&mut self, event: NoticeEvent) -> NoticeEffect {
        if self.closed {
            return NoticeEffect::None;
        }

        match event {
            NoticeEvent::Status(update) => self.on_status(update),
            NoticeEvent::Continue => {
                if self.state == NoticeState::Shown {
                    self.state = NoticeState::Dismissed;
                    NoticeEffect::Hide
                } else {
                    NoticeEffect::None
                }
            }
            NoticeEvent::GoToLogin => {
                self.closed = true;
                self.state = NoticeState::Hidden;
                NoticeEffect::NavigateToLogin
            }
        }
    }

    fn on_status(&mut self, update: ExpiryUpdate) -> NoticeEffect {
        self.last = update;

        if !update.is_expiring {
            let was_shown = self.state == NoticeState::Shown;
            // Episode over: any dismissal is forgotten
            self.state = NoticeState::Hidden;
            return if was_shown {
                NoticeEffect::Hide
            } else {
                NoticeEffect::None
            };
        }

        match self.state {
            NoticeState::Hidden => {
                self.state = NoticeState::Shown;
                NoticeEffect::Show
            }
            NoticeState::Shown => NoticeEffect::Refresh,
            NoticeState::Dismissed => NoticeEffect::None,
        }
    }
}

/// Format milliseconds as `M:SS`, minutes unpadded.
pub fn format_time_left(time_left_ms: i64) -> String {
    let total_seconds = time_left_ms.max(0) / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}
