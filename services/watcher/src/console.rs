//! Terminal rendering of the expiration warning

use session::{ExpirationNotifier, NoticeEffect};

/// User action typed on stdin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Continue,
    Login,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "c" | "continue" => Some(Command::Continue),
            "l" | "login" => Some(Command::Login),
            _ => None,
        }
    }
}

/// Text to print for an effect, if any
pub fn render(effect: NoticeEffect, notifier: &ExpirationNotifier, login_url: &str) -> Option<String> {
    match effect {
        NoticeEffect::Show => Some(format!(
            "Your session expires in {}. Type 'continue' to keep working or 'login' to sign in again.",
            notifier.countdown().unwrap_or_default()
        )),
        NoticeEffect::Refresh => notifier
            .countdown()
            .map(|countdown| format!("Session expires in {}", countdown)),
        NoticeEffect::Hide | NoticeEffect::None => None,
        NoticeEffect::NavigateToLogin => Some(format!("Sign in again at {}", login_url)),
    }
}
