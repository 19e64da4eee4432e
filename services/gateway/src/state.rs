//! Application state shared across handlers

use common::AccessGuard;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub guard: AccessGuard,
}

impl AppState {
    pub fn new(guard: AccessGuard) -> Self {
        Self { guard }
    }
}
