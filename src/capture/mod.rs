pub mod session;
pub mod tracer;

pub use session::Session;
pub use tracer::PathTracer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Escape,
    Other,
}

impl KeyCode {
    /// Maps a DOM-style key name (`"Escape"`, `"Esc"`) to a key code.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "Escape" | "Esc" => KeyCode::Escape,
            _ => KeyCode::Other,
        }
    }
}

/// How an active gesture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Pointer released or left the page: keep what was drawn.
    Commit,
    /// Cancel hook invoked: discard what was drawn.
    Cancel,
}

/// Gesture capture state of one map.
///
/// While a session is `Active` its move/up/leave handling and its cancel
/// hook are installed; returning to `Idle` removes both, which leaves the
/// cancel slot as a no-op.
#[derive(Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Active(Session),
}

impl CaptureState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        match self {
            Self::Active(session) => Some(session),
            Self::Idle => None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Active(session) => Some(session),
            Self::Idle => None,
        }
    }

    /// Tears down the active session, if any, leaving the state idle.
    pub fn take(&mut self) -> Option<Session> {
        match std::mem::take(self) {
            Self::Active(session) => Some(session),
            Self::Idle => None,
        }
    }
}
