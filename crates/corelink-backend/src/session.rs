//! Core-session state as observed from the backend.
//!
//! The backend must distinguish "core never sent READY" (startup failure),
//! "core sent READY then STOPPED" (graceful shutdown) and "channel broke
//! mid-session" (transport failure) — each demands a different recovery, so
//! they are never collapsed into one disconnected state.

use corelink_proto::MessageType;

/// Where the core session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, READY not yet observed.
    AwaitingReady,
    /// READY observed; core is serving.
    Running,
    /// STOPPED observed; shutdown was graceful.
    Stopped,
    /// The channel failed while the session was live.
    Broken,
}

/// What the backend should do about the current session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Session is healthy; nothing to do.
    None,
    /// Core never came up (or died before READY): restart the core process.
    RestartCore,
    /// Graceful shutdown: accept it, do not restart.
    AcceptShutdown,
    /// Transport broke mid-session: reconnect the channel, core may be fine.
    ReconnectTransport,
}

/// Tracks the core session from observed packets and channel events.
#[derive(Debug)]
pub struct SessionTracker {
    state: SessionState,
    ready_seen: bool,
    last_error: Option<String>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self {
            state: SessionState::AwaitingReady,
            ready_seen: false,
            last_error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Most recent `CORE:ERROR` message, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Fold an observed packet type (and error text, for faults) into the
    /// session state. `CORE:ERROR` is informational and does not end the
    /// session; only `CORE:STOPPED` is terminal.
    pub fn observe(&mut self, msg_type: &MessageType, error: Option<&str>) {
        match msg_type {
            MessageType::CoreReady => {
                if self.state == SessionState::Stopped {
                    tracing::warn!("CORE:READY after CORE:STOPPED, session restarting");
                }
                self.ready_seen = true;
                self.state = SessionState::Running;
            }
            MessageType::CoreStopped => {
                self.state = SessionState::Stopped;
            }
            MessageType::CoreError => {
                self.last_error = error.map(str::to_string);
            }
            _ => {}
        }
    }

    /// Record that the channel closed or failed.
    ///
    /// After a graceful STOPPED this is expected and the state stays Stopped;
    /// anything else leaves the session Broken.
    pub fn channel_closed(&mut self) {
        match self.state {
            SessionState::Stopped => {}
            SessionState::AwaitingReady => {
                tracing::warn!("channel closed before CORE:READY, core startup failed");
                self.state = SessionState::Broken;
            }
            _ => {
                tracing::warn!("channel broke mid-session");
                self.state = SessionState::Broken;
            }
        }
    }

    /// The recovery the current state calls for.
    ///
    /// A broken channel that never carried READY is a startup failure (restart
    /// the core); broken after READY is a transport failure (reconnect).
    pub fn recovery(&self) -> RecoveryAction {
        match self.state {
            SessionState::Running => RecoveryAction::None,
            SessionState::Stopped => RecoveryAction::AcceptShutdown,
            SessionState::AwaitingReady => RecoveryAction::RestartCore,
            SessionState::Broken if self.ready_seen => RecoveryAction::ReconnectTransport,
            SessionState::Broken => RecoveryAction::RestartCore,
        }
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}
