//! The closed message-type registry shared by both processes.
//!
//! Adding a new message kind means adding a constant, an enum variant, and a
//! priority mapping here; both ends pick it up from this crate.

use serde::{Deserialize, Serialize};

use crate::error::{ProtoError, Result};

/// Core lifecycle: initialization finished, process is serving.
pub const CORE_READY: &str = "CORE:READY";
/// Core fault notification. Carries the `error` field, optionally a report payload.
pub const CORE_ERROR: &str = "CORE:ERROR";
/// Core graceful-shutdown terminus. Last packet a reporter may send.
pub const CORE_STOPPED: &str = "CORE:STOPPED";
/// Forwarded structured log record.
pub const CORE_LOG: &str = "CORE:LOG";
/// Periodic or change-driven device status snapshot.
pub const CORE_STATUS_CHANGE: &str = "CORE:STATUS_CHANGE";
/// Backend command: apply a new configuration.
pub const CMD_UPDATE_CONFIG: &str = "CMD:UPDATE_CONFIG";

/// Every registered type string, in declaration order.
pub const REGISTERED_TYPES: [&str; 6] = [
    CORE_READY,
    CORE_ERROR,
    CORE_STOPPED,
    CORE_LOG,
    CORE_STATUS_CHANGE,
    CMD_UPDATE_CONFIG,
];

/// Tagged union over the registered packet type strings.
///
/// `Unrecognized` exists only so that decoding a packet from a newer (or
/// broken) peer never fails at the deserialization layer; constructors reject
/// it, and dispatchers route it to the fail-soft path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    CoreReady,
    CoreError,
    CoreStopped,
    CoreLog,
    CoreStatusChange,
    CmdUpdateConfig,
    /// A type string outside the registry, preserved verbatim for diagnostics.
    Unrecognized(String),
}

impl MessageType {
    /// Parse a type string, rejecting anything outside the registry.
    pub fn parse(s: &str) -> Result<Self> {
        match Self::from_wire(s) {
            MessageType::Unrecognized(other) => Err(ProtoError::UnregisteredType(other)),
            known => Ok(known),
        }
    }

    /// Classify a type string without rejecting unknown values.
    pub fn from_wire(s: &str) -> Self {
        match s {
            CORE_READY => MessageType::CoreReady,
            CORE_ERROR => MessageType::CoreError,
            CORE_STOPPED => MessageType::CoreStopped,
            CORE_LOG => MessageType::CoreLog,
            CORE_STATUS_CHANGE => MessageType::CoreStatusChange,
            CMD_UPDATE_CONFIG => MessageType::CmdUpdateConfig,
            other => MessageType::Unrecognized(other.to_string()),
        }
    }

    /// The wire type string.
    pub fn as_str(&self) -> &str {
        match self {
            MessageType::CoreReady => CORE_READY,
            MessageType::CoreError => CORE_ERROR,
            MessageType::CoreStopped => CORE_STOPPED,
            MessageType::CoreLog => CORE_LOG,
            MessageType::CoreStatusChange => CORE_STATUS_CHANGE,
            MessageType::CmdUpdateConfig => CMD_UPDATE_CONFIG,
            MessageType::Unrecognized(other) => other,
        }
    }

    /// Colon-separated namespace prefix (`CORE`, `CMD`).
    pub fn namespace(&self) -> &str {
        self.as_str().split(':').next().unwrap_or("")
    }

    /// True for members of the closed registry.
    pub fn is_registered(&self) -> bool {
        !matches!(self, MessageType::Unrecognized(_))
    }
}

impl From<String> for MessageType {
    fn from(s: String) -> Self {
        MessageType::from_wire(&s)
    }
}

impl From<MessageType> for String {
    fn from(t: MessageType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
