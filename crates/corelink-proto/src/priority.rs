//! Delivery-urgency classification for outbound events.

use serde::{Deserialize, Serialize};

use crate::message::MessageType;

/// Four-level ordinal event priority.
///
/// Declaration order is urgency order: `Critical < High < Normal < Low` under
/// the derived `Ord`, so "more urgent" always sorts first. Lower ordinal means
/// higher urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventPriority {
    /// P0: must never be silently dropped; delivery failure escalates.
    Critical,
    /// P1: lifecycle transitions and commands.
    High,
    /// P2: periodic status traffic.
    Normal,
    /// P3: routine log forwarding; first to be coalesced or dropped.
    Low,
}

impl EventPriority {
    /// Numeric ordinal (P0=0 .. P3=3).
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Short display label (`P0`..`P3`).
    pub fn label(self) -> &'static str {
        match self {
            EventPriority::Critical => "P0",
            EventPriority::High => "P1",
            EventPriority::Normal => "P2",
            EventPriority::Low => "P3",
        }
    }
}

impl MessageType {
    /// Fixed, total priority mapping over the taxonomy.
    ///
    /// Errors are never lower priority than informational events. Unrecognized
    /// types map to P3 so forward-compatible traffic cannot starve registered
    /// traffic.
    pub fn priority(&self) -> EventPriority {
        match self {
            MessageType::CoreError => EventPriority::Critical,
            MessageType::CoreReady | MessageType::CoreStopped | MessageType::CmdUpdateConfig => {
                EventPriority::High
            }
            MessageType::CoreStatusChange => EventPriority::Normal,
            MessageType::CoreLog | MessageType::Unrecognized(_) => EventPriority::Low,
        }
    }
}
