//! Payload shapes carried inside packets.
//!
//! Wire field names are camelCase to match the shared JSON contract.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ProtoError, Result};
use crate::priority::EventPriority;

/// Device link protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    /// Parse a protocol name as reported by the device link.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "TCP" => Some(Protocol::Tcp),
            "UDP" => Some(Protocol::Udp),
            _ => None,
        }
    }
}

/// Normalized snapshot of the controlled device's connectivity state.
///
/// Produced fresh on each query; never cached by this layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub online: bool,
    /// IPv4 literal, e.g. `192.168.1.100`.
    #[serde(rename = "ipAddress")]
    pub ip_address: String,
    pub port: u16,
    pub protocol: Protocol,
    /// Seconds the device has been up.
    pub uptime: u64,
}

impl DeviceStatus {
    /// Check invariants serde cannot express (IPv4 literal syntax).
    pub fn validate(&self) -> Result<()> {
        if self.ip_address.parse::<Ipv4Addr>().is_err() {
            return Err(ProtoError::InvalidPayload {
                shape: "DeviceStatus",
                reason: format!("'{}' is not an IPv4 literal", self.ip_address),
            });
        }
        Ok(())
    }

    /// Deserialize and validate a status payload. Malformed payloads surface
    /// an error; they are never coerced to a default snapshot.
    pub fn from_value(value: &Value) -> Result<Self> {
        let status: DeviceStatus =
            serde_json::from_value(value.clone()).map_err(|err| ProtoError::InvalidPayload {
                shape: "DeviceStatus",
                reason: err.to_string(),
            })?;
        status.validate()?;
        Ok(status)
    }
}

/// Log level for forwarded records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Delivery priority for a record at this level. Error records follow the
    /// P0 no-drop policy; everything else is routine P3 traffic.
    pub fn forward_priority(self) -> EventPriority {
        match self {
            LogLevel::Error => EventPriority::Critical,
            _ => EventPriority::Low,
        }
    }
}

/// Structured log record forwarded over the link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
    /// RFC 3339 timestamp, assigned when the record is captured.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
}

impl LogRecord {
    /// Capture a record now.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: humantime::format_rfc3339_millis(std::time::SystemTime::now()).to_string(),
            context: None,
        }
    }

    /// Attach structured context.
    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = Some(context);
        self
    }

    /// Deserialize a forwarded record, surfacing shape errors.
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(|err| ProtoError::InvalidPayload {
            shape: "LogRecord",
            reason: err.to_string(),
        })
    }
}

/// Fault description carried by `CORE:ERROR` packets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}
