//! The atomic typed envelope exchanged over the link.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProtoError, Result};
use crate::message::MessageType;
use crate::payload::{DeviceStatus, ErrorReport, LogRecord};
use crate::priority::EventPriority;

/// A single IPC packet.
///
/// Constructed immediately before transmission and immutable once sent;
/// the receiving dispatcher consumes it exactly once. Optional fields are
/// omitted from the wire JSON when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    #[serde(rename = "type")]
    pub msg_type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Present only on failure signals; carries the human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Ties a packet to a request/response exchange. Absent for broadcasts.
    #[serde(rename = "correlationId", default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl Packet {
    /// Create a bare packet of a registered type.
    ///
    /// Fails with [`ProtoError::UnregisteredType`] for types outside the
    /// closed registry; decoding is the only path that produces unrecognized
    /// packets.
    pub fn new(msg_type: MessageType) -> Result<Self> {
        if let MessageType::Unrecognized(other) = msg_type {
            return Err(ProtoError::UnregisteredType(other));
        }
        Ok(Self {
            msg_type,
            payload: None,
            error: None,
            correlation_id: None,
        })
    }

    /// Create a packet from a raw type string, enforcing registry membership.
    pub fn from_type_str(type_str: &str) -> Result<Self> {
        Self::new(MessageType::parse(type_str)?)
    }

    /// Attach a serialized payload.
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Result<Self> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    /// Mark the packet as a failure signal.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Tie the packet to an exchange.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// `CORE:READY` lifecycle packet.
    pub fn ready() -> Self {
        Self {
            msg_type: MessageType::CoreReady,
            payload: None,
            error: None,
            correlation_id: None,
        }
    }

    /// `CORE:STOPPED` lifecycle packet.
    pub fn stopped() -> Self {
        Self {
            msg_type: MessageType::CoreStopped,
            payload: None,
            error: None,
            correlation_id: None,
        }
    }

    /// `CORE:ERROR` packet. The report message lands in `error`; the full
    /// report rides along as payload when it carries more than the message.
    pub fn fault(report: &ErrorReport) -> Result<Self> {
        let mut packet = Self {
            msg_type: MessageType::CoreError,
            payload: None,
            error: Some(report.message.clone()),
            correlation_id: None,
        };
        if report.code.is_some() {
            packet.payload = Some(serde_json::to_value(report)?);
        }
        Ok(packet)
    }

    /// `CORE:STATUS_CHANGE` packet carrying a status snapshot.
    pub fn status(snapshot: &DeviceStatus) -> Result<Self> {
        snapshot.validate()?;
        Self {
            msg_type: MessageType::CoreStatusChange,
            payload: None,
            error: None,
            correlation_id: None,
        }
        .with_payload(snapshot)
    }

    /// `CORE:LOG` packet carrying a forwarded record.
    pub fn log(record: &LogRecord) -> Result<Self> {
        Self {
            msg_type: MessageType::CoreLog,
            payload: None,
            error: None,
            correlation_id: None,
        }
        .with_payload(record)
    }

    /// `CMD:UPDATE_CONFIG` packet carrying an opaque validated config.
    pub fn update_config(config: &Value, correlation_id: impl Into<String>) -> Self {
        Self {
            msg_type: MessageType::CmdUpdateConfig,
            payload: Some(config.clone()),
            error: None,
            correlation_id: Some(correlation_id.into()),
        }
    }

    /// Delivery priority, from the fixed type-driven mapping.
    pub fn priority(&self) -> EventPriority {
        self.msg_type.priority()
    }

    /// True when the packet marks a failure.
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Protocol;

    #[test]
    fn new_rejects_unrecognized_type() {
        let err = Packet::new(MessageType::Unrecognized("CORE:NOPE".into())).unwrap_err();
        assert!(matches!(err, ProtoError::UnregisteredType(s) if s == "CORE:NOPE"));
    }

    #[test]
    fn from_type_str_accepts_registry_members() {
        for type_str in crate::message::REGISTERED_TYPES {
            assert!(Packet::from_type_str(type_str).is_ok());
        }
        assert!(Packet::from_type_str("CORE:UNKNOWN").is_err());
    }

    #[test]
    fn absent_fields_stay_absent_on_the_wire() {
        let json = serde_json::to_value(Packet::ready()).unwrap();
        assert_eq!(json["type"], "CORE:READY");
        assert!(json.get("payload").is_none());
        assert!(json.get("error").is_none());
        assert!(json.get("correlationId").is_none());
    }

    #[test]
    fn round_trip_preserves_present_fields() {
        let packet = Packet::from_type_str(crate::message::CMD_UPDATE_CONFIG)
            .unwrap()
            .with_payload(&serde_json::json!({"port": 9000}))
            .unwrap()
            .with_correlation_id("cfg-1");

        let text = serde_json::to_string(&packet).unwrap();
        let back: Packet = serde_json::from_str(&text).unwrap();
        assert_eq!(back, packet);
        assert_eq!(back.correlation_id.as_deref(), Some("cfg-1"));
        assert!(back.error.is_none());
    }

    #[test]
    fn decoding_unknown_type_succeeds_as_unrecognized() {
        let back: Packet = serde_json::from_str(r#"{"type":"CORE:UNKNOWN"}"#).unwrap();
        assert!(!back.msg_type.is_registered());
        assert_eq!(back.msg_type.as_str(), "CORE:UNKNOWN");
    }

    #[test]
    fn fault_packet_marks_failure() {
        let packet = Packet::fault(&ErrorReport::new("link lost")).unwrap();
        assert!(packet.is_failure());
        assert_eq!(packet.error.as_deref(), Some("link lost"));
        assert!(packet.payload.is_none());

        let coded = Packet::fault(&ErrorReport::new("link lost").with_code("E_LINK")).unwrap();
        assert_eq!(coded.payload.unwrap()["code"], "E_LINK");
    }

    #[test]
    fn status_packet_validates_snapshot() {
        let bad = DeviceStatus {
            online: false,
            ip_address: "999.1.2.3.4".into(),
            port: 1,
            protocol: Protocol::Udp,
            uptime: 0,
        };
        assert!(Packet::status(&bad).is_err());
    }

    #[test]
    fn priorities_come_from_the_type_mapping() {
        assert_eq!(
            Packet::fault(&ErrorReport::new("x")).unwrap().priority(),
            EventPriority::Critical
        );
        assert_eq!(Packet::ready().priority(), EventPriority::High);
    }
}
