//! Packet dispatch on the receiving side of the link.
//!
//! Dispatch is an exhaustive match over the tagged message-type union, so a
//! new registry entry fails the build here until it is handled. Unrecognized
//! types take the fail-soft path: log, count, continue — a newer peer must
//! never crash an older receiver.

use corelink_proto::{DeviceStatus, ErrorReport, LogRecord, MessageType, Packet};
use serde_json::Value;

use crate::error::{BackendError, Result};
use crate::session::SessionTracker;

/// Handler hooks for each registered message kind.
///
/// Default implementations ignore the message, so an implementor only writes
/// the hooks for traffic it consumes. The backend implements the `CORE:*`
/// hooks; a core-side receiver implements `on_update_config`.
pub trait PacketHandler {
    fn on_ready(&mut self) {}

    fn on_error(&mut self, report: ErrorReport) {
        let _ = report;
    }

    fn on_stopped(&mut self) {}

    fn on_log(&mut self, record: LogRecord) {
        let _ = record;
    }

    fn on_status(&mut self, status: DeviceStatus) {
        let _ = status;
    }

    fn on_update_config(&mut self, config: Value, correlation_id: Option<String>) {
        let _ = (config, correlation_id);
    }
}

/// Routes decoded packets to a handler and keeps the session tracker current.
pub struct Dispatcher<H> {
    handler: H,
    session: SessionTracker,
    unknown_count: u64,
}

impl<H: PacketHandler> Dispatcher<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            session: SessionTracker::new(),
            unknown_count: 0,
        }
    }

    pub fn session(&self) -> &SessionTracker {
        &self.session
    }

    /// Mark the underlying channel as closed or failed.
    pub fn channel_closed(&mut self) {
        self.session.channel_closed();
    }

    /// Unrecognized packets seen so far.
    pub fn unknown_count(&self) -> u64 {
        self.unknown_count
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Consume one packet.
    ///
    /// Unknown types are logged and dropped (`Ok`). Payloads that fail their
    /// expected shape surface a validation error to the caller; they are
    /// never coerced into defaults, and the dispatcher remains usable.
    pub fn dispatch(&mut self, packet: Packet) -> Result<()> {
        self.session
            .observe(&packet.msg_type, packet.error.as_deref());

        match &packet.msg_type {
            MessageType::CoreReady => {
                self.handler.on_ready();
                Ok(())
            }
            MessageType::CoreError => {
                let report = match &packet.payload {
                    Some(payload) => serde_json::from_value(payload.clone())
                        .map_err(|err| BackendError::Validation(err.to_string()))?,
                    None => ErrorReport::new(packet.error.clone().unwrap_or_default()),
                };
                self.handler.on_error(report);
                Ok(())
            }
            MessageType::CoreStopped => {
                self.handler.on_stopped();
                Ok(())
            }
            MessageType::CoreLog => {
                let payload = packet
                    .payload
                    .as_ref()
                    .ok_or_else(|| BackendError::Validation("CORE:LOG without payload".into()))?;
                let record = LogRecord::from_value(payload)?;
                self.handler.on_log(record);
                Ok(())
            }
            MessageType::CoreStatusChange => {
                let payload = packet.payload.as_ref().ok_or_else(|| {
                    BackendError::Validation("CORE:STATUS_CHANGE without payload".into())
                })?;
                let status = DeviceStatus::from_value(payload)?;
                self.handler.on_status(status);
                Ok(())
            }
            MessageType::CmdUpdateConfig => {
                let config = packet.payload.clone().ok_or_else(|| {
                    BackendError::Validation("CMD:UPDATE_CONFIG without payload".into())
                })?;
                self.handler
                    .on_update_config(config, packet.correlation_id.clone());
                Ok(())
            }
            MessageType::Unrecognized(type_str) => {
                self.unknown_count += 1;
                tracing::warn!(
                    msg_type = %type_str,
                    count = self.unknown_count,
                    "unknown message type, dropping packet"
                );
                Ok(())
            }
        }
    }
}
