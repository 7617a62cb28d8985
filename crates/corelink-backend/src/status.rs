//! Device status queries, normalized for the link.
//!
//! The actual device connection (serial, TCP, whatever the hardware speaks)
//! lives behind [`DeviceLink`]; this module only adapts its loose result into
//! the validated [`DeviceStatus`] payload shape.

use corelink_proto::{DeviceStatus, Protocol};

use crate::error::{BackendError, Result};

/// Raw result of a device-link query, before normalization.
///
/// Field types are deliberately loose: the link reports whatever the device
/// said, and normalization decides whether it is usable.
#[derive(Debug, Clone)]
pub struct RawDeviceState {
    pub online: bool,
    pub ip_address: String,
    pub port: u32,
    pub protocol: String,
    pub uptime: i64,
}

/// External collaborator: the actual connection to the managed device.
pub trait DeviceLink {
    /// Query current device state. Failure here means the query itself
    /// failed, which is not the same thing as the device being offline.
    fn query(&mut self) -> Result<RawDeviceState>;
}

/// Normalizes device-link results into `DeviceStatus` payloads.
pub struct StatusService<L> {
    link: L,
}

impl<L: DeviceLink> StatusService<L> {
    pub fn new(link: L) -> Self {
        Self { link }
    }

    /// Fresh status snapshot. Never cached; every call hits the link.
    ///
    /// Link failures propagate as [`BackendError::LinkFailed`], malformed
    /// results as validation errors — neither is ever flattened into a
    /// defaulted `online: false` snapshot.
    pub fn get_status(&mut self) -> Result<DeviceStatus> {
        let raw = self.link.query()?;
        let status = normalize(raw)?;
        tracing::debug!(online = status.online, ip = %status.ip_address, "device status queried");
        Ok(status)
    }
}

fn normalize(raw: RawDeviceState) -> Result<DeviceStatus> {
    let port = u16::try_from(raw.port)
        .map_err(|_| BackendError::Validation(format!("port {} out of range", raw.port)))?;

    let protocol = Protocol::from_name(&raw.protocol)
        .ok_or_else(|| BackendError::Validation(format!("unknown protocol '{}'", raw.protocol)))?;

    let uptime = u64::try_from(raw.uptime)
        .map_err(|_| BackendError::Validation(format!("negative uptime {}", raw.uptime)))?;

    let status = DeviceStatus {
        online: raw.online,
        ip_address: raw.ip_address,
        port,
        protocol,
        uptime,
    };
    status.validate()?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeLink {
        result: std::result::Result<RawDeviceState, String>,
    }

    impl DeviceLink for FakeLink {
        fn query(&mut self) -> Result<RawDeviceState> {
            self.result
                .clone()
                .map_err(BackendError::LinkFailed)
        }
    }

    fn healthy_raw() -> RawDeviceState {
        RawDeviceState {
            online: true,
            ip_address: "192.168.1.100".into(),
            port: 8080,
            protocol: "TCP".into(),
            uptime: 42,
        }
    }

    #[test]
    fn healthy_query_normalizes() {
        let mut service = StatusService::new(FakeLink {
            result: Ok(healthy_raw()),
        });
        let status = service.get_status().unwrap();
        assert!(status.online);
        assert_eq!(status.ip_address, "192.168.1.100");
        assert_eq!(status.port, 8080);
        assert_eq!(status.protocol, Protocol::Tcp);
        assert_eq!(status.uptime, 42);
    }

    #[test]
    fn offline_device_is_not_a_failure() {
        let mut raw = healthy_raw();
        raw.online = false;
        let mut service = StatusService::new(FakeLink { result: Ok(raw) });

        let status = service.get_status().unwrap();
        assert!(!status.online);
    }

    #[test]
    fn link_failure_is_distinguishable_from_offline() {
        let mut service = StatusService::new(FakeLink {
            result: Err("serial timeout".into()),
        });
        let err = service.get_status().unwrap_err();
        assert!(matches!(err, BackendError::LinkFailed(msg) if msg == "serial timeout"));
    }

    #[test]
    fn out_of_range_port_is_a_validation_error() {
        let mut raw = healthy_raw();
        raw.port = 70000;
        let mut service = StatusService::new(FakeLink { result: Ok(raw) });
        assert!(matches!(
            service.get_status(),
            Err(BackendError::Validation(_))
        ));
    }

    #[test]
    fn unknown_protocol_is_a_validation_error() {
        let mut raw = healthy_raw();
        raw.protocol = "SCTP".into();
        let mut service = StatusService::new(FakeLink { result: Ok(raw) });
        assert!(matches!(
            service.get_status(),
            Err(BackendError::Validation(_))
        ));
    }

    #[test]
    fn negative_uptime_is_a_validation_error() {
        let mut raw = healthy_raw();
        raw.uptime = -1;
        let mut service = StatusService::new(FakeLink { result: Ok(raw) });
        assert!(matches!(
            service.get_status(),
            Err(BackendError::Validation(_))
        ));
    }

    #[test]
    fn bad_ip_literal_is_a_validation_error() {
        let mut raw = healthy_raw();
        raw.ip_address = "core.local".into();
        let mut service = StatusService::new(FakeLink { result: Ok(raw) });
        assert!(service.get_status().is_err());
    }
}
