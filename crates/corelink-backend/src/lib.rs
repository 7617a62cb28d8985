//! Backend-process side of the supervisory link.
//!
//! Receives core lifecycle/status/log packets, tracks where the session
//! stands, exposes device status to the rest of the backend, and issues
//! commands back to the core.

pub mod command;
pub mod dispatcher;
pub mod error;
pub mod session;
pub mod status;

pub use command::CommandIssuer;
pub use dispatcher::{Dispatcher, PacketHandler};
pub use error::{BackendError, Result};
pub use session::{RecoveryAction, SessionState, SessionTracker};
pub use status::{DeviceLink, RawDeviceState, StatusService};
