//! Shared protocol layer for the core↔backend supervisory link.
//!
//! One crate defines the whole contract both processes compile against:
//! the packet envelope, the closed message-type registry, the event-priority
//! model, payload shapes, and the length-prefixed wire codec.

pub mod error;
pub mod message;
pub mod packet;
pub mod payload;
pub mod priority;
pub mod wire;

pub use error::{ProtoError, Result};
pub use message::{
    MessageType, CMD_UPDATE_CONFIG, CORE_ERROR, CORE_LOG, CORE_READY, CORE_STATUS_CHANGE,
    CORE_STOPPED, REGISTERED_TYPES,
};
pub use packet::Packet;
pub use payload::{DeviceStatus, ErrorReport, LogLevel, LogRecord, Protocol};
pub use priority::EventPriority;
pub use wire::{
    decode_packet, encode_packet, PacketReader, PacketSink, PacketWriter, WireConfig,
    DEFAULT_MAX_BODY, HEADER_SIZE, MAGIC,
};
