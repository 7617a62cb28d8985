//! Frame codec and blocking packet streams.
//!
//! Every packet travels as one self-delimited frame:
//!
//! ```text
//! ┌────────────┬─────────────┬──────────────────┐
//! │ Magic (2B) │ Length (4B) │ Body (JSON)      │
//! │ 0x43 0x4C  │ LE          │ Length bytes     │
//! │ "CL"       │             │                  │
//! └────────────┴─────────────┴──────────────────┘
//! ```
//!
//! The transport underneath (pipe, socketpair) is an external collaborator;
//! anything `Read`/`Write` works. No partial frames ever reach user code.

use std::io::{ErrorKind, Read, Write};

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{ProtoError, Result};
use crate::packet::Packet;

/// Frame header: magic (2) + length (4) = 6 bytes.
pub const HEADER_SIZE: usize = 6;

/// Magic bytes: "CL" (0x43 0x4C).
pub const MAGIC: [u8; 2] = [0x43, 0x4C];

/// Default maximum body size: 1 MiB. Supervisory traffic is small; anything
/// bigger is a protocol bug, not a workload.
pub const DEFAULT_MAX_BODY: usize = 1024 * 1024;

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;
const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Wire-level limits.
#[derive(Debug, Clone)]
pub struct WireConfig {
    /// Maximum frame body size in bytes.
    pub max_body_size: usize,
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY,
        }
    }
}

/// Encode a packet into its wire frame.
pub fn encode_packet(packet: &Packet, max_body_size: usize, dst: &mut BytesMut) -> Result<()> {
    let body = serde_json::to_vec(packet)?;
    if body.len() > max_body_size {
        return Err(ProtoError::BodyTooLarge {
            size: body.len(),
            max: max_body_size,
        });
    }
    dst.reserve(HEADER_SIZE + body.len());
    dst.put_slice(&MAGIC);
    dst.put_u32_le(body.len() as u32);
    dst.put_slice(&body);
    Ok(())
}

/// Decode one packet from a buffer.
///
/// Returns `Ok(None)` until the buffer holds a complete frame. On success the
/// frame bytes are consumed from the buffer.
pub fn decode_packet(src: &mut BytesMut, max_body_size: usize) -> Result<Option<Packet>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    if src[0..2] != MAGIC {
        return Err(ProtoError::InvalidMagic);
    }

    let body_len = u32::from_le_bytes(src[2..6].try_into().unwrap()) as usize;
    if body_len > max_body_size {
        return Err(ProtoError::BodyTooLarge {
            size: body_len,
            max: max_body_size,
        });
    }

    if src.len() < HEADER_SIZE + body_len {
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    let body = src.split_to(body_len);
    let packet: Packet = serde_json::from_slice(&body)?;
    Ok(Some(packet))
}

/// Somewhere packets can be sent.
///
/// The seam between protocol components and the transport; reporters,
/// forwarder drains and command issuers all write through this, which keeps
/// them testable against in-memory sinks.
pub trait PacketSink {
    fn send_packet(&mut self, packet: &Packet) -> Result<()>;
}

/// Reads complete packets from any `Read` stream.
///
/// Handles partial reads internally; callers always get whole packets.
pub struct PacketReader<T> {
    inner: T,
    buf: BytesMut,
    config: WireConfig,
}

impl<T: Read> PacketReader<T> {
    /// Create a reader with default limits.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, WireConfig::default())
    }

    /// Create a reader with explicit limits.
    pub fn with_config(inner: T, config: WireConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next packet (blocking).
    ///
    /// Returns `Err(ProtoError::ConnectionClosed)` at EOF.
    pub fn read_packet(&mut self) -> Result<Packet> {
        loop {
            if let Some(packet) = decode_packet(&mut self.buf, self.config.max_body_size)? {
                return Ok(packet);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ProtoError::Io(err)),
            };

            if read == 0 {
                return Err(ProtoError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

/// Writes complete packets to any `Write` stream.
pub struct PacketWriter<T> {
    inner: T,
    buf: BytesMut,
    config: WireConfig,
}

impl<T: Write> PacketWriter<T> {
    /// Create a writer with default limits.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, WireConfig::default())
    }

    /// Create a writer with explicit limits.
    pub fn with_config(inner: T, config: WireConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode and write one packet, then flush.
    pub fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        self.buf.clear();
        encode_packet(packet, self.config.max_body_size, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(ProtoError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(ProtoError::Io(err)),
            }
        }

        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(ProtoError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Write> PacketSink for PacketWriter<T> {
    fn send_packet(&mut self, packet: &Packet) -> Result<()> {
        self.write_packet(packet)
    }
}
