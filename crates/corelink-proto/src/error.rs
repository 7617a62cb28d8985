/// Errors raised by the packet model and wire codec.
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    /// A packet was constructed with a type string outside the closed registry.
    #[error("unregistered message type '{0}'")]
    UnregisteredType(String),

    /// The frame header contains an invalid magic number.
    #[error("invalid frame magic (expected 0x434C \"CL\")")]
    InvalidMagic,

    /// The frame body exceeds the configured maximum size.
    #[error("frame body too large ({size} bytes, max {max})")]
    BodyTooLarge { size: usize, max: usize },

    /// A payload failed its expected shape.
    #[error("invalid {shape} payload: {reason}")]
    InvalidPayload {
        shape: &'static str,
        reason: String,
    },

    /// The stream was closed before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,

    /// An I/O error occurred while reading or writing frames.
    #[error("wire I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The frame body was not valid packet JSON.
    #[error("packet JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProtoError>;
