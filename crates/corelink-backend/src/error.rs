use corelink_proto::ProtoError;

/// Errors raised on the backend side of the link.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The device link itself failed. Distinct from a healthy link reporting
    /// an offline device; callers must be able to tell the two apart.
    #[error("device link query failed: {0}")]
    LinkFailed(String),

    /// A payload or device-link result failed its expected shape.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Protocol or transport failure below the backend layer.
    #[error(transparent)]
    Proto(#[from] ProtoError),
}

pub type Result<T> = std::result::Result<T, BackendError>;
