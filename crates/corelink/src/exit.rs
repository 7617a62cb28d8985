use std::fmt;
use std::io;

use corelink_backend::BackendError;
use corelink_core::EmitError;
use corelink_proto::ProtoError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const LINK_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused | io::ErrorKind::BrokenPipe => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn proto_error(context: &str, err: ProtoError) -> CliError {
    match err {
        ProtoError::Io(source) => io_error(context, source),
        ProtoError::InvalidMagic
        | ProtoError::BodyTooLarge { .. }
        | ProtoError::InvalidPayload { .. }
        | ProtoError::Json(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        ProtoError::UnregisteredType(_) => CliError::new(USAGE, format!("{context}: {err}")),
        ProtoError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn emit_error(context: &str, err: EmitError) -> CliError {
    match err {
        EmitError::OrderingViolation { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        EmitError::CriticalDeliveryFailed { .. } => {
            CliError::new(LINK_ERROR, format!("{context}: {err}"))
        }
        EmitError::Proto(err) => proto_error(context, err),
    }
}

pub fn backend_error(context: &str, err: BackendError) -> CliError {
    match err {
        BackendError::LinkFailed(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        BackendError::Validation(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        BackendError::Proto(err) => proto_error(context, err),
    }
}
