use corelink_proto::ProtoError;

use crate::reporter::ReporterState;

/// Errors raised when emitting events from the core process.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// An operation was called outside the reporter's legal state ordering.
    #[error("{op} called while reporter is {state:?} (protocol ordering violation)")]
    OrderingViolation {
        op: &'static str,
        state: ReporterState,
    },

    /// A P0 event could not be delivered within the retry budget. A dropped
    /// critical event is indistinguishable from whole-system failure, so this
    /// must escalate to the caller instead of being swallowed.
    #[error("critical event not delivered after {attempts} attempts: {source}")]
    CriticalDeliveryFailed {
        attempts: usize,
        #[source]
        source: ProtoError,
    },

    /// Protocol or transport failure below the emit layer.
    #[error(transparent)]
    Proto(#[from] ProtoError),
}

pub type Result<T> = std::result::Result<T, EmitError>;
