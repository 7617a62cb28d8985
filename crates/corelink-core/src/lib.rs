//! Core-process side of the supervisory link.
//!
//! The core owns exactly one [`StatusReporter`] and one [`ForwardingLogger`]
//! per process; together they are the only writers on the transport. Both are
//! plain owned state objects so tests construct as many as they like.

pub mod error;
pub mod forwarder;
pub mod queue;
pub mod reporter;
pub mod schedule;

pub use error::{EmitError, Result};
pub use forwarder::{
    create_forwarding_logger, ForwardingLogger, Logger, TracingLogger, DEFAULT_LOG_QUEUE_CAPACITY,
};
pub use queue::{Enqueue, OutboundQueue, DEFAULT_QUEUE_CAPACITY};
pub use reporter::{ReporterState, StatusReporter, DEFAULT_CRITICAL_RETRIES};
pub use schedule::StatusSchedule;
