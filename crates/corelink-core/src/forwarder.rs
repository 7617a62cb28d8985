//! Log forwarding over the link.
//!
//! `ForwardingLogger` decorates any [`Logger`] implementation: every call is
//! delegated to the base logger first (forwarding is in addition to the local
//! sink, never instead of it), then captured as a [`LogRecord`] for transport.
//! Capture is pure queue work, so a slow or broken channel can never stall a
//! log call. The embedding event loop pumps `drain` to turn queued records
//! into `CORE:LOG` packets.

use std::collections::VecDeque;

use corelink_proto::{LogLevel, LogRecord, Packet, PacketSink, ProtoError};
use serde_json::{Map, Value};

use crate::error::{EmitError, Result};

/// Bounded capacity of the routine (non-error) record queue.
pub const DEFAULT_LOG_QUEUE_CAPACITY: usize = 256;

/// Retry attempts (beyond the first) when draining error-level records.
const CRITICAL_DRAIN_RETRIES: usize = 3;

/// The logging capability set shared by base loggers and the decorator.
pub trait Logger {
    fn debug(&mut self, message: &str);
    fn info(&mut self, message: &str);
    fn warn(&mut self, message: &str);
    fn error(&mut self, message: &str);
}

/// Base logger backed by the `tracing` macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&mut self, message: &str) {
        tracing::debug!("{message}");
    }

    fn info(&mut self, message: &str) {
        tracing::info!("{message}");
    }

    fn warn(&mut self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&mut self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Decorator that captures every log call for forwarding.
pub struct ForwardingLogger<L> {
    base: L,
    /// Error-level records; never dropped, flushed first.
    critical: VecDeque<LogRecord>,
    /// Everything else; bounded, drop-oldest under pressure.
    routine: VecDeque<LogRecord>,
    capacity: usize,
    dropped: u64,
}

/// Wrap a base logger with forwarding, using the default queue capacity.
pub fn create_forwarding_logger<L: Logger>(base: L) -> ForwardingLogger<L> {
    ForwardingLogger::with_capacity(base, DEFAULT_LOG_QUEUE_CAPACITY)
}

impl<L: Logger> ForwardingLogger<L> {
    pub fn with_capacity(base: L, capacity: usize) -> Self {
        Self {
            base,
            critical: VecDeque::new(),
            routine: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    /// Records waiting to be drained.
    pub fn queued(&self) -> usize {
        self.critical.len() + self.routine.len()
    }

    /// Routine records evicted under pressure since construction.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Log with structured context attached to the forwarded record.
    pub fn log_with_context(&mut self, level: LogLevel, message: &str, context: Map<String, Value>) {
        self.delegate(level, message);
        self.capture(LogRecord::new(level, message).with_context(context));
    }

    /// Convert queued records into `CORE:LOG` packets.
    ///
    /// Error-level records go first under the P0 policy: retried within a
    /// budget and escalated on failure with the record still queued. Routine
    /// records are best-effort; the first failure ends the drain and the
    /// remainder stays queued for the next pump. Returns packets delivered.
    pub fn drain(&mut self, sink: &mut impl PacketSink) -> Result<usize> {
        let mut sent = 0usize;

        while let Some(record) = self.critical.front() {
            let packet = Packet::log(record)?;
            send_with_retries(sink, &packet)?;
            self.critical.pop_front();
            sent += 1;
        }

        while let Some(record) = self.routine.front() {
            let packet = Packet::log(record)?;
            if let Err(err) = sink.send_packet(&packet) {
                tracing::debug!(error = %err, remaining = self.routine.len(), "log drain deferred");
                break;
            }
            self.routine.pop_front();
            sent += 1;
        }

        Ok(sent)
    }

    /// Borrow the wrapped base logger.
    pub fn base(&self) -> &L {
        &self.base
    }

    fn delegate(&mut self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => self.base.debug(message),
            LogLevel::Info => self.base.info(message),
            LogLevel::Warn => self.base.warn(message),
            LogLevel::Error => self.base.error(message),
        }
    }

    fn capture(&mut self, record: LogRecord) {
        if record.level == LogLevel::Error {
            self.critical.push_back(record);
            return;
        }

        if self.routine.len() >= self.capacity {
            self.routine.pop_front();
            self.dropped += 1;
        }
        self.routine.push_back(record);
    }
}

impl<L: Logger> Logger for ForwardingLogger<L> {
    fn debug(&mut self, message: &str) {
        self.delegate(LogLevel::Debug, message);
        self.capture(LogRecord::new(LogLevel::Debug, message));
    }

    fn info(&mut self, message: &str) {
        self.delegate(LogLevel::Info, message);
        self.capture(LogRecord::new(LogLevel::Info, message));
    }

    fn warn(&mut self, message: &str) {
        self.delegate(LogLevel::Warn, message);
        self.capture(LogRecord::new(LogLevel::Warn, message));
    }

    fn error(&mut self, message: &str) {
        self.delegate(LogLevel::Error, message);
        self.capture(LogRecord::new(LogLevel::Error, message));
    }
}

fn send_with_retries(sink: &mut impl PacketSink, packet: &Packet) -> Result<()> {
    let attempts = 1 + CRITICAL_DRAIN_RETRIES;
    let mut last_err: Option<ProtoError> = None;

    for _ in 0..attempts {
        match sink.send_packet(packet) {
            Ok(()) => return Ok(()),
            Err(err) => last_err = Some(err),
        }
    }

    Err(EmitError::CriticalDeliveryFailed {
        attempts,
        source: last_err.unwrap_or(ProtoError::ConnectionClosed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Base logger that records which capability was invoked.
    #[derive(Default)]
    struct RecordingLogger {
        calls: Vec<(LogLevel, String)>,
    }

    impl Logger for RecordingLogger {
        fn debug(&mut self, message: &str) {
            self.calls.push((LogLevel::Debug, message.to_string()));
        }
        fn info(&mut self, message: &str) {
            self.calls.push((LogLevel::Info, message.to_string()));
        }
        fn warn(&mut self, message: &str) {
            self.calls.push((LogLevel::Warn, message.to_string()));
        }
        fn error(&mut self, message: &str) {
            self.calls.push((LogLevel::Error, message.to_string()));
        }
    }

    #[derive(Default)]
    struct VecSink {
        sent: Vec<Packet>,
        fail_remaining: usize,
    }

    impl PacketSink for VecSink {
        fn send_packet(&mut self, packet: &Packet) -> corelink_proto::Result<()> {
            if self.fail_remaining > 0 {
                self.fail_remaining -= 1;
                return Err(ProtoError::ConnectionClosed);
            }
            self.sent.push(packet.clone());
            Ok(())
        }
    }

    #[test]
    fn every_call_reaches_the_base_logger_first() {
        let mut logger = create_forwarding_logger(RecordingLogger::default());
        logger.debug("d");
        logger.info("i");
        logger.warn("w");
        logger.error("e");

        let calls = &logger.base().calls;
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0], (LogLevel::Debug, "d".to_string()));
        assert_eq!(calls[3], (LogLevel::Error, "e".to_string()));
        assert_eq!(logger.queued(), 4);
    }

    #[test]
    fn drain_produces_log_packets_with_payload() {
        let mut logger = create_forwarding_logger(RecordingLogger::default());
        logger.info("starting up");

        let mut sink = VecSink::default();
        assert_eq!(logger.drain(&mut sink).unwrap(), 1);

        let packet = &sink.sent[0];
        assert_eq!(packet.msg_type.as_str(), "CORE:LOG");
        let record = LogRecord::from_value(packet.payload.as_ref().unwrap()).unwrap();
        assert_eq!(record.level, LogLevel::Info);
        assert_eq!(record.message, "starting up");
    }

    #[test]
    fn overflow_evicts_exactly_one_oldest_record() {
        let capacity = 4;
        let mut logger = ForwardingLogger::with_capacity(RecordingLogger::default(), capacity);
        for i in 0..capacity + 1 {
            logger.info(&format!("msg-{i}"));
        }

        assert_eq!(logger.queued(), capacity);
        assert_eq!(logger.dropped(), 1);

        let mut sink = VecSink::default();
        logger.drain(&mut sink).unwrap();
        let first = LogRecord::from_value(sink.sent[0].payload.as_ref().unwrap()).unwrap();
        assert_eq!(first.message, "msg-1");
    }

    #[test]
    fn error_records_are_never_evicted() {
        let mut logger = ForwardingLogger::with_capacity(RecordingLogger::default(), 2);
        logger.error("critical-1");
        for i in 0..10 {
            logger.info(&format!("noise-{i}"));
        }
        logger.error("critical-2");

        // 2 critical + 2 routine survive.
        assert_eq!(logger.queued(), 4);
        assert_eq!(logger.dropped(), 8);

        let mut sink = VecSink::default();
        logger.drain(&mut sink).unwrap();
        let first = LogRecord::from_value(sink.sent[0].payload.as_ref().unwrap()).unwrap();
        let second = LogRecord::from_value(sink.sent[1].payload.as_ref().unwrap()).unwrap();
        assert_eq!(first.message, "critical-1");
        assert_eq!(second.message, "critical-2");
    }

    #[test]
    fn routine_drain_failure_is_deferred_not_fatal() {
        let mut logger = create_forwarding_logger(RecordingLogger::default());
        logger.info("kept");

        let mut sink = VecSink {
            fail_remaining: usize::MAX,
            ..VecSink::default()
        };
        assert_eq!(logger.drain(&mut sink).unwrap(), 0);
        assert_eq!(logger.queued(), 1);
    }

    #[test]
    fn critical_drain_failure_escalates() {
        let mut logger = create_forwarding_logger(RecordingLogger::default());
        logger.error("must deliver");

        let mut sink = VecSink {
            fail_remaining: usize::MAX,
            ..VecSink::default()
        };
        let err = logger.drain(&mut sink).unwrap_err();
        assert!(matches!(err, EmitError::CriticalDeliveryFailed { .. }));
        // The record survives for the next attempt.
        assert_eq!(logger.queued(), 1);
    }

    #[test]
    fn critical_drain_retries_through_transient_failures() {
        let mut logger = create_forwarding_logger(RecordingLogger::default());
        logger.error("flaky path");

        let mut sink = VecSink {
            fail_remaining: 2,
            ..VecSink::default()
        };
        assert_eq!(logger.drain(&mut sink).unwrap(), 1);
        assert_eq!(logger.queued(), 0);
    }

    #[test]
    fn context_rides_with_the_record() {
        let mut logger = create_forwarding_logger(RecordingLogger::default());
        let mut context = Map::new();
        context.insert("module".to_string(), Value::from("relay"));
        logger.log_with_context(LogLevel::Warn, "relay slow", context);

        let mut sink = VecSink::default();
        logger.drain(&mut sink).unwrap();
        let record = LogRecord::from_value(sink.sent[0].payload.as_ref().unwrap()).unwrap();
        assert_eq!(record.context.unwrap()["module"], "relay");
        assert_eq!(logger.base().calls[0].1, "relay slow");
    }
}
