//! Core-side lifecycle and status reporting.
//!
//! One reporter instance exists per core process and exclusively owns the
//! outbound half of the transport; no other component writes frames directly,
//! which is what keeps frames from interleaving.

use std::time::{Duration, Instant};

use corelink_proto::{DeviceStatus, ErrorReport, Packet, PacketSink, ProtoError};

use crate::error::{EmitError, Result};
use crate::queue::{Enqueue, OutboundQueue};
use crate::schedule::StatusSchedule;

/// Retry attempts (beyond the first) for P0 and terminal packets.
pub const DEFAULT_CRITICAL_RETRIES: usize = 3;

/// Reporter lifecycle state.
///
/// `Uninitialized -> Running` on the first `send_ready`, `Running -> Stopped`
/// on `send_stopped`. `Stopped` is terminal: a stopped reporter rejects every
/// further send as an ordering violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReporterState {
    Uninitialized,
    Running,
    Stopped,
}

/// Emits lifecycle, status and error packets for the core process.
pub struct StatusReporter<S> {
    sink: S,
    queue: OutboundQueue,
    state: ReporterState,
    started: Option<Instant>,
    schedule: Option<StatusSchedule>,
    critical_retries: usize,
}

impl<S: PacketSink> StatusReporter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            queue: OutboundQueue::new(),
            state: ReporterState::Uninitialized,
            started: None,
            schedule: None,
            critical_retries: DEFAULT_CRITICAL_RETRIES,
        }
    }

    /// Replace the default outbound queue (capacity tuning in tests/embedders).
    pub fn with_queue(mut self, queue: OutboundQueue) -> Self {
        self.queue = queue;
        self
    }

    pub fn state(&self) -> ReporterState {
        self.state
    }

    /// The underlying sink, for traffic that rides the same channel but is
    /// produced elsewhere (forwarded logs, mainly).
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Queued-but-unsent packet count.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Packets dropped under backpressure since construction.
    pub fn dropped(&self) -> u64 {
        self.queue.dropped()
    }

    /// Enable timer-driven status reporting at a fixed interval.
    pub fn set_status_interval(&mut self, interval: Duration) {
        self.schedule = Some(StatusSchedule::new(interval));
    }

    /// True when a periodic status report is due. Always false once stopped
    /// (the schedule is cancelled) or when no interval was configured.
    pub fn status_due(&mut self, now: Instant) -> bool {
        match self.schedule.as_mut() {
            Some(schedule) => schedule.due(now),
            None => false,
        }
    }

    /// Emit `CORE:READY` and start the uptime clock.
    ///
    /// Called once at startup after initialization succeeds. Calling again
    /// while running sends another packet (no deduplication here); calling
    /// after `send_stopped` is an ordering violation.
    pub fn send_ready(&mut self) -> Result<()> {
        if self.state == ReporterState::Stopped {
            return Err(EmitError::OrderingViolation {
                op: "send_ready",
                state: self.state,
            });
        }

        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
        self.sink.send_packet(&Packet::ready())?;
        self.state = ReporterState::Running;
        tracing::info!("core ready, CORE:READY sent");
        Ok(())
    }

    /// Enqueue a `CORE:STATUS_CHANGE` snapshot and flush opportunistically.
    ///
    /// Transport failures during the opportunistic flush leave the packet
    /// queued for the next flush instead of failing the caller; only
    /// snapshot-validation problems surface here.
    pub fn send_status(&mut self, snapshot: &DeviceStatus) -> Result<()> {
        self.ensure_running("send_status")?;

        let packet = Packet::status(snapshot)?;
        if let Enqueue::Evicted(victim) = self.queue.push(packet) {
            tracing::debug!(msg_type = %victim.msg_type, "evicted under backpressure");
        }

        if let Err(err) = self.queue.flush(&mut self.sink) {
            tracing::warn!(error = %err, pending = self.queue.len(), "status flush deferred");
        }
        Ok(())
    }

    /// Emit `CORE:ERROR` on the direct P0 path.
    ///
    /// Never queued and never silently dropped: delivery is retried within
    /// the budget and failure escalates as [`EmitError::CriticalDeliveryFailed`].
    /// Callable from any fault path while the reporter lives, including
    /// during shutdown, but not before `send_ready` or after `send_stopped`.
    /// `CORE:ERROR` is informational; it does not terminate the core.
    pub fn send_error(&mut self, report: &ErrorReport) -> Result<()> {
        self.ensure_running("send_error")?;

        tracing::error!(message = %report.message, code = ?report.code, "core error");
        let packet = Packet::fault(report)?;
        self.send_direct(&packet)
    }

    /// Graceful terminus: drain the queue, emit `CORE:STOPPED`, cancel the
    /// status schedule and enter the terminal state.
    ///
    /// The reporter is `Stopped` afterwards even when delivery fails; the
    /// error still propagates so the process can exit nonzero.
    pub fn send_stopped(&mut self) -> Result<()> {
        self.ensure_running("send_stopped")?;

        let delivered = self.queue.drain_for_shutdown(&mut self.sink);
        tracing::debug!(delivered, remaining = self.queue.len(), "shutdown drain");

        self.schedule = None;
        self.state = ReporterState::Stopped;

        self.send_direct(&Packet::stopped())?;
        tracing::info!("core stopped, CORE:STOPPED sent");
        Ok(())
    }

    /// Flush queued packets in priority order.
    pub fn flush(&mut self) -> Result<usize> {
        let sent = self.queue.flush(&mut self.sink)?;
        Ok(sent)
    }

    /// Time since `send_ready`. Monotonic within one process lifetime;
    /// zero before the reporter has started.
    pub fn uptime(&self) -> Duration {
        self.started.map(|t| t.elapsed()).unwrap_or(Duration::ZERO)
    }

    /// Whole seconds of uptime.
    pub fn uptime_secs(&self) -> u64 {
        self.uptime().as_secs()
    }

    fn ensure_running(&self, op: &'static str) -> Result<()> {
        if self.state != ReporterState::Running {
            return Err(EmitError::OrderingViolation {
                op,
                state: self.state,
            });
        }
        Ok(())
    }

    fn send_direct(&mut self, packet: &Packet) -> Result<()> {
        let attempts = 1 + self.critical_retries;
        let mut last_err: Option<ProtoError> = None;

        for attempt in 0..attempts {
            match self.sink.send_packet(packet) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        attempts,
                        error = %err,
                        msg_type = %packet.msg_type,
                        "direct send failed"
                    );
                    last_err = Some(err);
                }
            }
        }

        Err(EmitError::CriticalDeliveryFailed {
            attempts,
            source: last_err.unwrap_or(ProtoError::ConnectionClosed),
        })
    }
}
