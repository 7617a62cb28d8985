//! Bounded, priority-ordered outbound queue for P1–P3 events.
//!
//! P0 events never touch this queue; the reporter sends them on a direct
//! path with their own retry budget. Within one priority level delivery is
//! FIFO; across levels, more urgent entries overtake queued less urgent ones.

use std::collections::VecDeque;

use corelink_proto::{EventPriority, Packet, PacketSink, ProtoError};

/// Default number of in-flight packets before eviction starts.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug)]
struct Entry {
    priority: EventPriority,
    seq: u64,
    packet: Packet,
}

/// Outcome of a push against a bounded queue.
#[derive(Debug)]
pub enum Enqueue {
    /// Accepted; nothing displaced.
    Queued,
    /// Accepted; the returned older, less-urgent packet was evicted.
    Evicted(Packet),
    /// Refused; everything queued is more urgent than the incoming packet.
    Rejected(Packet),
}

/// Bounded priority queue keyed by [`EventPriority`].
#[derive(Debug)]
pub struct OutboundQueue {
    entries: VecDeque<Entry>,
    capacity: usize,
    next_seq: u64,
    dropped: u64,
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
            next_seq: 0,
            dropped: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Packets dropped by eviction or rejection since construction.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Enqueue a packet, evicting under pressure.
    ///
    /// When full, the oldest entry of the least-urgent class present is
    /// evicted, provided the incoming packet is at least as urgent as that
    /// class; otherwise the incoming packet itself is refused. Either way
    /// exactly one packet is dropped per overflow.
    pub fn push(&mut self, packet: Packet) -> Enqueue {
        let priority = packet.priority();
        let mut outcome = Enqueue::Queued;

        if self.entries.len() >= self.capacity {
            let victim_idx = self
                .entries
                .iter()
                .enumerate()
                .max_by_key(|(_, entry)| (entry.priority, std::cmp::Reverse(entry.seq)))
                .map(|(idx, _)| idx);

            match victim_idx {
                Some(idx) if self.entries[idx].priority >= priority => {
                    let victim = self.entries.remove(idx).map(|entry| entry.packet);
                    self.dropped += 1;
                    outcome = match victim {
                        Some(packet) => Enqueue::Evicted(packet),
                        None => Enqueue::Queued,
                    };
                }
                _ => {
                    self.dropped += 1;
                    tracing::debug!(
                        msg_type = %packet.msg_type,
                        priority = packet.priority().label(),
                        "outbound queue full, refusing less urgent packet"
                    );
                    return Enqueue::Rejected(packet);
                }
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push_back(Entry {
            priority,
            seq,
            packet,
        });
        outcome
    }

    /// Flush everything in (priority, arrival) order.
    ///
    /// On a sink failure the unsent remainder (including the packet that
    /// failed) stays queued, and the error propagates.
    pub fn flush(&mut self, sink: &mut impl PacketSink) -> Result<usize, ProtoError> {
        self.sort_pending();
        let mut sent = 0usize;
        while let Some(entry) = self.entries.front() {
            match sink.send_packet(&entry.packet) {
                Ok(()) => {
                    self.entries.pop_front();
                    sent += 1;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(sent)
    }

    /// Best-effort drain for shutdown.
    ///
    /// P3 entries that fail to send are dropped; a failure on anything more
    /// urgent aborts the drain with the remainder still queued. Returns the
    /// number of packets delivered.
    pub fn drain_for_shutdown(&mut self, sink: &mut impl PacketSink) -> usize {
        self.sort_pending();
        let mut sent = 0usize;
        while let Some(entry) = self.entries.front() {
            match sink.send_packet(&entry.packet) {
                Ok(()) => {
                    self.entries.pop_front();
                    sent += 1;
                }
                Err(err) if entry.priority == EventPriority::Low => {
                    tracing::debug!(error = %err, "dropping routine packet during shutdown drain");
                    self.entries.pop_front();
                    self.dropped += 1;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "shutdown drain aborted, packets left queued");
                    break;
                }
            }
        }
        sent
    }

    fn sort_pending(&mut self) {
        self.entries
            .make_contiguous()
            .sort_unstable_by_key(|entry| (entry.priority, entry.seq));
    }
}

impl Default for OutboundQueue {
    fn default() -> Self {
        Self::new()
    }
}
