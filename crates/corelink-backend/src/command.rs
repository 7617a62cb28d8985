//! Commands issued from the backend to the core.

use corelink_proto::{Packet, PacketSink};
use serde_json::Value;

use crate::error::Result;

/// Builds and sends `CMD:*` packets with generated correlation ids.
///
/// Correlation ids are `cfg-<pid>-<seq>`: unique within one backend process,
/// and enough to tie a later reply back to the exchange that caused it.
pub struct CommandIssuer {
    pid: u32,
    next_seq: u64,
}

impl CommandIssuer {
    pub fn new() -> Self {
        Self {
            pid: std::process::id(),
            next_seq: 0,
        }
    }

    /// Build a `CMD:UPDATE_CONFIG` packet for an opaque validated config.
    pub fn update_config(&mut self, config: &Value) -> Packet {
        let correlation_id = self.next_correlation_id();
        tracing::info!(%correlation_id, "issuing CMD:UPDATE_CONFIG");
        Packet::update_config(config, correlation_id)
    }

    /// Build and immediately send a config update.
    pub fn send_update_config(
        &mut self,
        sink: &mut impl PacketSink,
        config: &Value,
    ) -> Result<String> {
        let packet = self.update_config(config);
        let correlation_id = packet.correlation_id.clone().unwrap_or_default();
        sink.send_packet(&packet)?;
        Ok(correlation_id)
    }

    fn next_correlation_id(&mut self) -> String {
        let seq = self.next_seq;
        self.next_seq += 1;
        format!("cfg-{}-{}", self.pid, seq)
    }
}

impl Default for CommandIssuer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use corelink_proto::MessageType;

    use super::*;

    #[derive(Default)]
    struct VecSink {
        sent: Vec<Packet>,
    }

    impl PacketSink for VecSink {
        fn send_packet(&mut self, packet: &Packet) -> corelink_proto::Result<()> {
            self.sent.push(packet.clone());
            Ok(())
        }
    }

    #[test]
    fn update_config_packets_are_correlated_and_unique() {
        let mut issuer = CommandIssuer::new();
        let config = serde_json::json!({"port": 9000});

        let first = issuer.update_config(&config);
        let second = issuer.update_config(&config);

        assert_eq!(first.msg_type, MessageType::CmdUpdateConfig);
        assert_eq!(first.payload.as_ref(), Some(&config));
        assert!(first.correlation_id.is_some());
        assert_ne!(first.correlation_id, second.correlation_id);
    }

    #[test]
    fn send_returns_the_correlation_id() {
        let mut issuer = CommandIssuer::new();
        let mut sink = VecSink::default();
        let config = serde_json::json!({"protocol": "UDP"});

        let correlation_id = issuer.send_update_config(&mut sink, &config).unwrap();
        assert_eq!(
            sink.sent[0].correlation_id.as_deref(),
            Some(correlation_id.as_str())
        );
    }
}
