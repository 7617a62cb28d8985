use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use corelink_proto::Packet;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct PacketOutput<'a> {
    #[serde(rename = "type")]
    msg_type: String,
    priority: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<&'a serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<&'a str>,
}

pub fn print_packet(packet: &Packet, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = PacketOutput {
                msg_type: packet.msg_type.to_string(),
                priority: packet.priority().label(),
                payload: packet.payload.as_ref(),
                error: packet.error.as_deref(),
                correlation_id: packet.correlation_id.as_deref(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "PRIORITY", "CORRELATION", "PAYLOAD"])
                .add_row(vec![
                    packet.msg_type.to_string(),
                    packet.priority().label().to_string(),
                    packet.correlation_id.clone().unwrap_or_else(|| "-".into()),
                    payload_preview(packet),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "type={} priority={} correlation={} payload={}",
                packet.msg_type,
                packet.priority().label(),
                packet.correlation_id.as_deref().unwrap_or("-"),
                payload_preview(packet)
            );
        }
    }
}

fn payload_preview(packet: &Packet) -> String {
    if let Some(error) = &packet.error {
        return format!("error: {error}");
    }
    match &packet.payload {
        Some(value) => serde_json::to_string(value).unwrap_or_else(|_| "<unprintable>".into()),
        None => "-".into(),
    }
}
