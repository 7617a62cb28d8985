use std::io::Write;

use corelink_backend::CommandIssuer;
use corelink_proto::{PacketSink, PacketWriter};

use crate::cmd::SendConfigArgs;
use crate::exit::{io_error, proto_error, CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: SendConfigArgs) -> CliResult<i32> {
    let raw = match (&args.config, &args.file) {
        (Some(inline), None) => inline.clone(),
        (None, Some(path)) => {
            std::fs::read_to_string(path).map_err(|err| io_error("read config file", err))?
        }
        _ => return Err(CliError::new(USAGE, "provide --config or --file")),
    };

    let config: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|err| CliError::new(USAGE, format!("config is not valid JSON: {err}")))?;

    let mut writer = PacketWriter::new(std::io::stdout());
    let mut issuer = CommandIssuer::new();
    let packet = issuer.update_config(&config);

    writer
        .send_packet(&packet)
        .map_err(|err| proto_error("write failed", err))?;
    std::io::stdout()
        .flush()
        .map_err(|err| io_error("flush failed", err))?;

    // Correlation id goes to stderr so stdout stays a clean packet stream.
    if let Some(correlation_id) = &packet.correlation_id {
        eprintln!("correlation_id: {correlation_id}");
    }

    Ok(SUCCESS)
}
