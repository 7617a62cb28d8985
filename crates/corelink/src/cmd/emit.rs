use std::io::Write;

use corelink_core::{create_forwarding_logger, Logger, StatusReporter, TracingLogger};
use corelink_proto::{DeviceStatus, ErrorReport, PacketWriter, Protocol};

use crate::cmd::EmitArgs;
use crate::exit::{emit_error, proto_error, CliResult, SUCCESS};

/// Plays one full core session onto stdout so a `watch` process (or any
/// framed-packet consumer) on the other end of a pipe sees realistic traffic.
pub fn run(args: EmitArgs) -> CliResult<i32> {
    let writer = PacketWriter::new(std::io::stdout());
    let mut reporter = StatusReporter::new(writer);
    let mut logger = create_forwarding_logger(TracingLogger);

    reporter
        .send_ready()
        .map_err(|err| emit_error("READY failed", err))?;
    logger.info("core session started");

    for n in 0..args.count {
        let snapshot = DeviceStatus {
            online: true,
            ip_address: args.ip.clone(),
            port: args.port,
            protocol: Protocol::Tcp,
            uptime: reporter.uptime_secs(),
        };
        reporter
            .send_status(&snapshot)
            .map_err(|err| emit_error("status report failed", err))?;
        logger.debug(&format!("status report {} of {}", n + 1, args.count));
    }

    if let Some(message) = &args.error {
        reporter
            .send_error(&ErrorReport::new(message.clone()))
            .map_err(|err| emit_error("error report failed", err))?;
    }

    logger
        .drain(reporter.sink_mut())
        .map_err(|err| emit_error("log forwarding failed", err))?;

    reporter
        .send_stopped()
        .map_err(|err| emit_error("STOPPED failed", err))?;

    std::io::stdout()
        .flush()
        .map_err(|err| proto_error("flush failed", err.into()))?;
    Ok(SUCCESS)
}
