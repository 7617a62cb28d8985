use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use corelink_backend::{Dispatcher, PacketHandler, RecoveryAction, SessionState};
use corelink_proto::{DeviceStatus, ErrorReport, LogRecord, PacketReader, ProtoError};
use serde::Serialize;

use crate::cmd::WatchArgs;
use crate::exit::{backend_error, proto_error, CliResult, FAILURE, SUCCESS};
use crate::output::{print_packet, OutputFormat};

#[derive(Default)]
struct Tally {
    ready: usize,
    statuses: usize,
    logs: usize,
    errors: usize,
    stopped: usize,
}

impl PacketHandler for Tally {
    fn on_ready(&mut self) {
        self.ready += 1;
    }
    fn on_error(&mut self, _report: ErrorReport) {
        self.errors += 1;
    }
    fn on_stopped(&mut self) {
        self.stopped += 1;
    }
    fn on_log(&mut self, _record: LogRecord) {
        self.logs += 1;
    }
    fn on_status(&mut self, _status: DeviceStatus) {
        self.statuses += 1;
    }
}

pub fn run(args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    let mut reader = PacketReader::new(std::io::stdin());
    let mut dispatcher = Dispatcher::new(Tally::default());
    let mut seen = 0usize;

    loop {
        let packet = match reader.read_packet() {
            Ok(packet) => packet,
            Err(ProtoError::ConnectionClosed) => {
                dispatcher.channel_closed();
                break;
            }
            Err(err) => return Err(proto_error("read failed", err)),
        };

        if !args.quiet {
            print_packet(&packet, format);
        }

        dispatcher
            .dispatch(packet)
            .map_err(|err| backend_error("dispatch failed", err))?;

        seen += 1;
        if let Some(count) = args.count {
            if seen >= count {
                break;
            }
        }
    }

    let state = dispatcher.session().state();
    let recovery = dispatcher.session().recovery();
    let last_error = dispatcher.session().last_error().map(str::to_string);
    let tally = dispatcher.into_handler();

    print_summary(&tally, seen, state, recovery, last_error.as_deref(), format);

    match recovery {
        RecoveryAction::None | RecoveryAction::AcceptShutdown => Ok(SUCCESS),
        RecoveryAction::RestartCore | RecoveryAction::ReconnectTransport => Ok(FAILURE),
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    packets: usize,
    ready: usize,
    statuses: usize,
    logs: usize,
    errors: usize,
    stopped: usize,
    session: String,
    recovery: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_error: Option<&'a str>,
}

fn print_summary(
    tally: &Tally,
    seen: usize,
    state: SessionState,
    recovery: RecoveryAction,
    last_error: Option<&str>,
    format: OutputFormat,
) {
    let summary = Summary {
        packets: seen,
        ready: tally.ready,
        statuses: tally.statuses,
        logs: tally.logs,
        errors: tally.errors,
        stopped: tally.stopped,
        session: format!("{state:?}"),
        recovery: format!("{recovery:?}"),
        last_error,
    };

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&summary).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PACKETS", "ERRORS", "SESSION", "RECOVERY"])
                .add_row(vec![
                    summary.packets.to_string(),
                    summary.errors.to_string(),
                    summary.session.clone(),
                    summary.recovery.clone(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "packets={} ready={} statuses={} logs={} errors={} stopped={} session={} recovery={}",
                summary.packets,
                summary.ready,
                summary.statuses,
                summary.logs,
                summary.errors,
                summary.stopped,
                summary.session,
                summary.recovery,
            );
        }
    }
}
