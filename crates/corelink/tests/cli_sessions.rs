#![cfg(unix)]

use std::io::Write;
use std::process::{Command, Output, Stdio};

use corelink_proto::{decode_packet, MessageType, DEFAULT_MAX_BODY};

fn run_emit(extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_corelink"))
        .arg("--log-level")
        .arg("error")
        .arg("emit")
        .args(extra)
        .output()
        .expect("emit should run")
}

fn run_watch_with_input(input: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_corelink"))
        .arg("--log-level")
        .arg("error")
        .arg("--format")
        .arg("json")
        .arg("watch")
        .arg("--quiet")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("watch should spawn");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(input)
        .expect("stdin write should succeed");

    child.wait_with_output().expect("watch should finish")
}

fn decode_all(bytes: &[u8]) -> Vec<MessageType> {
    let mut buf = bytes::BytesMut::from(bytes);
    let mut types = Vec::new();
    while let Some(packet) = decode_packet(&mut buf, DEFAULT_MAX_BODY).expect("stream is valid") {
        types.push(packet.msg_type);
    }
    assert!(buf.is_empty(), "no trailing garbage after the last packet");
    types
}

#[test]
fn emit_produces_a_well_formed_session_stream() {
    let output = run_emit(&["--count", "2"]);
    assert!(output.status.success());

    let types = decode_all(&output.stdout);
    assert_eq!(types.first(), Some(&MessageType::CoreReady));
    assert_eq!(types.last(), Some(&MessageType::CoreStopped));
    assert_eq!(
        types
            .iter()
            .filter(|t| **t == MessageType::CoreStatusChange)
            .count(),
        2
    );
    assert!(types.contains(&MessageType::CoreLog));
}

#[test]
fn watch_reports_a_graceful_shutdown() {
    let emit = run_emit(&["--count", "1"]);
    let watch = run_watch_with_input(&emit.stdout);
    assert!(watch.status.success());

    let summary: serde_json::Value =
        serde_json::from_slice(&watch.stdout).expect("summary should be JSON");
    assert_eq!(summary["session"], "Stopped");
    assert_eq!(summary["recovery"], "AcceptShutdown");
    assert_eq!(summary["ready"], 1);
    assert_eq!(summary["statuses"], 1);
    assert_eq!(summary["stopped"], 1);
}

#[test]
fn watch_counts_errors_without_ending_the_session() {
    let emit = run_emit(&["--count", "1", "--error", "relay stuck"]);
    let watch = run_watch_with_input(&emit.stdout);
    assert!(watch.status.success());

    let summary: serde_json::Value =
        serde_json::from_slice(&watch.stdout).expect("summary should be JSON");
    assert_eq!(summary["errors"], 1);
    assert_eq!(summary["last_error"], "relay stuck");
    assert_eq!(summary["recovery"], "AcceptShutdown");
}

#[test]
fn version_extended_reports_only_known_build_facts() {
    let output = Command::new(env!("CARGO_BIN_EXE_corelink"))
        .arg("version")
        .arg("--extended")
        .output()
        .expect("version should run");
    assert!(output.status.success());

    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("name: corelink"));
    assert!(text.contains(&format!("version: {}", env!("CARGO_PKG_VERSION"))));
    assert!(!text.contains("unknown"));
}

#[test]
fn watch_flags_a_stream_that_never_stopped() {
    // A config packet alone: no READY, no STOPPED, then EOF.
    let send = Command::new(env!("CARGO_BIN_EXE_corelink"))
        .arg("send-config")
        .arg("--config")
        .arg(r#"{"port":9000}"#)
        .output()
        .expect("send-config should run");
    assert!(send.status.success());
    let stderr = String::from_utf8_lossy(&send.stderr);
    assert!(stderr.contains("correlation_id: cfg-"));

    let watch = run_watch_with_input(&send.stdout);
    assert_eq!(watch.status.code(), Some(1));

    let summary: serde_json::Value =
        serde_json::from_slice(&watch.stdout).expect("summary should be JSON");
    assert_eq!(summary["session"], "Broken");
    assert_eq!(summary["recovery"], "RestartCore");
}
