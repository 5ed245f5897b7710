use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use sunflower_frame::{Command, ErrorCode, Frame, OkCode};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
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
struct FrameOutput<'a> {
    command: &'a str,
    opcode: u8,
    data: u32,
    checksum: u8,
    detail: String,
    hex: String,
    port: &'a str,
    timestamp: String,
}

/// Print a received frame. `request` is the command it answers, if any; it
/// decides how an `OK` data word is read.
pub fn print_frame(frame: &Frame, request: Option<Command>, port: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                command: command_name(frame),
                opcode: frame.command,
                data: frame.data,
                checksum: frame.checksum,
                detail: detail(frame, request),
                hex: hex(&frame.to_bytes()),
                port,
                timestamp: now_unix_seconds(),
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
                .set_header(vec!["COMMAND", "DATA", "DETAIL", "BYTES"])
                .add_row(vec![
                    command_name(frame).to_string(),
                    frame.data.to_string(),
                    detail(frame, request),
                    hex(&frame.to_bytes()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{frame} ({}) port={port}", detail(frame, request));
        }
        OutputFormat::Raw => {
            let mut out = std::io::stdout();
            let _ = out.write_all(&frame.to_bytes());
            let _ = out.flush();
        }
    }
}

fn command_name(frame: &Frame) -> &'static str {
    frame.command().map(Command::name).unwrap_or("UNKNOWN")
}

fn detail(frame: &Frame, request: Option<Command>) -> String {
    match frame.command() {
        Some(Command::Ok) if request == Some(Command::GetState) => {
            frame.tracker_state().to_string()
        }
        Some(Command::Ok) => match OkCode::from_data(frame.data) {
            OkCode::Ok => "OK".to_string(),
            OkCode::MotorsStopped => "MOTORS_STOPPED".to_string(),
            OkCode::HomingFinished => "HOMING_FINISHED".to_string(),
            OkCode::Other(value) => value.to_string(),
        },
        Some(Command::Error) => ErrorCode::from_data(frame.data).to_string(),
        _ => String::new(),
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_matches_wire_layout() {
        let frame = Frame::new(Command::GetState, 0);
        assert_eq!(hex(&frame.to_bytes()), "A5 AA AA 03 00 00 00 00 03");
    }

    #[test]
    fn error_detail_names_the_code() {
        let frame = Frame::new(Command::Error, 3);
        assert_eq!(detail(&frame, None), "MOTORS_OUT_OF_RANGE");
        assert_eq!(command_name(&Frame::from_raw(0x42, 0)), "UNKNOWN");
    }

    #[test]
    fn ok_detail_depends_on_request() {
        let frame = Frame::new(Command::Ok, 2);
        assert_eq!(detail(&frame, Some(Command::GetState)), "HOMING");
        assert_eq!(detail(&frame, Some(Command::Home)), "HOMING_FINISHED");
    }
}
