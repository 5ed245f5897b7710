mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "sunflower", version, about = "Sunflower tracker serial link CLI")]
struct Cli {
    /// Output format for received frames.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "sunflower",
            "send",
            "/dev/ttyUSB0",
            "SET_MOTOR_L",
            "--data",
            "120",
        ])
        .expect("send args should parse");

        let Command::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert_eq!(args.port.port, "/dev/ttyUSB0");
        assert_eq!(args.command, "SET_MOTOR_L");
        assert_eq!(args.data, 120);
        assert_eq!(args.port.baud, 115_200);
    }

    #[test]
    fn parses_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "sunflower",
            "run",
            "COM3",
            "--baud",
            "57600",
            "--poll-interval",
            "100ms",
            "--deadzone",
            "0.2",
            "--log-format",
            "json",
        ])
        .expect("run args should parse");

        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.port.baud, 57_600);
        assert_eq!(args.poll_interval, "100ms");
        assert_eq!(args.deadzone, 0.2);
        assert_eq!(args.multiplier, 50);
        assert!(matches!(cli.log_format, LogFormat::Json));
    }

    #[test]
    fn parses_listen_count() {
        let cli = Cli::try_parse_from(["sunflower", "listen", "/dev/ttyACM0", "--count", "3"])
            .expect("listen args should parse");
        assert!(matches!(cli.command, Command::Listen(ref a) if a.count == Some(3)));
    }

    #[test]
    fn rejects_non_numeric_data() {
        let err = Cli::try_parse_from([
            "sunflower",
            "send",
            "/dev/ttyUSB0",
            "HOME",
            "--data",
            "lots",
        ])
        .expect_err("bad data should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
