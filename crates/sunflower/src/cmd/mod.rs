use std::time::Duration;

use clap::{Args, Subcommand};
use sunflower_frame::FrameConfig;
use sunflower_link::{open_with_config, Link, LinkConfig};
use sunflower_transport::{SerialConfig, SerialLink, DEFAULT_BAUD_RATE};

use crate::exit::{link_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod listen;
pub mod run;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the control loop with a console operator on stdin.
    Run(RunArgs),
    /// Send one command and print the response.
    Send(SendArgs),
    /// Print frames the tracker sends on its own.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args),
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Serial endpoint and link settings shared by every command that talks to
/// the tracker.
#[derive(Args, Debug)]
pub struct PortArgs {
    /// Serial port (e.g. /dev/ttyUSB0, COM3).
    #[arg(env = "SUNFLOWER_PORT")]
    pub port: String,
    /// Line speed.
    #[arg(long, env = "SUNFLOWER_BAUD", default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// How long to wait for each response (e.g. 15s, 500ms).
    #[arg(long, default_value = "15s")]
    pub timeout: String,
    /// Do not write the wakeup bytes after opening the port.
    #[arg(long)]
    pub no_wakeup: bool,
    /// Accept frames whatever their first three bytes are.
    #[arg(long)]
    pub no_verify_magic: bool,
}

impl PortArgs {
    pub fn link_config(&self) -> CliResult<LinkConfig> {
        Ok(LinkConfig {
            response_timeout: parse_duration(&self.timeout)?,
            send_wakeup: !self.no_wakeup,
            frame: FrameConfig {
                verify_magic: !self.no_verify_magic,
            },
            ..LinkConfig::default()
        })
    }

    pub fn open(&self) -> CliResult<Link<SerialLink>> {
        let serial = SerialConfig {
            baud_rate: self.baud,
            ..SerialConfig::default()
        };
        let config = self.link_config()?;
        open_with_config(&self.port, &serial, config)
            .map_err(|err| link_error(&format!("open {} failed", self.port), err))
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// State poll cadence.
    #[arg(long, default_value = "250ms")]
    pub poll_interval: String,
    /// Position steps per cycle at full stick deflection.
    #[arg(long, default_value_t = 50)]
    pub multiplier: i32,
    /// Full width of the stick deadzone.
    #[arg(long, default_value_t = 0.4)]
    pub deadzone: f32,
    /// Haptic alert length after a failed command.
    #[arg(long, default_value = "2s")]
    pub alert: String,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Command name (GET_STATE, home, ...) or opcode (3, 0x03).
    pub command: String,
    /// Data word.
    #[arg(long, short = 'd', default_value_t = 0)]
    pub data: u32,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Exit after receiving N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert_eq!(parse_duration("").unwrap_err().code, USAGE);
    }

    #[test]
    fn port_args_map_onto_link_config() {
        let args = PortArgs {
            port: "/dev/ttyUSB0".into(),
            baud: 9600,
            timeout: "500ms".into(),
            no_wakeup: true,
            no_verify_magic: false,
        };
        let config = args.link_config().unwrap();
        assert_eq!(config.response_timeout, Duration::from_millis(500));
        assert!(!config.send_wakeup);
        assert!(config.frame.verify_magic);
        assert!(config.discard_stale);
    }
}
