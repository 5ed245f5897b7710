use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use sunflower_control::{
    CommandOutcome, ControlConfig, ControlLoop, ExitReason, LedPattern, OperatorHandle,
    OperatorOutput, Rgb,
};
use sunflower_frame::TrackingMode;
use sunflower_link::Transactor;
use tracing::{debug, error, info, warn};

use crate::cmd::{parse_duration, RunArgs};
use crate::exit::{control_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};

pub fn run(args: RunArgs) -> CliResult<i32> {
    let config = ControlConfig {
        poll_interval: parse_duration(&args.poll_interval)?,
        multiplier: args.multiplier,
        deadzone_width: args.deadzone,
        alert_duration: parse_duration(&args.alert)?,
        ..ControlConfig::default()
    };
    let link: Arc<dyn Transactor> = Arc::new(args.port.open()?);
    let output = Arc::new(ConsoleOutput::default());

    let mut control = ControlLoop::new(link, output.clone(), config);
    let operator = control.operator();

    let on_signal = operator.clone();
    ctrlc::set_handler(move || on_signal.request_stop()).map_err(|err| {
        CliError::new(INTERNAL, format!("signal handler setup failed: {err}"))
    })?;

    spawn_console(operator, output)?;
    info!(port = %args.port.port, "operator console ready: stick X Y | stop | release ARM | home SECONDS | mode N | quit");

    match control.run() {
        Ok(ExitReason::StopRequested) | Ok(ExitReason::OperatorDisconnected) => Ok(SUCCESS),
        Err(err) => Err(control_error("control loop failed", err)),
    }
}

/// One line of operator input.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ConsoleCommand {
    Stick { x: f32, y: f32 },
    Stop,
    Release { arm: f32 },
    Home { hold: Duration },
    Mode(TrackingMode),
    Quit,
}

fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("stick", [x, y]) => ConsoleCommand::Stick {
            x: parse_axis(x)?,
            y: parse_axis(y)?,
        },
        ("stop", []) => ConsoleCommand::Stop,
        ("release", [arm]) => ConsoleCommand::Release {
            arm: parse_axis(arm)?,
        },
        ("home", [seconds]) => {
            let seconds: f32 = seconds
                .parse()
                .map_err(|_| format!("invalid hold time: {seconds}"))?;
            let hold = Duration::try_from_secs_f32(seconds)
                .map_err(|_| format!("invalid hold time: {seconds}"))?;
            ConsoleCommand::Home { hold }
        }
        ("mode", [value]) => {
            let mode = value
                .parse::<u32>()
                .ok()
                .and_then(TrackingMode::from_data)
                .ok_or_else(|| format!("unknown tracking mode: {value} (expected 1-5)"))?;
            ConsoleCommand::Mode(mode)
        }
        ("quit" | "exit", []) => ConsoleCommand::Quit,
        _ => return Err(format!("unrecognized input: {}", line.trim())),
    };
    Ok(Some(command))
}

fn parse_axis(input: &str) -> Result<f32, String> {
    match input.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value.clamp(-1.0, 1.0)),
        _ => Err(format!("invalid axis value: {input}")),
    }
}

fn spawn_console(operator: OperatorHandle, output: Arc<ConsoleOutput>) -> CliResult<()> {
    thread::Builder::new()
        .name("sunflower-console".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match parse_line(&line) {
                    Ok(Some(ConsoleCommand::Quit)) => {
                        operator.request_stop();
                        return;
                    }
                    // A dead link is left for the control loop to report.
                    Ok(Some(command)) => {
                        if !dispatch(&operator, command) {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(message) => warn!(code = USAGE, "{message}"),
                }
            }
            info!("operator input closed");
            output.disconnect();
        })
        .map(|_| ())
        .map_err(|err| CliError::new(INTERNAL, format!("console thread failed: {err}")))
}

/// Run one operator command. Returns false once the link is gone.
fn dispatch(operator: &OperatorHandle, command: ConsoleCommand) -> bool {
    let result = match command {
        ConsoleCommand::Stick { x, y } => {
            operator.stick_changed(x, y);
            return true;
        }
        ConsoleCommand::Stop => operator.safety_trigger(),
        ConsoleCommand::Release { arm } => operator.safety_release(arm),
        ConsoleCommand::Home { hold } => {
            operator.homing_pressed();
            thread::sleep(hold);
            operator.homing_released()
        }
        ConsoleCommand::Mode(mode) => operator.set_tracking_mode(mode),
        ConsoleCommand::Quit => return false,
    };
    match result {
        Ok(CommandOutcome::Accepted) => {
            info!(?command, "done");
            true
        }
        Ok(outcome) => {
            info!(?command, ?outcome, "not applied");
            true
        }
        Err(err) => {
            error!(error = %err, "operator command hit a dead link");
            false
        }
    }
}

/// Renders operator feedback as log events.
#[derive(Default)]
struct ConsoleOutput {
    lightbar: Mutex<Option<Rgb>>,
    closed: AtomicBool,
}

impl ConsoleOutput {
    fn disconnect(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl OperatorOutput for ConsoleOutput {
    fn set_lightbar(&self, color: Rgb) {
        let mut last = self
            .lightbar
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *last != Some(color) {
            let Rgb(r, g, b) = color;
            info!(r, g, b, "lightbar");
            *last = Some(color);
        } else {
            debug!("lightbar unchanged");
        }
    }

    fn set_player_leds(&self, pattern: LedPattern) {
        info!(?pattern, "player leds");
    }

    fn set_rumble(&self, active: bool) {
        if active {
            warn!("alert");
        } else {
            debug!("alert off");
        }
    }

    fn is_connected(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use sunflower_frame::Frame;
    use sunflower_link::LinkError;

    use super::*;
    use crate::exit::TRANSPORT_ERROR;

    struct UnpluggedLink;

    impl Transactor for UnpluggedLink {
        fn transact(&self, _request: &Frame) -> sunflower_link::Result<Frame> {
            Err(LinkError::Disconnected("device unplugged".into()))
        }
    }

    #[test]
    fn parses_console_commands() {
        assert_eq!(
            parse_line("stick 0 1").unwrap(),
            Some(ConsoleCommand::Stick { x: 0.0, y: 1.0 })
        );
        assert_eq!(parse_line("STOP").unwrap(), Some(ConsoleCommand::Stop));
        assert_eq!(
            parse_line("release 0.95").unwrap(),
            Some(ConsoleCommand::Release { arm: 0.95 })
        );
        assert_eq!(
            parse_line("home 3.5").unwrap(),
            Some(ConsoleCommand::Home {
                hold: Duration::from_millis(3500)
            })
        );
        assert_eq!(
            parse_line("mode 2").unwrap(),
            Some(ConsoleCommand::Mode(TrackingMode::FullSensor))
        );
        assert_eq!(parse_line("quit").unwrap(), Some(ConsoleCommand::Quit));
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn stick_values_are_clamped() {
        assert_eq!(
            parse_line("stick -4 0.5").unwrap(),
            Some(ConsoleCommand::Stick { x: -1.0, y: 0.5 })
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_line("stick 1").is_err());
        assert!(parse_line("stick nan 0").is_err());
        assert!(parse_line("mode 9").is_err());
        assert!(parse_line("home -1").is_err());
        assert!(parse_line("fly").is_err());
    }

    #[test]
    fn console_output_tracks_disconnect() {
        let output = ConsoleOutput::default();
        assert!(output.is_connected());
        output.disconnect();
        assert!(!output.is_connected());
    }

    #[test]
    fn dead_link_during_command_fails_the_run() {
        let mut control = ControlLoop::new(
            Arc::new(UnpluggedLink),
            Arc::new(ConsoleOutput::default()),
            ControlConfig::default(),
        );
        let operator = control.operator();

        assert!(!dispatch(&operator, ConsoleCommand::Stop));
        assert!(!operator.is_stop_requested());

        let err = control.run().unwrap_err();
        let cli = control_error("control loop failed", err);
        assert_eq!(cli.code, TRANSPORT_ERROR);
    }
}
