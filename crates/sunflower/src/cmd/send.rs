use sunflower_frame::{Command, Frame};
use sunflower_link::Transactor;
use tracing::debug;

use crate::cmd::SendArgs;
use crate::exit::{link_error, CliError, CliResult, FAILURE, SUCCESS, USAGE};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let command = resolve_command(&args.command)?;
    let link = args.port.open()?;

    let result = exchange(&link, command, args.data);
    if let Err(err) = link.close() {
        debug!(error = %err, "close after send failed");
    }
    let response = result.map_err(|err| link_error("send failed", err))?;

    print_frame(&response, Some(command), &args.port.port, format);
    Ok(exit_code(&response))
}

fn resolve_command(input: &str) -> CliResult<Command> {
    Command::parse(input)
        .ok_or_else(|| CliError::new(USAGE, format!("unknown command: {input}")))
}

fn exchange<T: Transactor + ?Sized>(
    link: &T,
    command: Command,
    data: u32,
) -> sunflower_link::Result<Frame> {
    debug!(%command, data, "sending");
    link.request(command, data)
}

/// An answer other than `OK` is reported, then exits non-zero.
fn exit_code(response: &Frame) -> i32 {
    if response.is_ok() {
        SUCCESS
    } else {
        FAILURE
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct MockLink {
        sent: Mutex<Vec<Frame>>,
        reply: Frame,
    }

    impl Transactor for MockLink {
        fn transact(&self, request: &Frame) -> sunflower_link::Result<Frame> {
            self.sent.lock().unwrap().push(*request);
            Ok(self.reply)
        }
    }

    #[test]
    fn resolves_names_and_opcodes() {
        assert_eq!(resolve_command("GET_STATE").unwrap(), Command::GetState);
        assert_eq!(resolve_command("reset-stop").unwrap(), Command::ResetStop);
        assert_eq!(resolve_command("0x06").unwrap(), Command::Home);
        assert_eq!(resolve_command("9").unwrap(), Command::SetMotorL);
    }

    #[test]
    fn unknown_command_is_usage_error() {
        assert_eq!(resolve_command("SPIN").unwrap_err().code, USAGE);
        assert_eq!(resolve_command("0x42").unwrap_err().code, USAGE);
    }

    #[test]
    fn exchange_sends_one_frame() {
        let link = MockLink {
            sent: Mutex::new(Vec::new()),
            reply: Frame::new(Command::Ok, 0),
        };
        let response = exchange(&link, Command::SetMotorR, 250).unwrap();
        assert!(response.is_ok());
        assert_eq!(
            *link.sent.lock().unwrap(),
            vec![Frame::new(Command::SetMotorR, 250)]
        );
    }

    #[test]
    fn error_answer_exits_non_zero() {
        assert_eq!(exit_code(&Frame::new(Command::Ok, 4)), SUCCESS);
        assert_eq!(exit_code(&Frame::new(Command::Error, 1)), FAILURE);
    }
}
