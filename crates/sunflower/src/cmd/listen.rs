use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::cmd::ListenArgs;
use crate::exit::{CliError, CliResult, SUCCESS, TRANSPORT_ERROR};
use crate::output::{print_frame, OutputFormat};

const IDLE_WAIT: Duration = Duration::from_millis(20);

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let link = args.port.open()?;
    info!(port = %args.port.port, "listening");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    let mut lost = false;

    while running.load(Ordering::SeqCst) {
        let Some(frame) = link.poll_unsolicited() else {
            if !link.is_connected() {
                lost = true;
                break;
            }
            thread::sleep(IDLE_WAIT);
            continue;
        };

        print_frame(&frame, None, &args.port.port, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                break;
            }
        }
    }

    if let Err(err) = link.close() {
        warn!(error = %err, "close failed");
    }
    if lost {
        return Err(CliError::new(
            TRANSPORT_ERROR,
            format!("{}: link lost after {printed} frames", args.port.port),
        ));
    }
    Ok(SUCCESS)
}

pub(crate) fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
