//! Test doubles for the link and the operator device.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use sunflower_frame::{Command, ErrorCode, Frame};
use sunflower_link::{LinkError, Transactor};

use crate::feedback::{LedPattern, OperatorOutput, Rgb};

/// Scripted answer for one transaction.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Reply {
    Frame(Frame),
    Timeout,
    Disconnected,
}

impl Reply {
    pub(crate) fn ok(data: u32) -> Self {
        Reply::Frame(Frame::new(Command::Ok, data))
    }

    pub(crate) fn error(code: ErrorCode) -> Self {
        Reply::Frame(Frame::new(Command::Error, code.as_data()))
    }
}

/// Transactor that answers from a script and records every request.
///
/// Once the script runs out every request is answered with `OK`.
#[derive(Default)]
pub(crate) struct ScriptedLink {
    replies: Mutex<VecDeque<Reply>>,
    sent: Mutex<Vec<Frame>>,
    closed: AtomicBool,
}

impl ScriptedLink {
    pub(crate) fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    pub(crate) fn sent(&self) -> Vec<(Command, u32)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|f| (f.command().unwrap(), f.data))
            .collect()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Transactor for ScriptedLink {
    fn transact(&self, request: &Frame) -> sunflower_link::Result<Frame> {
        self.sent.lock().unwrap().push(*request);
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Frame(frame)) => Ok(frame),
            Some(Reply::Timeout) => Err(LinkError::ResponseTimeout(Duration::from_secs(15))),
            Some(Reply::Disconnected) => Err(LinkError::Disconnected("port removed".into())),
            None => Ok(Frame::new(Command::Ok, 0)),
        }
    }

    fn close(&self) -> sunflower_link::Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Records every output call.
#[derive(Default)]
pub(crate) struct RecordingOutput {
    pub lightbar: Mutex<Vec<Rgb>>,
    pub leds: Mutex<Vec<LedPattern>>,
    pub rumble: Mutex<Vec<bool>>,
    pub disconnected: AtomicBool,
}

impl RecordingOutput {
    pub(crate) fn rumble_events(&self) -> Vec<bool> {
        self.rumble.lock().unwrap().clone()
    }

    pub(crate) fn rumbling(&self) -> bool {
        self.rumble.lock().unwrap().last().copied().unwrap_or(false)
    }
}

impl OperatorOutput for RecordingOutput {
    fn set_lightbar(&self, color: Rgb) {
        self.lightbar.lock().unwrap().push(color);
    }

    fn set_player_leds(&self, pattern: LedPattern) {
        self.leds.lock().unwrap().push(pattern);
    }

    fn set_rumble(&self, active: bool) {
        self.rumble.lock().unwrap().push(active);
    }

    fn is_connected(&self) -> bool {
        !self.disconnected.load(Ordering::SeqCst)
    }
}
