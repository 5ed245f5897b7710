//! The polling control loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use sunflower_frame::{Command, Frame, TrackerState};
use sunflower_link::Transactor;
use tracing::{debug, error, info, warn};

use crate::config::ControlConfig;
use crate::error::Result;
use crate::feedback::{Feedback, OperatorOutput};
use crate::operator::OperatorHandle;
use crate::position::{Position, PositionAccumulator};
use crate::safety::SafetyHandlers;
use crate::steering::OperatorTarget;

/// Result of one [`ControlLoop::run_cycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// `GET_STATE` timed out.
    PollFailed,
    /// `GET_STATE` was answered with something other than `OK`.
    Anomaly(Frame),
    /// The tracker is busy; no motor command was sent.
    Observed(TrackerState),
    /// The tracker was idle and the full motor batch was acknowledged.
    Moved(Position),
    /// The motor batch stopped at `failed`.
    BatchAborted { position: Position, failed: Command },
}

/// Why [`ControlLoop::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopRequested,
    OperatorDisconnected,
}

/// Polls the tracker and steers it from operator input while it is idle.
pub struct ControlLoop {
    link: Arc<dyn Transactor>,
    feedback: Feedback,
    safety: Arc<SafetyHandlers>,
    target: Arc<OperatorTarget>,
    stop: Arc<AtomicBool>,
    positions: PositionAccumulator,
    last_state: Option<TrackerState>,
    config: ControlConfig,
}

impl ControlLoop {
    pub fn new(
        link: Arc<dyn Transactor>,
        output: Arc<dyn OperatorOutput>,
        config: ControlConfig,
    ) -> Self {
        let feedback = Feedback::new(output);
        let safety = Arc::new(SafetyHandlers::new(
            Arc::clone(&link),
            feedback.clone(),
            config.clone(),
        ));
        Self {
            link,
            feedback,
            safety,
            target: Arc::new(OperatorTarget::new()),
            stop: Arc::new(AtomicBool::new(false)),
            positions: PositionAccumulator::new(config.position_min, config.position_max),
            last_state: None,
            config,
        }
    }

    /// Handle for delivering operator input to this loop.
    pub fn operator(&self) -> OperatorHandle {
        OperatorHandle::new(
            Arc::clone(&self.target),
            Arc::clone(&self.safety),
            Arc::clone(&self.stop),
            self.config.deadzone_width,
        )
    }

    /// Last commanded motor setpoint.
    pub fn positions(&self) -> Position {
        self.positions.position()
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Run one poll cycle.
    ///
    /// Timeouts and non-`OK` answers are reported in the outcome; only a lost
    /// link is an error.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let response = match self.link.request(Command::GetState, 0) {
            Ok(response) => response,
            Err(err) if err.is_transaction_failure() => {
                warn!(error = %err, "state poll failed, skipping cycle");
                return Ok(CycleOutcome::PollFailed);
            }
            Err(err) => return Err(err.into()),
        };

        if !response.is_ok() {
            warn!(%response, "unexpected answer to state poll, skipping cycle");
            return Ok(CycleOutcome::Anomaly(response));
        }

        let state = response.tracker_state();
        if self.last_state != Some(state) {
            info!(%state, "tracker state changed");
            self.last_state = Some(state);
        }
        self.feedback.display_state(state);

        if state != TrackerState::Idle {
            return Ok(CycleOutcome::Observed(state));
        }
        self.drive()
    }

    /// Run cycles until the operator stops or disconnects.
    ///
    /// The link is closed and any alert cancelled on every exit path.
    pub fn run(&mut self) -> Result<ExitReason> {
        info!(
            poll_ms = self.config.poll_interval.as_millis() as u64,
            "control loop started"
        );
        let result = self.run_until_stopped();
        self.feedback.cancel_alert();
        if let Err(err) = self.link.close() {
            warn!(error = %err, "closing link failed");
        }
        match &result {
            Ok(reason) => info!(?reason, "control loop finished"),
            Err(err) => error!(error = %err, "control loop aborted"),
        }
        result
    }

    fn run_until_stopped(&mut self) -> Result<ExitReason> {
        loop {
            // A link lost under an operator command outranks a stop request.
            if let Some(err) = self.safety.take_link_lost() {
                return Err(err.into());
            }
            if self.stop.load(Ordering::SeqCst) {
                return Ok(ExitReason::StopRequested);
            }
            if !self.feedback.is_connected() {
                return Ok(ExitReason::OperatorDisconnected);
            }

            let started = Instant::now();
            let outcome = self.run_cycle()?;
            debug!(?outcome, "cycle");

            if let Some(rest) = self.config.poll_interval.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }
    }

    fn drive(&mut self) -> Result<CycleOutcome> {
        let (left, right) = self.target.get();
        let position = self
            .positions
            .integrate(left, right, self.config.multiplier);

        // Positions are sent as their two's-complement bit pattern.
        let batch = [
            (Command::HaltTracking, 0),
            (Command::SetMotorL, position.left as u32),
            (Command::SetMotorR, position.right as u32),
            (Command::StartTracking, 0),
        ];

        for (command, data) in batch {
            match self.link.request_ok(command, data) {
                Ok(_) => {}
                Err(err) if err.is_transaction_failure() => {
                    warn!(%command, error = %err, "motor batch aborted");
                    self.feedback.alert(self.config.alert_duration);
                    return Ok(CycleOutcome::BatchAborted {
                        position,
                        failed: command,
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }

        debug!(left = position.left, right = position.right, "motors set");
        Ok(CycleOutcome::Moved(position))
    }
}

impl std::fmt::Debug for ControlLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlLoop")
            .field("positions", &self.positions.position())
            .field("last_state", &self.last_state)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
