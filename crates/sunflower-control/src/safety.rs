//! Out-of-band commands triggered by the operator.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use sunflower_frame::{Command, Frame, TrackingMode};
use sunflower_link::{LinkError, Transactor};
use tracing::{debug, error, info, warn};

use crate::config::ControlConfig;
use crate::error::{ControlError, Result};
use crate::feedback::Feedback;

/// What happened to an operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Sent, and the tracker answered.
    Accepted,
    /// Sent, but timed out or was not acknowledged. The alert was raised.
    Failed,
    /// Not sent: a local precondition did not hold.
    Suppressed,
}

/// Stop, stop-release, homing and mode commands.
///
/// Handlers may be called from any thread; the link keeps them from
/// interleaving with the control loop's own transactions.
pub struct SafetyHandlers {
    link: Arc<dyn Transactor>,
    feedback: Feedback,
    config: ControlConfig,
    homing_pressed_at: Mutex<Option<Instant>>,
    link_lost: Mutex<Option<LinkError>>,
}

impl SafetyHandlers {
    pub fn new(link: Arc<dyn Transactor>, feedback: Feedback, config: ControlConfig) -> Self {
        Self {
            link,
            feedback,
            config,
            homing_pressed_at: Mutex::new(None),
            link_lost: Mutex::new(None),
        }
    }

    /// Send `STOP`. Any answer counts; a timeout is logged.
    pub fn emergency_stop(&self) -> Result<CommandOutcome> {
        info!("emergency stop");
        match self.link.request(Command::Stop, 0) {
            Ok(response) => {
                debug!(%response, "stop answered");
                Ok(CommandOutcome::Accepted)
            }
            Err(err) if err.is_transaction_failure() => {
                warn!(error = %err, "stop not answered");
                Ok(CommandOutcome::Failed)
            }
            Err(err) => Err(self.link_failed(err)),
        }
    }

    /// Send `RESET_STOP` if the arm input is held past the threshold.
    pub fn release_stop(&self, arm: f32) -> Result<CommandOutcome> {
        // NaN fails the comparison and stays suppressed.
        if !(arm >= self.config.arm_threshold) {
            info!(
                arm,
                threshold = self.config.arm_threshold,
                "stop release ignored, arm input not held"
            );
            return Ok(CommandOutcome::Suppressed);
        }
        let result = self.link.request_ok(Command::ResetStop, 0);
        self.settle(Command::ResetStop, result)
    }

    /// Record the start of a homing hold.
    pub fn homing_pressed(&self, at: Instant) {
        *self.homing_slot() = Some(at);
    }

    /// End a homing hold; sends `HOME` if it lasted longer than the
    /// configured hold.
    pub fn homing_released(&self, at: Instant) -> Result<CommandOutcome> {
        let Some(pressed) = self.homing_slot().take() else {
            return Ok(CommandOutcome::Suppressed);
        };
        let held = at.saturating_duration_since(pressed);
        if held <= self.config.homing_hold {
            debug!(held_ms = held.as_millis() as u64, "homing hold too short");
            return Ok(CommandOutcome::Suppressed);
        }
        info!(held_ms = held.as_millis() as u64, "homing requested");
        let result = self.link.request_ok(Command::Home, 0);
        self.settle(Command::Home, result)
    }

    /// Switch the tracking mode and show it on the player LEDs.
    pub fn set_tracking_mode(&self, mode: TrackingMode) -> Result<CommandOutcome> {
        let result = self
            .link
            .request_ok(Command::SetTrackingMode, mode.as_data());
        let outcome = self.settle(Command::SetTrackingMode, result)?;
        if outcome == CommandOutcome::Accepted {
            info!(%mode, "tracking mode set");
            self.feedback.display_mode(mode);
        }
        Ok(outcome)
    }

    fn settle(
        &self,
        command: Command,
        result: sunflower_link::Result<Frame>,
    ) -> Result<CommandOutcome> {
        match result {
            Ok(_) => Ok(CommandOutcome::Accepted),
            Err(err) if err.is_transaction_failure() => {
                warn!(%command, error = %err, "operator command failed");
                self.feedback.alert(self.config.alert_duration);
                Ok(CommandOutcome::Failed)
            }
            Err(err) => Err(self.link_failed(err)),
        }
    }

    /// The link error an operator command ran into, if the link died under
    /// one. The control loop ends with it.
    pub(crate) fn take_link_lost(&self) -> Option<LinkError> {
        self.link_lost
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    fn link_failed(&self, err: LinkError) -> ControlError {
        error!(error = %err, "link lost during operator command");
        let mut slot = self
            .link_lost
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if slot.is_none() {
            *slot = Some(LinkError::Disconnected(err.to_string()));
        }
        ControlError::Link(err)
    }

    fn homing_slot(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        self.homing_pressed_at
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for SafetyHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafetyHandlers")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
