use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use sunflower_frame::TrackingMode;
use tracing::{info, trace};

use crate::error::Result;
use crate::safety::{CommandOutcome, SafetyHandlers};
use crate::steering::{mix, OperatorTarget};

/// Entry points for operator input events.
///
/// Cloned into whatever thread delivers input (a controller callback, a
/// console reader). Stick events only update the shared target; the other
/// events run their command on the calling thread.
#[derive(Clone)]
pub struct OperatorHandle {
    target: Arc<OperatorTarget>,
    safety: Arc<SafetyHandlers>,
    stop: Arc<AtomicBool>,
    deadzone_width: f32,
}

impl OperatorHandle {
    pub(crate) fn new(
        target: Arc<OperatorTarget>,
        safety: Arc<SafetyHandlers>,
        stop: Arc<AtomicBool>,
        deadzone_width: f32,
    ) -> Self {
        Self {
            target,
            safety,
            stop,
            deadzone_width,
        }
    }

    /// Stick moved to `(x, y)`, both in `[-1, 1]`.
    pub fn stick_changed(&self, x: f32, y: f32) {
        let (left, right) = mix(x, y, self.deadzone_width);
        trace!(x, y, left, right, "stick");
        self.target.set(left, right);
    }

    pub fn safety_trigger(&self) -> Result<CommandOutcome> {
        self.safety.emergency_stop()
    }

    /// Stop-release pressed while the arm input reads `arm`.
    pub fn safety_release(&self, arm: f32) -> Result<CommandOutcome> {
        self.safety.release_stop(arm)
    }

    pub fn homing_pressed(&self) {
        self.safety.homing_pressed(Instant::now());
    }

    pub fn homing_released(&self) -> Result<CommandOutcome> {
        self.safety.homing_released(Instant::now())
    }

    pub fn set_tracking_mode(&self, mode: TrackingMode) -> Result<CommandOutcome> {
        self.safety.set_tracking_mode(mode)
    }

    /// Ask the control loop to finish after its current cycle.
    pub fn request_stop(&self) {
        if !self.stop.swap(true, Ordering::SeqCst) {
            info!("stop requested by operator");
        }
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Current (left, right) target.
    pub fn target(&self) -> (f32, f32) {
        self.target.get()
    }
}

impl std::fmt::Debug for OperatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorHandle")
            .field("target", &self.target.get())
            .field("stop", &self.is_stop_requested())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sunflower_frame::Command;

    use super::*;
    use crate::config::ControlConfig;
    use crate::feedback::Feedback;
    use crate::testing::{RecordingOutput, ScriptedLink};

    fn handle() -> (OperatorHandle, Arc<ScriptedLink>) {
        let link = Arc::new(ScriptedLink::default());
        let output = Arc::new(RecordingOutput::default());
        let safety = SafetyHandlers::new(
            link.clone(),
            Feedback::new(output),
            ControlConfig::default(),
        );
        let handle = OperatorHandle::new(
            Arc::new(OperatorTarget::new()),
            Arc::new(safety),
            Arc::new(AtomicBool::new(false)),
            0.4,
        );
        (handle, link)
    }

    #[test]
    fn stick_updates_target_through_mixer() {
        let (handle, link) = handle();
        handle.stick_changed(0.0, 1.0);
        assert_eq!(handle.target(), (1.0, 1.0));

        handle.stick_changed(0.1, 0.05);
        assert_eq!(handle.target(), (0.0, 0.0));
        assert!(link.sent().is_empty());
    }

    #[test]
    fn clones_share_state() {
        let (handle, _) = handle();
        let other = handle.clone();
        other.stick_changed(-1.0, 0.0);
        other.request_stop();
        assert_eq!(handle.target(), (-1.0, 1.0));
        assert!(handle.is_stop_requested());
    }

    #[test]
    fn buttons_reach_the_link() {
        let (handle, link) = handle();
        handle.safety_trigger().unwrap();
        handle.safety_release(0.95).unwrap();
        handle.set_tracking_mode(TrackingMode::Timed).unwrap();
        assert_eq!(
            link.sent(),
            vec![
                (Command::Stop, 0),
                (Command::ResetStop, 0),
                (Command::SetTrackingMode, 3),
            ]
        );
    }

    #[test]
    fn quick_homing_tap_sends_nothing() {
        let (handle, link) = handle();
        handle.homing_pressed();
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(handle.homing_released().unwrap(), CommandOutcome::Suppressed);
        assert!(link.sent().is_empty());
    }
}
