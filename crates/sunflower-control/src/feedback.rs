//! Operator-visible output: lightbar color, player LEDs, haptic alerts.

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use sunflower_frame::{TrackerState, TrackingMode};
use tracing::{debug, warn};

/// Lightbar color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const OFF: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

/// Player LED arrangement used to show the tracking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedPattern {
    Center,
    Inner,
    Outer,
    CenterAndOuter,
    Off,
}

/// Lightbar color for a tracker state. States without a dedicated color
/// show white.
pub fn state_color(state: TrackerState) -> Rgb {
    match state {
        TrackerState::Idle => Rgb::OFF,
        TrackerState::Tracking => Rgb(0, 255, 0),
        TrackerState::Stop => Rgb(0, 0, 255),
        TrackerState::Warning => Rgb(255, 255, 0),
        TrackerState::Error => Rgb(255, 0, 0),
        TrackerState::Homing | TrackerState::Night | TrackerState::Unknown => Rgb::WHITE,
    }
}

/// Player LED pattern for a tracking mode.
pub fn mode_pattern(mode: TrackingMode) -> LedPattern {
    match mode {
        TrackingMode::Uart => LedPattern::Center,
        TrackingMode::FullSensor => LedPattern::Inner,
        TrackingMode::Timed => LedPattern::Outer,
        TrackingMode::Hybrid => LedPattern::CenterAndOuter,
        TrackingMode::Ai => LedPattern::Off,
    }
}

/// Output side of the operator device.
pub trait OperatorOutput: Send + Sync {
    fn set_lightbar(&self, color: Rgb);
    fn set_player_leds(&self, pattern: LedPattern);
    /// Start (`true`) or stop (`false`) the haptic alert.
    fn set_rumble(&self, active: bool);
    /// False once the device has gone away; ends the control loop.
    fn is_connected(&self) -> bool {
        true
    }
}

/// Renders tracker state and alerts on an [`OperatorOutput`].
///
/// Alerts are timed and run off the caller's thread, so a failed command never
/// delays the next poll. A newer alert supersedes an older one; the older
/// alert's timer then leaves the rumble alone.
#[derive(Clone)]
pub struct Feedback {
    output: Arc<dyn OperatorOutput>,
    alert_generation: Arc<Mutex<u64>>,
}

impl Feedback {
    pub fn new(output: Arc<dyn OperatorOutput>) -> Self {
        Self {
            output,
            alert_generation: Arc::new(Mutex::new(0)),
        }
    }

    pub fn display_state(&self, state: TrackerState) {
        self.output.set_lightbar(state_color(state));
    }

    pub fn display_mode(&self, mode: TrackingMode) {
        self.output.set_player_leds(mode_pattern(mode));
    }

    /// Run the haptic alert for `duration`.
    pub fn alert(&self, duration: Duration) {
        let generation = {
            let mut current = self.generation();
            *current = current.wrapping_add(1);
            self.output.set_rumble(true);
            *current
        };
        debug!(duration_ms = duration.as_millis() as u64, "alert started");

        let output = Arc::clone(&self.output);
        let shared = Arc::clone(&self.alert_generation);
        let spawned = thread::Builder::new()
            .name("sunflower-alert".to_string())
            .spawn(move || {
                thread::sleep(duration);
                let current = shared.lock().unwrap_or_else(|p| p.into_inner());
                if *current == generation {
                    output.set_rumble(false);
                }
            });

        if let Err(err) = spawned {
            warn!(error = %err, "could not schedule alert stop, stopping immediately");
            self.cancel_alert();
        }
    }

    /// Stop any running alert now.
    pub fn cancel_alert(&self) {
        let mut current = self.generation();
        *current = current.wrapping_add(1);
        self.output.set_rumble(false);
    }

    /// Whether the operator device is still attached.
    pub fn is_connected(&self) -> bool {
        self.output.is_connected()
    }

    fn generation(&self) -> MutexGuard<'_, u64> {
        self.alert_generation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feedback").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::testing::RecordingOutput;

    fn wait_until(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !condition() {
            assert!(Instant::now() < deadline, "condition never held");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn every_state_has_a_color() {
        assert_eq!(state_color(TrackerState::Idle), Rgb(0, 0, 0));
        assert_eq!(state_color(TrackerState::Tracking), Rgb(0, 255, 0));
        assert_eq!(state_color(TrackerState::Stop), Rgb(0, 0, 255));
        assert_eq!(state_color(TrackerState::Warning), Rgb(255, 255, 0));
        assert_eq!(state_color(TrackerState::Error), Rgb(255, 0, 0));
        assert_eq!(state_color(TrackerState::Homing), Rgb::WHITE);
        assert_eq!(state_color(TrackerState::Night), Rgb::WHITE);
        assert_eq!(state_color(TrackerState::Unknown), Rgb::WHITE);
    }

    #[test]
    fn modes_map_to_led_patterns() {
        assert_eq!(mode_pattern(TrackingMode::Uart), LedPattern::Center);
        assert_eq!(mode_pattern(TrackingMode::FullSensor), LedPattern::Inner);
        assert_eq!(mode_pattern(TrackingMode::Timed), LedPattern::Outer);
        assert_eq!(mode_pattern(TrackingMode::Hybrid), LedPattern::CenterAndOuter);
        assert_eq!(mode_pattern(TrackingMode::Ai), LedPattern::Off);
    }

    #[test]
    fn display_state_sets_lightbar() {
        let output = Arc::new(RecordingOutput::default());
        let feedback = Feedback::new(output.clone());
        feedback.display_state(TrackerState::Error);
        assert_eq!(*output.lightbar.lock().unwrap(), vec![Rgb(255, 0, 0)]);
    }

    #[test]
    fn alert_returns_immediately_and_stops_itself() {
        let output = Arc::new(RecordingOutput::default());
        let feedback = Feedback::new(output.clone());

        let started = Instant::now();
        feedback.alert(Duration::from_millis(50));
        assert!(started.elapsed() < Duration::from_millis(50));
        assert!(output.rumbling());

        wait_until(|| !output.rumbling());
        assert_eq!(output.rumble_events(), vec![true, false]);
    }

    #[test]
    fn newer_alert_supersedes_older_timer() {
        let output = Arc::new(RecordingOutput::default());
        let feedback = Feedback::new(output.clone());

        feedback.alert(Duration::from_millis(30));
        feedback.alert(Duration::from_millis(400));

        thread::sleep(Duration::from_millis(150));
        assert!(output.rumbling(), "first timer must not stop the second alert");

        wait_until(|| !output.rumbling());
        assert_eq!(output.rumble_events(), vec![true, true, false]);
    }

    #[test]
    fn cancel_stops_alert_immediately() {
        let output = Arc::new(RecordingOutput::default());
        let feedback = Feedback::new(output.clone());

        feedback.alert(Duration::from_millis(100));
        feedback.cancel_alert();
        assert!(!output.rumbling());

        thread::sleep(Duration::from_millis(200));
        assert_eq!(output.rumble_events(), vec![true, false]);
    }
}
