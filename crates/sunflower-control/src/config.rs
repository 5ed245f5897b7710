use std::time::Duration;

/// Control loop and operator-handling parameters.
#[derive(Debug, Clone)]
pub struct ControlConfig {
    /// Cadence of the `GET_STATE` poll.
    pub poll_interval: Duration,
    /// Position steps per cycle at full stick deflection.
    pub multiplier: i32,
    /// Lowest accepted motor position.
    pub position_min: i32,
    /// Highest accepted motor position.
    pub position_max: i32,
    /// Full width of the stick deadzone around center.
    pub deadzone_width: f32,
    /// How long the haptic alert runs after a failed command.
    pub alert_duration: Duration,
    /// Arm input level required for a stop release.
    pub arm_threshold: f32,
    /// Minimum hold of the homing control.
    pub homing_hold: Duration,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            multiplier: 50,
            position_min: 0,
            position_max: 500,
            deadzone_width: 0.4,
            alert_duration: Duration::from_secs(2),
            arm_threshold: 0.9,
            homing_hold: Duration::from_secs(3),
        }
    }
}
