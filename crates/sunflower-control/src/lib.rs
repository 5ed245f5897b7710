//! Operator-driven control of a Sunflower tracker.
//!
//! The [`ControlLoop`] polls the tracker state on a fixed cadence and, while
//! the device is idle, integrates the operator's stick input into clamped
//! motor setpoints. [`SafetyHandlers`] run the stop, stop-release, homing and
//! mode commands that the operator triggers out of band. Both go through the
//! same [`sunflower_link::Transactor`], which keeps one transaction in flight.
//!
//! The operator device itself is abstract: it drives an [`OperatorHandle`] and
//! renders whatever the core sends to its [`OperatorOutput`].

pub mod config;
pub mod control_loop;
pub mod error;
pub mod feedback;
pub mod operator;
pub mod position;
pub mod safety;
pub mod steering;

#[cfg(test)]
mod testing;

pub use config::ControlConfig;
pub use control_loop::{ControlLoop, CycleOutcome, ExitReason};
pub use error::{ControlError, Result};
pub use feedback::{mode_pattern, state_color, Feedback, LedPattern, OperatorOutput, Rgb};
pub use operator::OperatorHandle;
pub use position::{Position, PositionAccumulator};
pub use safety::{CommandOutcome, SafetyHandlers};
pub use steering::{apply_deadzone, mix, OperatorTarget};
