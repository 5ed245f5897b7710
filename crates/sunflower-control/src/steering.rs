//! Stick-to-motor mixing.

use std::sync::atomic::{AtomicU32, Ordering};

/// Zero out deflections inside the deadzone.
///
/// `width` is the full width of the zone centered on zero, so values with
/// `|value| < width / 2` become `0.0`.
pub fn apply_deadzone(value: f32, width: f32) -> f32 {
    let half = width.abs() / 2.0;
    if value.abs() < half {
        0.0
    } else {
        value
    }
}

/// Mix stick axes into per-motor targets in `[-1, 1]`.
///
/// `left = y + x`, `right = y - x`, each clamped and then passed through the
/// deadzone.
pub fn mix(x: f32, y: f32, deadzone_width: f32) -> (f32, f32) {
    let left = (y + x).clamp(-1.0, 1.0);
    let right = (y - x).clamp(-1.0, 1.0);
    (
        apply_deadzone(left, deadzone_width),
        apply_deadzone(right, deadzone_width),
    )
}

/// Latest operator target, written by stick events and read by the loop.
#[derive(Debug, Default)]
pub struct OperatorTarget {
    left: AtomicU32,
    right: AtomicU32,
}

impl OperatorTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new (left, right) target. Values are clamped to `[-1, 1]`;
    /// NaN is stored as zero.
    pub fn set(&self, left: f32, right: f32) {
        self.left.store(sanitize(left).to_bits(), Ordering::Relaxed);
        self.right.store(sanitize(right).to_bits(), Ordering::Relaxed);
    }

    /// Current (left, right) target.
    pub fn get(&self) -> (f32, f32) {
        (
            f32::from_bits(self.left.load(Ordering::Relaxed)),
            f32::from_bits(self.right.load(Ordering::Relaxed)),
        )
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadzone_suppresses_small_deflections() {
        assert_eq!(apply_deadzone(0.0, 0.4), 0.0);
        assert_eq!(apply_deadzone(0.19, 0.4), 0.0);
        assert_eq!(apply_deadzone(-0.19, 0.4), 0.0);
        assert_eq!(apply_deadzone(0.2, 0.4), 0.2);
        assert_eq!(apply_deadzone(-0.75, 0.4), -0.75);
    }

    #[test]
    fn zero_width_deadzone_passes_everything() {
        assert_eq!(apply_deadzone(0.01, 0.0), 0.01);
    }

    #[test]
    fn straight_ahead_drives_both_motors() {
        assert_eq!(mix(0.0, 1.0, 0.4), (1.0, 1.0));
        assert_eq!(mix(0.0, -1.0, 0.4), (-1.0, -1.0));
    }

    #[test]
    fn turning_splits_motors() {
        assert_eq!(mix(1.0, 0.0, 0.4), (1.0, -1.0));
        assert_eq!(mix(-0.5, 0.0, 0.4), (-0.5, 0.5));
    }

    #[test]
    fn mix_clamps_combined_axes() {
        assert_eq!(mix(1.0, 1.0, 0.4), (1.0, 0.0));
        assert_eq!(mix(-1.0, -1.0, 0.4), (-1.0, 0.0));
    }

    #[test]
    fn centered_stick_noise_is_ignored() {
        assert_eq!(mix(0.05, -0.08, 0.4), (0.0, 0.0));
    }

    #[test]
    fn target_stores_and_clamps() {
        let target = OperatorTarget::new();
        assert_eq!(target.get(), (0.0, 0.0));

        target.set(0.5, -0.25);
        assert_eq!(target.get(), (0.5, -0.25));

        target.set(3.0, f32::NAN);
        assert_eq!(target.get(), (1.0, 0.0));
    }
}
