/// A clamped (left, right) motor setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub left: i32,
    pub right: i32,
}

/// Integrates operator targets into motor setpoints bounded to
/// `[min, max]`.
#[derive(Debug, Clone)]
pub struct PositionAccumulator {
    position: Position,
    min: i32,
    max: i32,
}

impl PositionAccumulator {
    /// Start at `min` on both axes.
    pub fn new(min: i32, max: i32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            position: Position {
                left: min,
                right: min,
            },
            min,
            max,
        }
    }

    /// Add `round(multiplier * target)` to each axis, then clamp.
    pub fn integrate(&mut self, left: f32, right: f32, multiplier: i32) -> Position {
        self.position.left = self.step(self.position.left, left, multiplier);
        self.position.right = self.step(self.position.right, right, multiplier);
        self.position
    }

    /// Current setpoint.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Bounds as `(min, max)`.
    pub fn bounds(&self) -> (i32, i32) {
        (self.min, self.max)
    }

    fn step(&self, current: i32, target: f32, multiplier: i32) -> i32 {
        let delta = (multiplier as f32 * target).round();
        // f32 -> i32 casts saturate, and NaN becomes 0.
        let delta = delta as i32;
        current.saturating_add(delta).clamp(self.min, self.max)
    }
}

impl Default for PositionAccumulator {
    fn default() -> Self {
        Self::new(0, 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_forward_adds_multiplier() {
        let mut acc = PositionAccumulator::default();
        let pos = acc.integrate(1.0, 1.0, 50);
        assert_eq!(pos, Position { left: 50, right: 50 });
        let pos = acc.integrate(1.0, 1.0, 50);
        assert_eq!(pos, Position { left: 100, right: 100 });
    }

    #[test]
    fn partial_deflection_is_rounded() {
        let mut acc = PositionAccumulator::default();
        let pos = acc.integrate(0.25, 0.6, 50);
        // 12.5 rounds away from zero.
        assert_eq!(pos, Position { left: 13, right: 30 });
    }

    #[test]
    fn clamps_at_lower_bound() {
        let mut acc = PositionAccumulator::default();
        let pos = acc.integrate(-1.0, -0.5, 50);
        assert_eq!(pos, Position { left: 0, right: 0 });
    }

    #[test]
    fn clamps_at_upper_bound() {
        let mut acc = PositionAccumulator::default();
        for _ in 0..20 {
            acc.integrate(1.0, 0.9, 50);
        }
        assert_eq!(acc.position(), Position { left: 500, right: 500 });
    }

    #[test]
    fn never_leaves_bounds_for_mixed_sequences() {
        let mut acc = PositionAccumulator::default();
        let steps: [f32; 10] = [1.0, -0.3, 0.7, 1.0, -1.0, 0.45, 1.0, 1.0, -0.9, 0.2];
        for round in 0..50 {
            for (i, step) in steps.iter().enumerate() {
                let sign: f32 = if (round + i) % 3 == 0 { -1.0 } else { 1.0 };
                let multiplier = 10 + (round as i32 * 7) % 200;
                let pos = acc.integrate(step * sign, -step * sign, multiplier);
                assert!((0..=500).contains(&pos.left), "left {pos:?}");
                assert!((0..=500).contains(&pos.right), "right {pos:?}");
            }
        }
    }

    #[test]
    fn huge_multiplier_saturates_instead_of_overflowing() {
        let mut acc = PositionAccumulator::default();
        let pos = acc.integrate(1.0, -1.0, i32::MAX);
        assert_eq!(pos, Position { left: 500, right: 0 });
    }

    #[test]
    fn swapped_bounds_are_normalized() {
        let acc = PositionAccumulator::new(500, 0);
        assert_eq!(acc.bounds(), (0, 500));
    }
}
