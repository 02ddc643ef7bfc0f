#![forbid(unsafe_code)]

//! Snap decision: where a released drag settles.
//!
//! Rules are evaluated in order and the first match wins:
//!
//! | # | Condition | Target |
//! |---|-----------|--------|
//! | 1 | `vy < -threshold` | End |
//! | 2 | `vy > threshold` | Closed |
//! | 3 | middle set, `y <= middle_y` | Middle |
//! | 4 | end set, `y <= end_y` | End |
//! | 5 | end set, `y > end_y` | End if `y < end_y + tolerance`, else Closed |
//! | 6 | `y > end_y + tolerance` | Closed |
//! | 7 | `y <= panel_height / 2` | End |
//! | 8 | otherwise | Closed |
//!
//! A decisive throw wins over position; otherwise the generous near-miss
//! tolerance keeps an almost-open panel from snapping shut on release
//! jitter.

use std::fmt;

use crate::config::{DrawerConfig, SnapTuning};
use crate::geometry::{Geometry, SnapTarget};

/// Which rule produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapRule {
    FlingUp,
    FlingDown,
    AtOrAboveMiddle,
    AtOrAboveEnd,
    NearEnd,
    FarBelowEnd,
    UpperHalf,
    Fallthrough,
}

impl SnapRule {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SnapRule::FlingUp => "fling_up",
            SnapRule::FlingDown => "fling_down",
            SnapRule::AtOrAboveMiddle => "at_or_above_middle",
            SnapRule::AtOrAboveEnd => "at_or_above_end",
            SnapRule::NearEnd => "near_end",
            SnapRule::FarBelowEnd => "far_below_end",
            SnapRule::UpperHalf => "upper_half",
            SnapRule::Fallthrough => "fallthrough",
        }
    }
}

impl fmt::Display for SnapRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A target and the rule that chose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapDecision {
    pub target: SnapTarget,
    pub rule: SnapRule,
}

impl SnapDecision {
    const fn new(target: SnapTarget, rule: SnapRule) -> Self {
        Self { target, rule }
    }
}

/// Pure decision engine over one config.
#[derive(Debug, Clone, Copy)]
pub struct SnapEngine {
    geometry: Geometry,
    has_middle: bool,
    has_end: bool,
    tuning: SnapTuning,
}

impl SnapEngine {
    #[must_use]
    pub fn new(config: &DrawerConfig, geometry: Geometry) -> Self {
        Self {
            geometry,
            has_middle: config.middle_height().is_some(),
            has_end: config.end_height().is_some(),
            tuning: config.tuning,
        }
    }

    /// Choose where a drag released at `y` with `velocity_y` settles.
    #[must_use]
    pub fn decide(&self, y: f32, velocity_y: f32) -> SnapDecision {
        use SnapRule as R;
        use SnapTarget as T;

        let threshold = self.tuning.velocity_threshold;
        let tolerance = self.tuning.near_miss_tolerance;
        let end_y = self.geometry.open_end_y();

        if velocity_y < -threshold {
            return SnapDecision::new(T::End, R::FlingUp);
        }
        if velocity_y > threshold {
            return SnapDecision::new(T::Closed, R::FlingDown);
        }
        if self.has_middle && y <= self.geometry.open_middle_y() {
            return SnapDecision::new(T::Middle, R::AtOrAboveMiddle);
        }
        if self.has_end {
            if y <= end_y {
                return SnapDecision::new(T::End, R::AtOrAboveEnd);
            }
            let target = if y < end_y + tolerance { T::End } else { T::Closed };
            return SnapDecision::new(target, R::NearEnd);
        }
        if y > end_y + tolerance {
            return SnapDecision::new(T::Closed, R::FarBelowEnd);
        }
        if y <= self.geometry.panel_height() / 2.0 {
            return SnapDecision::new(T::End, R::UpperHalf);
        }
        SnapDecision::new(T::Closed, R::Fallthrough)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    fn engine(config: &DrawerConfig) -> SnapEngine {
        SnapEngine::new(config, Geometry::new(config, &Environment::new(800.0)))
    }

    fn end_only() -> DrawerConfig {
        DrawerConfig::default().with_end_height(400.0)
    }

    #[test]
    fn fast_upward_throw_always_opens() {
        let e = engine(&end_only());
        for y in [30.0, 400.0, 790.0] {
            let d = e.decide(y, -0.8);
            assert_eq!(d.target, SnapTarget::End);
            assert_eq!(d.rule, SnapRule::FlingUp);
        }
    }

    #[test]
    fn fast_downward_throw_always_closes() {
        let d = engine(&end_only()).decide(30.0, 0.61);
        assert_eq!(d, SnapDecision::new(SnapTarget::Closed, SnapRule::FlingDown));
    }

    #[test]
    fn threshold_itself_is_not_a_fling() {
        let e = engine(&end_only());
        assert_eq!(e.decide(300.0, 0.6).rule, SnapRule::AtOrAboveEnd);
        assert_eq!(e.decide(300.0, -0.6).rule, SnapRule::AtOrAboveEnd);
    }

    #[test]
    fn release_above_end_opens() {
        let d = engine(&end_only()).decide(250.0, 0.0);
        assert_eq!(d.target, SnapTarget::End);
    }

    #[test]
    fn near_miss_still_opens() {
        let e = engine(&end_only());
        assert_eq!(e.decide(474.0, 0.0).target, SnapTarget::End);
        assert_eq!(e.decide(475.0, 0.0).target, SnapTarget::Closed);
        assert_eq!(e.decide(550.0, 0.0).target, SnapTarget::Closed);
    }

    #[test]
    fn middle_wins_over_end() {
        let config = DrawerConfig::default()
            .with_middle_height(300.0)
            .with_end_height(600.0);
        let e = engine(&config);
        assert_eq!(e.decide(450.0, 0.0).target, SnapTarget::Middle);
        assert_eq!(e.decide(150.0, 0.0).target, SnapTarget::Middle);
        // Below middle: near-miss on end (200 + 75) fails, closes.
        assert_eq!(e.decide(600.0, 0.0).target, SnapTarget::Closed);
    }

    #[test]
    fn without_end_height_uses_far_below_rule() {
        // End falls back to top padding 20; tolerance puts the line at 95.
        let e = engine(&DrawerConfig::default());
        let d = e.decide(400.0, 0.0);
        assert_eq!(d, SnapDecision::new(SnapTarget::Closed, SnapRule::FarBelowEnd));
        let d = e.decide(60.0, 0.0);
        assert_eq!(d, SnapDecision::new(SnapTarget::End, SnapRule::UpperHalf));
    }

    #[test]
    fn fallthrough_closes_when_upper_half_fails() {
        // Tiny viewport: panel height 60 - 20 = 40, half 20.
        let config = DrawerConfig::default();
        let e = SnapEngine::new(&config, Geometry::new(&config, &Environment::new(60.0)));
        let d = e.decide(50.0, 0.0);
        assert_eq!(d, SnapDecision::new(SnapTarget::Closed, SnapRule::Fallthrough));
    }

    #[test]
    fn tuned_constants_are_honoured() {
        let mut config = end_only();
        config.tuning.velocity_threshold = 1.5;
        config.tuning.near_miss_tolerance = 10.0;
        let e = engine(&config);
        assert_eq!(e.decide(300.0, 1.0).target, SnapTarget::End);
        assert_eq!(e.decide(420.0, 0.0).target, SnapTarget::Closed);
    }
}
