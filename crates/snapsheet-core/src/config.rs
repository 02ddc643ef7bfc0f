#![forbid(unsafe_code)]

//! Drawer configuration and the host environment sampled at attach time.
//!
//! [`DrawerConfig`] is immutable for the lifetime of a drawer session.
//! Every height is optional; an unset height never is an error, it makes the
//! corresponding stop fall back to the top padding (see
//! [`Stop::Fallback`](crate::geometry::Stop::Fallback)).
//!
//! [`DrawerConfig::validate`] reports configurations that are legal but
//! almost certainly unintended. The runtime does not call it; a drawer built
//! from an invalid config still behaves (it degrades, e.g. to permanent
//! overscroll), so hosts decide whether to reject or just log.

use std::time::Duration;

use crate::error::ConfigError;
use crate::geometry::{Geometry, SnapTarget};

/// Default settle animation duration.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(400);

/// Top padding without a safe-area inset.
pub const TOP_PADDING: f32 = 20.0;

/// Top padding when the device reports a safe-area inset (notch).
pub const TOP_PADDING_WITH_INSET: f32 = 40.0;

/// Base z-index the overlay index is added to.
pub const BASE_Z_INDEX: i32 = 20_000;

// ---------------------------------------------------------------------------
// SnapTuning
// ---------------------------------------------------------------------------

/// Tunable constants of the gesture and snap logic.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SnapTuning {
    /// Release speed above which the throw direction alone decides the
    /// target. Default: 0.6 position units per millisecond.
    pub velocity_threshold: f32,
    /// How far below the end stop a release still counts as open.
    /// Default: 75.
    pub near_miss_tolerance: f32,
    /// Fraction of the raw displacement applied while beyond limits.
    /// Default: 0.3.
    pub friction: f32,
    /// Distance past the viewport bottom used for the closed stop.
    /// Default: 20.
    pub closed_overshoot: f32,
    /// Slack allowed between scroll extent and visible extent before a
    /// scroll region counts as scrollable. Default: 1.
    pub scroll_slack: f32,
}

impl Default for SnapTuning {
    fn default() -> Self {
        Self {
            velocity_threshold: 0.6,
            near_miss_tolerance: 75.0,
            friction: 0.3,
            closed_overshoot: 20.0,
            scroll_slack: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// DrawerConfig
// ---------------------------------------------------------------------------

/// Per-session drawer configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DrawerConfig {
    /// Target resolved at attach, and re-requested through
    /// [`Drawer::set_open_to`](crate::drawer::Drawer::set_open_to).
    pub open_to: SnapTarget,
    /// Height above the viewport bottom of the start stop. Zero counts as
    /// unset, here and for the other heights and `max_offset`.
    pub open_height_start: Option<f32>,
    /// Height above the viewport bottom of the middle stop.
    pub open_height_middle: Option<f32>,
    /// Height above the viewport bottom of the end stop. Also the panel
    /// height when set.
    pub open_height_end: Option<f32>,
    /// Coordinate past which dragging upward is resisted.
    pub max_offset: Option<f32>,
    /// Stacking order, passed through to [`HostAttributes`](crate::drawer::HostAttributes).
    pub overlay_index: i32,
    /// Extra host classes, passed through untouched.
    pub css_class: Vec<String>,
    /// Duration of every settle transition.
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub animation_duration: Duration,
    /// Snap thresholds and overscroll constants.
    pub tuning: SnapTuning,
}

impl Default for DrawerConfig {
    fn default() -> Self {
        Self {
            open_to: SnapTarget::Closed,
            open_height_start: None,
            open_height_middle: None,
            open_height_end: None,
            max_offset: None,
            overlay_index: 0,
            css_class: Vec::new(),
            animation_duration: DEFAULT_ANIMATION_DURATION,
            tuning: SnapTuning::default(),
        }
    }
}

impl DrawerConfig {
    /// Set the initial target.
    #[must_use]
    pub fn open_to(mut self, target: SnapTarget) -> Self {
        self.open_to = target;
        self
    }

    /// Set the start stop height.
    #[must_use]
    pub fn with_start_height(mut self, height: f32) -> Self {
        self.open_height_start = Some(height);
        self
    }

    /// Set the middle stop height.
    #[must_use]
    pub fn with_middle_height(mut self, height: f32) -> Self {
        self.open_height_middle = Some(height);
        self
    }

    /// Set the end stop height.
    #[must_use]
    pub fn with_end_height(mut self, height: f32) -> Self {
        self.open_height_end = Some(height);
        self
    }

    /// Set the maximum offset coordinate.
    #[must_use]
    pub fn with_max_offset(mut self, offset: f32) -> Self {
        self.max_offset = Some(offset);
        self
    }

    /// Set the overlay stacking index.
    #[must_use]
    pub fn with_overlay_index(mut self, index: i32) -> Self {
        self.overlay_index = index;
        self
    }

    /// Parse a space separated class list into [`css_class`](Self::css_class).
    #[must_use]
    pub fn with_css_class(mut self, classes: &str) -> Self {
        self.css_class = classes.split_whitespace().map(str::to_owned).collect();
        self
    }

    /// Set the settle animation duration.
    #[must_use]
    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }

    /// Replace the tuning constants.
    #[must_use]
    pub fn with_tuning(mut self, tuning: SnapTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Start height, if set and non-zero.
    #[inline]
    #[must_use]
    pub fn start_height(&self) -> Option<f32> {
        nonzero(self.open_height_start)
    }

    /// Middle height, if set and non-zero.
    #[inline]
    #[must_use]
    pub fn middle_height(&self) -> Option<f32> {
        nonzero(self.open_height_middle)
    }

    /// End height, if set and non-zero.
    #[inline]
    #[must_use]
    pub fn end_height(&self) -> Option<f32> {
        nonzero(self.open_height_end)
    }

    /// `max_offset`, if set and non-zero.
    #[inline]
    #[must_use]
    pub fn max_offset_limit(&self) -> Option<f32> {
        nonzero(self.max_offset)
    }

    /// Validate environment-independent constraints and return all
    /// violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        validate_height("open_height_start", self.start_height(), &mut errors);
        validate_height("open_height_middle", self.middle_height(), &mut errors);
        validate_height("open_height_end", self.end_height(), &mut errors);
        if let Some(offset) = self.max_offset_limit()
            && (!offset.is_finite() || offset < 0.0)
        {
            errors.push(ConfigError::new(
                "max_offset",
                offset.to_string(),
                "must be a finite, non-negative coordinate",
            ));
        }

        let ordered = [
            ("open_height_end", self.end_height()),
            ("open_height_middle", self.middle_height()),
            ("open_height_start", self.start_height()),
        ];
        let present: Vec<_> = ordered
            .iter()
            .filter_map(|(field, h)| h.map(|h| (*field, h)))
            .collect();
        for pair in present.windows(2) {
            let (upper_field, upper) = pair[0];
            let (lower_field, lower) = pair[1];
            if lower > upper {
                errors.push(ConfigError::new(
                    lower_field,
                    lower.to_string(),
                    format!("must not exceed {upper_field} ({upper})"),
                ));
            }
        }

        if self.animation_duration.is_zero() {
            errors.push(ConfigError::new(
                "animation_duration",
                "0ms",
                "completion would fire before the transition is visible",
            ));
        }

        let t = &self.tuning;
        if !(t.velocity_threshold.is_finite() && t.velocity_threshold > 0.0) {
            errors.push(ConfigError::new(
                "tuning.velocity_threshold",
                t.velocity_threshold.to_string(),
                "must be positive",
            ));
        }
        if !(t.near_miss_tolerance.is_finite() && t.near_miss_tolerance >= 0.0) {
            errors.push(ConfigError::new(
                "tuning.near_miss_tolerance",
                t.near_miss_tolerance.to_string(),
                "must be non-negative",
            ));
        }
        if !(t.friction > 0.0 && t.friction <= 1.0) {
            errors.push(ConfigError::new(
                "tuning.friction",
                t.friction.to_string(),
                "must be in (0, 1]",
            ));
        }
        if !(t.closed_overshoot.is_finite() && t.closed_overshoot >= 0.0) {
            errors.push(ConfigError::new(
                "tuning.closed_overshoot",
                t.closed_overshoot.to_string(),
                "must be non-negative",
            ));
        }
        if !(t.scroll_slack.is_finite() && t.scroll_slack >= 0.0) {
            errors.push(ConfigError::new(
                "tuning.scroll_slack",
                t.scroll_slack.to_string(),
                "must be non-negative",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Like [`validate`](Self::validate), plus checks that need the viewport:
    /// stops taller than the viewport, and a `max_offset` below the end stop
    /// coordinate, which would leave every drag permanently beyond limits.
    pub fn validate_for(&self, env: &Environment) -> Result<(), Vec<ConfigError>> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => errors,
        };

        let usable = env.viewport_height - env.top_padding();
        for (field, height) in [
            ("open_height_start", self.start_height()),
            ("open_height_middle", self.middle_height()),
            ("open_height_end", self.end_height()),
        ] {
            if let Some(h) = height
                && h > usable
            {
                errors.push(ConfigError::new(
                    field,
                    h.to_string(),
                    format!("exceeds usable viewport height {usable}"),
                ));
            }
        }

        if let Some(offset) = self.max_offset_limit() {
            let end_y = Geometry::new(self, env).open_end_y();
            if end_y < offset {
                errors.push(ConfigError::new(
                    "max_offset",
                    offset.to_string(),
                    format!("end stop at {end_y} lies beyond it; drags always overscroll"),
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn nonzero(value: Option<f32>) -> Option<f32> {
    value.filter(|v| *v != 0.0)
}

fn validate_height(field: &'static str, value: Option<f32>, errors: &mut Vec<ConfigError>) {
    if let Some(h) = value
        && !(h.is_finite() && h > 0.0)
    {
        errors.push(ConfigError::new(
            field,
            h.to_string(),
            "must be a finite, positive height",
        ));
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Facts about the host sampled once when the drawer attaches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    /// Viewport height in position units.
    pub viewport_height: f32,
    /// Whether safe-area detection reported a top inset.
    pub has_safe_area_inset: bool,
}

impl Environment {
    /// Environment without a safe-area inset.
    #[must_use]
    pub fn new(viewport_height: f32) -> Self {
        Self {
            viewport_height,
            has_safe_area_inset: false,
        }
    }

    /// Mark the environment as having a safe-area inset.
    #[must_use]
    pub fn with_safe_area_inset(mut self, inset: bool) -> Self {
        self.has_safe_area_inset = inset;
        self
    }

    /// Minimum allowed top offset of the panel.
    #[inline]
    #[must_use]
    pub fn top_padding(&self) -> f32 {
        if self.has_safe_area_inset {
            TOP_PADDING_WITH_INSET
        } else {
            TOP_PADDING
        }
    }
}

#[cfg(feature = "serde")]
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = DrawerConfig::default();
        assert_eq!(config.open_to, SnapTarget::Closed);
        assert_eq!(config.animation_duration, Duration::from_millis(400));
        assert_eq!(config.tuning.velocity_threshold, 0.6);
        assert_eq!(config.tuning.near_miss_tolerance, 75.0);
        assert_eq!(config.tuning.friction, 0.3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn safe_area_inset_raises_top_padding() {
        assert_eq!(Environment::new(800.0).top_padding(), 20.0);
        assert_eq!(
            Environment::new(800.0)
                .with_safe_area_inset(true)
                .top_padding(),
            40.0
        );
    }

    #[test]
    fn css_class_splits_on_whitespace() {
        let config = DrawerConfig::default().with_css_class("  sheet   dark ");
        assert_eq!(config.css_class, vec!["sheet", "dark"]);
    }

    #[test]
    fn validate_reports_every_violation() {
        let config = DrawerConfig::default()
            .with_start_height(-1.0)
            .with_end_height(f32::NAN)
            .with_animation_duration(Duration::ZERO);
        let errors = config.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"open_height_start"));
        assert!(fields.contains(&"open_height_end"));
        assert!(fields.contains(&"animation_duration"));
    }

    #[test]
    fn validate_rejects_out_of_order_heights() {
        let config = DrawerConfig::default()
            .with_end_height(300.0)
            .with_middle_height(400.0);
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "open_height_middle");
    }

    #[test]
    fn validate_skips_unset_stops_when_ordering() {
        let config = DrawerConfig::default()
            .with_end_height(500.0)
            .with_start_height(200.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_tuning() {
        let tuning = SnapTuning {
            friction: 0.0,
            velocity_threshold: -1.0,
            ..SnapTuning::default()
        };
        let errors = DrawerConfig::default()
            .with_tuning(tuning)
            .validate()
            .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn validate_for_flags_always_overscrolling_max_offset() {
        let env = Environment::new(800.0);
        // End stop sits at 800 - 400 = 400, above the cap at 500.
        let config = DrawerConfig::default()
            .with_end_height(400.0)
            .with_max_offset(500.0);
        let errors = config.validate_for(&env).unwrap_err();
        assert_eq!(errors[0].field, "max_offset");

        let fine = DrawerConfig::default()
            .with_end_height(400.0)
            .with_max_offset(300.0);
        assert!(fine.validate_for(&env).is_ok());
    }

    #[test]
    fn validate_for_flags_stop_taller_than_viewport() {
        let env = Environment::new(600.0).with_safe_area_inset(true);
        let config = DrawerConfig::default().with_end_height(590.0);
        let errors = config.validate_for(&env).unwrap_err();
        assert_eq!(errors[0].field, "open_height_end");
    }

    #[test]
    fn zero_values_read_as_unset() {
        let config = DrawerConfig::default()
            .with_middle_height(0.0)
            .with_end_height(400.0)
            .with_max_offset(0.0);
        assert_eq!(config.middle_height(), None);
        assert_eq!(config.end_height(), Some(400.0));
        assert_eq!(config.max_offset_limit(), None);
        assert!(config.validate_for(&Environment::new(800.0)).is_ok());
    }
}
