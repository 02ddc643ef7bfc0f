#![forbid(unsafe_code)]

//! Overscroll ("rubber band") policy.
//!
//! While a drag sample is *beyond limits* the incoming displacement is
//! damped by the friction factor and the inner content region grows by how
//! far the panel has been pulled past the end stop, so the stretched panel
//! never shows an empty gap below its content.
//!
//! A sample is beyond limits when any of these hold:
//!
//! - both `open_height_end` and `max_offset` are set and `y < open_end_y`;
//! - `max_offset` is set and `open_end_y < max_offset`;
//! - `y <= top_padding`.
//!
//! # Invariants
//!
//! 1. Outside the beyond-limits region the step carries zero growth and a
//!    friction of exactly 1, so content height returns exactly to its resting
//!    value.
//! 2. The policy is a pure function of config, geometry and `y`.

use crate::config::DrawerConfig;
use crate::geometry::Geometry;

/// Outcome of classifying one drag sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverscrollStep {
    pub beyond_limits: bool,
    /// Growth added to the resting content height.
    pub content_growth: f32,
    /// Multiplier applied to the raw displacement.
    pub friction: f32,
}

impl OverscrollStep {
    /// Step that leaves displacement and content height untouched.
    pub const NEUTRAL: OverscrollStep = OverscrollStep {
        beyond_limits: false,
        content_growth: 0.0,
        friction: 1.0,
    };

    /// Displacement after friction.
    #[inline]
    #[must_use]
    pub fn apply(&self, dy: f32) -> f32 {
        dy * self.friction
    }
}

/// Classifies drag samples against the configured limits.
#[derive(Debug, Clone, Copy)]
pub struct OverscrollPolicy {
    geometry: Geometry,
    max_offset: Option<f32>,
    has_end_height: bool,
    friction: f32,
}

impl OverscrollPolicy {
    #[must_use]
    pub fn new(config: &DrawerConfig, geometry: Geometry) -> Self {
        Self {
            geometry,
            max_offset: config.max_offset_limit(),
            has_end_height: config.end_height().is_some(),
            friction: config.tuning.friction,
        }
    }

    /// Whether `y` is beyond the configured limits.
    #[must_use]
    pub fn is_beyond_limits(&self, y: f32) -> bool {
        let end_y = self.geometry.open_end_y();
        match self.max_offset {
            Some(_) if self.has_end_height && y < end_y => true,
            Some(max) if end_y < max => true,
            _ => y <= self.geometry.top_padding(),
        }
    }

    /// Classify a sample at `y`.
    #[must_use]
    pub fn evaluate(&self, y: f32) -> OverscrollStep {
        if !self.is_beyond_limits(y) {
            return OverscrollStep::NEUTRAL;
        }
        OverscrollStep {
            beyond_limits: true,
            content_growth: self.geometry.open_end_y() - y,
            friction: self.friction,
        }
    }
}
