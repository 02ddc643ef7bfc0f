#![forbid(unsafe_code)]

//! Position model: snap targets and their vertical coordinates.
//!
//! Coordinates measure the panel's top edge from the top of the viewport,
//! so *smaller* values mean *more open*. With viewport height `H` and top
//! padding `P`:
//!
//! | Target | Coordinate |
//! |--------|------------|
//! | `Closed` | `H + closed_overshoot` |
//! | `Start`, `Middle`, `End` | `H - height` when configured, else `P` |
//!
//! # Invariants
//!
//! 1. With every height set and `end ≥ middle ≥ start`, the coordinates are
//!    ordered `end ≤ middle ≤ start < closed`.
//! 2. Every value returned by [`Geometry::clamp_y`] lies in
//!    `[top_padding, closed_y]`.
//!
//! # Fallback stops
//!
//! An unset height makes its stop fall back to the top padding. Two
//! fallback stops therefore share a coordinate and compare equal under
//! [`Geometry::is_at`]. [`Geometry::stop`] keeps the distinction explicit
//! through [`Stop::Fallback`], so callers that care whether a target was
//! really configured never have to compare coordinates.

use std::fmt;
use std::str::FromStr;

use crate::config::{DrawerConfig, Environment};
use crate::error::ParseTargetError;

// ---------------------------------------------------------------------------
// SnapTarget
// ---------------------------------------------------------------------------

/// One of the four logical resting positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SnapTarget {
    #[default]
    Closed,
    Start,
    Middle,
    End,
}

impl SnapTarget {
    /// All targets, closed first.
    pub const ALL: [SnapTarget; 4] = [
        SnapTarget::Closed,
        SnapTarget::Start,
        SnapTarget::Middle,
        SnapTarget::End,
    ];

    /// Whether settling here counts as "opened".
    #[inline]
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, SnapTarget::Closed)
    }

    /// Lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SnapTarget::Closed => "closed",
            SnapTarget::Start => "start",
            SnapTarget::Middle => "middle",
            SnapTarget::End => "end",
        }
    }
}

impl fmt::Display for SnapTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SnapTarget {
    type Err = ParseTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "closed" => Ok(SnapTarget::Closed),
            "start" => Ok(SnapTarget::Start),
            "middle" => Ok(SnapTarget::Middle),
            "end" => Ok(SnapTarget::End),
            other => Err(ParseTargetError::new(other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Stop
// ---------------------------------------------------------------------------

/// A resolved stop coordinate, tagged with where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stop {
    /// The height for this target was configured.
    Configured(f32),
    /// The height was unset; the stop falls back to the top padding.
    Fallback(f32),
    /// The closed stop, below the viewport.
    Offscreen(f32),
}

impl Stop {
    /// The coordinate regardless of origin.
    #[inline]
    #[must_use]
    pub const fn y(self) -> f32 {
        match self {
            Stop::Configured(y) | Stop::Fallback(y) | Stop::Offscreen(y) => y,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_fallback(self) -> bool {
        matches!(self, Stop::Fallback(_))
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Pure geometry over a config and the attach-time environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    viewport_height: f32,
    top_padding: f32,
    closed_overshoot: f32,
    start: Option<f32>,
    middle: Option<f32>,
    end: Option<f32>,
}

impl Geometry {
    #[must_use]
    pub fn new(config: &DrawerConfig, env: &Environment) -> Self {
        Self {
            viewport_height: env.viewport_height,
            top_padding: env.top_padding(),
            closed_overshoot: config.tuning.closed_overshoot,
            start: config.start_height(),
            middle: config.middle_height(),
            end: config.end_height(),
        }
    }

    #[inline]
    #[must_use]
    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    #[inline]
    #[must_use]
    pub fn top_padding(&self) -> f32 {
        self.top_padding
    }

    /// Coordinate at which the panel is fully below the viewport.
    #[inline]
    #[must_use]
    pub fn closed_y(&self) -> f32 {
        self.viewport_height + self.closed_overshoot
    }

    #[inline]
    #[must_use]
    pub fn open_end_y(&self) -> f32 {
        self.stop(SnapTarget::End).y()
    }

    #[inline]
    #[must_use]
    pub fn open_middle_y(&self) -> f32 {
        self.stop(SnapTarget::Middle).y()
    }

    #[inline]
    #[must_use]
    pub fn open_start_y(&self) -> f32 {
        self.stop(SnapTarget::Start).y()
    }

    /// Resolve a target to its stop.
    #[must_use]
    pub fn stop(&self, target: SnapTarget) -> Stop {
        let height = match target {
            SnapTarget::Closed => return Stop::Offscreen(self.closed_y()),
            SnapTarget::Start => self.start,
            SnapTarget::Middle => self.middle,
            SnapTarget::End => self.end,
        };
        match height {
            Some(h) => Stop::Configured(self.viewport_height - h),
            None => Stop::Fallback(self.top_padding),
        }
    }

    /// Stop a freshly attached panel rests at for `open_to`.
    ///
    /// Any open target starts at the start stop, or at the middle stop when
    /// no start height is set. Without either, or for `Closed`, the panel
    /// starts closed. Later `open_to` requests go to the exact target.
    #[must_use]
    pub fn initial_target(&self, open_to: SnapTarget) -> SnapTarget {
        if !open_to.is_open() {
            SnapTarget::Closed
        } else if self.start.is_some() {
            SnapTarget::Start
        } else if self.middle.is_some() {
            SnapTarget::Middle
        } else {
            SnapTarget::Closed
        }
    }

    /// Coordinate of `target`.
    #[inline]
    #[must_use]
    pub fn y_for(&self, target: SnapTarget) -> f32 {
        self.stop(target).y()
    }

    /// Exact equality between `y` and the coordinate of `target`.
    #[inline]
    #[must_use]
    pub fn is_at(&self, target: SnapTarget, y: f32) -> bool {
        y == self.y_for(target)
    }

    /// Height of the panel element: the end height, or the full viewport
    /// below the top padding.
    #[must_use]
    pub fn panel_height(&self) -> f32 {
        self.end
            .unwrap_or(self.viewport_height - self.top_padding)
    }

    /// Height of the inner content region when not stretched.
    #[must_use]
    pub fn resting_content_height(&self) -> f32 {
        self.end.unwrap_or(self.viewport_height)
    }

    /// Clamp `y` into `[top_padding, closed_y]`.
    #[must_use]
    pub fn clamp_y(&self, y: f32) -> f32 {
        y.clamp(self.top_padding, self.closed_y().max(self.top_padding))
    }
}
