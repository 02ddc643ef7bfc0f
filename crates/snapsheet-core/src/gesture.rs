#![forbid(unsafe_code)]

//! Gesture state machine and the collaborator contracts it consumes.
//!
//! The gesture recognizer is external: it samples pointer movement, filters
//! for vertical motion and calls back into a [`GestureHandler`] with
//! [`GestureDetail`]s. This module owns what happens on our side of that
//! boundary:
//!
//! - [`DragGate`] decides whether a drag may start, deferring to an inner
//!   scroll region when the panel cannot travel any further.
//! - [`DragSession`] tracks the `Idle → Dragging → Idle` lifecycle and turns
//!   absolute samples into per-step displacements.
//!
//! # Invariants
//!
//! 1. The first sample of a session yields a displacement of zero.
//! 2. `end()` always returns the session to `Idle` and forgets the last
//!    sample, even if `start()` was never called.
//!
//! # Failure Modes
//!
//! | Failure | Fallback |
//! |---------|----------|
//! | Scroll region not yet available | Treated as not scrollable; drag permitted |
//! | No scroll content between origin and panel root | Drag permitted |
//! | Non-finite sample | Ignored; displacement zero |

use std::time::Instant;

use crate::config::DrawerConfig;

// ---------------------------------------------------------------------------
// Collaborator contracts
// ---------------------------------------------------------------------------

/// Scroll extents of the inner content region.
pub trait ScrollRegion {
    /// Total scrollable extent.
    fn scroll_extent(&self) -> f32;
    /// Visible extent.
    fn visible_extent(&self) -> f32;
}

/// Plain snapshot of a region's extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_extent: f32,
    pub visible_extent: f32,
}

impl ScrollMetrics {
    #[must_use]
    pub const fn new(scroll_extent: f32, visible_extent: f32) -> Self {
        Self {
            scroll_extent,
            visible_extent,
        }
    }
}

impl ScrollRegion for ScrollMetrics {
    fn scroll_extent(&self) -> f32 {
        self.scroll_extent
    }

    fn visible_extent(&self) -> f32 {
        self.visible_extent
    }
}

/// One node on the path from a gesture's origin up to (not including) the
/// panel root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginNode {
    /// The inner scrollable content region.
    ScrollContent,
    /// Any other element.
    Element,
}

/// Axis a recognizer filters motion on. Drawers only slide vertically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Vertical,
}

/// How the drawer asks to be registered with the gesture recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureRegistration {
    pub name: &'static str,
    pub direction: Axis,
    /// Higher priorities win when recognizers compete.
    pub priority: i32,
    /// Movement required before the gesture activates.
    pub threshold: u32,
    /// Whether the recognizer may listen passively (never blocks scrolling).
    pub passive: bool,
}

impl GestureRegistration {
    /// Registration used by every drawer.
    pub const DRAWER: GestureRegistration = GestureRegistration {
        name: "drawerExpand",
        direction: Axis::Vertical,
        priority: 110,
        threshold: 0,
        passive: true,
    };
}

/// One sample reported by the recognizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureDetail {
    /// Current pointer coordinate.
    pub current_y: f32,
    /// Signed vertical velocity in position units per millisecond;
    /// negative is upward.
    pub velocity_y: f32,
    pub timestamp: Instant,
}

impl GestureDetail {
    #[must_use]
    pub fn new(current_y: f32, velocity_y: f32, timestamp: Instant) -> Self {
        Self {
            current_y,
            velocity_y,
            timestamp,
        }
    }
}

/// The four callbacks a recognizer drives.
pub trait GestureHandler {
    /// Whether a gesture originating along `origin` may start.
    fn can_start(&self, origin: &[OriginNode]) -> bool;
    fn on_start(&mut self, detail: GestureDetail);
    fn on_move(&mut self, detail: GestureDetail);
    fn on_end(&mut self, detail: GestureDetail);
}

// ---------------------------------------------------------------------------
// DragGate
// ---------------------------------------------------------------------------

/// Decides whether a drag may start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGate {
    max_offset: Option<f32>,
    middle_height: Option<f32>,
    scroll_slack: f32,
}

impl DragGate {
    #[must_use]
    pub fn new(config: &DrawerConfig) -> Self {
        Self {
            max_offset: config.max_offset_limit(),
            middle_height: config.middle_height(),
            scroll_slack: config.tuning.scroll_slack,
        }
    }

    /// Whether the panel still has room to travel before reaching the
    /// scroll-blocking cap.
    #[must_use]
    pub fn can_open_further(&self) -> bool {
        match (self.max_offset, self.middle_height) {
            (None, _) => true,
            (Some(max), Some(middle)) => middle < max,
            (Some(_), None) => false,
        }
    }

    /// Whether `region` holds more content than it shows. A missing region
    /// is never scrollable.
    #[must_use]
    pub fn is_scrollable(&self, region: Option<&dyn ScrollRegion>) -> bool {
        region.is_some_and(|r| r.scroll_extent() > r.visible_extent() + self.scroll_slack)
    }

    /// Walk `origin` (origin node first) and decide at the first scroll
    /// content node. Without one, the drag is always permitted.
    #[must_use]
    pub fn can_start(&self, origin: &[OriginNode], region: Option<&dyn ScrollRegion>) -> bool {
        if !origin.contains(&OriginNode::ScrollContent) {
            return true;
        }
        self.can_open_further() || !self.is_scrollable(region)
    }
}

// ---------------------------------------------------------------------------
// DragSession
// ---------------------------------------------------------------------------

/// Lifecycle phase of the drag session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
}

/// Turns absolute pointer samples into displacements.
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    phase: DragPhase,
    last_y: Option<f32>,
    steps: u32,
}

impl DragSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a session, forgetting any previous sample.
    pub fn start(&mut self) {
        self.phase = DragPhase::Dragging;
        self.last_y = None;
        self.steps = 0;
    }

    /// Record `sample_y` and return the displacement since the previous
    /// sample.
    pub fn step(&mut self, sample_y: f32) -> f32 {
        if !sample_y.is_finite() {
            return 0.0;
        }
        let dy = self.last_y.map_or(0.0, |last| sample_y - last);
        self.last_y = Some(sample_y);
        self.steps = self.steps.saturating_add(1);
        dy
    }

    /// End the session.
    pub fn end(&mut self) {
        self.phase = DragPhase::Idle;
        self.last_y = None;
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.phase == DragPhase::Dragging
    }

    /// Last raw pointer coordinate of the active session.
    #[inline]
    #[must_use]
    pub fn last_y(&self) -> Option<f32> {
        self.last_y
    }

    /// Samples recorded since the last `start()`.
    #[inline]
    #[must_use]
    pub fn step_count(&self) -> u32 {
        self.steps
    }
}
