#![forbid(unsafe_code)]

//! Settle transitions and their completion timer.
//!
//! The visual move is driven by the renderer through a duration-based
//! transition style; this module only describes that style and decides when
//! the move counts as finished. Completion is detected in one of two ways:
//!
//! - the host reports a real transition-end event
//!   ([`Sequencer::transition_end`]), or
//! - the fallback deadline passes ([`Sequencer::poll`]).
//!
//! Whichever comes first consumes the pending settle; the other then finds
//! nothing to do.
//!
//! # Invariants
//!
//! 1. At most one settle is pending at any time. Scheduling a new one
//!    cancels the previous one without completing it.
//! 2. Each scheduled settle completes at most once.
//! 3. A cancelled settle never completes.

use std::fmt;
use std::time::{Duration, Instant};

use crate::geometry::SnapTarget;

// ---------------------------------------------------------------------------
// CubicBezier
// ---------------------------------------------------------------------------

/// CSS-style timing curve through `(0, 0)`, `(x1, y1)`, `(x2, y2)`, `(1, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl CubicBezier {
    /// Strong ease-out used for drawer settles.
    pub const SETTLE: CubicBezier = CubicBezier::new(0.23, 1.0, 0.32, 1.0);

    #[must_use]
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    fn coord(t: f32, p1: f32, p2: f32) -> f32 {
        let u = 1.0 - t;
        3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
    }

    fn slope(t: f32, p1: f32, p2: f32) -> f32 {
        let u = 1.0 - t;
        3.0 * u * u * p1 + 6.0 * u * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
    }

    /// Solve the curve parameter whose x equals `x`.
    fn solve_t(&self, x: f32) -> f32 {
        let mut t = x;
        for _ in 0..8 {
            let err = Self::coord(t, self.x1, self.x2) - x;
            if err.abs() < 1e-5 {
                return t;
            }
            let d = Self::slope(t, self.x1, self.x2);
            if d.abs() < 1e-6 {
                break;
            }
            t = (t - err / d).clamp(0.0, 1.0);
        }
        // Newton stalled: bisect.
        let (mut lo, mut hi) = (0.0f32, 1.0f32);
        t = x;
        for _ in 0..32 {
            let cx = Self::coord(t, self.x1, self.x2);
            if (cx - x).abs() < 1e-5 {
                break;
            }
            if cx < x {
                lo = t;
            } else {
                hi = t;
            }
            t = (lo + hi) / 2.0;
        }
        t
    }

    /// Eased progress for linear progress `t` in [0, 1].
    #[must_use]
    pub fn ease(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 || t == 1.0 {
            return t;
        }
        Self::coord(self.solve_t(t), self.y1, self.y2)
    }
}

impl fmt::Display for CubicBezier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cubic-bezier({}, {}, {}, {})",
            self.x1, self.y1, self.x2, self.y2
        )
    }
}

// ---------------------------------------------------------------------------
// TransitionStyle
// ---------------------------------------------------------------------------

/// Transition the renderer applies to position writes while enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionStyle {
    pub duration: Duration,
    pub curve: CubicBezier,
}

impl TransitionStyle {
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            curve: CubicBezier::SETTLE,
        }
    }
}

impl fmt::Display for TransitionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms transform {}", self.duration.as_millis(), self.curve)
    }
}

// ---------------------------------------------------------------------------
// Sequencer
// ---------------------------------------------------------------------------

/// A scheduled settle waiting for completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingSettle {
    pub target: SnapTarget,
    pub from_y: f32,
    pub to_y: f32,
    pub started: Instant,
    pub due: Instant,
}

impl PendingSettle {
    /// Linear progress at `now`, in [0, 1].
    #[must_use]
    pub fn progress(&self, now: Instant) -> f32 {
        let total = self.due.saturating_duration_since(self.started);
        if total.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0) as f32
    }
}

/// Owns the single pending settle and its fallback deadline.
#[derive(Debug, Clone)]
pub struct Sequencer {
    style: TransitionStyle,
    pending: Option<PendingSettle>,
    completed: u64,
    cancelled: u64,
}

impl Sequencer {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            style: TransitionStyle::new(duration),
            pending: None,
            completed: 0,
            cancelled: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn style(&self) -> TransitionStyle {
        self.style
    }

    /// Schedule completion of a move to `target` at `now + duration`.
    ///
    /// Returns the settle this one replaced, if any.
    pub fn settle(
        &mut self,
        target: SnapTarget,
        from_y: f32,
        to_y: f32,
        now: Instant,
    ) -> Option<PendingSettle> {
        let replaced = self.cancel();
        self.pending = Some(PendingSettle {
            target,
            from_y,
            to_y,
            started: now,
            due: now + self.style.duration,
        });
        replaced
    }

    /// Drop the pending settle without completing it.
    pub fn cancel(&mut self) -> Option<PendingSettle> {
        let cancelled = self.pending.take();
        if cancelled.is_some() {
            self.cancelled += 1;
        }
        cancelled
    }

    /// Complete the pending settle if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<PendingSettle> {
        match self.pending {
            Some(p) if now >= p.due => self.complete(),
            _ => None,
        }
    }

    /// Complete the pending settle because the renderer reported the end
    /// of the transition.
    pub fn transition_end(&mut self) -> Option<PendingSettle> {
        self.complete()
    }

    fn complete(&mut self) -> Option<PendingSettle> {
        let done = self.pending.take();
        if done.is_some() {
            self.completed += 1;
        }
        done
    }

    #[inline]
    #[must_use]
    pub fn pending(&self) -> Option<&PendingSettle> {
        self.pending.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Position the renderer should be showing at `now`, for hosts that step
    /// frames themselves instead of relying on a transition style.
    #[must_use]
    pub fn interpolated_y(&self, now: Instant) -> Option<f32> {
        self.pending.map(|p| {
            let t = self.style.curve.ease(p.progress(now));
            p.from_y + (p.to_y - p.from_y) * t
        })
    }

    /// Settles completed so far (diagnostic).
    #[inline]
    #[must_use]
    pub fn completed_count(&self) -> u64 {
        self.completed
    }

    /// Settles cancelled so far (diagnostic).
    #[inline]
    #[must_use]
    pub fn cancelled_count(&self) -> u64 {
        self.cancelled
    }
}
