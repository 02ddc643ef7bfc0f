#![forbid(unsafe_code)]

//! The drawer: owner of all mutable runtime state.
//!
//! A [`Drawer`] wires the pure pieces together. Drag callbacks run through
//! the [`DragSession`] and [`OverscrollPolicy`]; a release goes through the
//! [`SnapEngine`]; settles go through the [`Sequencer`]. Nothing else
//! mutates state.
//!
//! # Lifecycle
//!
//! 1. [`Drawer::attach`] samples the environment, resolves the initial
//!    stop from `open_to` and writes its coordinate with transitions
//!    disabled.
//! 2. [`Drawer::on_frame`] after the first paint enables transitions, so the
//!    initial placement never animates.
//! 3. Drag callbacks, [`Drawer::set_open_to`], [`Drawer::poll`] and
//!    [`Drawer::on_transition_end`] drive the drawer from then on.
//! 4. [`Drawer::detach`] drops the drawer and any pending completion.
//!
//! # Invariants
//!
//! 1. `current_y` stays within `[top_padding, closed_y]`.
//! 2. At most one settle is pending; starting a drag or requesting another
//!    settle cancels it, so a stale completion can never fire.
//! 3. Every completed settle queues exactly one event: `Opened` for
//!    Start/Middle/End, `Closed` for Closed.
//! 4. Content growth is zero whenever no drag is beyond limits and after
//!    every completed settle.

use std::fmt;
use std::time::Instant;

use tracing::{debug, info, info_span, trace, warn};

use crate::config::{BASE_Z_INDEX, DrawerConfig, Environment};
use crate::event::DrawerEvent;
use crate::geometry::{Geometry, SnapTarget};
use crate::gesture::{
    DragGate, DragPhase, DragSession, GestureDetail, GestureHandler, OriginNode, ScrollRegion,
};
use crate::overscroll::OverscrollPolicy;
use crate::snap::{SnapDecision, SnapEngine};
use crate::transition::{PendingSettle, Sequencer, TransitionStyle};

// ---------------------------------------------------------------------------
// Render output
// ---------------------------------------------------------------------------

/// Geometry the renderer should apply to the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Vertical offset of the panel's top edge.
    pub translate_y: f32,
    pub panel_height: f32,
    /// Height of the inner content region, including overscroll growth.
    pub content_height: f32,
    /// Transition to apply to position changes; `None` while writes must be
    /// instantaneous (during a drag and before the first frame).
    pub transition: Option<TransitionStyle>,
}

impl Placement {
    /// CSS transform for the panel.
    #[must_use]
    pub fn transform(&self) -> String {
        format!("translateY({}px) translateZ(0)", self.translate_y)
    }
}

/// Attributes for the host element, passed through from config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAttributes {
    pub role: &'static str,
    pub aria_modal: bool,
    pub z_index: i32,
    pub classes: Vec<String>,
}

// ---------------------------------------------------------------------------
// DrawerRuntimeState
// ---------------------------------------------------------------------------

/// Snapshot of everything a drawer mutates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawerRuntimeState {
    /// Panel top edge; always within `[top_padding, closed_y]`.
    pub current_y: f32,
    /// Last raw pointer coordinate of the active drag; `None` when idle or
    /// before the first sample.
    pub last_drag_y: Option<f32>,
    /// Inner content height; equals the resting height unless a drag is
    /// beyond limits.
    pub content_height: f32,
    /// A settle has been requested and not yet completed.
    pub is_transitioning: bool,
    /// Position writes are animated by the renderer.
    pub transition_enabled: bool,
    /// Most recently settled-to or requested target.
    pub active_target: SnapTarget,
    pub phase: DragPhase,
    /// Samples fed to the current drag, or to the last one once released.
    pub drag_samples: u32,
    /// Settles that completed, by timer or transition end.
    pub settles_completed: u64,
    /// Settles dropped before completing (drag start, replacement, detach).
    pub settles_cancelled: u64,
}

// ---------------------------------------------------------------------------
// Drawer
// ---------------------------------------------------------------------------

/// A snapping bottom-sheet drawer.
pub struct Drawer {
    config: DrawerConfig,
    geometry: Geometry,
    overscroll: OverscrollPolicy,
    gate: DragGate,
    snap: SnapEngine,
    session: DragSession,
    sequencer: Sequencer,
    scroll_region: Option<Box<dyn ScrollRegion>>,
    current_y: f32,
    content_growth: f32,
    transition_enabled: bool,
    awaiting_first_frame: bool,
    active_target: SnapTarget,
    events: Vec<DrawerEvent>,
}

impl fmt::Debug for Drawer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Drawer")
            .field("current_y", &self.current_y)
            .field("active_target", &self.active_target)
            .field("phase", &self.session.phase())
            .field("content_growth", &self.content_growth)
            .field("transition_enabled", &self.transition_enabled)
            .field("pending_settle", &self.sequencer.pending())
            .field("has_scroll_region", &self.scroll_region.is_some())
            .field("pending_events", &self.events.len())
            .finish()
    }
}

impl Drawer {
    /// Attach a drawer: resolve `config.open_to` to its initial stop (see
    /// [`Geometry::initial_target`]) and place the panel there without
    /// animation.
    #[must_use]
    pub fn attach(config: DrawerConfig, env: Environment) -> Self {
        let geometry = Geometry::new(&config, &env);
        let active_target = geometry.initial_target(config.open_to);
        let current_y = geometry.clamp_y(geometry.y_for(active_target));
        debug!(
            viewport_height = env.viewport_height,
            top_padding = geometry.top_padding(),
            snap = %active_target,
            y = current_y,
            "drawer attached"
        );
        Self {
            overscroll: OverscrollPolicy::new(&config, geometry),
            gate: DragGate::new(&config),
            snap: SnapEngine::new(&config, geometry),
            sequencer: Sequencer::new(config.animation_duration),
            session: DragSession::new(),
            scroll_region: None,
            current_y,
            content_growth: 0.0,
            transition_enabled: false,
            awaiting_first_frame: true,
            active_target,
            events: Vec::new(),
            geometry,
            config,
        }
    }

    /// Attach the inner scroll region once the content collaborator is
    /// ready (builder form of [`set_scroll_region`](Self::set_scroll_region)).
    #[must_use]
    pub fn with_scroll_region(mut self, region: impl ScrollRegion + 'static) -> Self {
        self.scroll_region = Some(Box::new(region));
        self
    }

    /// Replace (or clear) the inner scroll region.
    pub fn set_scroll_region(&mut self, region: Option<Box<dyn ScrollRegion>>) {
        self.scroll_region = region;
    }

    /// Called once the initial placement has been painted. Enables the
    /// settle transition; later calls do nothing.
    pub fn on_frame(&mut self) {
        if self.awaiting_first_frame {
            self.awaiting_first_frame = false;
            self.transition_enabled = true;
            trace!("first frame painted; transitions enabled");
        }
    }

    /// Detach the drawer, dropping any pending completion.
    pub fn detach(mut self) -> DrawerRuntimeState {
        if self.sequencer.cancel().is_some() {
            debug!("pending settle dropped on detach");
        }
        self.state()
    }

    // -----------------------------------------------------------------------
    // Gesture callbacks
    // -----------------------------------------------------------------------

    /// Whether a drag originating along `origin` may start.
    #[must_use]
    pub fn can_start(&self, origin: &[OriginNode]) -> bool {
        let allowed = self.gate.can_start(origin, self.scroll_region.as_deref());
        trace!(allowed, "drag gate");
        allowed
    }

    /// Begin a drag. Takes priority over any settle in flight.
    pub fn on_drag_start(&mut self) {
        if let Some(cancelled) = self.sequencer.cancel() {
            debug!(snap = %cancelled.target, "settle interrupted by drag");
        }
        self.awaiting_first_frame = false;
        self.transition_enabled = false;
        self.session.start();
        debug!(y = self.current_y, "drag start");
    }

    /// Feed one pointer sample of the active drag.
    pub fn on_drag_move(&mut self, sample_y: f32) {
        if !self.session.is_dragging() {
            warn!(sample_y, "drag move without an active drag; ignored");
            return;
        }
        if !sample_y.is_finite() {
            warn!(sample_y, "non-finite drag sample; ignored");
            return;
        }
        let dy = self.session.step(sample_y);
        let step = self.overscroll.evaluate(self.current_y + dy);
        self.content_growth = step.content_growth;
        self.current_y = self.geometry.clamp_y(self.current_y + step.apply(dy));
        trace!(
            sample_y,
            dy,
            y = self.current_y,
            beyond_limits = step.beyond_limits,
            growth = step.content_growth,
            "drag move"
        );
    }

    /// Release the drag and settle where the snap engine decides.
    ///
    /// Returns `None`, leaving position and any pending settle untouched,
    /// when no drag is active.
    pub fn on_drag_end(&mut self, velocity_y: f32, now: Instant) -> Option<SnapDecision> {
        if !self.session.is_dragging() {
            warn!(velocity_y, "drag end without an active drag; ignored");
            return None;
        }
        self.session.end();
        self.transition_enabled = true;

        let velocity_y = if velocity_y.is_finite() {
            velocity_y
        } else {
            warn!(velocity_y, "non-finite release velocity; treating as zero");
            0.0
        };
        let decision = self.snap.decide(self.current_y, velocity_y);
        debug!(
            y = self.current_y,
            velocity_y,
            snap = %decision.target,
            rule = %decision.rule,
            "drag end"
        );
        self.settle(decision.target, now);
        Some(decision)
    }

    // -----------------------------------------------------------------------
    // Settling
    // -----------------------------------------------------------------------

    /// Request the drawer move to `target`, as the host does after changing
    /// its `open_to` option.
    ///
    /// Does nothing when the panel already rests at `target`. A fallback
    /// stop that merely shares a coordinate with the current one only counts
    /// as "already there" if it is also the active target. Returns whether a
    /// settle was started.
    pub fn set_open_to(&mut self, target: SnapTarget, now: Instant) -> bool {
        self.config.open_to = target;
        let stop = self.geometry.stop(target);
        let already_there = self.geometry.is_at(target, self.current_y)
            && (!stop.is_fallback() || self.active_target == target);
        if already_there {
            trace!(snap = %target, "open_to unchanged; no-op");
            return false;
        }
        self.settle(target, now);
        true
    }

    fn settle(&mut self, target: SnapTarget, now: Instant) {
        let span = info_span!("drawer.settle", snap = %target);
        let _guard = span.enter();

        let from_y = self.current_y;
        let to_y = self.slide_to(self.geometry.y_for(target));
        self.active_target = target;
        if let Some(replaced) = self.sequencer.settle(target, from_y, to_y, now) {
            debug!(replaced = %replaced.target, "pending settle replaced");
        }
        debug!(from_y, to_y, "settle scheduled");
    }

    fn slide_to(&mut self, y: f32) -> f32 {
        self.current_y = self.geometry.clamp_y(y);
        self.current_y
    }

    /// Fire the pending completion if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<DrawerEvent> {
        let done = self.sequencer.poll(now)?;
        Some(self.complete(done))
    }

    /// The renderer reported that the settle transition finished.
    pub fn on_transition_end(&mut self) -> Option<DrawerEvent> {
        let done = self.sequencer.transition_end()?;
        Some(self.complete(done))
    }

    fn complete(&mut self, done: PendingSettle) -> DrawerEvent {
        self.content_growth = 0.0;
        let event = DrawerEvent::for_target(done.target);
        info!(snap = %done.target, y = done.to_y, event = %event, "settle complete");
        self.events.push(event);
        event
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Drain all pending events. Clears the event queue.
    pub fn drain_events(&mut self) -> Vec<DrawerEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }

    /// Geometry to apply to the panel right now.
    #[must_use]
    pub fn placement(&self) -> Placement {
        Placement {
            translate_y: self.current_y,
            panel_height: self.geometry.panel_height(),
            content_height: self.content_height(),
            transition: self.transition_enabled.then(|| self.sequencer.style()),
        }
    }

    /// Where a frame-stepping host should draw the panel at `now`: the eased
    /// position while a settle is in flight, `current_y` otherwise.
    #[must_use]
    pub fn animated_y(&self, now: Instant) -> f32 {
        if self.transition_enabled {
            self.sequencer.interpolated_y(now).unwrap_or(self.current_y)
        } else {
            self.current_y
        }
    }

    #[must_use]
    pub fn host_attributes(&self) -> HostAttributes {
        HostAttributes {
            role: "dialog",
            aria_modal: true,
            z_index: BASE_Z_INDEX.saturating_add(self.config.overlay_index),
            classes: self.config.css_class.clone(),
        }
    }

    #[must_use]
    pub fn state(&self) -> DrawerRuntimeState {
        DrawerRuntimeState {
            current_y: self.current_y,
            last_drag_y: self.session.last_y(),
            content_height: self.content_height(),
            is_transitioning: self.sequencer.is_pending(),
            transition_enabled: self.transition_enabled,
            active_target: self.active_target,
            phase: self.session.phase(),
            drag_samples: self.session.step_count(),
            settles_completed: self.sequencer.completed_count(),
            settles_cancelled: self.sequencer.cancelled_count(),
        }
    }

    #[inline]
    #[must_use]
    pub fn current_y(&self) -> f32 {
        self.current_y
    }

    #[inline]
    #[must_use]
    pub fn active_target(&self) -> SnapTarget {
        self.active_target
    }

    #[inline]
    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &DrawerConfig {
        &self.config
    }

    /// Content height: resting height plus current growth.
    #[must_use]
    pub fn content_height(&self) -> f32 {
        self.geometry.resting_content_height() + self.content_growth
    }
}

impl GestureHandler for Drawer {
    fn can_start(&self, origin: &[OriginNode]) -> bool {
        Drawer::can_start(self, origin)
    }

    fn on_start(&mut self, _detail: GestureDetail) {
        self.on_drag_start();
    }

    fn on_move(&mut self, detail: GestureDetail) {
        self.on_drag_move(detail.current_y);
    }

    fn on_end(&mut self, detail: GestureDetail) {
        self.on_drag_end(detail.velocity_y, detail.timestamp);
    }
}
