#![forbid(unsafe_code)]

//! Scripted drag replay on a virtual clock.
//!
//! A [`DragScript`] lists the callbacks a host would deliver (first frame,
//! drag start/move/end, `open_to` requests, transition-end events, clock
//! advances) with millisecond timestamps. [`Replay::run`] feeds them into a
//! fresh [`Drawer`], firing due completion timers before each step just as
//! an event loop would, and records a JSONL trace.
//!
//! # JSONL Schema
//!
//! ```json
//! {"event":"replay_start","case":"open_end","viewport_height":800.0,"top_padding":20.0,"y":820.0}
//! {"event":"drag_start","at_ms":0,"allowed":true}
//! {"event":"drag_move","at_ms":16,"sample_y":640.0,"y":640.0,"content_height":400.0}
//! {"event":"drag_end","at_ms":48,"velocity_y":0.0,"samples":3,"target":"end","rule":"at_or_above_end","y":400.0}
//! {"event":"notify","at_ms":448,"kind":"opened","y":400.0}
//! {"event":"replay_complete","y":400.0,"active_target":"end","notifications":1,"settles_completed":1,"settles_cancelled":0}
//! ```
//!
//! # Failure Modes
//!
//! - Timestamps that go backwards are clamped to the current clock.
//! - Moves and releases after a rejected drag start are skipped (and
//!   logged as `skipped`), matching a recognizer that never activated. A
//!   release the drawer ignores because no drag is active is logged the
//!   same way.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use snapsheet_core::{
    Drawer, DrawerConfig, DrawerEvent, DrawerRuntimeState, Environment, OriginNode, ScrollMetrics,
    SnapTarget,
};
use tracing::{debug, info_span};

// ============================================================================
// Script
// ============================================================================

/// One host callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScriptStep {
    /// The initial placement was painted.
    Frame,
    /// The recognizer asks to start a drag.
    Start {
        at_ms: u64,
        /// Whether the touch began inside the scroll content region.
        #[serde(default)]
        in_scroll_content: bool,
    },
    /// A pointer sample.
    Move { at_ms: u64, y: f32 },
    /// The pointer was released.
    End { at_ms: u64, velocity_y: f32 },
    /// The host changed `open_to`.
    OpenTo { at_ms: u64, target: SnapTarget },
    /// The renderer reported the end of the transition.
    TransitionEnd { at_ms: u64 },
    /// Let the clock run, firing due timers.
    Advance { to_ms: u64 },
}

impl ScriptStep {
    fn at_ms(&self) -> Option<u64> {
        match self {
            ScriptStep::Frame => None,
            ScriptStep::Start { at_ms, .. }
            | ScriptStep::Move { at_ms, .. }
            | ScriptStep::End { at_ms, .. }
            | ScriptStep::OpenTo { at_ms, .. }
            | ScriptStep::TransitionEnd { at_ms } => Some(*at_ms),
            ScriptStep::Advance { to_ms } => Some(*to_ms),
        }
    }
}

/// A named sequence of host callbacks against one drawer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragScript {
    pub case: String,
    pub viewport_height: f32,
    #[serde(default)]
    pub safe_area_inset: bool,
    #[serde(default)]
    pub config: DrawerConfig,
    /// Scroll and visible extent of the content region, if present.
    #[serde(default)]
    pub scroll: Option<(f32, f32)>,
    pub steps: Vec<ScriptStep>,
}

impl DragScript {
    /// Empty script for a drawer in a viewport of `viewport_height`.
    #[must_use]
    pub fn new(case: impl Into<String>, config: DrawerConfig, viewport_height: f32) -> Self {
        Self {
            case: case.into(),
            viewport_height,
            safe_area_inset: false,
            config,
            scroll: None,
            steps: Vec::new(),
        }
    }

    /// Parse a script from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn with_safe_area_inset(mut self) -> Self {
        self.safe_area_inset = true;
        self
    }

    #[must_use]
    pub fn with_scroll(mut self, scroll_extent: f32, visible_extent: f32) -> Self {
        self.scroll = Some((scroll_extent, visible_extent));
        self
    }

    #[must_use]
    pub fn step(mut self, step: ScriptStep) -> Self {
        self.steps.push(step);
        self
    }

    #[must_use]
    pub fn frame(self) -> Self {
        self.step(ScriptStep::Frame)
    }

    /// A full drag: start at `at_ms`, one sample every 16 ms through `ys`,
    /// release with `velocity_y` one frame after the last sample.
    #[must_use]
    pub fn drag(mut self, at_ms: u64, ys: &[f32], velocity_y: f32) -> Self {
        self.steps.push(ScriptStep::Start {
            at_ms,
            in_scroll_content: false,
        });
        let mut t = at_ms;
        for &y in ys {
            self.steps.push(ScriptStep::Move { at_ms: t, y });
            t += 16;
        }
        self.steps.push(ScriptStep::End { at_ms: t, velocity_y });
        self
    }

    #[must_use]
    pub fn open_to(self, at_ms: u64, target: SnapTarget) -> Self {
        self.step(ScriptStep::OpenTo { at_ms, target })
    }

    #[must_use]
    pub fn advance(self, to_ms: u64) -> Self {
        self.step(ScriptStep::Advance { to_ms })
    }

    fn environment(&self) -> Environment {
        Environment::new(self.viewport_height).with_safe_area_inset(self.safe_area_inset)
    }
}

// ============================================================================
// Report
// ============================================================================

/// Outcome of one replay.
#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub case: String,
    /// Trace, one JSON object per line.
    pub lines: Vec<Value>,
    /// Notifications in the order they fired.
    pub notifications: Vec<DrawerEvent>,
    pub final_state: DrawerRuntimeState,
    /// Lowest and highest `current_y` observed after any step.
    pub y_range: (f32, f32),
}

impl ReplayReport {
    /// Trace as JSONL.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        self.lines
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Trace lines whose `event` field equals `name`.
    pub fn events_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.lines
            .iter()
            .filter(move |line| line["event"] == name)
    }
}

// ============================================================================
// Replay
// ============================================================================

/// Runs scripts against fresh drawers.
#[derive(Debug)]
pub struct Replay {
    drawer: Drawer,
    origin: Instant,
    now_ms: u64,
    rejected: bool,
    lines: Vec<Value>,
    notifications: Vec<DrawerEvent>,
    y_range: (f32, f32),
}

impl Replay {
    /// Run `script` to completion.
    #[must_use]
    pub fn run(script: &DragScript) -> ReplayReport {
        let span = info_span!("replay", case = %script.case);
        let _guard = span.enter();

        let env = script.environment();
        let mut drawer = Drawer::attach(script.config.clone(), env);
        if let Some((scroll_extent, visible_extent)) = script.scroll {
            drawer = drawer.with_scroll_region(ScrollMetrics::new(scroll_extent, visible_extent));
        }
        let y = drawer.current_y();
        let mut replay = Self {
            drawer,
            origin: Instant::now(),
            now_ms: 0,
            rejected: false,
            lines: Vec::new(),
            notifications: Vec::new(),
            y_range: (y, y),
        };
        replay.lines.push(json!({
            "event": "replay_start",
            "case": script.case,
            "viewport_height": env.viewport_height,
            "top_padding": env.top_padding(),
            "y": y,
        }));

        for step in &script.steps {
            if let Some(at_ms) = step.at_ms() {
                replay.advance_to(at_ms);
            }
            replay.apply(step);
            replay.observe_y();
        }

        let state = replay.drawer.state();
        replay.lines.push(json!({
            "event": "replay_complete",
            "y": state.current_y,
            "active_target": state.active_target.as_str(),
            "notifications": replay.notifications.len(),
            "settles_completed": state.settles_completed,
            "settles_cancelled": state.settles_cancelled,
        }));
        debug!(lines = replay.lines.len(), "replay complete");

        ReplayReport {
            case: script.case.clone(),
            lines: replay.lines,
            notifications: replay.notifications,
            final_state: state,
            y_range: replay.y_range,
        }
    }

    fn at(&self, ms: u64) -> Instant {
        self.origin + Duration::from_millis(ms)
    }

    /// Move the clock forward to `ms`, firing any timer that falls due.
    fn advance_to(&mut self, ms: u64) {
        self.now_ms = self.now_ms.max(ms);
        if let Some(event) = self.drawer.poll(self.at(self.now_ms)) {
            self.record_notification(event);
        }
    }

    fn apply(&mut self, step: &ScriptStep) {
        let now = self.at(self.now_ms);
        match *step {
            ScriptStep::Frame => {
                self.drawer.on_frame();
                self.lines.push(json!({ "event": "frame" }));
            }
            ScriptStep::Start {
                in_scroll_content, ..
            } => {
                let origin: &[OriginNode] = if in_scroll_content {
                    &[OriginNode::ScrollContent]
                } else {
                    &[OriginNode::Element]
                };
                let allowed = self.drawer.can_start(origin);
                self.rejected = !allowed;
                if allowed {
                    self.drawer.on_drag_start();
                }
                self.lines.push(json!({
                    "event": "drag_start",
                    "at_ms": self.now_ms,
                    "allowed": allowed,
                }));
            }
            ScriptStep::Move { y, .. } => {
                if self.rejected {
                    self.skip("move");
                    return;
                }
                self.drawer.on_drag_move(y);
                self.lines.push(json!({
                    "event": "drag_move",
                    "at_ms": self.now_ms,
                    "sample_y": y,
                    "y": self.drawer.current_y(),
                    "content_height": self.drawer.content_height(),
                }));
            }
            ScriptStep::End { velocity_y, .. } => {
                if self.rejected {
                    self.rejected = false;
                    self.skip("end");
                    return;
                }
                let Some(decision) = self.drawer.on_drag_end(velocity_y, now) else {
                    self.skip("end");
                    return;
                };
                self.lines.push(json!({
                    "event": "drag_end",
                    "at_ms": self.now_ms,
                    "velocity_y": velocity_y,
                    "samples": self.drawer.state().drag_samples,
                    "target": decision.target.as_str(),
                    "rule": decision.rule.as_str(),
                    "y": self.drawer.current_y(),
                }));
            }
            ScriptStep::OpenTo { target, .. } => {
                let started = self.drawer.set_open_to(target, now);
                self.lines.push(json!({
                    "event": "open_to",
                    "at_ms": self.now_ms,
                    "target": target.as_str(),
                    "started": started,
                    "y": self.drawer.current_y(),
                }));
            }
            ScriptStep::TransitionEnd { .. } => {
                if let Some(event) = self.drawer.on_transition_end() {
                    self.record_notification(event);
                }
            }
            ScriptStep::Advance { .. } => {}
        }
    }

    fn record_notification(&mut self, event: DrawerEvent) {
        // The drawer queues the same event; drain so the queue stays bounded.
        self.drawer.drain_events();
        self.notifications.push(event);
        self.lines.push(json!({
            "event": "notify",
            "at_ms": self.now_ms,
            "kind": event.as_str(),
            "y": self.drawer.current_y(),
        }));
    }

    fn skip(&mut self, what: &str) {
        self.lines.push(json!({
            "event": "skipped",
            "at_ms": self.now_ms,
            "step": what,
        }));
    }

    fn observe_y(&mut self) {
        let y = self.drawer.current_y();
        self.y_range = (self.y_range.0.min(y), self.y_range.1.max(y));
    }
}
