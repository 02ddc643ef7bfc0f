#![forbid(unsafe_code)]

//! Core: snapping bottom-sheet drawer geometry, gestures, and settling.
//!
//! The host owns rendering, the gesture recognizer and safe-area detection.
//! It feeds drag samples and clock readings into a [`Drawer`] and applies the
//! resulting [`Placement`] and [`DrawerEvent`]s.
//!
//! ```
//! use std::time::{Duration, Instant};
//! use snapsheet_core::{Drawer, DrawerConfig, DrawerEvent, Environment, SnapTarget};
//!
//! let config = DrawerConfig::default().with_end_height(400.0);
//! let mut drawer = Drawer::attach(config, Environment::new(800.0));
//! drawer.on_frame();
//!
//! drawer.on_drag_start();
//! drawer.on_drag_move(780.0);
//! drawer.on_drag_move(250.0);
//! let t0 = Instant::now();
//! let decision = drawer.on_drag_end(0.0, t0).expect("drag is active");
//! assert_eq!(decision.target, SnapTarget::End);
//!
//! drawer.poll(t0 + Duration::from_millis(400));
//! assert_eq!(drawer.drain_events(), vec![DrawerEvent::Opened]);
//! ```

pub mod config;
pub mod drawer;
pub mod error;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod overscroll;
pub mod snap;
pub mod transition;

pub use config::{DrawerConfig, Environment, SnapTuning};
pub use drawer::{Drawer, DrawerRuntimeState, HostAttributes, Placement};
pub use error::{ConfigError, ParseTargetError};
pub use event::DrawerEvent;
pub use geometry::{Geometry, SnapTarget, Stop};
pub use gesture::{
    DragPhase, GestureDetail, GestureHandler, GestureRegistration, OriginNode, ScrollMetrics,
    ScrollRegion,
};
pub use snap::{SnapDecision, SnapRule};
pub use transition::TransitionStyle;
