#![forbid(unsafe_code)]

//! Replay and stress tooling for `snapsheet-core`.
//!
//! - **Replay**: [`replay::DragScript`] describes host callbacks with
//!   virtual timestamps; [`replay::Replay::run`] drives a fresh drawer
//!   through them and returns a JSONL trace.
//! - **Storms**: [`storm::DragStorm`] generates seeded random scripts for
//!   invariant checks.
//! - **Logging**: [`logging::init_test_tracing`] routes the core crate's
//!   `tracing` output to the test writer.
//!
//! # Quick Start
//!
//! ```
//! use snapsheet_core::{DrawerConfig, DrawerEvent};
//! use snapsheet_harness::replay::{DragScript, Replay};
//!
//! let script = DragScript::new("open", DrawerConfig::default().with_end_height(400.0), 800.0)
//!     .frame()
//!     .drag(0, &[820.0, 300.0], 0.0)
//!     .advance(1_000);
//! let report = Replay::run(&script);
//! assert_eq!(report.notifications, vec![DrawerEvent::Opened]);
//! ```
//!
//! Set `SNAPSHEET_JSONL=1` to have [`assert_report`] print the trace of
//! every checked report, not only failing ones.

pub mod logging;
pub mod replay;
pub mod storm;

pub use replay::{DragScript, Replay, ReplayReport, ScriptStep};
pub use storm::{DragStorm, StormConfig};

/// Check the replay invariants on `report`, panicking with the JSONL trace
/// on failure.
///
/// - `current_y` stays within `[top_padding, closed_y]`.
/// - Notifications never outnumber the settles that were started.
/// - Every completed settle produced exactly one notification.
pub fn assert_report(report: &ReplayReport, top_padding: f32, closed_y: f32) {
    if std::env::var_os("SNAPSHEET_JSONL").is_some() {
        eprintln!("{}", report.to_jsonl());
    }

    let (low, high) = report.y_range;
    let settles = report.events_named("drag_end").count()
        + report
            .events_named("open_to")
            .filter(|line| line["started"] == true)
            .count();

    let mut failures = Vec::new();
    if low < top_padding || high > closed_y {
        failures.push(format!(
            "y range [{low}, {high}] outside [{top_padding}, {closed_y}]"
        ));
    }
    if report.notifications.len() > settles {
        failures.push(format!(
            "{} notifications for {settles} settles",
            report.notifications.len()
        ));
    }

    let completed = report.final_state.settles_completed;
    if completed != report.notifications.len() as u64 {
        failures.push(format!(
            "{completed} settles completed but {} notifications",
            report.notifications.len()
        ));
    }

    assert!(
        failures.is_empty(),
        "replay {} failed:\n  {}\n--- JSONL ---\n{}",
        report.case,
        failures.join("\n  "),
        report.to_jsonl()
    );
}
