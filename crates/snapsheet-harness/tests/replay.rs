#![forbid(unsafe_code)]

//! Replay traces and seeded storms against the drawer core.
//!
//! Run with `SNAPSHEET_JSONL=1` to print every trace.

use proptest::prelude::*;
use snapsheet_core::{DrawerConfig, DrawerEvent, SnapTarget};
use snapsheet_harness::logging::init_test_tracing;
use snapsheet_harness::{DragScript, DragStorm, Replay, ScriptStep, StormConfig, assert_report};

const TOP: f32 = 20.0;
const CLOSED: f32 = 820.0;

// ============================================================================
// Scripted cases
// ============================================================================

#[test]
fn script_loads_from_json() {
    init_test_tracing();
    let script = DragScript::from_json(
        r#"{
            "case": "json_open_middle",
            "viewport_height": 800,
            "config": { "open_height_middle": 300, "open_height_end": 600 },
            "steps": [
                { "step": "frame" },
                { "step": "start", "at_ms": 0 },
                { "step": "move", "at_ms": 0, "y": 820 },
                { "step": "move", "at_ms": 16, "y": 480 },
                { "step": "end", "at_ms": 32, "velocity_y": 0.1 },
                { "step": "advance", "to_ms": 600 }
            ]
        }"#,
    )
    .expect("valid script");
    assert_eq!(script.steps.len(), 6);

    let report = Replay::run(&script);
    let end = report.events_named("drag_end").next().expect("drag_end line");
    assert_eq!(end["target"], "middle");
    assert_eq!(end["rule"], "at_or_above_middle");
    assert_eq!(report.final_state.current_y, 500.0);
    assert_eq!(report.notifications, vec![DrawerEvent::Opened]);
    assert_report(&report, TOP, CLOSED);
}

#[test]
fn early_transition_end_beats_timer() {
    init_test_tracing();
    let script = DragScript::new("early_end", DrawerConfig::default().with_end_height(400.0), 800.0)
        .frame()
        .open_to(0, SnapTarget::End)
        .step(ScriptStep::TransitionEnd { at_ms: 120 })
        .advance(2_000);
    let report = Replay::run(&script);
    assert_eq!(report.notifications, vec![DrawerEvent::Opened]);
    let notify = report.events_named("notify").next().expect("notify line");
    assert_eq!(notify["at_ms"], 120);
}

#[test]
fn fling_down_from_open_closes() {
    init_test_tracing();
    let config = DrawerConfig::default().with_end_height(400.0);
    let script = DragScript::new("fling_down", config, 800.0)
        .frame()
        .open_to(0, SnapTarget::End)
        .advance(500)
        .drag(600, &[400.0, 420.0], 1.5)
        .advance(1_500);
    let report = Replay::run(&script);
    let end = report.events_named("drag_end").next().expect("drag_end line");
    assert_eq!(end["rule"], "fling_down");
    assert_eq!(
        report.notifications,
        vec![DrawerEvent::Opened, DrawerEvent::Closed]
    );
    assert_eq!(report.final_state.active_target, SnapTarget::Closed);
    assert_report(&report, TOP, CLOSED);
}

#[test]
fn open_to_config_starts_at_start_stop() {
    init_test_tracing();
    let config = DrawerConfig::default()
        .with_start_height(150.0)
        .with_end_height(600.0)
        .open_to(SnapTarget::End);
    let script = DragScript::new("initial_start", config, 800.0).frame();
    let report = Replay::run(&script);
    let start = report.events_named("replay_start").next().expect("replay_start line");
    assert_eq!(start["y"], 650.0);
    assert_eq!(report.final_state.active_target, SnapTarget::Start);
}

#[test]
fn safe_area_script_respects_inset() {
    init_test_tracing();
    let script = DragScript::new("inset", DrawerConfig::default(), 800.0)
        .with_safe_area_inset()
        .frame()
        .drag(0, &[820.0, 60.0], 0.0)
        .advance(1_000);
    let report = Replay::run(&script);
    assert_eq!(report.y_range.0, 40.0);
    assert_report(&report, 40.0, CLOSED);
}

// ============================================================================
// Storms
// ============================================================================

#[test]
fn default_storms_hold_invariants() {
    init_test_tracing();
    for seed in 0..16 {
        let script = DragStorm::new(StormConfig::default().with_seed(seed)).script();
        let report = Replay::run(&script);
        assert_report(&report, TOP, CLOSED);
    }
}

#[test]
fn capped_storms_hold_invariants() {
    init_test_tracing();
    let config = DrawerConfig::default()
        .with_middle_height(350.0)
        .with_max_offset(300.0);
    for seed in 100..110 {
        let storm = StormConfig::default()
            .with_seed(seed)
            .with_bursts(20)
            .with_config(config.clone());
        let report = Replay::run(&DragStorm::new(storm).script());
        assert_report(&report, TOP, CLOSED);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_seed_holds_invariants(seed in any::<u64>(), bursts in 1usize..30) {
        let storm = StormConfig::default().with_seed(seed).with_bursts(bursts);
        let report = Replay::run(&DragStorm::new(storm).script());
        let (low, high) = report.y_range;
        prop_assert!(low >= TOP && high <= CLOSED, "{}", report.to_jsonl());
        // The final advance is long enough for any pending settle to fire.
        prop_assert!(!report.final_state.is_transitioning);
    }
}
