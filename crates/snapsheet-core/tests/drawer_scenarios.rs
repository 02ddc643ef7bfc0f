#![forbid(unsafe_code)]

//! End-to-end drawer scenarios: attach, drag, release, settle.

use std::time::{Duration, Instant};

use snapsheet_core::gesture::DragGate;
use snapsheet_core::overscroll::OverscrollPolicy;
use snapsheet_core::{
    Drawer, DrawerConfig, DrawerEvent, Environment, Geometry, OriginNode, ScrollMetrics,
    SnapTarget,
};

const MS_400: Duration = Duration::from_millis(400);

fn env() -> Environment {
    Environment::new(800.0)
}

fn end_only() -> DrawerConfig {
    DrawerConfig::default().with_end_height(400.0)
}

fn attached(config: DrawerConfig) -> Drawer {
    let mut drawer = Drawer::attach(config, env());
    drawer.on_frame();
    drawer
}

/// Attach and complete a settle at the end stop.
fn opened_at_end(config: DrawerConfig) -> Drawer {
    let mut drawer = attached(config);
    drawer.set_open_to(SnapTarget::End, Instant::now());
    drawer.on_transition_end();
    drawer.drain_events();
    drawer
}

/// Drag the panel so that it rests at `y`, starting from wherever it is.
fn drag_to(drawer: &mut Drawer, y: f32) {
    let from = drawer.current_y();
    drawer.on_drag_start();
    drawer.on_drag_move(from);
    drawer.on_drag_move(y);
}

#[test]
fn release_above_end_opens_and_notifies_after_duration() {
    let mut drawer = attached(end_only());
    drag_to(&mut drawer, 250.0);
    assert_eq!(drawer.current_y(), 250.0);

    let t0 = Instant::now();
    let decision = drawer.on_drag_end(0.0, t0).expect("active drag");
    assert_eq!(decision.target, SnapTarget::End);
    assert_eq!(drawer.current_y(), 400.0);

    assert_eq!(drawer.poll(t0 + Duration::from_millis(200)), None);
    assert_eq!(drawer.poll(t0 + MS_400), Some(DrawerEvent::Opened));
    assert_eq!(drawer.drain_events(), vec![DrawerEvent::Opened]);
}

#[test]
fn release_far_below_end_closes() {
    let mut drawer = opened_at_end(end_only());
    assert_eq!(drawer.current_y(), 400.0);
    drag_to(&mut drawer, 550.0);

    let t0 = Instant::now();
    let decision = drawer.on_drag_end(0.0, t0).expect("active drag");
    assert_eq!(decision.target, SnapTarget::Closed);
    assert_eq!(drawer.current_y(), 820.0);
    assert_eq!(drawer.poll(t0 + MS_400), Some(DrawerEvent::Closed));
}

#[test]
fn upward_fling_opens_from_anywhere() {
    for y in [30.0, 420.0, 700.0, 810.0] {
        let mut drawer = attached(end_only());
        drag_to(&mut drawer, y);
        let decision = drawer
            .on_drag_end(-0.8, Instant::now())
            .expect("active drag");
        assert_eq!(decision.target, SnapTarget::End, "released at {y}");
    }
}

#[test]
fn idempotent_open_request_emits_nothing_new() {
    let mut drawer = attached(end_only());
    let t0 = Instant::now();
    assert!(drawer.set_open_to(SnapTarget::End, t0));
    assert_eq!(drawer.poll(t0 + MS_400), Some(DrawerEvent::Opened));

    let t1 = t0 + MS_400;
    assert!(!drawer.set_open_to(SnapTarget::End, t1));
    assert!(!drawer.state().is_transitioning);
    assert_eq!(drawer.poll(t1 + MS_400), None);
    assert_eq!(drawer.drain_events(), vec![DrawerEvent::Opened]);
}

#[test]
fn scrollable_content_gates_drag_only_when_capped() {
    // Content overflows its visible extent by 50.
    let region = ScrollMetrics::new(650.0, 600.0);
    let origin = [OriginNode::Element, OriginNode::ScrollContent];

    let uncapped = attached(end_only()).with_scroll_region(region);
    assert!(uncapped.can_start(&origin));

    let capped = attached(end_only().with_max_offset(400.0)).with_scroll_region(region);
    assert!(!capped.can_start(&origin));

    let gate = DragGate::new(&end_only().with_max_offset(400.0));
    assert!(gate.can_start(&origin, None));
}

#[test]
fn middle_above_cap_overscrolls_with_friction() {
    let config = DrawerConfig::default()
        .with_middle_height(350.0)
        .with_max_offset(300.0);
    let geometry = Geometry::new(&config, &env());
    let policy = OverscrollPolicy::new(&config, geometry);

    let below_end = geometry.open_end_y() - 5.0;
    let step = policy.evaluate(below_end);
    assert!(step.beyond_limits);
    assert!((step.apply(-10.0) + 3.0).abs() < 1e-5);
}

#[test]
fn new_drag_interrupts_settle_without_stale_notification() {
    let mut drawer = attached(end_only());
    let t0 = Instant::now();
    drawer.set_open_to(SnapTarget::End, t0);

    // Grab the panel half way through the settle and pull it down.
    drawer.on_drag_start();
    drawer.on_drag_move(400.0);
    drawer.on_drag_move(700.0);
    assert_eq!(drawer.poll(t0 + MS_400), None);

    let t1 = t0 + Duration::from_millis(500);
    let decision = drawer.on_drag_end(0.0, t1).expect("active drag");
    assert_eq!(decision.target, SnapTarget::Closed);
    assert_eq!(drawer.poll(t1 + MS_400), Some(DrawerEvent::Closed));
    assert_eq!(drawer.drain_events(), vec![DrawerEvent::Closed]);
}

#[test]
fn programmatic_request_replaces_pending_settle() {
    let config = end_only().with_middle_height(250.0);
    let mut drawer = attached(config);
    let t0 = Instant::now();
    drawer.set_open_to(SnapTarget::End, t0);
    drawer.set_open_to(SnapTarget::Middle, t0 + Duration::from_millis(100));
    assert_eq!(drawer.current_y(), 550.0);

    assert_eq!(drawer.poll(t0 + MS_400), None);
    assert_eq!(
        drawer.poll(t0 + Duration::from_millis(500)),
        Some(DrawerEvent::Opened)
    );
    assert_eq!(drawer.drain_events().len(), 1);
}

#[test]
fn transition_end_event_completes_early() {
    let mut drawer = attached(end_only());
    let t0 = Instant::now();
    drawer.set_open_to(SnapTarget::End, t0);
    assert_eq!(drawer.on_transition_end(), Some(DrawerEvent::Opened));
    assert_eq!(drawer.poll(t0 + MS_400), None);
    assert_eq!(drawer.on_transition_end(), None);
}

#[test]
fn safe_area_inset_moves_fallback_end() {
    let env = Environment::new(800.0).with_safe_area_inset(true);
    let mut drawer = Drawer::attach(DrawerConfig::default(), env);
    drawer.on_frame();
    drawer.set_open_to(SnapTarget::End, Instant::now());
    assert_eq!(drawer.current_y(), 40.0);
    assert_eq!(drawer.placement().panel_height, 760.0);
}

#[test]
fn overscroll_growth_returns_to_rest_before_release() {
    let mut drawer = opened_at_end(end_only().with_max_offset(300.0));
    drawer.on_drag_start();
    drawer.on_drag_move(600.0);
    drawer.on_drag_move(450.0);
    drawer.on_drag_move(380.0);
    assert!(drawer.content_height() > 400.0);
    drawer.on_drag_move(700.0);
    assert_eq!(drawer.content_height(), 400.0);
}

#[test]
fn initial_open_uses_start_stop_or_stays_closed() {
    let config = DrawerConfig::default()
        .with_start_height(150.0)
        .with_end_height(600.0)
        .open_to(SnapTarget::End);
    let drawer = Drawer::attach(config, env());
    assert_eq!(drawer.current_y(), 650.0);
    assert_eq!(drawer.active_target(), SnapTarget::Start);

    let drawer = Drawer::attach(DrawerConfig::default().open_to(SnapTarget::End), env());
    assert_eq!(drawer.current_y(), 820.0);
    assert_eq!(drawer.active_target(), SnapTarget::Closed);
}

#[test]
fn zero_max_offset_leaves_scroll_gate_open() {
    let region = ScrollMetrics::new(900.0, 400.0);
    let drawer = attached(end_only().with_max_offset(0.0)).with_scroll_region(region);
    assert!(drawer.can_start(&[OriginNode::ScrollContent]));
    assert!(end_only().with_max_offset(0.0).validate().is_ok());
}

#[test]
fn stray_release_does_not_settle() {
    let mut drawer = opened_at_end(end_only());
    let t0 = Instant::now();
    assert_eq!(drawer.on_drag_end(3.0, t0), None);
    assert_eq!(drawer.current_y(), 400.0);
    assert_eq!(drawer.poll(t0 + MS_400), None);
    assert!(drawer.drain_events().is_empty());
}
