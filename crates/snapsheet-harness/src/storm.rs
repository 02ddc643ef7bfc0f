#![forbid(unsafe_code)]

//! Seeded random drag scripts.
//!
//! A [`DragStorm`] produces reproducible [`DragScript`]s: bursts of drags
//! with jittered samples and release velocities, interleaved with `open_to`
//! requests, early transition-end reports and idle gaps. The same seed
//! always yields the same script, so a failing case can be replayed from
//! its seed alone.
//!
//! # Invariants
//!
//! Replaying any storm script must keep `current_y` within
//! `[top_padding, closed_y]` and must never report more notifications than
//! settles were started.

use snapsheet_core::{DrawerConfig, SnapTarget};

use crate::replay::{DragScript, ScriptStep};

/// LCG with the Numerical Recipes constants.
#[derive(Debug, Clone)]
struct SeededRng {
    state: u64,
}

impl SeededRng {
    fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    fn next_range(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        min + (self.next_u64() % (max - min))
    }

    fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    fn next_f32_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }
}

/// Storm generator settings.
#[derive(Debug, Clone)]
pub struct StormConfig {
    pub seed: u64,
    pub viewport_height: f32,
    /// Number of gesture bursts.
    pub bursts: usize,
    /// Samples per drag, inclusive lower and exclusive upper bound.
    pub samples: (u64, u64),
    /// Probability that a burst is an `open_to` request instead of a drag.
    pub open_to_chance: f32,
    /// Probability that a burst ends with an early transition-end report.
    pub transition_end_chance: f32,
    pub config: DrawerConfig,
}

impl Default for StormConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            viewport_height: 800.0,
            bursts: 12,
            samples: (2, 12),
            open_to_chance: 0.25,
            transition_end_chance: 0.2,
            config: DrawerConfig::default()
                .with_start_height(150.0)
                .with_middle_height(350.0)
                .with_end_height(600.0),
        }
    }
}

impl StormConfig {
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_bursts(mut self, bursts: usize) -> Self {
        self.bursts = bursts;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: DrawerConfig) -> Self {
        self.config = config;
        self
    }
}

/// Generates drag scripts from a [`StormConfig`].
#[derive(Debug, Clone)]
pub struct DragStorm {
    config: StormConfig,
}

impl DragStorm {
    #[must_use]
    pub fn new(config: StormConfig) -> Self {
        Self { config }
    }

    /// Build the script for this storm's seed.
    #[must_use]
    pub fn script(&self) -> DragScript {
        let cfg = &self.config;
        let mut rng = SeededRng::new(cfg.seed);
        let mut script = DragScript::new(
            format!("storm_{}", cfg.seed),
            cfg.config.clone(),
            cfg.viewport_height,
        )
        .frame();

        let mut t = 0u64;
        for _ in 0..cfg.bursts {
            if rng.chance(cfg.open_to_chance) {
                let index = rng.next_range(0, SnapTarget::ALL.len() as u64) as usize;
                let target = SnapTarget::ALL[index];
                script = script.open_to(t, target);
            } else {
                let count = rng.next_range(cfg.samples.0, cfg.samples.1);
                script = script.step(ScriptStep::Start {
                    at_ms: t,
                    in_scroll_content: false,
                });
                let mut y = rng.next_f32_range(0.0, cfg.viewport_height);
                for _ in 0..count {
                    script = script.step(ScriptStep::Move { at_ms: t, y });
                    y += rng.next_f32_range(-180.0, 180.0);
                    t += rng.next_range(8, 24);
                }
                let velocity_y = rng.next_f32_range(-2.0, 2.0);
                script = script.step(ScriptStep::End { at_ms: t, velocity_y });
            }

            if rng.chance(cfg.transition_end_chance) {
                t += rng.next_range(50, 300);
                script = script.step(ScriptStep::TransitionEnd { at_ms: t });
            }
            t += rng.next_range(0, 700);
        }
        script.advance(t + 1_000)
    }
}
