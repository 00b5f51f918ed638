use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::debug;

use super::item::Item;
use super::random::UnitSource;
use super::selection::{crossed_segment, selected_item};
use super::speed::SpinSpeed;

/// Velocity (radians per frame) at or below which the wheel has stopped
pub const MIN_VELOCITY_THRESHOLD: f64 = 0.001;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SpinRejected {
    #[error("a spin is already in progress")]
    AlreadySpinning,
    #[error("the wheel has no items")]
    NoItems,
}

/// Transient per-spin state, dropped when the spin ends or is cancelled
#[derive(Debug, Clone)]
pub struct SpinState {
    pub velocity: f64,
    pub friction: f64,
    /// Boundary counter from the last tick; `None` until the first frame
    pub last_crossed_segment: Option<i64>,
    /// Items captured at spin start; later edits apply to the next spin
    pub items: Vec<Item>,
    pub frames: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Nothing is spinning
    Idle,
    /// The wheel moved; `tick` is set when a wedge boundary was crossed
    Advanced { tick: bool },
    /// The wheel came to rest on this item; the engine is idle again
    Completed(Item),
}

/// Frame-driven spin simulation for one wheel.
///
/// `Idle -> Spinning -> Idle`: [`SpinEngine::start_spin`] enters the
/// spinning state, [`SpinEngine::step`] advances it once per rendered frame
/// until the velocity decays below [`MIN_VELOCITY_THRESHOLD`], and
/// [`SpinEngine::stop`] abandons it silently.
pub struct SpinEngine<R: UnitSource = StdRng> {
    rotation: f64,
    spin: Option<SpinState>,
    rng: R,
}

impl SpinEngine<StdRng> {
    /// Engine with an entropy-seeded generator, or a fixed seed for replays
    pub fn with_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(rng)
    }
}

impl<R: UnitSource> SpinEngine<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rotation: 0.0,
            spin: None,
            rng,
        }
    }

    /// Current wheel rotation in radians, unbounded
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn is_spinning(&self) -> bool {
        self.spin.is_some()
    }

    pub fn state(&self) -> Option<&SpinState> {
        self.spin.as_ref()
    }

    /// Items locked by the active spin
    pub fn spinning_items(&self) -> Option<&[Item]> {
        self.spin.as_ref().map(|s| s.items.as_slice())
    }

    /// Begin a spin over `items`. Rotation continues from where the wheel
    /// last rested.
    pub fn start_spin(&mut self, items: &[Item], speed: SpinSpeed) -> Result<(), SpinRejected> {
        if self.spin.is_some() {
            return Err(SpinRejected::AlreadySpinning);
        }
        if items.is_empty() {
            return Err(SpinRejected::NoItems);
        }

        let velocity = speed.initial_velocity(&mut self.rng);
        let friction = speed.profile().friction;
        debug!(
            "Spin start: {} items, speed {}, v0 {:.4}, ~{} frames over {:.2} rad",
            items.len(),
            speed,
            velocity,
            frames_to_stop(velocity, friction),
            total_travel(velocity, friction)
        );

        self.spin = Some(SpinState {
            velocity,
            friction,
            last_crossed_segment: None,
            items: items.to_vec(),
            frames: 0,
        });
        Ok(())
    }

    /// Advance the active spin by one frame.
    pub fn step(&mut self) -> StepOutcome {
        let Some(spin) = self.spin.as_mut() else {
            return StepOutcome::Idle;
        };

        if spin.velocity <= MIN_VELOCITY_THRESHOLD {
            let Some(spin) = self.spin.take() else {
                return StepOutcome::Idle;
            };
            return match selected_item(self.rotation, &spin.items) {
                Some(item) => {
                    debug!(
                        "Spin complete after {} frames at rotation {:.4}: {}",
                        spin.frames, self.rotation, item.question
                    );
                    StepOutcome::Completed(item.clone())
                }
                None => StepOutcome::Idle,
            };
        }

        spin.velocity *= spin.friction;
        self.rotation += spin.velocity;
        spin.frames += 1;

        let segment = crossed_segment(self.rotation, spin.items.len());
        let tick = spin.last_crossed_segment != Some(segment);
        if tick {
            spin.last_crossed_segment = Some(segment);
        }

        StepOutcome::Advanced { tick }
    }

    /// Cancel the active spin without a completion. Rotation is kept.
    pub fn stop(&mut self) {
        if self.spin.take().is_some() {
            debug!("Spin cancelled at rotation {:.4}", self.rotation);
        }
    }
}

/// Number of velocity updates before `v0` decays to the stop threshold.
pub fn frames_to_stop(v0: f64, friction: f64) -> u64 {
    if v0 <= MIN_VELOCITY_THRESHOLD {
        return 0;
    }
    ((MIN_VELOCITY_THRESHOLD / v0).ln() / friction.ln()).ceil().max(0.0) as u64
}

/// Total rotation travelled over a spin starting at `v0`.
pub fn total_travel(v0: f64, friction: f64) -> f64 {
    let k = frames_to_stop(v0, friction) as i32;
    v0 * friction * (1.0 - friction.powi(k)) / (1.0 - friction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wheel::random::FixedUnit;
    use crate::wheel::selection::{segment_angle, select_index};
    use approx::assert_relative_eq;

    fn items(n: usize) -> Vec<Item> {
        (0..n).map(|i| Item::new(format!("q{}", i), i)).collect()
    }

    fn fixed(draw: f64) -> SpinEngine<FixedUnit> {
        SpinEngine::new(FixedUnit(draw))
    }

    /// Run to completion, returning (frames stepped, ticks, selected item)
    fn run_to_end<R: UnitSource>(engine: &mut SpinEngine<R>) -> (u64, u64, Item) {
        let mut frames = 0;
        let mut ticks = 0;
        loop {
            frames += 1;
            assert!(frames < 100_000, "spin did not terminate");
            match engine.step() {
                StepOutcome::Advanced { tick } => ticks += tick as u64,
                StepOutcome::Completed(item) => return (frames, ticks, item),
                StepOutcome::Idle => panic!("went idle without completing"),
            }
        }
    }

    #[test]
    fn test_medium_four_items_closed_form() {
        let wheel = items(4);
        let mut engine = fixed(0.0);
        engine.start_spin(&wheel, SpinSpeed::Medium).unwrap();
        assert_relative_eq!(engine.state().unwrap().velocity, 0.65, epsilon = 1e-12);

        let (frames, _, item) = run_to_end(&mut engine);

        let k = frames_to_stop(0.65, 0.97);
        assert_eq!(frames, k + 1);
        assert_relative_eq!(engine.rotation(), total_travel(0.65, 0.97), max_relative = 1e-9);

        let expected = select_index(engine.rotation(), 4);
        assert!(expected < 4);
        assert_eq!(item, wheel[expected]);
        assert!(!engine.is_spinning());
    }

    #[test]
    fn test_every_profile_terminates_within_bound() {
        for speed in SpinSpeed::all() {
            for draw in [0.0, 0.5, 0.999] {
                let mut engine = fixed(draw);
                engine.start_spin(&items(6), *speed).unwrap();
                let v0 = engine.state().unwrap().velocity;
                let (frames, _, _) = run_to_end(&mut engine);
                assert_eq!(frames, frames_to_stop(v0, speed.profile().friction) + 1);
            }
        }
    }

    #[test]
    fn test_rotation_monotonic_and_velocity_decays() {
        let mut engine = fixed(0.3);
        engine.start_spin(&items(5), SpinSpeed::Fast).unwrap();
        let mut last_rotation = engine.rotation();
        let mut last_velocity = engine.state().unwrap().velocity;
        while let StepOutcome::Advanced { .. } = engine.step() {
            let rotation = engine.rotation();
            let velocity = engine.state().unwrap().velocity;
            assert!(rotation >= last_rotation);
            assert!(velocity < last_velocity);
            last_rotation = rotation;
            last_velocity = velocity;
        }
        assert!(!engine.is_spinning());
    }

    #[test]
    fn test_deterministic_with_seed() {
        let wheel = items(7);
        let run = |seed| {
            let mut engine = SpinEngine::with_seed(Some(seed));
            let mut picks = Vec::new();
            for _ in 0..3 {
                engine.start_spin(&wheel, SpinSpeed::Slow).unwrap();
                picks.push(run_to_end(&mut engine).2.id);
            }
            (picks, engine.rotation())
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_rejects_start_while_spinning() {
        let wheel = items(3);
        let mut engine = fixed(0.5);
        engine.start_spin(&wheel, SpinSpeed::Medium).unwrap();
        engine.step();
        engine.step();

        let before_rotation = engine.rotation();
        let before = engine.state().cloned().unwrap();

        assert_eq!(
            engine.start_spin(&items(9), SpinSpeed::Fast),
            Err(SpinRejected::AlreadySpinning)
        );
        let after = engine.state().unwrap();
        assert_eq!(engine.rotation(), before_rotation);
        assert_eq!(after.velocity, before.velocity);
        assert_eq!(after.last_crossed_segment, before.last_crossed_segment);
        assert_eq!(after.items, before.items);
    }

    #[test]
    fn test_rejects_empty_items_without_events() {
        let mut engine = fixed(0.5);
        assert_eq!(engine.start_spin(&[], SpinSpeed::Medium), Err(SpinRejected::NoItems));
        assert!(!engine.is_spinning());
        assert_eq!(engine.step(), StepOutcome::Idle);
        assert_eq!(engine.rotation(), 0.0);
    }

    #[test]
    fn test_tick_count_bounded_by_travel() {
        for n in [1, 2, 4, 9, 24] {
            let mut engine = fixed(0.7);
            engine.start_spin(&items(n), SpinSpeed::Fast).unwrap();
            let (_, ticks, _) = run_to_end(&mut engine);
            let bound = engine.rotation() / segment_angle(n) + 1.0;
            assert!(ticks >= 1);
            assert!((ticks as f64) <= bound, "n={} ticks={} bound={}", n, ticks, bound);
        }
    }

    #[test]
    fn test_at_most_one_tick_per_frame_even_when_skipping_wedges() {
        // 64 wedges are narrower than the first frames' travel
        let mut engine = fixed(0.999);
        engine.start_spin(&items(64), SpinSpeed::Fast).unwrap();
        let mut frames = 0u64;
        let mut ticks = 0u64;
        while let StepOutcome::Advanced { tick } = engine.step() {
            frames += 1;
            ticks += tick as u64;
        }
        assert!(ticks <= frames);
    }

    #[test]
    fn test_rotation_carries_over_between_spins() {
        let wheel = items(4);
        let mut engine = fixed(0.0);
        engine.start_spin(&wheel, SpinSpeed::Slow).unwrap();
        run_to_end(&mut engine);
        let rested = engine.rotation();
        assert!(rested > 0.0);

        engine.start_spin(&wheel, SpinSpeed::Slow).unwrap();
        assert_eq!(engine.rotation(), rested);
        assert_eq!(engine.state().unwrap().last_crossed_segment, None);
        run_to_end(&mut engine);
        assert_relative_eq!(engine.rotation(), rested * 2.0, max_relative = 1e-9);
    }

    #[test]
    fn test_stop_cancels_silently_and_is_idempotent() {
        let mut engine = fixed(0.5);
        engine.start_spin(&items(4), SpinSpeed::Medium).unwrap();
        for _ in 0..10 {
            engine.step();
        }
        let at_cancel = engine.rotation();
        engine.stop();
        assert!(!engine.is_spinning());
        assert_eq!(engine.rotation(), at_cancel);
        assert_eq!(engine.step(), StepOutcome::Idle);
        engine.stop();
        assert_eq!(engine.rotation(), at_cancel);
    }

    #[test]
    fn test_selection_uses_list_captured_at_start() {
        let mut wheel = items(4);
        let mut engine = fixed(0.25);
        engine.start_spin(&wheel, SpinSpeed::Medium).unwrap();
        let captured = wheel.clone();
        wheel.truncate(1);

        let (_, _, item) = run_to_end(&mut engine);
        assert!(captured.contains(&item));
        assert_eq!(item, captured[select_index(engine.rotation(), 4)]);
    }

    #[test]
    fn test_frames_to_stop_edge_cases() {
        assert_eq!(frames_to_stop(MIN_VELOCITY_THRESHOLD, 0.97), 0);
        assert_eq!(frames_to_stop(0.0005, 0.97), 0);
        // 0.65 * 0.97^k <= 0.001 first holds at k = 213
        assert_eq!(frames_to_stop(0.65, 0.97), 213);
    }
}
