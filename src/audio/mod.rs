mod click;
mod playback;

pub use playback::TickPlayer;

use std::time::{Duration, Instant};
use tracing::warn;

use crate::config::AudioConfig;

/// Drops ticks that arrive closer together than `min_interval`
#[derive(Debug, Clone)]
pub struct TickThrottle {
    min_interval: Duration,
    last: Option<Instant>,
}

impl TickThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// Whether a tick at `now` should sound; records it if so
    pub fn should_play(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.min_interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Best-effort tick feedback for the spin engine.
///
/// Audio never affects the spin: if the sound device is unavailable the
/// ticks are simply not played.
pub struct TickSound {
    player: Option<TickPlayer>,
    throttle: TickThrottle,
}

impl TickSound {
    pub fn new(config: &AudioConfig) -> Self {
        if !config.enabled {
            return Self::muted(config);
        }

        let player = match TickPlayer::new(config.device.clone()) {
            Ok(player) => Some(player),
            Err(e) => {
                warn!("Tick sound disabled: {}", e);
                None
            }
        };

        Self {
            player,
            throttle: TickThrottle::new(Duration::from_millis(config.tick_throttle_ms)),
        }
    }

    pub fn muted(config: &AudioConfig) -> Self {
        Self {
            player: None,
            throttle: TickThrottle::new(Duration::from_millis(config.tick_throttle_ms)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.player.is_some()
    }

    pub fn play_tick(&mut self) {
        if !self.throttle.should_play(Instant::now()) {
            return;
        }
        if let Some(player) = &self.player {
            player.trigger();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_spacing() {
        let mut throttle = TickThrottle::new(Duration::from_millis(25));
        let t0 = Instant::now();
        assert!(throttle.should_play(t0));
        assert!(!throttle.should_play(t0 + Duration::from_millis(10)));
        assert!(!throttle.should_play(t0 + Duration::from_millis(24)));
        assert!(throttle.should_play(t0 + Duration::from_millis(25)));
        // Spacing is measured from the last played tick
        assert!(!throttle.should_play(t0 + Duration::from_millis(40)));
        assert!(throttle.should_play(t0 + Duration::from_millis(51)));
    }

    #[test]
    fn test_zero_interval_plays_everything() {
        let mut throttle = TickThrottle::new(Duration::ZERO);
        let t0 = Instant::now();
        assert!(throttle.should_play(t0));
        assert!(throttle.should_play(t0));
    }

    #[test]
    fn test_tick_audio_keeps_up_with_the_wheel() {
        use super::click::{synthesize_tick, tick_len, ClickMixer, SAMPLE_RATE};
        use super::playback::CHUNK_FRAMES;
        use crate::wheel::{parse_questions, SpinEngine, SpinSpeed, StepOutcome};
        use rand::{rngs::StdRng, SeedableRng};

        let text: String = (0..12).map(|i| format!("q{}\n", i)).collect();
        let items = parse_questions(&text, &[]);
        let mut engine = SpinEngine::new(StdRng::seed_from_u64(7));
        engine.start_spin(&items, SpinSpeed::Medium).unwrap();

        let mut throttle = TickThrottle::new(Duration::from_millis(25));
        let mut mixer = ClickMixer::new();
        let mut chunk = vec![0.0f32; CHUNK_FRAMES];
        let click = tick_len(SAMPLE_RATE);
        let frame_samples = SAMPLE_RATE as usize / 60;
        let t0 = Instant::now();

        let mut played = 0;
        let mut due = 0;
        for frame in 0.. {
            let now = t0 + Duration::from_secs_f64(frame as f64 / 60.0);
            match engine.step() {
                StepOutcome::Advanced { tick: true } if throttle.should_play(now) => {
                    mixer.add(synthesize_tick(2000.0, SAMPLE_RATE));
                    played += 1;
                    assert!(
                        mixer.remaining() <= click,
                        "frame {}: {} samples queued",
                        frame,
                        mixer.remaining()
                    );
                }
                StepOutcome::Completed(_) => break,
                _ => {}
            }
            // The device pulls one frame of audio in real time
            due += frame_samples;
            while due >= CHUNK_FRAMES {
                mixer.render(&mut chunk);
                due -= CHUNK_FRAMES;
            }
        }
        assert!(played > 10);

        // The last tick rings out within one click of the wheel stopping
        let mut tail = 0;
        while !mixer.is_idle() {
            mixer.render(&mut chunk);
            tail += CHUNK_FRAMES;
        }
        assert!(tail <= click + CHUNK_FRAMES);
    }

    #[test]
    fn test_muted_sound_is_silent_noop() {
        let mut sound = TickSound::muted(&AudioConfig::default());
        assert!(!sound.is_active());
        sound.play_tick();
        sound.play_tick();
    }
}
