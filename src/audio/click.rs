use std::f32::consts::TAU;

pub const SAMPLE_RATE: u32 = 44100;

const CLICK_SECS: f32 = 0.06;
const CLICK_SWEEP_SECS: f32 = 0.03;
const CLICK_END_HZ: f32 = 600.0;
const CLICK_GAIN: f32 = 0.25;

const THUMP_SECS: f32 = 0.04;
const THUMP_START_HZ: f32 = 150.0;
const THUMP_END_HZ: f32 = 80.0;
const THUMP_GAIN: f32 = 0.15;

const FLOOR_GAIN: f32 = 0.001;

/// Exponential ramp from `from` to `to` over `duration`, held at `to` after
#[inline]
fn exp_ramp(from: f32, to: f32, t: f32, duration: f32) -> f32 {
    let progress = (t / duration).clamp(0.0, 1.0);
    from * (to / from).powf(progress)
}

#[inline]
fn triangle(phase: f32) -> f32 {
    let p = phase.rem_euclid(1.0);
    4.0 * (p - 0.5).abs() - 1.0
}

/// Mono f32 samples for one peg "tick".
///
/// A short triangle click sweeping down from `click_hz` to 600 Hz, layered
/// with a low sine thump for body. `click_hz` is usually jittered per tick
/// in 1800..2200 so repeated ticks don't sound mechanical.
pub fn synthesize_tick(click_hz: f32, sample_rate: u32) -> Vec<f32> {
    let rate = sample_rate as f32;
    let len = tick_len(sample_rate);

    let mut click_phase = 0.0f32;
    let mut thump_phase = 0.0f32;

    (0..len)
        .map(|i| {
            let t = i as f32 / rate;

            let click_freq = exp_ramp(click_hz, CLICK_END_HZ, t, CLICK_SWEEP_SECS);
            let click_gain = exp_ramp(CLICK_GAIN, FLOOR_GAIN, t, CLICK_SECS);
            let click = triangle(click_phase) * click_gain;
            click_phase += click_freq / rate;

            let thump = if t < THUMP_SECS {
                let freq = exp_ramp(THUMP_START_HZ, THUMP_END_HZ, t, THUMP_SECS);
                let gain = exp_ramp(THUMP_GAIN, FLOOR_GAIN, t, THUMP_SECS);
                let s = (thump_phase * TAU).sin() * gain;
                thump_phase += freq / rate;
                s
            } else {
                0.0
            };

            (click + thump).clamp(-1.0, 1.0)
        })
        .collect()
}

/// Number of samples in one synthesized tick
pub fn tick_len(sample_rate: u32) -> usize {
    (CLICK_SECS * sample_rate as f32).ceil() as usize
}

/// A tick partway through playback
struct Voice {
    samples: Vec<f32>,
    pos: usize,
}

/// Sums overlapping ticks into one output stream.
///
/// A new tick starts in the next rendered chunk no matter how many are
/// still ringing, so output never queues up behind earlier clicks.
#[derive(Default)]
pub struct ClickMixer {
    voices: Vec<Voice>,
}

impl ClickMixer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, samples: Vec<f32>) {
        self.voices.push(Voice { samples, pos: 0 });
    }

    pub fn is_idle(&self) -> bool {
        self.voices.is_empty()
    }

    /// Samples until every ringing tick has finished
    pub fn remaining(&self) -> usize {
        self.voices
            .iter()
            .map(|v| v.samples.len() - v.pos)
            .max()
            .unwrap_or(0)
    }

    /// Fill `out` with the mix of all ringing ticks, silence when idle
    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        for voice in &mut self.voices {
            let take = (voice.samples.len() - voice.pos).min(out.len());
            for (o, s) in out.iter_mut().zip(&voice.samples[voice.pos..voice.pos + take]) {
                *o += s;
            }
            voice.pos += take;
        }
        for o in out.iter_mut() {
            *o = o.clamp(-1.0, 1.0);
        }
        self.voices.retain(|v| v.pos < v.samples.len());
    }
}

/// Little-endian byte stream for a `F32le` PulseAudio stream
pub fn to_f32le_bytes(samples: &[f32]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tick_length_matches_click_duration() {
        let samples = synthesize_tick(2000.0, SAMPLE_RATE);
        assert_eq!(samples.len(), (0.06 * SAMPLE_RATE as f32).ceil() as usize);
        assert_eq!(samples.len(), tick_len(SAMPLE_RATE));
    }

    #[test]
    fn test_mixer_overlaps_ticks() {
        let mut mixer = ClickMixer::new();
        mixer.add(vec![0.25; 100]);
        let mut out = vec![0.0; 40];
        mixer.render(&mut out);
        assert_eq!(mixer.remaining(), 60);

        // Second tick starts right away and rings alongside the first
        mixer.add(vec![0.5; 100]);
        mixer.render(&mut out);
        assert_relative_eq!(out[0], 0.75);
        assert_eq!(mixer.remaining(), 60);

        mixer.render(&mut out);
        mixer.render(&mut out);
        assert_relative_eq!(out[0], 0.5);
        mixer.render(&mut out);
        assert!(mixer.is_idle());
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_mixer_clamps_sum() {
        let mut mixer = ClickMixer::new();
        for _ in 0..4 {
            mixer.add(vec![0.9; 10]);
        }
        let mut out = vec![0.0; 10];
        mixer.render(&mut out);
        assert!(out.iter().all(|s| *s == 1.0));
    }

    #[test]
    fn test_tick_stays_in_range_and_fades() {
        let samples = synthesize_tick(1800.0, SAMPLE_RATE);
        assert!(samples.iter().all(|s| (-1.0..=1.0).contains(s)));

        let peak = |chunk: &[f32]| chunk.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let head = peak(&samples[..200]);
        let tail = peak(&samples[samples.len() - 200..]);
        assert!(head > 0.1);
        assert!(tail < head / 10.0);
    }

    #[test]
    fn test_exp_ramp_endpoints() {
        assert_relative_eq!(exp_ramp(2000.0, 600.0, 0.0, 0.03), 2000.0);
        assert_relative_eq!(exp_ramp(2000.0, 600.0, 0.03, 0.03), 600.0, max_relative = 1e-5);
        assert_relative_eq!(exp_ramp(2000.0, 600.0, 1.0, 0.03), 600.0, max_relative = 1e-5);
    }

    #[test]
    fn test_byte_encoding() {
        let bytes = to_f32le_bytes(&[1.0, -0.5]);
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
    }
}
