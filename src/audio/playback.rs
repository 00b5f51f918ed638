use anyhow::{anyhow, Result};
use libpulse_binding as pulse;
use libpulse_simple_binding as psimple;
use pulse::def::BufferAttr;
use pulse::sample::{Format, Spec};
use pulse::stream::Direction;
use rand::Rng;
use std::thread;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use super::click::{synthesize_tick, to_f32le_bytes, ClickMixer, SAMPLE_RATE};

/// Pending ticks beyond this are dropped rather than queued
const QUEUE_DEPTH: usize = 4;

/// Samples mixed per write, 10 ms
pub const CHUNK_FRAMES: usize = SAMPLE_RATE as usize / 100;

/// Server-side buffer target, two chunks of f32 mono
const TARGET_BYTES: u32 = (CHUNK_FRAMES * 2 * std::mem::size_of::<f32>()) as u32;

/// Plays tick sounds on a dedicated thread.
///
/// The frame loop only ever does a non-blocking send; the thread owns the
/// PulseAudio connection and mixes requested clicks into 10 ms chunks, so
/// overlapping ticks ring together instead of queueing.
pub struct TickPlayer {
    sender: mpsc::Sender<()>,
    _playback_thread: thread::JoinHandle<()>,
}

impl TickPlayer {
    pub fn new(device: Option<String>) -> Result<Self> {
        let spec = Spec {
            format: Format::F32le,
            channels: 1,
            rate: SAMPLE_RATE,
        };

        if !spec.is_valid() {
            return Err(anyhow!("Invalid PulseAudio sample spec"));
        }

        // Keep the server buffer short so a tick is heard on the frame it fires
        let attr = BufferAttr {
            maxlength: u32::MAX,
            tlength: TARGET_BYTES,
            prebuf: (CHUNK_FRAMES * std::mem::size_of::<f32>()) as u32,
            minreq: u32::MAX,
            fragsize: u32::MAX,
        };

        let pulse = psimple::Simple::new(
            None,              // Use default server
            "wheelspin",       // Application name
            Direction::Playback,
            device.as_deref(), // Device name (None = default sink)
            "wheel-tick",      // Stream description
            &spec,
            None,
            Some(&attr),
        )
        .map_err(|e| anyhow!("Failed to connect to PulseAudio: {:?}", e))?;

        info!("Tick sound using device: {}", device.as_deref().unwrap_or("default"));

        let (sender, receiver) = mpsc::channel(QUEUE_DEPTH);
        let playback_thread = thread::spawn(move || Self::playback_loop(pulse, receiver));

        Ok(Self {
            sender,
            _playback_thread: playback_thread,
        })
    }

    /// Queue one tick; silently dropped if the device is falling behind
    pub fn trigger(&self) {
        if let Err(e) = self.sender.try_send(()) {
            debug!("Tick dropped: {}", e);
        }
    }

    fn playback_loop(pulse: psimple::Simple, mut receiver: mpsc::Receiver<()>) {
        let mut rng = rand::thread_rng();
        let mut mixer = ClickMixer::new();
        let mut chunk = vec![0.0f32; CHUNK_FRAMES];
        let mut open = true;

        // Ends once the player (and its sender) is dropped and the last tick rang out
        while open || !mixer.is_idle() {
            if mixer.is_idle() {
                match receiver.blocking_recv() {
                    Some(()) => mixer.add(Self::next_tick(&mut rng)),
                    None => break,
                }
            }
            while open {
                match receiver.try_recv() {
                    Ok(()) => mixer.add(Self::next_tick(&mut rng)),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => open = false,
                }
            }

            mixer.render(&mut chunk);
            if let Err(e) = pulse.write(&to_f32le_bytes(&chunk)) {
                warn!("PulseAudio write error: {:?}", e);
            }
        }

        if let Err(e) = pulse.drain() {
            debug!("PulseAudio drain failed: {:?}", e);
        }
        debug!("Tick player stopped");
    }

    fn next_tick(rng: &mut impl Rng) -> Vec<f32> {
        let click_hz = 1800.0 + rng.gen::<f32>() * 400.0;
        synthesize_tick(click_hz, SAMPLE_RATE)
    }
}
