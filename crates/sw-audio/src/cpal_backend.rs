//! Default-device output through cpal.
//!
//! The writer pushes frames into a ring; the device callback drains it,
//! converting to `f32` and spreading each frame over the device's channels.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use sw_engine::Frame;

use crate::traits::{AudioError, AudioOutput};

/// Audio held between the writer and the device.
const RING_MS: usize = 50;

/// Wait before retrying a push into a full ring.
const FULL_RING_BACKOFF: Duration = Duration::from_millis(1);

/// Stereo output on the host's default device.
///
/// [`write`](AudioOutput::write) sleeps while the ring is full, so whoever
/// writes is paced by the device without spinning.
pub struct CpalOutput {
    sample_rate: u32,
    ring: HeapProd<Frame>,
    enabled: Arc<AtomicBool>,
    stream: Stream,
}

impl CpalOutput {
    /// Open the default device at `sample_rate` and start its stream.
    pub fn open(sample_rate: u32) -> Result<Self, AudioError> {
        let device = cpal::default_host()
            .default_output_device()
            .ok_or(AudioError::NoDevice)?;
        let config = stereo_config(&device, sample_rate)?;
        let channels = config.channels as usize;

        let (ring, mut pending) = HeapRb::<Frame>::new(ring_capacity(sample_rate)).split();
        let enabled = Arc::new(AtomicBool::new(false));
        let gate = enabled.clone();

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    fill_device_buffer(data, channels, &mut pending, gate.load(Ordering::Relaxed));
                },
                |err| log::error!("audio stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::StreamCreate(e.to_string()))?;

        let mut output = Self {
            sample_rate,
            ring,
            enabled,
            stream,
        };
        output.start()?;
        log::info!("audio output open: {} Hz, {} channels", sample_rate, channels);
        Ok(output)
    }
}

impl AudioOutput for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn write(&mut self, frame: Frame) {
        push_blocking(&mut self.ring, frame);
    }

    fn start(&mut self) -> Result<(), AudioError> {
        self.enabled.store(true, Ordering::Relaxed);
        self.stream
            .play()
            .map_err(|e| AudioError::Playback(e.to_string()))
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.enabled.store(false, Ordering::Relaxed);
        self.stream
            .pause()
            .map_err(|e| AudioError::Playback(e.to_string()))
    }
}

fn stereo_config(device: &Device, sample_rate: u32) -> Result<StreamConfig, AudioError> {
    let mut config: StreamConfig = device
        .default_output_config()
        .map_err(|e| AudioError::DeviceInit(e.to_string()))?
        .into();
    config.channels = 2;
    config.sample_rate = SampleRate(sample_rate);
    Ok(config)
}

fn ring_capacity(sample_rate: u32) -> usize {
    (sample_rate as usize * RING_MS / 1000).max(64)
}

/// Push one frame, sleeping until the ring has room.
fn push_blocking(ring: &mut HeapProd<Frame>, frame: Frame) {
    while ring.try_push(frame).is_err() {
        thread::sleep(FULL_RING_BACKOFF);
    }
}

/// Fill one interleaved device buffer.
///
/// An empty ring or a disabled output gives silence. Channels past the
/// second are zeroed.
fn fill_device_buffer(data: &mut [f32], channels: usize, pending: &mut HeapCons<Frame>, enabled: bool) {
    for slot in data.chunks_mut(channels.max(1)) {
        let frame = if enabled {
            pending.try_pop().unwrap_or_default()
        } else {
            Frame::silence()
        };
        for (channel, sample) in slot.iter_mut().enumerate() {
            *sample = match channel {
                0 => to_f32(frame.left),
                1 => to_f32(frame.right),
                _ => 0.0,
            };
        }
    }
}

fn to_f32(sample: i16) -> f32 {
    sample as f32 / 32768.0
}
