//! Synthesis engine for squarewave.
//!
//! A fixed pool of square-wave voices mixed one sample at a time, and a
//! polled player that feeds note events from a packed song stream into it.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod clock;
mod error;
mod frame;
mod frequency;
mod player;
#[cfg(feature = "std")]
mod synth;
mod voice;
mod voice_pool;

#[cfg(feature = "std")]
pub use clock::SystemClock;
pub use clock::{Clock, ManualClock};
pub use error::{DescriptorFault, LoadError, NoteError};
pub use frame::Frame;
pub use frequency::{
    half_period_samples, note_to_frequency, velocity_to_amplitude, MAX_VELOCITY,
    MAX_VOICE_AMPLITUDE, SAMPLE_RATE,
};
pub use player::{NoteSink, Player, PlayerState};
#[cfg(feature = "std")]
pub use synth::Synthesizer;
pub use voice::Voice;
pub use voice_pool::{VoiceId, VoicePool, MAX_VOICES, SILENCE};
