//! Core types for the squarewave synthesizer.
//!
//! This crate defines the packed event stream the sequencer walks, the
//! read-only song descriptor handed to the player, and the tick/tempo
//! arithmetic shared by the engine and the format converters.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod event;
pub mod song;
mod timing;

pub use event::{EventKind, NoteAction, SongEvent, BYTES_PER_EVENT};
pub use song::{Song, SongInfo, MAX_EVENTS};
pub use timing::{millis_per_tick, normalize_bpm, ticks_to_millis, DEFAULT_BPM, TICKS_PER_QUARTER_NOTE};
