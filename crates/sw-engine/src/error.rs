//! Error types for voice allocation, song loading and synth setup.

use core::fmt;

/// Why a note-on did not sound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NoteError {
    /// Every voice slot is active
    PoolExhausted,
    /// Frequency, amplitude or half period came out degenerate
    InvalidParameters {
        note: i32,
        frequency: f32,
        amplitude: i16,
        half_period: u16,
    },
}

impl fmt::Display for NoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteError::PoolExhausted => write!(f, "no free voices"),
            NoteError::InvalidParameters {
                note,
                frequency,
                amplitude,
                half_period,
            } => write!(
                f,
                "cannot start note {} (freq={:.2}, amp={}, half_period={})",
                note, frequency, amplitude, half_period
            ),
        }
    }
}

impl core::error::Error for NoteError {}

/// What is wrong with a song descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DescriptorFault {
    /// No event data
    MissingData,
    /// Event count of zero
    NoEvents,
    /// Data shorter than `event_count` records
    Truncated { needed: usize, available: usize },
}

/// Error returned by `Player::load_song`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadError {
    InvalidDescriptor(DescriptorFault),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::InvalidDescriptor(DescriptorFault::MissingData) => {
                write!(f, "invalid song descriptor: no event data")
            }
            LoadError::InvalidDescriptor(DescriptorFault::NoEvents) => {
                write!(f, "invalid song descriptor: zero events")
            }
            LoadError::InvalidDescriptor(DescriptorFault::Truncated { needed, available }) => write!(
                f,
                "invalid song descriptor: needs {} bytes of event data, has {}",
                needed, available
            ),
        }
    }
}

impl core::error::Error for LoadError {}
