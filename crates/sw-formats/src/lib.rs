//! File formats for squarewave.
//!
//! Loads and saves the `.sqw` song container, imports Standard MIDI Files
//! into the packed event stream, and writes rendered audio as WAV.

mod midi;
mod song_file;
mod wav_format;

pub use midi::import_midi;
pub use song_file::{load_song, save_song, FORMAT_VERSION, MAGIC, TITLE_LEN};
pub use wav_format::{frames_to_wav, write_wav};

/// Error type for format parsing.
#[derive(Debug)]
pub enum FormatError {
    /// Invalid file header or magic bytes
    InvalidHeader,
    /// Unexpected end of file
    UnexpectedEof,
    /// Unsupported format version
    UnsupportedVersion,
    /// I/O error
    Io(String),
    /// Malformed MIDI data
    Midi(String),
    /// More events than a song can address
    TooManyEvents,
    /// MIDI file uses SMPTE timecode instead of ticks per quarter note
    UnsupportedTiming,
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::InvalidHeader => write!(f, "invalid file header"),
            FormatError::UnexpectedEof => write!(f, "unexpected end of file"),
            FormatError::UnsupportedVersion => write!(f, "unsupported format version"),
            FormatError::Io(msg) => write!(f, "I/O error: {}", msg),
            FormatError::Midi(msg) => write!(f, "MIDI error: {}", msg),
            FormatError::TooManyEvents => {
                write!(f, "more than {} events", sw_ir::MAX_EVENTS)
            }
            FormatError::UnsupportedTiming => write!(f, "SMPTE timecode timing is not supported"),
        }
    }
}

impl std::error::Error for FormatError {}

impl From<std::io::Error> for FormatError {
    fn from(e: std::io::Error) -> Self {
        FormatError::Io(e.to_string())
    }
}
