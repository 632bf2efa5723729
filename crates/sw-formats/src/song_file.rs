//! `.sqw` song container.
//!
//! Layout (big-endian):
//!
//! | offset | size | field |
//! |---|---|---|
//! | 0 | 4 | magic `SQWV` |
//! | 4 | 1 | version |
//! | 5 | 32 | title, NUL padded |
//! | 37 | 4 | bpm (`f32`) |
//! | 41 | 2 | event count |
//! | 43 | 6 × count | packed event records |

use std::io::Cursor;

use binrw::{binrw, BinRead, BinWrite};
use sw_ir::{Song, BYTES_PER_EVENT};

use crate::FormatError;

pub const MAGIC: &[u8; 4] = b"SQWV";
pub const FORMAT_VERSION: u8 = 1;
pub const TITLE_LEN: usize = 32;

const HEADER_LEN: usize = 4 + 1 + TITLE_LEN + 4 + 2;

#[binrw]
#[brw(big, magic = b"SQWV")]
#[derive(Debug)]
struct SongFile {
    version: u8,
    title: [u8; TITLE_LEN],
    bpm: f32,
    event_count: u16,
    #[br(count = event_count as usize * BYTES_PER_EVENT)]
    data: Vec<u8>,
}

/// Load a song container from bytes.
pub fn load_song(data: &[u8]) -> Result<Song, FormatError> {
    if data.len() < MAGIC.len() {
        return Err(FormatError::UnexpectedEof);
    }
    if &data[..MAGIC.len()] != MAGIC {
        return Err(FormatError::InvalidHeader);
    }
    if data.len() < HEADER_LEN {
        return Err(FormatError::UnexpectedEof);
    }
    if data[4] != FORMAT_VERSION {
        return Err(FormatError::UnsupportedVersion);
    }

    let file = SongFile::read(&mut Cursor::new(data)).map_err(read_error)?;

    let title_end = file.title.iter().position(|&b| b == 0).unwrap_or(TITLE_LEN);
    let title = String::from_utf8_lossy(&file.title[..title_end]);

    let song = Song::from_packed(&title, file.bpm, file.data);
    log::debug!("loaded '{}': {} events at {} bpm", song.title, song.len(), song.bpm);
    Ok(song)
}

/// Encode a song as a container.
pub fn save_song(song: &Song) -> Result<Vec<u8>, FormatError> {
    let event_count = u16::try_from(song.len()).map_err(|_| FormatError::TooManyEvents)?;

    let mut title = [0u8; TITLE_LEN];
    let bytes = song.title.as_bytes();
    let len = bytes.len().min(TITLE_LEN);
    title[..len].copy_from_slice(&bytes[..len]);

    let file = SongFile {
        version: FORMAT_VERSION,
        title,
        bpm: song.bpm,
        event_count,
        data: song.data().to_vec(),
    };

    let mut cursor = Cursor::new(Vec::with_capacity(HEADER_LEN + file.data.len()));
    file.write(&mut cursor)
        .map_err(|e| FormatError::Io(e.to_string()))?;
    Ok(cursor.into_inner())
}

fn read_error(e: binrw::Error) -> FormatError {
    if e.is_eof() {
        return FormatError::UnexpectedEof;
    }
    match e {
        binrw::Error::BadMagic { .. } => FormatError::InvalidHeader,
        other => FormatError::Io(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sw_ir::SongEvent;

    fn scale() -> Song {
        let mut events = Vec::new();
        for (i, note) in [60u8, 62, 64, 65].iter().enumerate() {
            events.push(SongEvent::note_on(if i == 0 { 0 } else { 48 }, *note, 100));
            events.push(SongEvent::note_off(48, *note));
        }
        Song::from_events("Scale", 140.0, &events)
    }

    #[test]
    fn header_layout() {
        let bytes = save_song(&scale()).unwrap();
        assert_eq!(&bytes[0..4], b"SQWV");
        assert_eq!(bytes[4], FORMAT_VERSION);
        assert_eq!(&bytes[5..10], b"Scale");
        assert!(bytes[10..37].iter().all(|&b| b == 0));
        assert_eq!(&bytes[37..41], &140.0f32.to_be_bytes());
        assert_eq!(&bytes[41..43], &8u16.to_be_bytes());
        assert_eq!(bytes.len(), HEADER_LEN + 8 * BYTES_PER_EVENT);
    }

    #[test]
    fn events_survive_save_and_load() {
        let song = scale();
        let loaded = load_song(&save_song(&song).unwrap()).unwrap();
        assert_eq!(loaded.title.as_str(), "Scale");
        assert_eq!(loaded.bpm, 140.0);
        assert_eq!(loaded.data(), song.data());
    }

    #[test]
    fn full_length_title_has_no_terminator() {
        let title = "x".repeat(TITLE_LEN);
        let song = Song::new(&title, 120.0);
        let loaded = load_song(&save_song(&song).unwrap()).unwrap();
        assert_eq!(loaded.title.as_str(), title);
    }

    #[test]
    fn wrong_magic_rejected() {
        let mut bytes = save_song(&scale()).unwrap();
        bytes[0] = b'M';
        assert!(matches!(load_song(&bytes), Err(FormatError::InvalidHeader)));
    }

    #[test]
    fn newer_version_rejected() {
        let mut bytes = save_song(&scale()).unwrap();
        bytes[4] = 2;
        assert!(matches!(load_song(&bytes), Err(FormatError::UnsupportedVersion)));
    }

    #[test]
    fn short_event_data_is_eof() {
        let bytes = save_song(&scale()).unwrap();
        let cut = &bytes[..bytes.len() - 3];
        assert!(matches!(load_song(cut), Err(FormatError::UnexpectedEof)));
    }

    #[test]
    fn short_header_is_eof() {
        assert!(matches!(load_song(b"SQ"), Err(FormatError::UnexpectedEof)));
        assert!(matches!(load_song(b"SQWV\x01"), Err(FormatError::UnexpectedEof)));
    }

    #[test]
    fn trailing_bytes_ignored() {
        let mut bytes = save_song(&scale()).unwrap();
        bytes.extend_from_slice(&[0xAA; 5]);
        assert_eq!(load_song(&bytes).unwrap().len(), 8);
    }
}
