//! Song descriptor and owned song data.

use alloc::vec::Vec;
use arrayvec::ArrayString;

use crate::event::{SongEvent, BYTES_PER_EVENT};
use crate::timing::DEFAULT_BPM;

/// Largest event count a descriptor can address.
pub const MAX_EVENTS: usize = u16::MAX as usize;

/// Read-only view of a song's packed event stream.
///
/// Owned by the surrounding program; the player only reads it.
/// `data == None` is the "no data" descriptor and is rejected at load time.
#[derive(Clone, Copy, Debug)]
pub struct SongInfo<'a> {
    pub data: Option<&'a [u8]>,
    pub event_count: u16,
    pub bpm: f32,
}

impl<'a> SongInfo<'a> {
    pub const fn new(data: &'a [u8], event_count: u16, bpm: f32) -> Self {
        Self {
            data: Some(data),
            event_count,
            bpm,
        }
    }

    /// Descriptor with no event data.
    pub const fn empty() -> Self {
        Self {
            data: None,
            event_count: 0,
            bpm: 0.0,
        }
    }

    /// Decode the event at `index`, if the stream holds it.
    pub fn event(&self, index: u16) -> Option<SongEvent> {
        if index >= self.event_count {
            return None;
        }
        let start = index as usize * BYTES_PER_EVENT;
        let record = self.data?.get(start..start + BYTES_PER_EVENT)?;
        let record: &[u8; BYTES_PER_EVENT] = record.try_into().ok()?;
        Some(SongEvent::from_bytes(record))
    }

    /// Only the delta of the event at `index` (first two bytes).
    pub fn delta_ticks(&self, index: u16) -> Option<u16> {
        if index >= self.event_count {
            return None;
        }
        let start = index as usize * BYTES_PER_EVENT;
        let bytes = self.data?.get(start..start + 2)?;
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Bytes the descriptor claims to cover.
    pub const fn required_len(&self) -> usize {
        self.event_count as usize * BYTES_PER_EVENT
    }
}

/// A song that owns its packed event stream.
#[derive(Clone, Debug)]
pub struct Song {
    /// Song title
    pub title: ArrayString<32>,
    /// Tempo in beats per minute
    pub bpm: f32,
    /// Packed event records
    data: Vec<u8>,
}

impl Default for Song {
    fn default() -> Self {
        Self {
            title: ArrayString::new(),
            bpm: DEFAULT_BPM,
            data: Vec::new(),
        }
    }
}

impl Song {
    /// Create a new empty song.
    pub fn new(title: &str, bpm: f32) -> Self {
        let mut song = Self {
            bpm,
            ..Self::default()
        };
        song.set_title(title);
        song
    }

    /// Build a song from decoded events.
    pub fn from_events(title: &str, bpm: f32, events: &[SongEvent]) -> Self {
        let mut song = Self::new(title, bpm);
        song.data.reserve(events.len() * BYTES_PER_EVENT);
        for event in events {
            song.push(*event);
        }
        song
    }

    /// Wrap an already packed stream. Trailing partial records are dropped.
    pub fn from_packed(title: &str, bpm: f32, mut data: Vec<u8>) -> Self {
        let whole = data.len() - data.len() % BYTES_PER_EVENT;
        data.truncate(whole.min(MAX_EVENTS * BYTES_PER_EVENT));
        let mut song = Self::new(title, bpm);
        song.data = data;
        song
    }

    /// Set the title, truncating at a character boundary to fit.
    pub fn set_title(&mut self, title: &str) {
        self.title.clear();
        for ch in title.chars() {
            if self.title.try_push(ch).is_err() {
                break;
            }
        }
    }

    /// Append one event. Returns false once the stream holds [`MAX_EVENTS`].
    pub fn push(&mut self, event: SongEvent) -> bool {
        if self.len() >= MAX_EVENTS {
            return false;
        }
        self.data.extend_from_slice(&event.to_bytes());
        true
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.data.len() / BYTES_PER_EVENT
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Packed event records.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Iterate over decoded events.
    pub fn events(&self) -> impl Iterator<Item = SongEvent> + '_ {
        self.data.chunks_exact(BYTES_PER_EVENT).map(|chunk| {
            let mut record = [0u8; BYTES_PER_EVENT];
            record.copy_from_slice(chunk);
            SongEvent::from_bytes(&record)
        })
    }

    /// Sum of all event deltas.
    pub fn total_ticks(&self) -> u64 {
        self.events().map(|e| e.delta_ticks as u64).sum()
    }

    /// Borrow a descriptor for the player.
    pub fn info(&self) -> SongInfo<'_> {
        SongInfo::new(&self.data, self.len() as u16, self.bpm)
    }
}
