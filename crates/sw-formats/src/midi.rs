//! Standard MIDI File import.
//!
//! Flattens every track into one stream of note events, sorted by absolute
//! time and rescaled to [`TICKS_PER_QUARTER_NOTE`].

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use sw_ir::{Song, SongEvent, DEFAULT_BPM, MAX_EVENTS, TICKS_PER_QUARTER_NOTE};

use crate::FormatError;

/// A note event at an absolute source tick.
struct TimedEvent {
    tick: u64,
    event: SongEvent,
}

/// Import a Standard MIDI File.
///
/// Note-on with velocity 0 becomes note-off and the source channel is kept in
/// each record's reserved byte. The tempo is the first tempo meta event in
/// any track, or 120 bpm if there is none.
pub fn import_midi(data: &[u8]) -> Result<Song, FormatError> {
    let smf = Smf::parse(data).map_err(|e| FormatError::Midi(e.to_string()))?;

    let ppq = match smf.header.timing {
        Timing::Metrical(ticks) => ticks.as_int(),
        Timing::Timecode(..) => return Err(FormatError::UnsupportedTiming),
    };
    if ppq == 0 {
        return Err(FormatError::InvalidHeader);
    }

    let mut timed = Vec::new();
    let mut tempo: Option<u32> = None;
    let mut title: Option<String> = None;

    for track in &smf.tracks {
        let mut tick = 0u64;
        for event in track {
            tick += event.delta.as_int() as u64;
            match event.kind {
                TrackEventKind::Midi { channel, message } => {
                    let mut note = match message {
                        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                            SongEvent::note_on(0, key.as_int(), vel.as_int())
                        }
                        MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                            SongEvent::note_off(0, key.as_int())
                        }
                        _ => continue,
                    };
                    note.reserved = channel.as_int();
                    timed.push(TimedEvent { tick, event: note });
                }
                TrackEventKind::Meta(MetaMessage::Tempo(us)) if tempo.is_none() => {
                    tempo = Some(us.as_int());
                }
                TrackEventKind::Meta(MetaMessage::TrackName(name)) if title.is_none() => {
                    title = Some(String::from_utf8_lossy(name).into_owned());
                }
                _ => {}
            }
        }
    }

    if timed.len() > MAX_EVENTS {
        return Err(FormatError::TooManyEvents);
    }

    // Stable, so simultaneous events keep track order
    timed.sort_by_key(|t| t.tick);

    let bpm = match tempo {
        Some(us) if us > 0 => 60_000_000.0 / us as f32,
        _ => DEFAULT_BPM,
    };

    let mut song = Song::new(title.as_deref().unwrap_or(""), bpm);
    let mut last = 0u64;
    let mut saturated = 0usize;
    for t in &timed {
        let scaled = rescale(t.tick, ppq);
        let delta = scaled - last;
        last = scaled;

        let mut event = t.event;
        event.delta_ticks = u16::try_from(delta).unwrap_or_else(|_| {
            saturated += 1;
            u16::MAX
        });
        song.push(event);
    }

    if saturated > 0 {
        log::warn!("{} gaps longer than {} ticks were shortened", saturated, u16::MAX);
    }
    log::info!(
        "imported MIDI ({} tracks, {} ppq): {} events at {} bpm",
        smf.tracks.len(),
        ppq,
        song.len(),
        song.bpm
    );

    Ok(song)
}

/// Source ticks to [`TICKS_PER_QUARTER_NOTE`], rounded to nearest.
fn rescale(tick: u64, ppq: u16) -> u64 {
    let ppq = ppq as u64;
    (tick * TICKS_PER_QUARTER_NOTE as u64 + ppq / 2) / ppq
}
