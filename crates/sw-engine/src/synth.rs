//! Synthesizer: the voice pool behind a single guard, shared between the
//! sample producer thread and the sequencer.
//!
//! Every method takes the guard for one O(`MAX_VOICES`) pass over the voice
//! table and releases it before logging anything.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::NoteError;
use crate::player::NoteSink;
use crate::voice_pool::{VoiceId, VoicePool};

/// Cloneable handle to a guarded voice pool.
#[derive(Clone, Debug)]
pub struct Synthesizer {
    voices: Arc<Mutex<VoicePool>>,
}

impl Synthesizer {
    /// Create a synthesizer with every voice inactive.
    pub fn new(sample_rate: u32) -> Self {
        Self {
            voices: Arc::new(Mutex::new(VoicePool::with_sample_rate(sample_rate))),
        }
    }

    /// Start a note; dropped or rejected notes are logged.
    pub fn note_on(&self, note: i32, velocity: i32) -> Result<VoiceId, NoteError> {
        let result = self.voices.lock().note_on(note, velocity);
        if let Err(e) = &result {
            log::warn!("{}", e);
        }
        result
    }

    /// Stop the first voice playing `note`.
    pub fn note_off(&self, note: i32) -> Option<VoiceId> {
        self.voices.lock().note_off(note)
    }

    pub fn all_notes_off(&self) {
        self.voices.lock().all_notes_off();
    }

    /// Render the next mixed sample.
    #[inline]
    pub fn render_sample(&self) -> i16 {
        #[cfg(feature = "alloc_check")]
        {
            assert_no_alloc::assert_no_alloc(|| self.voices.lock().render_sample())
        }
        #[cfg(not(feature = "alloc_check"))]
        {
            self.voices.lock().render_sample()
        }
    }

    pub fn active_count(&self) -> usize {
        self.voices.lock().active_count()
    }

    pub fn sample_rate(&self) -> u32 {
        self.voices.lock().sample_rate()
    }

    /// Copy of the voice table, for diagnostics.
    pub fn snapshot(&self) -> VoicePool {
        self.voices.lock().clone()
    }
}

impl NoteSink for Synthesizer {
    fn note_on(&mut self, note: u8, velocity: u8) {
        let _ = Synthesizer::note_on(self, note as i32, velocity as i32);
    }

    fn note_off(&mut self, note: u8) {
        Synthesizer::note_off(self, note as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::{MAX_VOICE_AMPLITUDE, SAMPLE_RATE};
    use crate::voice_pool::{MAX_VOICES, SILENCE};
    use std::thread;

    #[test]
    fn clones_share_one_table() {
        let synth = Synthesizer::new(SAMPLE_RATE);
        let other = synth.clone();
        synth.note_on(60, 100).unwrap();
        assert_eq!(other.active_count(), 1);
        other.note_off(60);
        assert_eq!(synth.active_count(), 0);
    }

    #[test]
    fn render_follows_note_commands() {
        let synth = Synthesizer::new(SAMPLE_RATE);
        assert_eq!(synth.render_sample(), SILENCE);
        synth.note_on(69, 127).unwrap();
        assert_eq!(synth.render_sample(), MAX_VOICE_AMPLITUDE);
        synth.all_notes_off();
        assert_eq!(synth.render_sample(), SILENCE);
    }

    #[test]
    fn exhaustion_is_reported() {
        let synth = Synthesizer::new(SAMPLE_RATE);
        for i in 0..MAX_VOICES as i32 {
            synth.note_on(50 + i, 100).unwrap();
        }
        assert_eq!(synth.note_on(100, 100), Err(NoteError::PoolExhausted));
        assert_eq!(synth.active_count(), MAX_VOICES);
    }

    #[test]
    fn note_sink_drops_errors() {
        let mut synth = Synthesizer::new(SAMPLE_RATE);
        NoteSink::note_on(&mut synth, 60, 0);
        assert_eq!(synth.active_count(), 0);
        NoteSink::note_on(&mut synth, 60, 64);
        assert_eq!(synth.active_count(), 1);
        NoteSink::note_off(&mut synth, 60);
        assert_eq!(synth.active_count(), 0);
    }

    #[test]
    fn concurrent_render_and_commands() {
        let synth = Synthesizer::new(SAMPLE_RATE);
        let producer = synth.clone();
        let renderer = thread::spawn(move || {
            let mut peak = 0i16;
            for _ in 0..50_000 {
                peak = peak.max(producer.render_sample().saturating_abs());
            }
            peak
        });

        for round in 0..500 {
            let note = 40 + (round % 40);
            let _ = synth.note_on(note, 100);
            if round % 3 == 0 {
                synth.note_off(note);
            }
        }

        let peak = renderer.join().unwrap();
        assert!(peak <= MAX_VOICE_AMPLITUDE);
        assert!(synth.active_count() <= MAX_VOICES);
    }

    #[test]
    fn snapshot_is_detached() {
        let synth = Synthesizer::new(SAMPLE_RATE);
        synth.note_on(60, 100).unwrap();
        let snap = synth.snapshot();
        synth.all_notes_off();
        assert_eq!(snap.active_count(), 1);
        assert_eq!(synth.active_count(), 0);
    }
}
