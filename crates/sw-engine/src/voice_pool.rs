//! VoicePool: fixed voice table and the per-sample mixer.
//!
//! The pool itself does no locking. Real-time use goes through
//! [`Synthesizer`](crate::Synthesizer), which keeps the table behind a single
//! guard; offline rendering drives a pool directly.

use crate::error::NoteError;
use crate::frequency::SAMPLE_RATE;
use crate::voice::Voice;

/// Identifier for a voice slot in the pool.
pub type VoiceId = usize;

/// Maximum number of simultaneous voices.
pub const MAX_VOICES: usize = 8;

/// Output value with no active voice.
pub const SILENCE: i16 = 0;

/// Fixed table of square-wave voices.
#[derive(Clone, Debug)]
pub struct VoicePool {
    voices: [Voice; MAX_VOICES],
    sample_rate: u32,
}

impl VoicePool {
    /// Create a pool with every voice inactive.
    pub const fn new() -> Self {
        Self::with_sample_rate(SAMPLE_RATE)
    }

    pub const fn with_sample_rate(sample_rate: u32) -> Self {
        Self {
            voices: [Voice::silent(); MAX_VOICES],
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Start a note on the first free voice.
    ///
    /// A voice already playing `note` is released first, so a pitch never
    /// sounds twice. There is no stealing: with every slot busy the note is
    /// dropped.
    pub fn note_on(&mut self, note: i32, velocity: i32) -> Result<VoiceId, NoteError> {
        if let Some(existing) = self.find_voice_playing(note) {
            self.voices[existing].active = false;
        }

        let id = self.find_free_voice().ok_or(NoteError::PoolExhausted)?;
        self.voices[id].start(note, velocity, self.sample_rate)?;
        Ok(id)
    }

    /// Silence the first voice playing `note`.
    pub fn note_off(&mut self, note: i32) -> Option<VoiceId> {
        let id = self.find_voice_playing(note)?;
        self.voices[id].stop();
        Some(id)
    }

    /// Silence every voice.
    pub fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.stop();
        }
    }

    /// Advance every active voice by one sample and mix them.
    ///
    /// Active voices are averaged, so output level does not grow with
    /// polyphony; the clamp only guards the i16 range.
    pub fn render_sample(&mut self) -> i16 {
        let mut sum: i32 = 0;
        let mut active: i32 = 0;

        for voice in self.voices.iter_mut().filter(|v| v.active) {
            sum += voice.advance() as i32;
            active += 1;
        }

        if active == 0 {
            return SILENCE;
        }

        let mixed = sum as f32 / active as f32;
        if mixed > i16::MAX as f32 {
            i16::MAX
        } else if mixed < i16::MIN as f32 {
            i16::MIN
        } else {
            libm::roundf(mixed) as i16
        }
    }

    /// Count of active voices.
    pub fn active_count(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }

    /// Get a reference to a voice.
    pub fn voice(&self, id: VoiceId) -> Option<&Voice> {
        self.voices.get(id)
    }

    /// All voice slots in scan order.
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    fn find_free_voice(&self) -> Option<VoiceId> {
        self.voices.iter().position(|v| !v.active)
    }

    fn find_voice_playing(&self, note: i32) -> Option<VoiceId> {
        self.voices.iter().position(|v| v.active && v.note == note)
    }
}

impl Default for VoicePool {
    fn default() -> Self {
        Self::new()
    }
}
