//! Voice: one square-wave oscillator slot.

use crate::error::NoteError;
use crate::frequency::{half_period_samples, note_to_frequency, velocity_to_amplitude};

/// A single square-wave oscillator.
///
/// While active, `level` alternates between `+target_amplitude` and
/// `-target_amplitude`, holding each polarity for `half_period` samples.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Voice {
    /// Is the voice contributing to the mix?
    pub active: bool,
    /// Note currently assigned (meaningful only while active)
    pub note: i32,
    /// Oscillator frequency in Hz (0 = silent)
    pub frequency: f32,
    /// Peak excursion derived from velocity
    pub target_amplitude: i16,
    /// Present output value
    pub level: i16,
    /// Samples between polarity flips
    pub half_period: u16,
    /// Countdown to the next flip
    pub until_flip: u16,
}

impl Voice {
    /// An inactive, silent voice.
    pub const fn silent() -> Self {
        Self {
            active: false,
            note: 0,
            frequency: 0.0,
            target_amplitude: 0,
            level: 0,
            half_period: 0,
            until_flip: 0,
        }
    }

    /// Configure the voice for a note and activate it.
    ///
    /// On degenerate parameters the voice is left inactive.
    pub fn start(&mut self, note: i32, velocity: i32, sample_rate: u32) -> Result<(), NoteError> {
        self.note = note;
        self.frequency = note_to_frequency(note);
        self.target_amplitude = velocity_to_amplitude(velocity);
        self.half_period = half_period_samples(self.frequency, sample_rate);

        if self.half_period == 0 || self.target_amplitude == 0 {
            self.active = false;
            return Err(NoteError::InvalidParameters {
                note,
                frequency: self.frequency,
                amplitude: self.target_amplitude,
                half_period: self.half_period,
            });
        }

        // Start high
        self.level = self.target_amplitude;
        self.until_flip = self.half_period;
        self.active = true;
        Ok(())
    }

    /// Hard cutoff.
    pub fn stop(&mut self) {
        self.active = false;
        self.level = 0;
    }

    /// Advance one sample and return the level to mix.
    ///
    /// The countdown is reloaded on the flip and then decremented in the same
    /// sample, so each polarity lasts exactly `half_period` samples.
    #[inline]
    pub fn advance(&mut self) -> i16 {
        if self.until_flip == 0 {
            self.level = if self.level == self.target_amplitude {
                -self.target_amplitude
            } else {
                self.target_amplitude
            };
            self.until_flip = self.half_period;
        }
        if self.until_flip > 0 {
            self.until_flip -= 1;
        }
        self.level
    }
}
