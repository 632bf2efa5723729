//! Note, velocity and period conversion for square-wave voices.
//!
//! Equal-tempered tuning with A4 (note 69) at 440 Hz. The square wave is
//! described by its half period: the number of output samples between two
//! polarity flips.

/// Output sample rate in Hz.
pub const SAMPLE_RATE: u32 = 44_100;

/// Peak excursion of a single voice at full velocity.
pub const MAX_VOICE_AMPLITUDE: i16 = 16_000;

/// Highest MIDI velocity.
pub const MAX_VELOCITY: i32 = 127;

/// Convert a note number to a frequency in Hz.
///
/// Notes at or below 0 map to 0 Hz, which callers treat as "no note".
pub fn note_to_frequency(note: i32) -> f32 {
    if note <= 0 {
        return 0.0;
    }
    440.0 * libm::powf(2.0, (note - 69) as f32 / 12.0)
}

/// Convert a velocity (clamped to 0-127) to a peak amplitude.
pub fn velocity_to_amplitude(velocity: i32) -> i16 {
    let velocity = velocity.clamp(0, MAX_VELOCITY);
    let amp = (velocity as f32 / MAX_VELOCITY as f32) * MAX_VOICE_AMPLITUDE as f32;
    libm::roundf(amp) as i16
}

/// Samples per half cycle, rounded and floored at 1.
///
/// Returns 0 for a non-positive frequency. Very low frequencies saturate at
/// `u16::MAX`.
pub fn half_period_samples(frequency: f32, sample_rate: u32) -> u16 {
    if frequency.is_nan() || frequency <= 0.0 {
        return 0;
    }
    let half = libm::roundf(sample_rate as f32 / (frequency * 2.0)) as u16;
    half.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_440() {
        assert!((note_to_frequency(69) - 440.0).abs() < 1e-3);
    }

    #[test]
    fn octave_up_doubles() {
        assert!((note_to_frequency(81) - 880.0).abs() < 1e-2);
    }

    #[test]
    fn octave_down_halves() {
        assert!((note_to_frequency(57) - 220.0).abs() < 1e-2);
    }

    #[test]
    fn middle_c() {
        assert!((note_to_frequency(60) - 261.626).abs() < 1e-2);
    }

    #[test]
    fn non_positive_note_is_zero_hz() {
        assert_eq!(note_to_frequency(0), 0.0);
        assert_eq!(note_to_frequency(-5), 0.0);
    }

    #[test]
    fn full_velocity_is_max_amplitude() {
        assert_eq!(velocity_to_amplitude(127), MAX_VOICE_AMPLITUDE);
    }

    #[test]
    fn zero_velocity_is_silent() {
        assert_eq!(velocity_to_amplitude(0), 0);
    }

    #[test]
    fn velocity_is_clamped() {
        assert_eq!(velocity_to_amplitude(500), MAX_VOICE_AMPLITUDE);
        assert_eq!(velocity_to_amplitude(-20), 0);
    }

    #[test]
    fn velocity_scales_and_rounds() {
        // 64/127 * 16000 = 8062.99
        assert_eq!(velocity_to_amplitude(64), 8063);
        // 1/127 * 16000 = 125.98
        assert_eq!(velocity_to_amplitude(1), 126);
    }

    #[test]
    fn half_period_of_a4() {
        // 44100 / 880 = 50.11
        assert_eq!(half_period_samples(440.0, SAMPLE_RATE), 50);
    }

    #[test]
    fn half_period_floors_at_one() {
        assert_eq!(half_period_samples(40_000.0, SAMPLE_RATE), 1);
    }

    #[test]
    fn half_period_zero_frequency() {
        assert_eq!(half_period_samples(0.0, SAMPLE_RATE), 0);
        assert_eq!(half_period_samples(-3.0, SAMPLE_RATE), 0);
        assert_eq!(half_period_samples(f32::NAN, SAMPLE_RATE), 0);
    }

    #[test]
    fn half_period_saturates_for_subsonic() {
        assert_eq!(half_period_samples(0.1, SAMPLE_RATE), u16::MAX);
    }
}
