//! Tick and tempo conversion.

/// Resolution of the event stream's delta ticks.
pub const TICKS_PER_QUARTER_NOTE: u16 = 96;

/// Tempo used when a song carries no usable bpm.
pub const DEFAULT_BPM: f32 = 120.0;

/// Replace a non-positive or non-finite bpm with [`DEFAULT_BPM`].
pub fn normalize_bpm(bpm: f32) -> f32 {
    if bpm.is_finite() && bpm > 0.0 {
        bpm
    } else {
        DEFAULT_BPM
    }
}

/// Milliseconds per tick at the given tempo.
///
/// `(60_000_000 / bpm) / 1000 / TICKS_PER_QUARTER_NOTE`
pub fn millis_per_tick(bpm: f32) -> f32 {
    let micros_per_quarter = 60_000_000.0 / normalize_bpm(bpm);
    (micros_per_quarter / 1000.0) / TICKS_PER_QUARTER_NOTE as f32
}

/// Convert a tick delta to whole milliseconds (rounded to nearest).
pub fn ticks_to_millis(ticks: u16, millis_per_tick: f32) -> u64 {
    libm::roundf(ticks as f32 * millis_per_tick) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_per_tick_at_120_bpm() {
        let mpt = millis_per_tick(120.0);
        assert!((mpt - 5.208_333).abs() < 1e-4);
    }

    #[test]
    fn quarter_note_at_120_bpm_is_500ms() {
        assert_eq!(ticks_to_millis(96, millis_per_tick(120.0)), 500);
    }

    #[test]
    fn zero_ticks_is_zero_millis() {
        assert_eq!(ticks_to_millis(0, millis_per_tick(90.0)), 0);
    }

    #[test]
    fn non_positive_bpm_defaults_to_120() {
        assert_eq!(normalize_bpm(0.0), DEFAULT_BPM);
        assert_eq!(normalize_bpm(-30.0), DEFAULT_BPM);
        assert_eq!(normalize_bpm(f32::NAN), DEFAULT_BPM);
        assert_eq!(millis_per_tick(0.0), millis_per_tick(120.0));
    }

    #[test]
    fn faster_tempo_shortens_ticks() {
        assert_eq!(ticks_to_millis(96, millis_per_tick(240.0)), 250);
    }

    #[test]
    fn rounds_to_nearest_millisecond() {
        // 1 tick at 120 bpm = 5.208ms
        assert_eq!(ticks_to_millis(1, millis_per_tick(120.0)), 5);
        // 3 ticks = 15.625ms
        assert_eq!(ticks_to_millis(3, millis_per_tick(120.0)), 16);
    }
}
