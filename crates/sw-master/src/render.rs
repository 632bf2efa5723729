//! Offline rendering.
//!
//! Drives the player from a clock derived from the frame count, so a render
//! is deterministic and runs as fast as the machine allows.

use sw_engine::{Frame, LoadError, ManualClock, Player, VoicePool, SAMPLE_RATE};
use sw_ir::Song;

/// Silence rendered after the last event.
pub const RENDER_TAIL_MS: u64 = 250;

/// Render `song` to frames, stopping after the song finishes plus
/// [`RENDER_TAIL_MS`], or at `max_frames`.
///
/// The player is polled once per frame with the clock at
/// `frames * 1000 / SAMPLE_RATE` milliseconds.
pub fn render_song(song: &Song, max_frames: usize) -> Result<Vec<Frame>, LoadError> {
    let mut player = Player::new(
        VoicePool::with_sample_rate(SAMPLE_RATE),
        ManualClock::new(0),
    );
    player.load_song(song.info())?;
    player.start();

    let tail_frames = (SAMPLE_RATE as u64 * RENDER_TAIL_MS / 1000) as usize;
    let mut frames = Vec::with_capacity(max_frames.min(SAMPLE_RATE as usize * 60));
    let mut tail_left: Option<usize> = None;

    while frames.len() < max_frames {
        match tail_left {
            Some(0) => break,
            Some(ref mut left) => *left -= 1,
            None => {
                let now = frames.len() as u64 * 1000 / SAMPLE_RATE as u64;
                player.clock_mut().set(now);
                if !player.update() {
                    player.sink_mut().all_notes_off();
                    tail_left = Some(tail_frames);
                }
            }
        }
        frames.push(Frame::mono(player.sink_mut().render_sample()));
    }

    log::info!(
        "rendered {} frames ({:.2}s)",
        frames.len(),
        frames.len() as f32 / SAMPLE_RATE as f32
    );
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sw_engine::MAX_VOICE_AMPLITUDE;
    use sw_ir::SongEvent;

    #[test]
    fn note_sounds_until_its_off_event() {
        // 48 ticks at 120 bpm is 250ms
        let song = Song::from_events(
            "",
            120.0,
            &[SongEvent::note_on(0, 69, 127), SongEvent::note_off(48, 69)],
        );
        let frames = render_song(&song, usize::MAX).unwrap();

        // First event is due at 0ms and dispatched on the first frame
        assert_eq!(frames[0].left, MAX_VOICE_AMPLITUDE);
        assert_eq!(frames[50].left, -MAX_VOICE_AMPLITUDE);

        // The off event is due at 250ms, which the clock first reads at
        // frame 11025
        let last_sounding = frames.iter().rposition(|f| f.left != 0).unwrap();
        assert_eq!(last_sounding, 11_024);
    }

    #[test]
    fn output_ends_with_silent_tail() {
        let song = Song::from_events("", 120.0, &[SongEvent::note_on(0, 60, 100)]);
        let frames = render_song(&song, usize::MAX).unwrap();
        let tail = SAMPLE_RATE as usize * RENDER_TAIL_MS as usize / 1000;
        assert!(frames.len() > tail);
        assert!(frames[frames.len() - tail..].iter().all(|f| *f == Frame::silence()));
    }

    #[test]
    fn frame_cap_wins() {
        let song = Song::from_events(
            "",
            120.0,
            &[SongEvent::note_on(0, 60, 100), SongEvent::note_off(u16::MAX, 60)],
        );
        assert_eq!(render_song(&song, 4410).unwrap().len(), 4410);
    }

    #[test]
    fn invalid_song_is_an_error() {
        let song = Song::new("empty", 120.0);
        assert!(render_song(&song, 100).is_err());
    }

    #[test]
    fn frames_are_mono() {
        let song = Song::from_events(
            "",
            200.0,
            &[
                SongEvent::note_on(0, 60, 100),
                SongEvent::note_on(0, 64, 80),
                SongEvent::note_off(96, 60),
                SongEvent::note_off(0, 64),
            ],
        );
        let frames = render_song(&song, usize::MAX).unwrap();
        assert!(frames.iter().all(|f| f.left == f.right));
        assert!(frames.iter().any(|f| f.left != 0));
    }
}
