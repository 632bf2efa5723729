//! Offline render through the controller.

use sw_engine::MAX_VOICE_AMPLITUDE;
use sw_ir::{Song, SongEvent};
use sw_master::{render_song, Controller, Frame, SAMPLE_RATE};

fn melody() -> Song {
    let notes = [60u8, 62, 64, 65, 67, 69, 71, 72];
    let mut events = Vec::new();
    for note in notes {
        events.push(SongEvent::note_on(0, note, 110));
        events.push(SongEvent::note_off(48, note));
    }
    Song::from_events("Scale", 120.0, &events)
}

#[test]
fn render_is_nonsilent_and_in_range() {
    let frames = render_song(&melody(), usize::MAX).unwrap();

    // Eight 250ms notes, then the tail
    let expected = SAMPLE_RATE as usize * 2;
    assert!(frames.len() > expected);
    assert!(frames.len() < expected + SAMPLE_RATE as usize / 2);

    let peak = frames.iter().map(|f| f.left.saturating_abs()).max().unwrap();
    assert!(peak > 0);
    assert!(peak <= MAX_VOICE_AMPLITUDE);
    assert!(frames.iter().all(|f| f.left == f.right));
}

#[test]
fn render_is_deterministic() {
    let a = render_song(&melody(), usize::MAX).unwrap();
    let b = render_song(&melody(), usize::MAX).unwrap();
    assert_eq!(a, b);
}

#[test]
fn chord_is_averaged() {
    let song = Song::from_events(
        "",
        120.0,
        &[
            SongEvent::note_on(0, 57, 127),
            SongEvent::note_on(0, 69, 127),
            SongEvent::note_off(96, 57),
            SongEvent::note_off(0, 69),
        ],
    );
    let frames = render_song(&song, usize::MAX).unwrap();

    // One event per frame: A4 starts a frame after A3
    assert_eq!(frames[0].left, MAX_VOICE_AMPLITUDE);
    // Both high
    assert_eq!(frames[50].left, MAX_VOICE_AMPLITUDE);
    // A4 (half period 50) low while A3 (half period 100) is still high
    assert_eq!(frames[75].left, 0);
    // Both low
    assert_eq!(frames[160].left, -MAX_VOICE_AMPLITUDE);
}

#[test]
fn controller_wav_matches_frames() {
    let mut ctrl = Controller::new();
    ctrl.set_song(melody());

    let frames: Vec<Frame> = ctrl.render_frames(SAMPLE_RATE as usize).unwrap();
    assert_eq!(frames.len(), SAMPLE_RATE as usize);

    let wav = ctrl.render_to_wav(1).unwrap();
    assert_eq!(wav.len(), 44 + frames.len() * 4);
    assert_eq!(&wav[44..46], &frames[0].left.to_le_bytes());
}

#[test]
fn container_round_trip_renders_identically() {
    let song = melody();
    let bytes = sw_formats::save_song(&song).unwrap();
    let loaded = sw_formats::load_song(&bytes).unwrap();

    assert_eq!(
        render_song(&song, usize::MAX).unwrap(),
        render_song(&loaded, usize::MAX).unwrap()
    );
}
