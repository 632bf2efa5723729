//! Headless controller for squarewave.
//!
//! Provides one API for loading songs, real-time playback and offline
//! rendering that the CLI and tests share.

mod render;

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use sw_audio::{spawn_producer, CpalOutput, ProducerHandle};
use sw_engine::{Player, Synthesizer, SystemClock};

// Re-export common types so callers don't need the lower crates directly.
pub use sw_audio::AudioError;
pub use sw_engine::{Frame, LoadError, SAMPLE_RATE};
pub use sw_formats::{frames_to_wav, write_wav, FormatError};
pub use sw_ir::Song;

pub use render::{render_song, RENDER_TAIL_MS};

/// How long the sequencer sleeps when no event was due.
const UPDATE_INTERVAL: Duration = Duration::from_millis(1);

/// Time given to the output to drain after the last event.
const PLAYBACK_TAIL: Duration = Duration::from_millis(200);

const SEQUENCER_THREAD_NAME: &str = "synth-sequencer";

/// Error starting real-time playback.
#[derive(Debug)]
pub enum PlayError {
    /// The current song can't be played
    Load(LoadError),
    /// The audio device or a playback thread couldn't be started
    Audio(AudioError),
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayError::Load(e) => write!(f, "{}", e),
            PlayError::Audio(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PlayError {}

impl From<LoadError> for PlayError {
    fn from(e: LoadError) -> Self {
        PlayError::Load(e)
    }
}

impl From<AudioError> for PlayError {
    fn from(e: AudioError) -> Self {
        PlayError::Audio(e)
    }
}

/// Headless controller: owns a song and manages playback.
pub struct Controller {
    song: Song,
    playback: Option<PlaybackHandle>,
}

struct PlaybackHandle {
    synth: Synthesizer,
    producer: ProducerHandle,
    stop_signal: Arc<AtomicBool>,
    event_index: Arc<AtomicU32>,
    finished: Arc<AtomicBool>,
    sequencer: Option<JoinHandle<()>>,
}

impl Controller {
    pub fn new() -> Self {
        Self {
            song: Song::new("Untitled", sw_ir::DEFAULT_BPM),
            playback: None,
        }
    }

    // --- Song management ---

    pub fn song(&self) -> &Song {
        &self.song
    }

    pub fn set_song(&mut self, song: Song) {
        self.stop();
        self.song = song;
    }

    /// Load a `.sqw` container.
    pub fn load_song_file(&mut self, data: &[u8]) -> Result<(), FormatError> {
        let song = sw_formats::load_song(data)?;
        self.set_song(song);
        Ok(())
    }

    /// Import a Standard MIDI File.
    pub fn load_midi(&mut self, data: &[u8]) -> Result<(), FormatError> {
        let song = sw_formats::import_midi(data)?;
        self.set_song(song);
        Ok(())
    }

    /// Load a file, picking the format from its extension.
    ///
    /// `.mid`/`.midi` are imported as MIDI; anything else is read as a
    /// song container.
    pub fn load_path(&mut self, path: &Path) -> Result<(), FormatError> {
        let data = std::fs::read(path)?;
        let is_midi = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("mid") || ext.eq_ignore_ascii_case("midi"));
        if is_midi {
            self.load_midi(&data)
        } else {
            self.load_song_file(&data)
        }
    }

    /// Encode the current song as a `.sqw` container.
    pub fn export_song(&self) -> Result<Vec<u8>, FormatError> {
        sw_formats::save_song(&self.song)
    }

    // --- Real-time playback ---

    /// Start playing the current song on the default audio device.
    pub fn play(&mut self) -> Result<(), PlayError> {
        self.stop();

        let synth = Synthesizer::new(SAMPLE_RATE);
        let producer = spawn_producer(synth.clone(), || CpalOutput::open(SAMPLE_RATE))?;

        let stop_signal = Arc::new(AtomicBool::new(false));
        let event_index = Arc::new(AtomicU32::new(0));
        let finished = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = mpsc::channel();

        let ctx = SequencerContext {
            song: self.song.clone(),
            synth: synth.clone(),
            stop_signal: stop_signal.clone(),
            event_index: event_index.clone(),
            finished: finished.clone(),
        };
        let sequencer = thread::Builder::new()
            .name(SEQUENCER_THREAD_NAME.into())
            .spawn(move || sequencer_thread(ctx, ready_tx))
            .map_err(|e| AudioError::Spawn(e.to_string()))?;

        let handle = PlaybackHandle {
            synth,
            producer,
            stop_signal,
            event_index,
            finished,
            sequencer: Some(sequencer),
        };

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.playback = Some(handle);
                Ok(())
            }
            Ok(Err(e)) => {
                handle.shutdown();
                Err(e.into())
            }
            Err(_) => {
                handle.shutdown();
                Err(AudioError::Spawn(format!("{} exited early", SEQUENCER_THREAD_NAME)).into())
            }
        }
    }

    /// Stop playback, silence every voice and join the playback threads.
    pub fn stop(&mut self) {
        if let Some(handle) = self.playback.take() {
            handle.shutdown();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| !p.finished.load(Ordering::Relaxed))
    }

    pub fn is_finished(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| p.finished.load(Ordering::Relaxed))
    }

    /// Index of the next event the sequencer will process.
    pub fn position(&self) -> Option<u32> {
        let pb = self.playback.as_ref()?;
        if pb.finished.load(Ordering::Relaxed) {
            return None;
        }
        Some(pb.event_index.load(Ordering::Relaxed))
    }

    /// Voices currently sounding.
    pub fn active_voices(&self) -> usize {
        self.playback.as_ref().map_or(0, |p| p.synth.active_count())
    }

    // --- Offline rendering ---

    /// Render the song without an audio device, up to `max_frames`.
    pub fn render_frames(&self, max_frames: usize) -> Result<Vec<Frame>, LoadError> {
        render_song(&self.song, max_frames)
    }

    pub fn render_to_wav(&self, max_seconds: u32) -> Result<Vec<u8>, LoadError> {
        let max_frames = (SAMPLE_RATE as usize) * max_seconds as usize;
        let frames = self.render_frames(max_frames)?;
        Ok(frames_to_wav(&frames, SAMPLE_RATE))
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop();
    }
}

impl PlaybackHandle {
    fn shutdown(mut self) {
        self.stop_signal.store(true, Ordering::Relaxed);
        if let Some(thread) = self.sequencer.take() {
            if thread.join().is_err() {
                log::error!("{} thread panicked", SEQUENCER_THREAD_NAME);
            }
        }
        self.synth.all_notes_off();
        self.producer.stop();
    }
}

struct SequencerContext {
    song: Song,
    synth: Synthesizer,
    stop_signal: Arc<AtomicBool>,
    event_index: Arc<AtomicU32>,
    finished: Arc<AtomicBool>,
}

fn sequencer_thread(ctx: SequencerContext, ready: mpsc::Sender<Result<(), LoadError>>) {
    let mut player = Player::new(ctx.synth.clone(), SystemClock::new());
    if let Err(e) = player.load_song(ctx.song.info()) {
        ctx.finished.store(true, Ordering::Relaxed);
        let _ = ready.send(Err(e));
        return;
    }
    let _ = ready.send(Ok(()));

    player.start();
    while !ctx.stop_signal.load(Ordering::Relaxed) {
        let before = player.event_index();
        if !player.update() {
            break;
        }
        let after = player.event_index();
        ctx.event_index.store(after as u32, Ordering::Relaxed);
        if after == before {
            thread::sleep(UPDATE_INTERVAL);
        }
    }

    ctx.synth.all_notes_off();
    if !ctx.stop_signal.load(Ordering::Relaxed) {
        thread::sleep(PLAYBACK_TAIL);
    }
    ctx.finished.store(true, Ordering::Relaxed);
}
