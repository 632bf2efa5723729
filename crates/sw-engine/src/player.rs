//! Player: walks a packed event stream and dispatches notes on time.
//!
//! The player is polled. Each [`Player::update`] call checks the clock and
//! handles at most one due event, so a late poll never turns into a burst of
//! catch-up notes. The next event is scheduled relative to when the current
//! one was actually handled.

use sw_ir::{millis_per_tick, normalize_bpm, ticks_to_millis, NoteAction, SongEvent, SongInfo};

use crate::clock::Clock;
use crate::error::{DescriptorFault, LoadError};
use crate::voice_pool::VoicePool;

/// Receiver of note commands (the voice pool contract).
pub trait NoteSink {
    fn note_on(&mut self, note: u8, velocity: u8);
    fn note_off(&mut self, note: u8);
}

impl<T: NoteSink + ?Sized> NoteSink for &mut T {
    fn note_on(&mut self, note: u8, velocity: u8) {
        (**self).note_on(note, velocity);
    }

    fn note_off(&mut self, note: u8) {
        (**self).note_off(note);
    }
}

impl NoteSink for VoicePool {
    fn note_on(&mut self, note: u8, velocity: u8) {
        if let Err(e) = VoicePool::note_on(self, note as i32, velocity as i32) {
            log::warn!("{}", e);
        }
    }

    fn note_off(&mut self, note: u8) {
        VoicePool::note_off(self, note as i32);
    }
}

/// Playback state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayerState {
    /// No song loaded
    #[default]
    Idle,
    /// Song loaded, not playing
    Loaded,
    Playing,
    /// Every event has been dispatched
    Finished,
}

/// Event sequencer.
pub struct Player<'a, S, C> {
    sink: S,
    clock: C,
    song: Option<SongInfo<'a>>,
    state: PlayerState,
    /// Next event to process
    event_index: u16,
    /// Clock time at which `event_index` is due
    next_event_due_ms: u64,
    millis_per_tick: f32,
}

impl<'a, S: NoteSink, C: Clock> Player<'a, S, C> {
    pub fn new(sink: S, clock: C) -> Self {
        Self {
            sink,
            clock,
            song: None,
            state: PlayerState::Idle,
            event_index: 0,
            next_event_due_ms: 0,
            millis_per_tick: 0.0,
        }
    }

    /// Validate and adopt a song descriptor.
    ///
    /// Playback stops either way. On failure the previous song is forgotten
    /// and the player is left `Idle`.
    pub fn load_song(&mut self, song: SongInfo<'a>) -> Result<(), LoadError> {
        self.song = None;
        self.state = PlayerState::Idle;
        self.event_index = 0;
        self.next_event_due_ms = 0;

        if let Err(fault) = validate(&song) {
            let err = LoadError::InvalidDescriptor(fault);
            log::error!("{}", err);
            return Err(err);
        }

        self.millis_per_tick = millis_per_tick(song.bpm);
        log::info!(
            "loaded song: {} events, {:.2} bpm, {:.4} ms/tick",
            song.event_count,
            normalize_bpm(song.bpm),
            self.millis_per_tick
        );

        self.song = Some(song);
        self.state = PlayerState::Loaded;
        Ok(())
    }

    /// Start playback from the first event.
    ///
    /// Also replays a finished song. No-op while playing or without a song.
    pub fn start(&mut self) {
        if self.state == PlayerState::Playing {
            return;
        }
        if self.song.is_none() {
            log::error!("cannot start playback: no valid song loaded");
            return;
        }
        self.event_index = 0;
        self.begin();
    }

    /// Continue from the current cursor after [`stop`](Self::stop).
    ///
    /// Behaves like [`start`](Self::start) when there is nothing left to
    /// resume.
    pub fn resume(&mut self) {
        if self.state == PlayerState::Playing {
            return;
        }
        let remaining = self
            .song
            .as_ref()
            .is_some_and(|song| self.event_index < song.event_count);
        if self.state == PlayerState::Finished || !remaining {
            self.start();
        } else {
            self.begin();
        }
    }

    /// Stop playback, keeping the cursor.
    ///
    /// Sounding notes are left alone; silencing is up to the voice pool owner.
    pub fn stop(&mut self) {
        if self.state != PlayerState::Playing {
            return;
        }
        log::info!("stopping playback at event {}", self.event_index);
        self.state = PlayerState::Loaded;
    }

    /// Poll the player. Returns whether playback is still running.
    pub fn update(&mut self) -> bool {
        if self.state != PlayerState::Playing {
            return false;
        }

        let now = self.clock.now_ms();
        if now < self.next_event_due_ms {
            return true;
        }

        let Some(event) = self.song.and_then(|song| song.event(self.event_index)) else {
            log::info!("playback finished");
            self.state = PlayerState::Finished;
            return false;
        };

        self.dispatch(&event);
        self.event_index += 1;
        self.schedule_next(now);
        true
    }

    fn begin(&mut self) {
        let Some(delta) = self.song.and_then(|song| song.delta_ticks(self.event_index)) else {
            return;
        };
        log::info!("starting playback at event {}", self.event_index);
        self.next_event_due_ms = self
            .clock
            .now_ms()
            .saturating_add(ticks_to_millis(delta, self.millis_per_tick));
        self.state = PlayerState::Playing;
    }

    fn dispatch(&mut self, event: &SongEvent) {
        log::debug!(
            "event {}: {:?} note={} vel={}",
            self.event_index,
            event.kind,
            event.note,
            event.velocity
        );
        match event.action() {
            NoteAction::On { note, velocity } => self.sink.note_on(note, velocity),
            NoteAction::Off { note } => self.sink.note_off(note),
            NoteAction::Ignore => {}
        }
    }

    fn schedule_next(&mut self, processed_at: u64) {
        if let Some(delta) = self.song.and_then(|song| song.delta_ticks(self.event_index)) {
            self.next_event_due_ms =
                processed_at.saturating_add(ticks_to_millis(delta, self.millis_per_tick));
        }
    }

    // --- Accessors ---

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }

    pub fn event_index(&self) -> u16 {
        self.event_index
    }

    pub fn next_event_due_ms(&self) -> u64 {
        self.next_event_due_ms
    }

    pub fn millis_per_tick(&self) -> f32 {
        self.millis_per_tick
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

fn validate(song: &SongInfo<'_>) -> Result<(), DescriptorFault> {
    let data = song.data.ok_or(DescriptorFault::MissingData)?;
    if song.event_count == 0 {
        return Err(DescriptorFault::NoEvents);
    }
    let needed = song.required_len();
    if data.len() < needed {
        return Err(DescriptorFault::Truncated {
            needed,
            available: data.len(),
        });
    }
    Ok(())
}
