//! Fixed-width note events as stored in the packed song stream.

/// Size of one encoded event record in bytes.
pub const BYTES_PER_EVENT: usize = 6;

/// Raw event type byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Type byte 0
    NoteOff,
    /// Type byte 1
    NoteOn,
    /// Any other type byte; carried through and ignored at dispatch
    Other(u8),
}

impl EventKind {
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            0 => Self::NoteOff,
            1 => Self::NoteOn,
            other => Self::Other(other),
        }
    }

    pub const fn to_byte(self) -> u8 {
        match self {
            Self::NoteOff => 0,
            Self::NoteOn => 1,
            Self::Other(byte) => byte,
        }
    }
}

/// What the player should do with an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteAction {
    On { note: u8, velocity: u8 },
    Off { note: u8 },
    Ignore,
}

/// One event record.
///
/// Layout (big-endian): `delta_hi, delta_lo, kind, note, velocity, reserved`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SongEvent {
    /// Ticks since the previous event (or since playback start)
    pub delta_ticks: u16,
    pub kind: EventKind,
    pub note: u8,
    pub velocity: u8,
    /// Unused by playback; the MIDI importer stores the source channel here
    pub reserved: u8,
}

impl SongEvent {
    pub const fn note_on(delta_ticks: u16, note: u8, velocity: u8) -> Self {
        Self {
            delta_ticks,
            kind: EventKind::NoteOn,
            note,
            velocity,
            reserved: 0,
        }
    }

    pub const fn note_off(delta_ticks: u16, note: u8) -> Self {
        Self {
            delta_ticks,
            kind: EventKind::NoteOff,
            note,
            velocity: 0,
            reserved: 0,
        }
    }

    /// Decode a record.
    pub const fn from_bytes(bytes: &[u8; BYTES_PER_EVENT]) -> Self {
        Self {
            delta_ticks: u16::from_be_bytes([bytes[0], bytes[1]]),
            kind: EventKind::from_byte(bytes[2]),
            note: bytes[3],
            velocity: bytes[4],
            reserved: bytes[5],
        }
    }

    /// Encode a record.
    pub const fn to_bytes(&self) -> [u8; BYTES_PER_EVENT] {
        let delta = self.delta_ticks.to_be_bytes();
        [
            delta[0],
            delta[1],
            self.kind.to_byte(),
            self.note,
            self.velocity,
            self.reserved,
        ]
    }

    /// Resolve the event into a voice command.
    ///
    /// A note-on with zero velocity is a note-off.
    pub const fn action(&self) -> NoteAction {
        match self.kind {
            EventKind::NoteOn if self.velocity > 0 => NoteAction::On {
                note: self.note,
                velocity: self.velocity,
            },
            EventKind::NoteOn | EventKind::NoteOff => NoteAction::Off { note: self.note },
            EventKind::Other(_) => NoteAction::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_big_endian_delta() {
        let event = SongEvent::from_bytes(&[0x01, 0x80, 1, 60, 100, 0]);
        assert_eq!(event.delta_ticks, 384);
        assert_eq!(event.kind, EventKind::NoteOn);
        assert_eq!(event.note, 60);
        assert_eq!(event.velocity, 100);
    }

    #[test]
    fn encodes_reserved_byte_last() {
        let mut event = SongEvent::note_off(96, 64);
        event.reserved = 9;
        assert_eq!(event.to_bytes(), [0x00, 0x60, 0, 64, 0, 9]);
    }

    #[test]
    fn note_on_with_velocity_is_on() {
        assert_eq!(
            SongEvent::note_on(0, 60, 100).action(),
            NoteAction::On { note: 60, velocity: 100 }
        );
    }

    #[test]
    fn note_on_with_zero_velocity_is_off() {
        assert_eq!(SongEvent::note_on(0, 60, 0).action(), NoteAction::Off { note: 60 });
    }

    #[test]
    fn note_off_ignores_velocity() {
        let mut event = SongEvent::note_off(0, 72);
        event.velocity = 90;
        assert_eq!(event.action(), NoteAction::Off { note: 72 });
    }

    #[test]
    fn unknown_kind_is_ignored() {
        let event = SongEvent::from_bytes(&[0, 0, 7, 60, 100, 0]);
        assert_eq!(event.kind, EventKind::Other(7));
        assert_eq!(event.action(), NoteAction::Ignore);
    }
}
