//! The output seam between the sample producer and a device.

use std::fmt;

use sw_engine::Frame;

/// Why an output could not be opened or driven.
///
/// All of these are fatal for playback; nothing retries.
#[derive(Debug)]
pub enum AudioError {
    /// The host has no default output device
    NoDevice,
    /// The device refused to report a usable configuration
    DeviceInit(String),
    /// The stream could not be built for the requested format
    StreamCreate(String),
    /// The stream would not start or pause
    Playback(String),
    /// A playback thread could not be started
    Spawn(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::NoDevice => f.write_str("no audio output device"),
            AudioError::DeviceInit(msg) => write!(f, "audio device unusable: {}", msg),
            AudioError::StreamCreate(msg) => write!(f, "cannot build audio stream: {}", msg),
            AudioError::Playback(msg) => write!(f, "audio stream control failed: {}", msg),
            AudioError::Spawn(msg) => write!(f, "cannot start audio thread: {}", msg),
        }
    }
}

impl std::error::Error for AudioError {}

/// A sink for stereo frames at a fixed rate.
///
/// `write` takes one frame and returns once the output has room for it; that
/// wait is what paces the sample producer.
pub trait AudioOutput {
    fn sample_rate(&self) -> u32;

    fn write(&mut self, frame: Frame);

    fn start(&mut self) -> Result<(), AudioError>;

    fn stop(&mut self) -> Result<(), AudioError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_cause() {
        let e = AudioError::StreamCreate("format not supported".into());
        assert_eq!(e.to_string(), "cannot build audio stream: format not supported");
        assert_eq!(AudioError::NoDevice.to_string(), "no audio output device");
    }
}
