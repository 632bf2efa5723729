//! Sample producer: pulls mixed samples from the synthesizer and pushes them
//! to an output until told to stop.
//!
//! The output's blocking `write` paces the loop, so the producer runs at the
//! device rate and never sleeps on its own.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use sw_engine::{Frame, Synthesizer};

use crate::traits::{AudioError, AudioOutput};

/// Name of the producer thread.
pub const PRODUCER_THREAD_NAME: &str = "synth-audio";

/// Render into `output` until `stop` is set.
///
/// Each mixed sample goes to both channels. Returns the number of frames
/// written.
pub fn run_producer(synth: &Synthesizer, output: &mut impl AudioOutput, stop: &AtomicBool) -> u64 {
    let mut written = 0u64;
    while !stop.load(Ordering::Relaxed) {
        output.write(Frame::mono(synth.render_sample()));
        written += 1;
    }
    written
}

/// A running producer thread.
pub struct ProducerHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<u64>>,
}

impl ProducerHandle {
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Signal the thread and wait for it. Returns the frames it wrote.
    pub fn stop(mut self) -> u64 {
        self.shutdown()
    }

    fn shutdown(&mut self) -> u64 {
        self.stop.store(true, Ordering::Relaxed);
        match self.thread.take().map(JoinHandle::join) {
            Some(Ok(frames)) => frames,
            Some(Err(_)) => {
                log::error!("{} thread panicked", PRODUCER_THREAD_NAME);
                0
            }
            None => 0,
        }
    }
}

impl Drop for ProducerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Start the producer on its own thread.
///
/// `open` runs on the new thread, since some backends can't move their
/// stream between threads. Its error comes back here, as does a failure to
/// create the thread at all; both are fatal for playback.
pub fn spawn_producer<O, F>(synth: Synthesizer, open: F) -> Result<ProducerHandle, AudioError>
where
    O: AudioOutput,
    F: FnOnce() -> Result<O, AudioError> + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let thread_stop = stop.clone();
    let (ready_tx, ready_rx) = mpsc::channel();

    let thread = thread::Builder::new()
        .name(PRODUCER_THREAD_NAME.into())
        .spawn(move || {
            let mut output = match open() {
                Ok(output) => {
                    let _ = ready_tx.send(Ok(()));
                    output
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return 0;
                }
            };

            if output.sample_rate() != synth.sample_rate() {
                log::warn!(
                    "output runs at {} Hz, synthesizer at {} Hz",
                    output.sample_rate(),
                    synth.sample_rate()
                );
            }

            let written = run_producer(&synth, &mut output, &thread_stop);
            if let Err(e) = output.stop() {
                log::error!("{}", e);
            }
            written
        })
        .map_err(|e| AudioError::Spawn(e.to_string()))?;

    let mut handle = ProducerHandle {
        stop,
        thread: Some(thread),
    };

    match ready_rx.recv() {
        Ok(Ok(())) => {
            log::info!("{} started", PRODUCER_THREAD_NAME);
            Ok(handle)
        }
        Ok(Err(e)) => {
            handle.shutdown();
            log::error!("{}", e);
            Err(e)
        }
        Err(_) => {
            handle.shutdown();
            Err(AudioError::Spawn(format!(
                "{} exited before opening its output",
                PRODUCER_THREAD_NAME
            )))
        }
    }
}
