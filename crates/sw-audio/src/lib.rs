//! Audio output backends and the sample producer for squarewave.

mod cpal_backend;
mod producer;
mod traits;

pub use cpal_backend::CpalOutput;
pub use producer::{run_producer, spawn_producer, ProducerHandle, PRODUCER_THREAD_NAME};
pub use traits::{AudioError, AudioOutput};
