//! WAV encoding for 16-bit stereo PCM.

use std::io::Write;

use sw_engine::Frame;

const NUM_CHANNELS: u16 = 2;
const BITS_PER_SAMPLE: u16 = 16;
const BLOCK_ALIGN: u16 = NUM_CHANNELS * (BITS_PER_SAMPLE / 8);
const HEADER_LEN: usize = 44;

pub fn write_wav(w: &mut impl Write, frames: &[Frame], sample_rate: u32) -> std::io::Result<()> {
    w.write_all(&frames_to_wav(frames, sample_rate))
}

pub fn frames_to_wav(frames: &[Frame], sample_rate: u32) -> Vec<u8> {
    let data_size = frames.len() as u32 * BLOCK_ALIGN as u32;
    let mut buf = Vec::with_capacity(HEADER_LEN + data_size as usize);

    push_riff_header(&mut buf, data_size);
    push_fmt_chunk(&mut buf, sample_rate);
    push_data_chunk(&mut buf, frames, data_size);
    buf
}

fn push_riff_header(buf: &mut Vec<u8>, data_size: u32) {
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_size).to_le_bytes());
    buf.extend_from_slice(b"WAVE");
}

fn push_fmt_chunk(buf: &mut Vec<u8>, sample_rate: u32) {
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    // PCM
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&NUM_CHANNELS.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&(sample_rate * BLOCK_ALIGN as u32).to_le_bytes());
    buf.extend_from_slice(&BLOCK_ALIGN.to_le_bytes());
    buf.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
}

fn push_data_chunk(buf: &mut Vec<u8>, frames: &[Frame], data_size: u32) {
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for frame in frames {
        buf.extend_from_slice(&frame.left.to_le_bytes());
        buf.extend_from_slice(&frame.right.to_le_bytes());
    }
}
