//! Decoder side of the ffmpeg pipes: probing, fit filters, and raw frame reassembly.

/// Fixed-size frame reassembly from arbitrary byte chunks.
pub mod accumulator;
/// Decoder subprocess with cancellation.
pub mod ffmpeg;
/// Scale/crop filter chains per fit mode.
pub mod fit;
/// `ffprobe` metadata.
pub mod probe;
