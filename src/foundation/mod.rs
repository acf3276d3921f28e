//! Shared vocabulary: errors, frame timing, pixel buffers, colors, and small math helpers.

pub mod color;
pub mod core;
pub mod error;
pub mod math;
