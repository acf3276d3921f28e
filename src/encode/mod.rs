//! Encoding sinks.
//!
//! Sinks consume composited frames in timeline order and are driven by
//! [`crate::render::session::RenderSession`].

/// `ffmpeg`-based sink (MP4/GIF output via system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
