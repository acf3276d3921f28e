#![forbid(unsafe_code)]
//! Multi-track timeline compositing.
//!
//! A [`Timeline`] holds numbered [`Track`]s of time-bounded [`Element`]s. Each output frame is
//! built by quantizing every active element to its own frame grid, asking its layer source for
//! pixels, applying the element's animated transform, and stacking the results in track order.
//! Frames stream into a [`FrameSink`]; [`FfmpegSink`] pipes raw RGBA into an `ffmpeg` encoder.

pub mod animation;
pub mod config;
pub mod decode;
pub mod encode;
pub mod foundation;
pub mod layer;
pub mod logging;
pub mod project;
pub mod render;
pub mod timeline;

pub use animation::anim::{Animation, FillMode, KeyframeAnimation, Property, Tween};
pub use animation::ease::Ease;
pub use animation::presets::{Preset, PresetTable, PresetTableBuilder};
pub use animation::transform::TransformSnapshot;
pub use config::{OutputFormat, RenderConfig};
pub use decode::accumulator::FrameByteAccumulator;
pub use decode::ffmpeg::{CancelToken, DecodeRequest, DecoderProcess};
pub use decode::fit::FitMode;
pub use encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use foundation::color::Rgba8;
pub use foundation::core::{Canvas, Fps, FrameIndex, FrameRGBA};
pub use foundation::error::{ClipweaveError, ClipweaveResult};
pub use layer::{FrameRequest, FrameSource, Layer, LayerSource};
pub use project::ProjectSpec;
pub use render::session::{RenderSession, RenderStats};
pub use timeline::{Element, Timeline, Track};
