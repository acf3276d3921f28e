//! Frame sources: the uniform "pixels at a progress" contract and the built-in layer kinds.
//!
//! A [`Layer`] is an inert descriptor; [`Layer::open`] turns it into a [`LayerSource`] the
//! first time its element becomes active.

pub mod composition;
pub mod fill;
pub mod image;
pub mod shape;
pub mod video;

use crate::foundation::core::{Fps, FrameRGBA};
use crate::foundation::error::ClipweaveResult;
use crate::timeline::Timeline;

pub use self::composition::CompositionSource;
pub use self::fill::{FillLayer, FillSource, GradientDirection, GradientSource, LinearGradientLayer};
pub use self::image::{ImageLayer, ImageSource};
pub use self::shape::{ShapeKind, ShapeLayer, ShapeSource};
pub use self::video::{VideoLayer, VideoSource};

/// Everything a source needs to produce one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameRequest {
    /// Quantized element progress in `[0, 1)`.
    pub progress: f64,
    /// Seconds into the element, `element_duration * progress`.
    pub source_time: f64,
    /// Full element duration in seconds.
    pub element_duration: f64,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: Fps,
    /// Stable per-element identifier (see [`crate::timeline::clip_index`]).
    pub clip_index: u64,
}

/// Runtime object producing straight-alpha pixels for one element.
pub trait FrameSource: Send {
    /// Produce the frame for `req`; `Ok(None)` means "nothing to draw".
    fn read_next_frame(&mut self, req: FrameRequest) -> ClipweaveResult<Option<FrameRGBA>>;

    /// Release subprocesses and buffers. Called once, after the last frame.
    fn close(&mut self) -> ClipweaveResult<()> {
        Ok(())
    }
}

/// Layer descriptor attached to an element.
pub enum Layer {
    /// Solid color.
    Fill(FillLayer),
    /// Two-stop linear gradient.
    LinearGradient(LinearGradientLayer),
    /// Still image from disk.
    Image(ImageLayer),
    /// Rasterized rectangle or ellipse.
    Shape(ShapeLayer),
    /// Decoded video clip.
    Video(VideoLayer),
    /// Nested timeline sampled at the element's source time.
    Composition(Box<Timeline>),
    /// Caller-provided source.
    Custom(Box<dyn FrameSource>),
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}

impl Layer {
    /// Short kind name, as used in project JSON.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fill(_) => "fill",
            Self::LinearGradient(_) => "linear-gradient",
            Self::Image(_) => "image",
            Self::Shape(_) => "shape",
            Self::Video(_) => "video",
            Self::Composition(_) => "composition",
            Self::Custom(_) => "custom",
        }
    }

    /// Instantiate the runtime source for this descriptor.
    pub fn open(self) -> ClipweaveResult<LayerSource> {
        Ok(match self {
            Self::Fill(l) => LayerSource::Fill(FillSource::new(l)),
            Self::LinearGradient(l) => LayerSource::LinearGradient(GradientSource::new(l)),
            Self::Image(l) => LayerSource::Image(Box::new(ImageSource::open(l)?)),
            Self::Shape(l) => LayerSource::Shape(ShapeSource::new(l)),
            Self::Video(l) => LayerSource::Video(Box::new(VideoSource::new(l))),
            Self::Composition(t) => LayerSource::Composition(CompositionSource::new(*t)),
            Self::Custom(s) => LayerSource::Custom(s),
        })
    }
}

/// Opened source for each layer kind.
pub enum LayerSource {
    Fill(FillSource),
    LinearGradient(GradientSource),
    Image(Box<ImageSource>),
    Shape(ShapeSource),
    Video(Box<VideoSource>),
    Composition(CompositionSource),
    Custom(Box<dyn FrameSource>),
}

impl std::fmt::Debug for LayerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fill(s) => std::fmt::Debug::fmt(s, f),
            Self::LinearGradient(s) => std::fmt::Debug::fmt(s, f),
            Self::Image(s) => std::fmt::Debug::fmt(s, f),
            Self::Shape(s) => std::fmt::Debug::fmt(s, f),
            Self::Video(s) => std::fmt::Debug::fmt(s, f),
            Self::Composition(s) => std::fmt::Debug::fmt(s, f),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}

impl FrameSource for LayerSource {
    fn read_next_frame(&mut self, req: FrameRequest) -> ClipweaveResult<Option<FrameRGBA>> {
        match self {
            Self::Fill(s) => s.read_next_frame(req),
            Self::LinearGradient(s) => s.read_next_frame(req),
            Self::Image(s) => s.read_next_frame(req),
            Self::Shape(s) => s.read_next_frame(req),
            Self::Video(s) => s.read_next_frame(req),
            Self::Composition(s) => s.read_next_frame(req),
            Self::Custom(s) => s.read_next_frame(req),
        }
    }

    fn close(&mut self) -> ClipweaveResult<()> {
        match self {
            Self::Fill(s) => s.close(),
            Self::LinearGradient(s) => s.close(),
            Self::Image(s) => s.close(),
            Self::Shape(s) => s.close(),
            Self::Video(s) => s.close(),
            Self::Composition(s) => s.close(),
            Self::Custom(s) => s.close(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/mod.rs"]
mod tests;
