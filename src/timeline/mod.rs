//! Track/element scheduling and per-frame compositing.

pub mod element;
pub mod stack;
pub mod track;

pub use element::Element;
pub use stack::Timeline;
pub use track::{Quantized, Track, clip_index, quantize};
