//! Pixel operations and the frame-by-frame render driver.

/// Straight-alpha compositing and alpha flattening.
pub mod composite;
/// Render loop, sink driving, and scratch-directory lifetime.
pub mod session;
/// Transform snapshot application through `vello_cpu`.
pub mod transform;
