//! Easing curves, tweens and keyframes, transform snapshots, and named presets.

pub mod anim;
pub mod ease;
pub mod presets;
pub mod transform;
