use crate::animation::anim::Animation;
use crate::animation::transform::TransformSnapshot;
use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{ClipweaveError, ClipweaveResult};
use crate::layer::{FrameRequest, FrameSource, Layer, LayerSource};
use crate::render::transform::apply_snapshot;

/// A timed placement of one layer on a track.
///
/// The active window is half-open: `[start, start + duration)`.
#[derive(Debug)]
pub struct Element {
    start: f64,
    duration: f64,
    layer: Option<Layer>,
    source: Option<LayerSource>,
    clip_index: u64,
    animations: Vec<Animation>,
    base: TransformSnapshot,
    /// Set when the source failed to open; the element then draws nothing.
    broken: bool,
}

impl Element {
    /// Place `layer` at `start` for `duration` seconds.
    pub fn new(start: f64, duration: f64, layer: Layer) -> ClipweaveResult<Self> {
        if !start.is_finite() || start < 0.0 {
            return Err(ClipweaveError::validation(format!(
                "element start must be finite and >= 0, got {start}"
            )));
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ClipweaveError::validation(format!(
                "element duration must be finite and > 0, got {duration}"
            )));
        }
        Ok(Self {
            start,
            duration,
            layer: Some(layer),
            source: None,
            clip_index: 0,
            animations: Vec::new(),
            base: TransformSnapshot::default(),
            broken: false,
        })
    }

    /// Attach animations, evaluated in element-local time.
    pub fn with_animations(mut self, animations: Vec<Animation>) -> ClipweaveResult<Self> {
        for a in &animations {
            a.validate()?;
        }
        self.animations = animations;
        Ok(self)
    }

    /// Static transform the animations start from.
    pub fn with_transform(mut self, base: TransformSnapshot) -> Self {
        self.base = base;
        self
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// `start <= t < end`.
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t < self.end()
    }

    pub fn clip_index(&self) -> u64 {
        self.clip_index
    }

    pub(crate) fn set_clip_index(&mut self, clip_index: u64) {
        self.clip_index = clip_index;
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    /// Whether the runtime source has been created.
    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    /// Resolved transform at element-local time `element_time`.
    pub fn transform_at(&self, element_time: f64) -> TransformSnapshot {
        TransformSnapshot::evaluate(&self.base, &self.animations, element_time)
    }

    fn source_mut(&mut self) -> ClipweaveResult<&mut LayerSource> {
        if self.source.is_none() {
            let layer = self
                .layer
                .take()
                .ok_or_else(|| ClipweaveError::evaluation("element source already released"))?;
            tracing::debug!(
                clip = self.clip_index,
                kind = layer.kind(),
                "opening layer source"
            );
            match layer.open() {
                Ok(source) => self.source = Some(source),
                Err(e) => {
                    self.broken = true;
                    return Err(e);
                }
            }
        }
        self.source
            .as_mut()
            .ok_or_else(|| ClipweaveError::evaluation("element source missing (unexpected)"))
    }

    /// Pull the source frame for `req` and apply the transform at `element_time`.
    pub fn render(
        &mut self,
        req: FrameRequest,
        element_time: f64,
    ) -> ClipweaveResult<Option<FrameRGBA>> {
        let snapshot = self.transform_at(element_time);
        if self.broken || snapshot.clamped_opacity() <= 0.0 {
            return Ok(None);
        }
        let Some(frame) = self.source_mut()?.read_next_frame(req)? else {
            tracing::warn!(
                clip = self.clip_index,
                progress = req.progress,
                "active element produced no frame"
            );
            return Ok(None);
        };
        apply_snapshot(frame, &snapshot).map(Some)
    }

    /// Close the source if it was ever opened.
    pub fn close(&mut self) -> ClipweaveResult<()> {
        match self.source.as_mut() {
            Some(s) => s.close(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/element.rs"]
mod tests;
