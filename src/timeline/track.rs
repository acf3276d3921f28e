use crate::foundation::core::{Fps, FrameRGBA};
use crate::foundation::error::{ClipweaveError, ClipweaveResult};
use crate::layer::FrameRequest;
use crate::timeline::element::Element;

/// Stable identifier of the element inserted at `position` on track `track_id`.
///
/// The decimal digits are the track id followed by the position: track 2, position 5 is `25`;
/// track 12, position 3 is `123`; track 1, position 10 is `110`.
pub fn clip_index(track_id: u32, position: usize) -> u64 {
    let position = position as u64;
    let mut scale = 10u64;
    while scale <= position {
        scale = scale.saturating_mul(10);
    }
    u64::from(track_id)
        .saturating_mul(scale)
        .saturating_add(position)
}

/// Frame quantization of an element-local time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantized {
    /// Frames the element spans, `round(duration * fps)`, at least 1.
    pub num_frames: u64,
    /// Element-local frame, `floor(element_time * fps)`.
    pub frame: u64,
    /// `frame / num_frames`, always in `[0, 1)`.
    pub progress: f64,
    /// `duration * progress`.
    pub source_time: f64,
}

/// Snap `element_time` to the output frame grid of an element lasting `duration`.
pub fn quantize(element_time: f64, duration: f64, fps: Fps) -> Quantized {
    let rate = fps.as_f64();
    let num_frames = ((duration * rate).round() as u64).max(1);
    // `t = i / fps` can land a hair below the frame boundary.
    let raw = (element_time.max(0.0) * rate + 1e-9).floor() as u64;
    let frame = raw.min(num_frames - 1);
    let progress = frame as f64 / num_frames as f64;
    Quantized {
        num_frames,
        frame,
        progress,
        source_time: duration * progress,
    }
}

/// An independently scheduled row of elements.
#[derive(Debug)]
pub struct Track {
    id: u32,
    kind: String,
    elements: Vec<Element>,
    inserted: usize,
}

impl Track {
    pub fn new(id: u32, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            elements: Vec::new(),
            inserted: 0,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Informational type tag ("video", "overlay", ...).
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Elements sorted by start time; equal starts keep insertion order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Add an element, assigning its clip index from the insertion position.
    pub fn push(&mut self, mut element: Element) {
        element.set_clip_index(clip_index(self.id, self.inserted));
        self.inserted += 1;
        self.elements.push(element);
        self.elements
            .sort_by(|a, b| a.start().total_cmp(&b.start()));
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.push(element);
        self
    }

    /// Latest element end time, `0` when empty.
    pub fn end_time(&self) -> f64 {
        self.elements.iter().map(Element::end).fold(0.0, f64::max)
    }

    /// First element, in sorted order, whose window contains `t`.
    pub fn active_index(&self, t: f64) -> Option<usize> {
        self.elements.iter().position(|e| e.contains(t))
    }

    /// Render this track's contribution at timeline time `t`.
    ///
    /// `Ok(None)` when no element is active or the active one draws nothing. Source failures
    /// other than decoder errors are logged and treated as an empty frame.
    pub fn frame_at(
        &mut self,
        t: f64,
        width: u32,
        height: u32,
        fps: Fps,
    ) -> ClipweaveResult<Option<FrameRGBA>> {
        let Some(i) = self.active_index(t) else {
            return Ok(None);
        };
        let element = &mut self.elements[i];
        let element_time = t - element.start();
        let q = quantize(element_time, element.duration(), fps);
        let req = FrameRequest {
            progress: q.progress,
            source_time: q.source_time,
            element_duration: element.duration(),
            width,
            height,
            fps,
            clip_index: element.clip_index(),
        };

        match element.render(req, element_time) {
            Ok(frame) => Ok(frame),
            Err(e @ ClipweaveError::Decode(_)) => Err(e),
            Err(e) => {
                tracing::warn!(
                    track = self.id,
                    clip = element.clip_index(),
                    "element skipped: {e}"
                );
                Ok(None)
            }
        }
    }

    /// Close every opened source, reporting the first failure after trying all.
    pub fn close_all(&mut self) -> ClipweaveResult<()> {
        let mut first_err = None;
        for element in &mut self.elements {
            if let Err(e) = element.close() {
                tracing::warn!(
                    track = self.id,
                    clip = element.clip_index(),
                    "close failed: {e}"
                );
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/track.rs"]
mod tests;
