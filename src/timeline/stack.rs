use std::collections::BTreeMap;

use crate::foundation::core::{Fps, FrameRGBA};
use crate::foundation::error::{ClipweaveError, ClipweaveResult};
use crate::layer::{FrameRequest, FrameSource, Layer, LayerSource};
use crate::render::composite::over_in_place;
use crate::timeline::track::Track;

/// Global layer drawn above every track for the whole timeline.
#[derive(Debug)]
struct Overlay {
    layer: Option<Layer>,
    source: Option<LayerSource>,
}

impl Overlay {
    fn source_mut(&mut self) -> ClipweaveResult<&mut LayerSource> {
        if let Some(layer) = self.layer.take() {
            self.source = Some(layer.open()?);
        }
        self.source
            .as_mut()
            .ok_or_else(|| ClipweaveError::evaluation("overlay source unavailable"))
    }
}

/// Tracks keyed by id, composited bottom (lowest id) to top.
#[derive(Debug, Default)]
pub struct Timeline {
    tracks: BTreeMap<u32, Track>,
    overlays: Vec<Overlay>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a track; ids must be unique.
    pub fn add_track(&mut self, track: Track) -> ClipweaveResult<()> {
        let id = track.id();
        if self.tracks.contains_key(&id) {
            return Err(ClipweaveError::validation(format!(
                "duplicate track id {id}"
            )));
        }
        self.tracks.insert(id, track);
        Ok(())
    }

    pub fn with_track(mut self, track: Track) -> ClipweaveResult<Self> {
        self.add_track(track)?;
        Ok(self)
    }

    /// Add a layer rendered above all tracks, sampled at `t / duration`.
    pub fn add_overlay(&mut self, layer: Layer) {
        self.overlays.push(Overlay {
            layer: Some(layer),
            source: None,
        });
    }

    pub fn track(&self, id: u32) -> Option<&Track> {
        self.tracks.get(&id)
    }

    pub fn track_mut(&mut self, id: u32) -> Option<&mut Track> {
        self.tracks.get_mut(&id)
    }

    /// Tracks in ascending id order.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    /// Latest element end over all tracks.
    pub fn duration(&self) -> f64 {
        self.tracks
            .values()
            .map(Track::end_time)
            .fold(0.0, f64::max)
    }

    /// Reject timelines that would render nothing.
    pub fn validate(&self) -> ClipweaveResult<()> {
        if self.tracks.is_empty() {
            return Err(ClipweaveError::validation("timeline has no tracks"));
        }
        if self.tracks.values().all(Track::is_empty) {
            return Err(ClipweaveError::validation("timeline has no elements"));
        }
        Ok(())
    }

    /// Composite every track and overlay at timeline time `t`.
    ///
    /// Buffers of the wrong size are logged and skipped. With a single contributor its buffer
    /// is returned as is.
    pub fn composite_frame_at(
        &mut self,
        t: f64,
        width: u32,
        height: u32,
        channels: u32,
        fps: Fps,
    ) -> ClipweaveResult<FrameRGBA> {
        if channels != 4 {
            return Err(ClipweaveError::validation(format!(
                "only 4-channel RGBA compositing is supported, got {channels}"
            )));
        }
        let expected = width as usize * height as usize * channels as usize;
        let mut out: Option<FrameRGBA> = None;
        let mut layer_over = |frame: FrameRGBA, what: &str| -> ClipweaveResult<()> {
            if frame.data.len() != expected {
                tracing::warn!(
                    layer = what,
                    got = frame.data.len(),
                    expected,
                    "skipping frame buffer of unexpected size"
                );
                return Ok(());
            }
            match out.as_mut() {
                None => out = Some(frame),
                Some(acc) => over_in_place(&mut acc.data, &frame.data)?,
            }
            Ok(())
        };

        for track in self.tracks.values_mut() {
            if let Some(frame) = track.frame_at(t, width, height, fps)? {
                layer_over(frame, track.kind())?;
            }
        }

        let duration = self.duration();
        for overlay in &mut self.overlays {
            let progress = if duration > 0.0 {
                (t / duration).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let req = FrameRequest {
                progress,
                source_time: t,
                element_duration: duration,
                width,
                height,
                fps,
                clip_index: 0,
            };
            let frame = overlay.source_mut().and_then(|s| s.read_next_frame(req));
            match frame {
                Ok(Some(frame)) => layer_over(frame, "overlay")?,
                Ok(None) => {}
                Err(e @ ClipweaveError::Decode(_)) => return Err(e),
                Err(e) => tracing::warn!("overlay skipped: {e}"),
            }
        }

        Ok(out.unwrap_or_else(|| FrameRGBA::transparent(width, height)))
    }

    /// Close every opened source on every track and overlay.
    pub fn close_all(&mut self) -> ClipweaveResult<()> {
        let mut first_err = None;
        for track in self.tracks.values_mut() {
            if let Err(e) = track.close_all() {
                first_err.get_or_insert(e);
            }
        }
        for overlay in &mut self.overlays {
            if let Some(s) = overlay.source.as_mut()
                && let Err(e) = s.close()
            {
                tracing::warn!("overlay close failed: {e}");
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/stack.rs"]
mod tests;
