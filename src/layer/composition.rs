use crate::foundation::core::FrameRGBA;
use crate::foundation::error::ClipweaveResult;
use crate::layer::{FrameRequest, FrameSource};
use crate::timeline::Timeline;

/// A nested timeline rendered as one layer, sampled at the element's source time.
#[derive(Debug)]
pub struct CompositionSource {
    timeline: Timeline,
}

impl CompositionSource {
    pub fn new(timeline: Timeline) -> Self {
        Self { timeline }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}

impl FrameSource for CompositionSource {
    fn read_next_frame(&mut self, req: FrameRequest) -> ClipweaveResult<Option<FrameRGBA>> {
        let frame = self
            .timeline
            .composite_frame_at(req.source_time, req.width, req.height, 4, req.fps)?;
        Ok(Some(frame))
    }

    fn close(&mut self) -> ClipweaveResult<()> {
        self.timeline.close_all()
    }
}
