use std::path::PathBuf;

use crate::decode::ffmpeg::{DecodeRequest, DecoderProcess, loop_frame_index};
use crate::decode::fit::FitMode;
use crate::decode::probe::{VideoSourceInfo, probe_video};
use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{ClipweaveError, ClipweaveResult};
use crate::layer::{FrameRequest, FrameSource};

fn one() -> f64 {
    1.0
}

/// Video clip layer decoded through an `ffmpeg` subprocess.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoLayer {
    /// Source media file.
    pub path: PathBuf,
    /// Trim start in source seconds.
    #[serde(default)]
    pub cut_from: f64,
    /// Trim end in source seconds; the end of the file when absent.
    #[serde(default)]
    pub cut_to: Option<f64>,
    /// Playback speed factor.
    #[serde(default = "one")]
    pub speed: f64,
    #[serde(default, alias = "resizeMode")]
    pub fit: FitMode,
    /// Repeat the clip when it is shorter than its element.
    #[serde(default, rename = "loop")]
    pub looped: bool,
    /// Forward decoder diagnostics to stderr.
    #[serde(skip)]
    pub verbose: bool,
}

impl VideoLayer {
    /// Playback length after trim and speed, given the container duration.
    pub fn playback_duration(&self, container_duration: Option<f64>) -> Option<f64> {
        let end = self.cut_to.or(container_duration)?;
        let d = (end - self.cut_from) / self.speed;
        (d.is_finite() && d > 0.0).then_some(d)
    }
}

enum Playback {
    /// Frames pulled in order from a live decoder; the last one is held at EOF.
    Streaming {
        decoder: DecoderProcess,
        /// Index of `last` in the decoded stream.
        position: Option<u64>,
        last: Option<Vec<u8>>,
        exhausted: bool,
    },
    /// Whole clip buffered for loop indexing.
    Looped { frames: Vec<Vec<u8>> },
}

/// Runtime state for a [`VideoLayer`].
pub struct VideoSource {
    layer: VideoLayer,
    info: Option<VideoSourceInfo>,
    /// Consumed by the next start instead of spawning `ffmpeg`.
    pending: Option<DecoderProcess>,
    playback: Option<(u32, u32, Playback)>,
}

impl std::fmt::Debug for VideoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoSource")
            .field("path", &self.layer.path)
            .field("started", &self.playback.is_some())
            .finish()
    }
}

impl VideoSource {
    /// Probing and decoding start on the first frame request.
    pub fn new(layer: VideoLayer) -> Self {
        Self {
            layer,
            info: None,
            pending: None,
            playback: None,
        }
    }

    /// Use already probed metadata instead of running `ffprobe`.
    pub fn with_info(layer: VideoLayer, info: VideoSourceInfo) -> Self {
        Self {
            layer,
            info: Some(info),
            pending: None,
            playback: None,
        }
    }

    /// Play frames from an already running decoder.
    ///
    /// The decoder must emit frames at the size of the first request; a later size change
    /// falls back to spawning `ffmpeg`.
    pub(crate) fn with_decoder(
        layer: VideoLayer,
        info: VideoSourceInfo,
        decoder: DecoderProcess,
    ) -> Self {
        Self {
            layer,
            info: Some(info),
            pending: Some(decoder),
            playback: None,
        }
    }

    fn info(&mut self) -> ClipweaveResult<&VideoSourceInfo> {
        if self.info.is_none() {
            self.info = Some(probe_video(&self.layer.path)?);
        }
        self.info
            .as_ref()
            .ok_or_else(|| ClipweaveError::decode("video metadata unavailable (unexpected)"))
    }

    fn spawn_decoder(&mut self, req: &FrameRequest) -> ClipweaveResult<DecoderProcess> {
        if let Some(decoder) = self.pending.take() {
            return Ok(decoder);
        }
        let info = self.info()?.clone();
        let decode = DecodeRequest {
            source: self.layer.path.clone(),
            input_width: info.width,
            input_height: info.height,
            target_width: req.width,
            target_height: req.height,
            fit: self.layer.fit,
            cut_from: self.layer.cut_from,
            cut_to: self.layer.cut_to,
            speed: self.layer.speed,
            fps: req.fps,
            verbose: self.layer.verbose,
        };
        DecoderProcess::spawn(&decode)
    }

    fn start(&mut self, req: &FrameRequest) -> ClipweaveResult<Playback> {
        let mut decoder = self.spawn_decoder(req)?;
        let duration = self.info()?.duration_secs;
        let clip = self.layer.playback_duration(duration);
        let loops = self.layer.looped && clip.is_some_and(|d| d < req.element_duration);
        if !loops {
            return Ok(Playback::Streaming {
                decoder,
                position: None,
                last: None,
                exhausted: false,
            });
        }

        let frames = decoder.drain_all()?;
        tracing::debug!(
            path = %self.layer.path.display(),
            frames = frames.len(),
            "buffered looping clip"
        );
        Ok(Playback::Looped { frames })
    }

    fn stop_playback(&mut self) -> ClipweaveResult<()> {
        if let Some((_, _, Playback::Streaming { mut decoder, .. })) = self.playback.take() {
            decoder.close()?;
        }
        Ok(())
    }
}

impl FrameSource for VideoSource {
    fn read_next_frame(&mut self, req: FrameRequest) -> ClipweaveResult<Option<FrameRGBA>> {
        let restart = match &self.playback {
            Some((w, h, _)) => (*w, *h) != (req.width, req.height),
            None => true,
        };
        if restart {
            self.stop_playback()?;
            let playback = self.start(&req)?;
            self.playback = Some((req.width, req.height, playback));
        }
        let clip = self
            .info
            .as_ref()
            .and_then(|i| self.layer.playback_duration(i.duration_secs));
        let Some((w, h, playback)) = self.playback.as_mut() else {
            return Ok(None);
        };

        let bytes = match playback {
            Playback::Looped { frames } => {
                if frames.is_empty() {
                    return Ok(None);
                }
                let cycles = match clip {
                    Some(c) => req.element_duration / c,
                    None => 1.0,
                };
                let idx = loop_frame_index(req.progress * cycles, frames.len());
                frames[idx].clone()
            }
            Playback::Streaming {
                decoder,
                position,
                last,
                exhausted,
            } => {
                let frame_time = req.source_time * req.fps.as_f64() + 1e-9;
                let target = frame_time.floor().max(0.0) as u64;
                while !*exhausted && position.is_none_or(|p| p < target) {
                    match decoder.next_frame()? {
                        Some(frame) => {
                            *last = Some(frame);
                            *position = Some(position.map_or(0, |p| p + 1));
                        }
                        None => *exhausted = true,
                    }
                }
                match last {
                    Some(frame) => frame.clone(),
                    None => return Ok(None),
                }
            }
        };
        FrameRGBA::from_raw(*w, *h, bytes).map(Some)
    }

    fn close(&mut self) -> ClipweaveResult<()> {
        if let Some(mut decoder) = self.pending.take() {
            decoder.close()?;
        }
        self.stop_playback()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/video.rs"]
mod tests;
