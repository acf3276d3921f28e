use std::path::{Path, PathBuf};

use crate::config::RenderConfig;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, ensure_parent_dir};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRGBA};
use crate::foundation::error::{ClipweaveError, ClipweaveResult};
use crate::timeline::Timeline;

/// Range render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames pushed to the sink.
    pub frames_total: u64,
}

/// Per-render scratch directory, removed on drop unless kept.
#[derive(Debug)]
pub struct TempDirGuard {
    path: Option<PathBuf>,
    keep: bool,
}

impl TempDirGuard {
    /// Create `<parent>/clipweave-<pid>-<nanos>`.
    pub fn create(parent: &Path, keep: bool) -> ClipweaveResult<Self> {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let path = parent.join(format!("clipweave-{}-{nanos}", std::process::id()));
        std::fs::create_dir_all(&path).map_err(|e| {
            ClipweaveError::validation(format!(
                "failed to create tmp dir '{}': {e}",
                path.display()
            ))
        })?;
        Ok(Self {
            path: Some(path),
            keep,
        })
    }

    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or(Path::new(""))
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        if self.keep {
            tracing::info!(path = %path.display(), "keeping tmp dir");
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&path) {
            tracing::warn!(path = %path.display(), "failed to remove tmp dir: {e}");
        }
    }
}

/// Drives one timeline through a sink, frame by frame.
#[derive(Debug)]
pub struct RenderSession {
    cfg: RenderConfig,
    timeline: Timeline,
}

impl RenderSession {
    /// Validate the configuration and timeline before anything is spawned.
    pub fn new(cfg: RenderConfig, timeline: Timeline) -> ClipweaveResult<Self> {
        cfg.validate()?;
        timeline.validate()?;
        Ok(Self { cfg, timeline })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.cfg
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// `ceil(duration * fps)`.
    pub fn frame_count(&self) -> u64 {
        self.cfg.fps.secs_to_frames_ceil(self.timeline.duration())
    }

    /// Composite a single frame at timeline time `t`.
    pub fn render_frame_at(&mut self, t: f64) -> ClipweaveResult<FrameRGBA> {
        self.timeline
            .composite_frame_at(t, self.cfg.width, self.cfg.height, 4, self.cfg.fps)
    }

    /// Stop every decoder and release layer sources.
    pub fn close(&mut self) -> ClipweaveResult<()> {
        self.timeline.close_all()
    }

    fn sink_config(&self) -> SinkConfig {
        SinkConfig {
            width: self.cfg.width,
            height: self.cfg.height,
            fps: self.cfg.fps,
            format: self.cfg.format,
            audio_path: self.cfg.audio_path.clone(),
        }
    }

    fn push_all(&mut self, sink: &mut dyn FrameSink) -> ClipweaveResult<RenderStats> {
        let total = self.frame_count();
        sink.begin(self.sink_config())?;
        for i in 0..total {
            let idx = FrameIndex(i);
            let t = self.cfg.fps.frame_to_secs(idx);
            let frame = self.render_frame_at(t)?;
            sink.push_frame(idx, &frame)?;
            if i > 0 && i % 100 == 0 {
                tracing::debug!(frame = i, total, "render progress");
            }
        }
        sink.end()?;
        Ok(RenderStats {
            frames_total: total,
        })
    }

    /// Render every frame into `sink`.
    ///
    /// Sources are closed afterwards whether or not rendering succeeded; a render error takes
    /// precedence over a close error.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn render_to(&mut self, sink: &mut dyn FrameSink) -> ClipweaveResult<RenderStats> {
        let rendered = self.push_all(sink);
        let closed = self.timeline.close_all();
        let stats = rendered?;
        closed?;
        Ok(stats)
    }

    /// Encode to `cfg.out_path` through `ffmpeg`.
    ///
    /// The encoder writes into a scratch directory and the result is moved into place only after
    /// `ffmpeg` exits cleanly, so a failed render never leaves a partial output file.
    #[tracing::instrument(skip_all, fields(out = %self.cfg.out_path.display()))]
    pub fn render_to_file(&mut self) -> ClipweaveResult<RenderStats> {
        let tmp = TempDirGuard::create(&self.cfg.tmp_dir, self.cfg.keep_tmp)?;
        let file_name = self
            .cfg
            .out_path
            .file_name()
            .ok_or_else(|| ClipweaveError::validation("output path has no file name"))?;
        let staged = tmp.path().join(file_name);

        tracing::info!(
            frames = self.frame_count(),
            width = self.cfg.width,
            height = self.cfg.height,
            fps = self.cfg.fps.as_f64(),
            "rendering"
        );
        let mut sink = FfmpegSink::new(FfmpegSinkOpts {
            out_path: staged.clone(),
            overwrite: true,
            bg_rgba: self.cfg.bg_rgba,
            fast: self.cfg.fast,
            verbose: self.cfg.verbose,
        });
        let stats = self.render_to(&mut sink)?;

        ensure_parent_dir(&self.cfg.out_path)?;
        move_file(&staged, &self.cfg.out_path)?;
        tracing::info!(frames = stats.frames_total, "render finished");
        Ok(stats)
    }
}

fn move_file(from: &Path, to: &Path) -> ClipweaveResult<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    // Cross-device moves fall back to copy.
    std::fs::copy(from, to).map_err(|e| {
        ClipweaveError::encode(format!(
            "failed to move output to '{}': {e}",
            to.display()
        ))
    })?;
    if let Err(e) = std::fs::remove_file(from) {
        tracing::debug!("staged output not removed: {e}");
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/session.rs"]
mod tests;
