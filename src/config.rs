use std::path::{Path, PathBuf};

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ClipweaveError, ClipweaveResult};

/// Container/codec family of the rendered file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// H.264 in MP4 (or whatever container the extension implies).
    #[default]
    Mp4,
    /// Palette-optimized looping GIF.
    Gif,
}

impl OutputFormat {
    /// `Gif` for `*.gif` (case-insensitive), `Mp4` otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("gif") => Self::Gif,
            _ => Self::Mp4,
        }
    }
}

/// Immutable settings for one render.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub out_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// Parent of the per-render scratch directory.
    pub tmp_dir: PathBuf,
    pub format: OutputFormat,
    /// Favor encode speed over quality.
    pub fast: bool,
    /// Let `ffmpeg` print its own diagnostics.
    pub verbose: bool,
    /// Optional background audio track muxed into the output.
    pub audio_path: Option<PathBuf>,
    /// Keep the scratch directory after rendering.
    pub keep_tmp: bool,
    /// Background the composite is flattened over (straight RGBA8).
    pub bg_rgba: [u8; 4],
}

impl RenderConfig {
    /// Defaults for `out_path`: 640x640 at 25 fps, format from the extension.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        let out_path = out_path.into();
        Self {
            format: OutputFormat::from_path(&out_path),
            out_path,
            width: 640,
            height: 640,
            fps: Fps { num: 25, den: 1 },
            tmp_dir: std::env::temp_dir(),
            fast: false,
            verbose: false,
            audio_path: None,
            keep_tmp: false,
            bg_rgba: [0, 0, 0, 255],
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_fps(mut self, fps: Fps) -> Self {
        self.fps = fps;
        self
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Checks that must pass before any subprocess is spawned.
    pub fn validate(&self) -> ClipweaveResult<()> {
        if self.out_path.as_os_str().is_empty() {
            return Err(ClipweaveError::validation("output path is required"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ClipweaveError::validation(
                "output width/height must be non-zero",
            ));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(ClipweaveError::validation("fps must be non-zero"));
        }
        if self.format == OutputFormat::Mp4
            && (!self.width.is_multiple_of(2) || !self.height.is_multiple_of(2))
        {
            return Err(ClipweaveError::validation(
                "output width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if let Some(audio) = &self.audio_path
            && !audio.exists()
        {
            return Err(ClipweaveError::validation(format!(
                "audio file '{}' does not exist",
                audio.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
