use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::config::OutputFormat;
use crate::decode::ffmpeg::log_level;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRGBA};
use crate::foundation::error::{ClipweaveError, ClipweaveResult};
use crate::render::composite::flatten_over_bg;

/// `ffmpeg` filter graph producing an optimized palette GIF.
pub const GIF_PALETTE_FILTER: &str = "split[s0][s1];[s0]palettegen[p];[s1][p]paletteuse";

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// `ultrafast` preset without a CRF target.
    pub fast: bool,
    /// Let ffmpeg log at `info`.
    pub verbose: bool,
}

impl FfmpegSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
            fast: false,
            verbose: false,
        }
    }
}

/// Full encoder argument list (without the program name) for `cfg`.
pub fn encoder_args(cfg: &SinkConfig, opts: &FfmpegSinkOpts) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    let mut push = |items: &[&str]| args.extend(items.iter().map(OsString::from));

    push(&[if opts.overwrite { "-y" } else { "-n" }]);
    push(&["-hide_banner", "-loglevel", log_level(opts.verbose)]);
    push(&["-f", "rawvideo", "-vcodec", "rawvideo", "-pix_fmt", "rgba"]);
    push(&["-s", &format!("{}x{}", cfg.width, cfg.height)]);
    // Input rate goes before `-i` for rawvideo.
    push(&["-r", &cfg.fps.to_ffmpeg_rate(), "-i", "-"]);

    let audio = match cfg.format {
        OutputFormat::Mp4 => cfg.audio_path.as_deref(),
        OutputFormat::Gif => None,
    };
    if let Some(audio) = audio {
        push(&["-i"]);
        args.push(audio.as_os_str().to_owned());
    }

    let mut push = |items: &[&str]| args.extend(items.iter().map(OsString::from));
    match cfg.format {
        OutputFormat::Gif => {
            push(&["-vf", GIF_PALETTE_FILTER, "-loop", "0"]);
        }
        OutputFormat::Mp4 => {
            push(&["-c:v", "libx264", "-profile:v", "high"]);
            if opts.fast {
                push(&["-preset", "ultrafast"]);
            } else {
                push(&["-preset", "medium", "-crf", "18"]);
            }
            push(&["-pix_fmt", "yuv420p", "-movflags", "+faststart"]);
            if audio.is_some() {
                push(&["-map", "0:v:0", "-map", "1:a:0"]);
                push(&["-c:a", "aac", "-shortest"]);
            } else {
                push(&["-an"]);
            }
        }
    }
    args.push(opts.out_path.as_os_str().to_owned());
    args
}

/// Sink that spawns the system `ffmpeg` and streams flattened raw frames to its stdin.
///
/// Each `push_frame` blocks until the whole frame is written, so at most one frame is in flight.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    /// Run `cmd` as the encoder for frames of `cfg`, streaming to its stdin.
    fn spawn_encoder(&mut self, mut cmd: Command, cfg: SinkConfig) -> ClipweaveResult<()> {
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            ClipweaveError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ClipweaveError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ClipweaveError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.scratch = vec![0u8; cfg.width as usize * cfg.height as usize * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    /// Kill a running encoder without finalizing the output.
    pub fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                tracing::trace!("encoder kill: {e}");
            }
            if let Err(e) = child.wait() {
                tracing::warn!("failed to reap aborted encoder: {e}");
            }
        }
        if let Some(h) = self.stderr_drain.take()
            && h.join().is_err()
        {
            tracing::debug!("encoder stderr drain panicked");
        }
        self.cfg = None;
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            tracing::debug!("encoder dropped before end(); aborting");
            self.abort();
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ClipweaveResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(ClipweaveError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ClipweaveError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if cfg.format == OutputFormat::Mp4
            && (!cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2))
        {
            return Err(ClipweaveError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if cfg.format == OutputFormat::Gif && cfg.audio_path.is_some() {
            tracing::warn!("gif output has no audio stream; ignoring audio input");
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(ClipweaveError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        let args = encoder_args(&cfg, &self.opts);
        tracing::debug!(?args, "spawning ffmpeg encoder");
        let mut cmd = Command::new("ffmpeg");
        cmd.args(&args);
        self.spawn_encoder(cmd, cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ClipweaveResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ClipweaveError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ClipweaveError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ClipweaveError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        flatten_over_bg(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ClipweaveError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            ClipweaveError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> ClipweaveResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ClipweaveError::encode("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            ClipweaveError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ClipweaveError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ClipweaveError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ClipweaveError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> ClipweaveResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
