use std::{
    io::Read,
    path::PathBuf,
    process::{Child, Command, Stdio},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{Receiver, SyncSender, sync_channel},
    },
    thread::JoinHandle,
};

use crate::{
    decode::accumulator::FrameByteAccumulator,
    decode::fit::{FitMode, ffmpeg_filter},
    foundation::core::Fps,
    foundation::error::{ClipweaveError, ClipweaveResult},
};

/// Frames buffered between the reader thread and the consumer.
const FRAME_QUEUE_DEPTH: usize = 2;
const READ_CHUNK_BYTES: usize = 64 * 1024;

/// Shared abort flag for one decoder subprocess.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, not-canceled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything needed to decode one source into target-sized RGBA frames.
#[derive(Clone, Debug)]
pub struct DecodeRequest {
    /// Source media path.
    pub source: PathBuf,
    /// Source display width.
    pub input_width: u32,
    /// Source display height.
    pub input_height: u32,
    /// Output frame width.
    pub target_width: u32,
    /// Output frame height.
    pub target_height: u32,
    /// Fit mode.
    pub fit: FitMode,
    /// Trim start in source seconds.
    pub cut_from: f64,
    /// Trim end in source seconds.
    pub cut_to: Option<f64>,
    /// Playback speed factor (`> 0`).
    pub speed: f64,
    /// Output frame rate.
    pub fps: Fps,
    /// Pass `-loglevel info` instead of `error`.
    pub verbose: bool,
}

impl DecodeRequest {
    /// Byte size of one emitted frame.
    pub fn frame_size(&self) -> usize {
        self.target_width as usize * self.target_height as usize * 4
    }

    /// Full ffmpeg argument list (without the program name).
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec!["-nostdin".into(), "-hide_banner".into()];
        args.extend(["-loglevel".into(), log_level(self.verbose).into()]);
        if self.cut_from > 0.0 {
            args.extend(["-ss".into(), format!("{:.6}", self.cut_from)]);
        }
        if let Some(cut_to) = self.cut_to {
            args.extend(["-to".into(), format!("{cut_to:.6}")]);
        }
        args.push("-i".into());
        args.push(self.source.to_string_lossy().into_owned());

        let mut vf = Vec::new();
        if (self.speed - 1.0).abs() > f64::EPSILON {
            vf.push(format!("setpts={:.6}*PTS", 1.0 / self.speed));
        }
        vf.push(format!("fps={}", self.fps.to_ffmpeg_rate()));
        vf.push(ffmpeg_filter(
            self.input_width,
            self.input_height,
            self.target_width,
            self.target_height,
            self.fit,
        ));
        args.extend(["-vf".into(), vf.join(",")]);
        args.extend(["-an", "-f", "rawvideo", "-vcodec", "rawvideo"].map(String::from));
        args.extend(["-pix_fmt", "rgba", "-"].map(String::from));
        args
    }

    fn validate(&self) -> ClipweaveResult<()> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(ClipweaveError::validation(
                "decoder target width/height must be non-zero",
            ));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(ClipweaveError::validation(format!(
                "video speed factor must be > 0, got {}",
                self.speed
            )));
        }
        if let Some(cut_to) = self.cut_to
            && cut_to <= self.cut_from
        {
            return Err(ClipweaveError::validation(format!(
                "cutTo ({cut_to}) must be greater than cutFrom ({})",
                self.cut_from
            )));
        }
        Ok(())
    }
}

pub(crate) fn log_level(verbose: bool) -> &'static str {
    if verbose { "info" } else { "error" }
}

/// A running decoder subprocess producing fixed-size raw frames.
///
/// A reader thread pushes stdout through a [`FrameByteAccumulator`] and hands complete frames
/// over a bounded channel, so the subprocess never runs far ahead of the consumer.
pub struct DecoderProcess {
    label: String,
    child: Option<Child>,
    frames: Option<Receiver<Vec<u8>>>,
    reader: Option<JoinHandle<std::io::Result<ReaderStats>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    cancel: CancelToken,
    frame_size: usize,
    ended: bool,
}

#[derive(Debug, Default)]
struct ReaderStats {
    bytes: u64,
    trailing: usize,
}

impl std::fmt::Debug for DecoderProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderProcess")
            .field("label", &self.label)
            .field("frame_size", &self.frame_size)
            .field("ended", &self.ended)
            .field("canceled", &self.cancel.is_canceled())
            .finish()
    }
}

impl DecoderProcess {
    /// Spawn `ffmpeg` for `req`.
    pub fn spawn(req: &DecodeRequest) -> ClipweaveResult<Self> {
        req.validate()?;
        let args = req.args();
        tracing::debug!(source = %req.source.display(), ?args, "spawning ffmpeg decoder");
        let mut cmd = Command::new("ffmpeg");
        cmd.args(&args);
        Self::spawn_command(cmd, req.frame_size(), req.source.display().to_string())
    }

    /// Spawn an arbitrary command whose stdout carries `frame_size`-byte frames.
    pub fn spawn_command(
        mut cmd: Command,
        frame_size: usize,
        label: impl Into<String>,
    ) -> ClipweaveResult<Self> {
        let label = label.into();
        if frame_size == 0 {
            return Err(ClipweaveError::validation(
                "decoder frame size must be non-zero",
            ));
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = cmd.spawn().map_err(|e| {
            ClipweaveError::decode(format!(
                "failed to spawn decoder for '{label}' (is ffmpeg installed and on PATH?): {e}"
            ))
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ClipweaveError::decode("failed to open decoder stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ClipweaveError::decode("failed to open decoder stderr (unexpected)"))?;

        let (tx, rx) = sync_channel(FRAME_QUEUE_DEPTH);
        let reader = std::thread::spawn(move || read_frames(stdout, frame_size, tx));
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        Ok(Self {
            label,
            child: Some(child),
            frames: Some(rx),
            reader: Some(reader),
            stderr_drain: Some(stderr_drain),
            cancel: CancelToken::new(),
            frame_size,
            ended: false,
        })
    }

    /// Byte size of each frame.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Token that aborts this decoder when canceled.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Whether the decoder was stopped deliberately.
    pub fn was_canceled(&self) -> bool {
        self.cancel.is_canceled()
    }

    /// Block for the next frame; `Ok(None)` at end of stream or after cancellation.
    pub fn next_frame(&mut self) -> ClipweaveResult<Option<Vec<u8>>> {
        if self.ended || self.cancel.is_canceled() {
            return Ok(None);
        }
        let Some(rx) = self.frames.as_ref() else {
            return Ok(None);
        };
        match rx.recv() {
            Ok(frame) => Ok(Some(frame)),
            Err(_) => {
                self.ended = true;
                self.finish()?;
                Ok(None)
            }
        }
    }

    /// Drain the remaining stream into memory.
    pub fn drain_all(&mut self) -> ClipweaveResult<Vec<Vec<u8>>> {
        let mut out = Vec::new();
        while let Some(frame) = self.next_frame()? {
            out.push(frame);
        }
        Ok(out)
    }

    /// Abort the subprocess and release every handle.
    ///
    /// Whatever exit status the killed process reports, a closed decoder is never a failure.
    pub fn close(&mut self) -> ClipweaveResult<()> {
        if self.child.is_none() {
            return Ok(());
        }
        self.cancel.cancel();
        if let Some(child) = self.child.as_mut()
            && let Err(e) = child.kill()
        {
            // Already exited.
            tracing::trace!(decoder = %self.label, "kill: {e}");
        }
        self.finish()
    }

    fn finish(&mut self) -> ClipweaveResult<()> {
        // Unblocks the reader if it is parked on a full queue.
        drop(self.frames.take());
        let reader = self.reader.take().map(|h| h.join());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child.wait().map_err(|e| {
            ClipweaveError::decode(format!("failed to wait for decoder '{}': {e}", self.label))
        })?;
        let stderr = match self.stderr_drain.take() {
            Some(h) => h.join().ok().and_then(Result::ok).unwrap_or_default(),
            None => Vec::new(),
        };

        if self.cancel.is_canceled() {
            tracing::debug!(decoder = %self.label, %status, "decoder canceled");
            return Ok(());
        }

        match reader {
            Some(Ok(Ok(stats))) if stats.trailing > 0 => {
                tracing::warn!(
                    decoder = %self.label,
                    bytes = stats.bytes,
                    trailing = stats.trailing,
                    "decoder stream ended mid-frame; partial frame dropped"
                );
            }
            Some(Ok(Err(e))) => {
                return Err(ClipweaveError::decode(format!(
                    "failed reading decoder output for '{}': {e}",
                    self.label
                )));
            }
            Some(Err(_)) => {
                return Err(ClipweaveError::decode("decoder reader thread panicked"));
            }
            _ => {}
        }

        if !status.success() {
            return Err(ClipweaveError::decode(format!(
                "decoder for '{}' exited with status {status}: {}",
                self.label,
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        Ok(())
    }
}

impl Drop for DecoderProcess {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(decoder = %self.label, "decoder cleanup failed: {e}");
        }
    }
}

fn read_frames(
    mut stdout: impl Read,
    frame_size: usize,
    tx: SyncSender<Vec<u8>>,
) -> std::io::Result<ReaderStats> {
    let mut acc = FrameByteAccumulator::new(frame_size);
    let mut chunk = vec![0u8; READ_CHUNK_BYTES];
    let mut stats = ReaderStats::default();
    let mut consumer_gone = false;

    loop {
        let n = match stdout.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        stats.bytes += n as u64;
        acc.push(&chunk[..n], |frame| {
            if !consumer_gone && tx.send(frame).is_err() {
                consumer_gone = true;
            }
        });
        if consumer_gone {
            break;
        }
    }
    stats.trailing = acc.pending();
    Ok(stats)
}

/// Frame of a fully buffered (looping) source for `progress`.
///
/// `progress` may exceed 1 when the source loops several times; the result is always in
/// `[0, count)`.
pub fn loop_frame_index(progress: f64, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let idx = (progress.max(0.0) * count as f64).floor() as usize;
    idx % count
}

#[cfg(test)]
#[path = "../../tests/unit/decode/ffmpeg.rs"]
mod tests;
