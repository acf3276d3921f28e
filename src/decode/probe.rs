use std::path::{Path, PathBuf};

use crate::foundation::error::{ClipweaveError, ClipweaveResult};

/// Basic metadata about a source video file.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoSourceInfo {
    /// Path used for probing/decoding.
    pub source_path: PathBuf,
    /// Display width in pixels (rotation applied).
    pub width: u32,
    /// Display height in pixels (rotation applied).
    pub height: u32,
    /// Container duration in seconds, when known.
    pub duration_secs: Option<f64>,
    /// Average frame rate, when known.
    pub fps: Option<f64>,
    /// Rotation metadata in degrees.
    pub rotation: i32,
    /// Whether ffprobe detected at least one audio stream.
    pub has_audio: bool,
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    #[serde(default)]
    tags: Option<ProbeTags>,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
}

#[derive(serde::Deserialize)]
struct ProbeTags {
    rotate: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeSideData {
    rotation: Option<f64>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Probe source video metadata through `ffprobe`.
#[tracing::instrument(level = "debug")]
pub fn probe_video(source_path: &Path) -> ClipweaveResult<VideoSourceInfo> {
    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| ClipweaveError::decode(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ClipweaveError::decode(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    parse_probe_json(source_path, &out.stdout)
}

pub(crate) fn parse_probe_json(
    source_path: &Path,
    json: &[u8],
) -> ClipweaveResult<VideoSourceInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| ClipweaveError::decode(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            ClipweaveError::decode(format!(
                "no video stream found in '{}'",
                source_path.display()
            ))
        })?;
    let width = video_stream
        .width
        .ok_or_else(|| ClipweaveError::decode("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| ClipweaveError::decode("missing video height from ffprobe"))?;

    let rotation = video_stream
        .tags
        .as_ref()
        .and_then(|t| t.rotate.as_deref())
        .and_then(|r| r.trim().parse::<f64>().ok())
        .or_else(|| video_stream.side_data_list.iter().find_map(|d| d.rotation))
        .map(|r| r.round() as i32)
        .unwrap_or(0);
    let (width, height) = if rotation.rem_euclid(180) == 90 {
        (height, width)
    } else {
        (width, height)
    };

    let fps = [&video_stream.avg_frame_rate, &video_stream.r_frame_rate]
        .into_iter()
        .find_map(|r| r.as_deref().and_then(parse_rational));
    let duration_secs = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0);
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        duration_secs,
        fps,
        rotation,
        has_audio,
    })
}

fn parse_rational(s: &str) -> Option<f64> {
    let (num, den) = s.split_once('/').unwrap_or((s, "1"));
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    (den != 0.0 && num > 0.0).then(|| num / den)
}

#[cfg(test)]
#[path = "../../tests/unit/decode/probe.rs"]
mod tests;
