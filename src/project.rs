//! JSON edit description and its translation into a [`RenderConfig`] plus [`Timeline`].

use std::path::{Path, PathBuf};

use crate::animation::anim::Animation;
use crate::animation::presets::PresetTable;
use crate::animation::transform::TransformSnapshot;
use crate::config::{OutputFormat, RenderConfig};
use crate::decode::probe::probe_video;
use crate::foundation::color::Rgba8;
use crate::foundation::core::Fps;
use crate::foundation::error::{ClipweaveError, ClipweaveResult};
use crate::layer::{FillLayer, ImageLayer, Layer, LinearGradientLayer, ShapeLayer, VideoLayer};
use crate::timeline::{Element, Timeline, Track};

fn default_size() -> u32 {
    640
}

fn default_fps() -> f64 {
    25.0
}

fn default_track_kind() -> String {
    "video".to_owned()
}

/// Fallbacks for values an element leaves out.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Defaults {
    /// Element duration in seconds.
    pub duration: f64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self { duration: 4.0 }
    }
}

/// Layer descriptor as written in JSON, tagged by `type`.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LayerSpec {
    Fill(FillLayer),
    LinearGradient(LinearGradientLayer),
    Image(ImageLayer),
    Shape(ShapeLayer),
    Video(VideoLayer),
    Composition(CompositionSpec),
    /// Any unrecognized `type`; the element carrying it is skipped.
    #[serde(other)]
    Unknown,
}

/// Nested timeline description.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionSpec {
    #[serde(default)]
    pub tracks: Vec<TrackSpec>,
    #[serde(default)]
    pub overlays: Vec<LayerSpec>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSpec {
    pub id: u32,
    #[serde(default = "default_track_kind", rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSpec {
    /// Start in seconds; defaults to the end of the previous element on the track.
    #[serde(default)]
    pub start: Option<f64>,
    /// Duration in seconds; defaults to the clip length for videos, else `defaults.duration`.
    #[serde(default)]
    pub duration: Option<f64>,
    pub layer: LayerSpec,
    #[serde(default)]
    pub animations: Vec<Animation>,
    /// Names looked up in the [`PresetTable`]; applied before `animations`.
    #[serde(default)]
    pub presets: Vec<String>,
    #[serde(default)]
    pub transform: TransformSnapshot,
}

/// Top-level edit description.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpec {
    #[serde(default)]
    pub out_path: Option<PathBuf>,
    #[serde(default = "default_size")]
    pub width: u32,
    #[serde(default = "default_size")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: f64,
    /// Explicit output format; inferred from `out_path` when absent.
    #[serde(default)]
    pub format: Option<OutputFormat>,
    #[serde(default)]
    pub fast: bool,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default, alias = "audioFilePath")]
    pub audio_path: Option<PathBuf>,
    #[serde(default)]
    pub tmp_dir: Option<PathBuf>,
    #[serde(default)]
    pub keep_tmp: bool,
    #[serde(default)]
    pub background: Option<Rgba8>,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub tracks: Vec<TrackSpec>,
    #[serde(default)]
    pub overlays: Vec<LayerSpec>,

    /// Directory relative media paths resolve against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl ProjectSpec {
    pub fn from_json_str(json: &str) -> ClipweaveResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a project file; relative paths inside it resolve against its directory.
    pub fn load(path: &Path) -> ClipweaveResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ClipweaveError::validation(format!(
                "failed to read project '{}': {e}",
                path.display()
            ))
        })?;
        let mut spec = Self::from_json_str(&text)?;
        spec.base_dir = path.parent().map(Path::to_path_buf);
        Ok(spec)
    }

    /// Output settings alone.
    pub fn render_config(&self) -> ClipweaveResult<RenderConfig> {
        let out_path = self
            .out_path
            .as_ref()
            .map(|p| self.resolve(p))
            .ok_or_else(|| ClipweaveError::validation("output path is required"))?;
        let mut cfg = RenderConfig::new(out_path)
            .with_size(self.width, self.height)
            .with_fps(Fps::from_f64(self.fps)?);
        if let Some(format) = self.format {
            cfg.format = format;
        }
        cfg.fast = self.fast;
        cfg.verbose = self.verbose;
        cfg.audio_path = self.audio_path.as_ref().map(|p| self.resolve(p));
        if let Some(tmp) = &self.tmp_dir {
            cfg.tmp_dir = self.resolve(tmp);
        }
        cfg.keep_tmp = self.keep_tmp;
        if let Some(bg) = self.background {
            cfg.bg_rgba = bg.to_array();
        }
        Ok(cfg)
    }

    /// Validate and construct the render inputs.
    pub fn build(&self, presets: &PresetTable) -> ClipweaveResult<(RenderConfig, Timeline)> {
        let cfg = self.render_config()?;
        cfg.validate()?;
        let timeline = self.build_timeline(&self.tracks, &self.overlays, presets)?;
        timeline.validate()?;
        Ok((cfg, timeline))
    }

    fn resolve(&self, p: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if p.is_relative() => base.join(p),
            _ => p.to_path_buf(),
        }
    }

    fn build_timeline(
        &self,
        tracks: &[TrackSpec],
        overlays: &[LayerSpec],
        presets: &PresetTable,
    ) -> ClipweaveResult<Timeline> {
        let mut timeline = Timeline::new();
        for spec in tracks {
            let mut track = Track::new(spec.id, spec.kind.clone());
            let mut cursor = 0.0;
            for (i, el) in spec.elements.iter().enumerate() {
                let start = el.start.unwrap_or(cursor);
                let duration = match el.duration {
                    Some(d) => d,
                    None => self.default_duration(&el.layer)?,
                };
                cursor = start + duration;

                let Some(layer) = self.build_layer(&el.layer, presets)? else {
                    tracing::warn!(
                        track = spec.id,
                        element = i,
                        "unknown layer type; element skipped"
                    );
                    continue;
                };
                let mut animations = Vec::new();
                for name in &el.presets {
                    animations.extend(presets.instantiate(name, duration)?);
                }
                animations.extend(
                    el.animations
                        .iter()
                        .cloned()
                        .map(|a| a.with_default_duration(duration)),
                );
                let element = Element::new(start, duration, layer)?
                    .with_animations(animations)?
                    .with_transform(el.transform);
                track.push(element);
            }
            timeline.add_track(track)?;
        }
        for spec in overlays {
            match self.build_layer(spec, presets)? {
                Some(layer) => timeline.add_overlay(layer),
                None => tracing::warn!("unknown overlay layer type; overlay skipped"),
            }
        }
        Ok(timeline)
    }

    fn default_duration(&self, layer: &LayerSpec) -> ClipweaveResult<f64> {
        if let LayerSpec::Video(v) = layer {
            let info = probe_video(&self.resolve(&v.path))?;
            if let Some(d) = v.playback_duration(info.duration_secs) {
                return Ok(d);
            }
        }
        Ok(self.defaults.duration)
    }

    fn build_layer(
        &self,
        spec: &LayerSpec,
        presets: &PresetTable,
    ) -> ClipweaveResult<Option<Layer>> {
        Ok(Some(match spec {
            LayerSpec::Fill(l) => Layer::Fill(*l),
            LayerSpec::LinearGradient(l) => Layer::LinearGradient(*l),
            LayerSpec::Image(l) => Layer::Image(ImageLayer {
                path: self.resolve(&l.path),
                ..l.clone()
            }),
            LayerSpec::Shape(l) => Layer::Shape(*l),
            LayerSpec::Video(l) => Layer::Video(VideoLayer {
                path: self.resolve(&l.path),
                verbose: self.verbose,
                ..l.clone()
            }),
            LayerSpec::Composition(c) => {
                let nested = self.build_timeline(&c.tracks, &c.overlays, presets)?;
                Layer::Composition(Box::new(nested))
            }
            LayerSpec::Unknown => return Ok(None),
        }))
    }
}

#[cfg(test)]
#[path = "../tests/unit/project.rs"]
mod tests;
