use std::path::PathBuf;

use image::{RgbaImage, imageops};

use crate::decode::fit::{CONTAIN_BLUR_RADIUS, FitMode, background_geometry, fit_geometry};
use crate::foundation::core::FrameRGBA;
use crate::foundation::error::{ClipweaveError, ClipweaveResult};
use crate::layer::{FrameRequest, FrameSource};

/// Still image layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageLayer {
    /// Image file (PNG, JPEG, ...).
    pub path: PathBuf,
    /// How the image is placed into the frame.
    #[serde(default, alias = "resizeMode")]
    pub fit: FitMode,
}

/// Decoded image plus the last fitted frame.
pub struct ImageSource {
    layer: ImageLayer,
    pixels: RgbaImage,
    cached: Option<FrameRGBA>,
}

impl std::fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSource")
            .field("path", &self.layer.path)
            .field("size", &self.pixels.dimensions())
            .finish()
    }
}

impl ImageSource {
    /// Decode the image file.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %layer.path.display()))]
    pub fn open(layer: ImageLayer) -> ClipweaveResult<Self> {
        let pixels = image::open(&layer.path)
            .map_err(|e| {
                ClipweaveError::evaluation(format!(
                    "failed to decode image '{}': {e}",
                    layer.path.display()
                ))
            })?
            .to_rgba8();
        Ok(Self::from_pixels(layer, pixels))
    }

    /// Wrap already decoded pixels.
    pub fn from_pixels(layer: ImageLayer, pixels: RgbaImage) -> Self {
        Self {
            layer,
            pixels,
            cached: None,
        }
    }
}

impl FrameSource for ImageSource {
    fn read_next_frame(&mut self, req: FrameRequest) -> ClipweaveResult<Option<FrameRGBA>> {
        if let Some(f) = &self.cached
            && f.width == req.width
            && f.height == req.height
        {
            return Ok(Some(f.clone()));
        }
        let frame = fit_rgba(&self.pixels, req.width, req.height, self.layer.fit)?;
        self.cached = Some(frame.clone());
        Ok(Some(frame))
    }
}

/// Scale and place `src` into a `width x height` straight-alpha frame.
pub fn fit_rgba(
    src: &RgbaImage,
    width: u32,
    height: u32,
    mode: FitMode,
) -> ClipweaveResult<FrameRGBA> {
    let (iw, ih) = src.dimensions();
    let filter = imageops::FilterType::Triangle;

    if mode == FitMode::Fill {
        let scaled = imageops::resize(src, width, height, filter);
        return FrameRGBA::from_raw(width, height, scaled.into_raw());
    }

    let mut canvas = if mode == FitMode::ContainBlur {
        let bg = background_geometry(iw, ih, width, height);
        let scaled = imageops::resize(src, bg.width, bg.height, filter);
        let blurred = imageops::blur(&scaled, CONTAIN_BLUR_RADIUS as f32 / 2.0);
        let mut canvas = RgbaImage::new(width, height);
        imageops::replace(&mut canvas, &blurred, bg.offset_x, bg.offset_y);
        canvas
    } else {
        RgbaImage::new(width, height)
    };

    let g = fit_geometry(iw, ih, width, height, mode);
    let scaled = if (g.width, g.height) == (iw, ih) {
        src.clone()
    } else {
        imageops::resize(src, g.width, g.height, filter)
    };
    if mode == FitMode::ContainBlur {
        imageops::overlay(&mut canvas, &scaled, g.offset_x, g.offset_y);
    } else {
        imageops::replace(&mut canvas, &scaled, g.offset_x, g.offset_y);
    }
    FrameRGBA::from_raw(width, height, canvas.into_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/layer/image.rs"]
mod tests;
