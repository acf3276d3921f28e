use crate::foundation::color::Rgba8;
use crate::foundation::core::FrameRGBA;
use crate::foundation::error::ClipweaveResult;
use crate::foundation::math::{lerp, unit_to_u8};
use crate::layer::{FrameRequest, FrameSource};

/// Solid color layer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FillLayer {
    /// Fill color (straight alpha).
    pub color: Rgba8,
}

/// Two-stop gradient layer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LinearGradientLayer {
    /// Color at the top (vertical) or left (horizontal) edge.
    pub from: Rgba8,
    /// Color at the opposite edge.
    pub to: Rgba8,
    #[serde(default)]
    pub direction: GradientDirection,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientDirection {
    #[default]
    Vertical,
    Horizontal,
}

/// Fill output depends only on size; the last frame is reused.
#[derive(Debug)]
pub struct FillSource {
    layer: FillLayer,
    cached: Option<FrameRGBA>,
}

impl FillSource {
    pub fn new(layer: FillLayer) -> Self {
        Self {
            layer,
            cached: None,
        }
    }
}

impl FrameSource for FillSource {
    fn read_next_frame(&mut self, req: FrameRequest) -> ClipweaveResult<Option<FrameRGBA>> {
        let frame = cached_or(&mut self.cached, req.width, req.height, |w, h| {
            FrameRGBA::filled(w, h, self.layer.color.to_array())
        });
        Ok(Some(frame))
    }
}

#[derive(Debug)]
pub struct GradientSource {
    layer: LinearGradientLayer,
    cached: Option<FrameRGBA>,
}

impl GradientSource {
    pub fn new(layer: LinearGradientLayer) -> Self {
        Self {
            layer,
            cached: None,
        }
    }
}

impl FrameSource for GradientSource {
    fn read_next_frame(&mut self, req: FrameRequest) -> ClipweaveResult<Option<FrameRGBA>> {
        let layer = self.layer;
        let frame = cached_or(&mut self.cached, req.width, req.height, |w, h| {
            render_gradient(&layer, w, h)
        });
        Ok(Some(frame))
    }
}

fn cached_or(
    cache: &mut Option<FrameRGBA>,
    width: u32,
    height: u32,
    render: impl FnOnce(u32, u32) -> FrameRGBA,
) -> FrameRGBA {
    match cache {
        Some(f) if f.width == width && f.height == height => f.clone(),
        _ => {
            let f = render(width, height);
            *cache = Some(f.clone());
            f
        }
    }
}

fn render_gradient(layer: &LinearGradientLayer, width: u32, height: u32) -> FrameRGBA {
    let from = layer.from.to_array();
    let to = layer.to.to_array();
    let span = match layer.direction {
        GradientDirection::Vertical => height,
        GradientDirection::Horizontal => width,
    };
    let stop_at = |i: u32| -> [u8; 4] {
        let t = if span <= 1 {
            0.0
        } else {
            f64::from(i) / f64::from(span - 1)
        };
        let mut px = [0u8; 4];
        for c in 0..4 {
            px[c] = unit_to_u8(lerp(f64::from(from[c]), f64::from(to[c]), t) / 255.0);
        }
        px
    };

    let mut frame = FrameRGBA::transparent(width, height);
    let row_len = width as usize * 4;
    for (y, row) in frame.data.chunks_exact_mut(row_len.max(1)).enumerate() {
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let i = match layer.direction {
                GradientDirection::Vertical => y as u32,
                GradientDirection::Horizontal => x as u32,
            };
            px.copy_from_slice(&stop_at(i));
        }
    }
    frame
}

#[cfg(test)]
#[path = "../../tests/unit/layer/fill.rs"]
mod tests;
