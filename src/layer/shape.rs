use kurbo::Shape as _;

use crate::foundation::color::Rgba8;
use crate::foundation::core::FrameRGBA;
use crate::foundation::error::ClipweaveResult;
use crate::layer::{FrameRequest, FrameSource};
use crate::render::transform::{pixmap_dims, pixmap_to_straight};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rect,
    /// Ellipse inscribed in the shape box; a circle when the box is square.
    #[serde(alias = "ellipse")]
    Circle,
}

/// Filled vector shape centered in the frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeLayer {
    #[serde(default)]
    pub shape: ShapeKind,
    pub color: Rgba8,
    /// Box width in pixels; the frame width when absent.
    #[serde(default)]
    pub width: Option<f64>,
    /// Box height in pixels; the frame height when absent.
    #[serde(default)]
    pub height: Option<f64>,
    /// Corner radius for rectangles.
    #[serde(default)]
    pub corner_radius: f64,
}

#[derive(Debug)]
pub struct ShapeSource {
    layer: ShapeLayer,
    cached: Option<FrameRGBA>,
}

impl ShapeSource {
    pub fn new(layer: ShapeLayer) -> Self {
        Self {
            layer,
            cached: None,
        }
    }
}

impl FrameSource for ShapeSource {
    fn read_next_frame(&mut self, req: FrameRequest) -> ClipweaveResult<Option<FrameRGBA>> {
        if let Some(f) = &self.cached
            && f.width == req.width
            && f.height == req.height
        {
            return Ok(Some(f.clone()));
        }
        let frame = rasterize(&self.layer, req.width, req.height)?;
        self.cached = Some(frame.clone());
        Ok(Some(frame))
    }
}

fn rasterize(layer: &ShapeLayer, width: u32, height: u32) -> ClipweaveResult<FrameRGBA> {
    let (w, h) = pixmap_dims(width, height)?;
    let (fw, fh) = (f64::from(width), f64::from(height));
    let bw = layer.width.unwrap_or(fw).max(0.0);
    let bh = layer.height.unwrap_or(fh).max(0.0);
    let x0 = (fw - bw) / 2.0;
    let y0 = (fh - bh) / 2.0;

    let path = match layer.shape {
        ShapeKind::Rect => {
            kurbo::RoundedRect::new(x0, y0, x0 + bw, y0 + bh, layer.corner_radius.max(0.0))
                .to_path(0.1)
        }
        ShapeKind::Circle => {
            kurbo::Ellipse::new((fw / 2.0, fh / 2.0), (bw / 2.0, bh / 2.0), 0.0).to_path(0.1)
        }
    };
    let mut cpu_path = vello_cpu::kurbo::BezPath::new();
    for el in path.elements() {
        cpu_path.push(path_el_to_cpu(*el));
    }

    let c = layer.color;
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
    ctx.fill_path(&cpu_path);
    ctx.flush();

    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);
    pixmap_to_straight(&pixmap, width, height)
}

fn path_el_to_cpu(el: kurbo::PathEl) -> vello_cpu::kurbo::PathEl {
    use vello_cpu::kurbo::{PathEl as CpuEl, Point};

    let p = |p: kurbo::Point| Point::new(p.x, p.y);
    match el {
        kurbo::PathEl::MoveTo(a) => CpuEl::MoveTo(p(a)),
        kurbo::PathEl::LineTo(a) => CpuEl::LineTo(p(a)),
        kurbo::PathEl::QuadTo(a, b) => CpuEl::QuadTo(p(a), p(b)),
        kurbo::PathEl::CurveTo(a, b, c) => CpuEl::CurveTo(p(a), p(b), p(c)),
        kurbo::PathEl::ClosePath => CpuEl::ClosePath,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/shape.rs"]
mod tests;
