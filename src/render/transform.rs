use std::sync::Arc;

use vello_cpu::peniko::color::PremulRgba8;

use crate::animation::transform::TransformSnapshot;
use crate::foundation::core::{Affine, FrameRGBA};
use crate::foundation::error::{ClipweaveError, ClipweaveResult};
use crate::render::composite::{
    multiply_alpha_in_place, premultiply_in_place, unpremultiply_in_place,
};

/// Apply an element's resolved transform to its source frame.
///
/// Geometry is resampled through `vello_cpu`; opacity scales the alpha channel. Identity
/// snapshots return the frame untouched.
pub fn apply_snapshot(
    frame: FrameRGBA,
    snapshot: &TransformSnapshot,
) -> ClipweaveResult<FrameRGBA> {
    let opacity = snapshot.clamped_opacity();
    let mut out = if snapshot.is_geometric_identity() {
        frame
    } else {
        let affine = snapshot.to_affine(f64::from(frame.width), f64::from(frame.height));
        if affine == Affine::IDENTITY {
            frame
        } else {
            draw_transformed(&frame, affine)?
        }
    };
    if opacity < 1.0 {
        multiply_alpha_in_place(&mut out.data, opacity);
    }
    Ok(out)
}

/// Redraw `frame` through `affine` onto a transparent canvas of the same size.
pub fn draw_transformed(frame: &FrameRGBA, affine: Affine) -> ClipweaveResult<FrameRGBA> {
    let (w, h) = pixmap_dims(frame.width, frame.height)?;

    let mut premul = frame.data.clone();
    premultiply_in_place(&mut premul);
    let pixmap = pixmap_from_premul_bytes(&premul, w, h);
    let paint = vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    };

    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_transform(affine_to_cpu(affine));
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(frame.width),
        f64::from(frame.height),
    ));
    ctx.flush();

    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);
    pixmap_to_straight(&pixmap, frame.width, frame.height)
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn pixmap_dims(width: u32, height: u32) -> ClipweaveResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| ClipweaveError::evaluation("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| ClipweaveError::evaluation("pixmap height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(ClipweaveError::evaluation(
            "pixmap width/height must be non-zero",
        ));
    }
    Ok((w, h))
}

fn pixmap_from_premul_bytes(bytes: &[u8], width: u16, height: u16) -> vello_cpu::Pixmap {
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    vello_cpu::Pixmap::from_parts_with_opacity(pixels, width, height, true)
}

/// Copy a rendered pixmap out as straight-alpha RGBA8.
pub(crate) fn pixmap_to_straight(
    pixmap: &vello_cpu::Pixmap,
    width: u32,
    height: u32,
) -> ClipweaveResult<FrameRGBA> {
    let mut data = pixmap.data_as_u8_slice().to_vec();
    unpremultiply_in_place(&mut data);
    FrameRGBA::from_raw(width, height, data)
}

#[cfg(test)]
#[path = "../../tests/unit/render/transform.rs"]
mod tests;
