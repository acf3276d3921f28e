/// How a source of one aspect ratio is placed into a target box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitMode {
    /// Fill the box, cropping the overflow.
    Cover,
    /// Fit inside the box, letterboxing with transparency.
    #[default]
    Contain,
    /// Fit inside the box over a blurred, cropped copy of itself.
    ContainBlur,
    /// Stretch to the box, ignoring aspect ratio.
    #[serde(alias = "stretch")]
    Fill,
    /// Like `contain`, but never upscale.
    ScaleDown,
}

/// Where the scaled source lands inside the target box.
///
/// Offsets are negative when the scaled source overflows the box (cover).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FitGeometry {
    /// Scaled source width.
    pub width: u32,
    /// Scaled source height.
    pub height: u32,
    /// Left edge inside the target.
    pub offset_x: i64,
    /// Top edge inside the target.
    pub offset_y: i64,
}

/// Blur radius used for the `contain-blur` background.
pub(crate) const CONTAIN_BLUR_RADIUS: u32 = 20;

fn dim(v: f64) -> u32 {
    v.round().max(1.0) as u32
}

fn centered(width: u32, height: u32, target_w: u32, target_h: u32) -> FitGeometry {
    FitGeometry {
        width,
        height,
        offset_x: (i64::from(target_w) - i64::from(width)) / 2,
        offset_y: (i64::from(target_h) - i64::from(height)) / 2,
    }
}

fn cover(iw: f64, ih: f64, tw: u32, th: u32) -> FitGeometry {
    let scale = (f64::from(tw) / iw).max(f64::from(th) / ih);
    centered(dim(iw * scale), dim(ih * scale), tw, th)
}

fn contain(iw: f64, ih: f64, tw: u32, th: u32) -> FitGeometry {
    let scale = (f64::from(tw) / iw).min(f64::from(th) / ih);
    centered(dim(iw * scale), dim(ih * scale), tw, th)
}

/// Geometry of the (foreground) source for `mode`.
pub fn fit_geometry(
    input_w: u32,
    input_h: u32,
    target_w: u32,
    target_h: u32,
    mode: FitMode,
) -> FitGeometry {
    let (iw, ih) = (f64::from(input_w.max(1)), f64::from(input_h.max(1)));
    match mode {
        FitMode::Cover => cover(iw, ih, target_w, target_h),
        FitMode::Contain | FitMode::ContainBlur => contain(iw, ih, target_w, target_h),
        FitMode::Fill => centered(target_w, target_h, target_w, target_h),
        FitMode::ScaleDown => {
            if input_w <= target_w && input_h <= target_h {
                centered(input_w.max(1), input_h.max(1), target_w, target_h)
            } else {
                contain(iw, ih, target_w, target_h)
            }
        }
    }
}

/// Geometry of the cropped background for `contain-blur`.
pub fn background_geometry(
    input_w: u32,
    input_h: u32,
    target_w: u32,
    target_h: u32,
) -> FitGeometry {
    cover(
        f64::from(input_w.max(1)),
        f64::from(input_h.max(1)),
        target_w,
        target_h,
    )
}

/// ffmpeg `-vf` chain producing exactly `target_w x target_h` RGBA frames.
pub fn ffmpeg_filter(
    input_w: u32,
    input_h: u32,
    target_w: u32,
    target_h: u32,
    mode: FitMode,
) -> String {
    let g = fit_geometry(input_w, input_h, target_w, target_h, mode);
    let pad = |g: &FitGeometry| {
        format!(
            "pad={target_w}:{target_h}:{}:{}:color=black@0",
            g.offset_x, g.offset_y
        )
    };

    match mode {
        FitMode::Fill => format!("format=rgba,scale={target_w}:{target_h}"),
        FitMode::Cover => format!(
            "format=rgba,scale={}:{},crop={target_w}:{target_h}",
            g.width, g.height
        ),
        FitMode::Contain | FitMode::ScaleDown => {
            format!("format=rgba,scale={}:{},{}", g.width, g.height, pad(&g))
        }
        FitMode::ContainBlur => {
            let bg = background_geometry(input_w, input_h, target_w, target_h);
            format!(
                "format=rgba,split[bg][fg];\
                 [bg]scale={}:{},crop={target_w}:{target_h},boxblur={CONTAIN_BLUR_RADIUS}[bgb];\
                 [fg]scale={}:{}[fgs];\
                 [bgb][fgs]overlay={}:{}",
                bg.width, bg.height, g.width, g.height, g.offset_x, g.offset_y
            )
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decode/fit.rs"]
mod tests;
