use super::*;
use crate::foundation::core::Fps;

const RED: [u8; 4] = [255, 0, 0, 255];

fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, image::Rgba(px))
}

fn req(width: u32, height: u32) -> FrameRequest {
    FrameRequest {
        progress: 0.0,
        source_time: 0.0,
        element_duration: 2.0,
        width,
        height,
        fps: Fps::new(25, 1).unwrap(),
        clip_index: 0,
    }
}

#[test]
fn contain_letterboxes_with_transparency() {
    let f = fit_rgba(&solid(4, 2, RED), 4, 4, FitMode::Contain).unwrap();
    assert_eq!(f.pixel(0, 0), [0, 0, 0, 0]);
    assert_eq!(f.pixel(0, 1), RED);
    assert_eq!(f.pixel(3, 2), RED);
    assert_eq!(f.pixel(3, 3), [0, 0, 0, 0]);
}

#[test]
fn cover_fills_the_frame() {
    let f = fit_rgba(&solid(4, 2, RED), 2, 2, FitMode::Cover).unwrap();
    assert!(f.data.chunks_exact(4).all(|px| px == RED));
}

#[test]
fn fill_stretches_to_target() {
    let f = fit_rgba(&solid(1, 5, RED), 3, 3, FitMode::Fill).unwrap();
    assert_eq!((f.width, f.height), (3, 3));
    assert!(f.data.chunks_exact(4).all(|px| px == RED));
}

#[test]
fn scale_down_centers_small_images() {
    let f = fit_rgba(&solid(4, 2, RED), 8, 8, FitMode::ScaleDown).unwrap();
    assert_eq!(f.pixel(2, 3), RED);
    assert_eq!(f.pixel(5, 4), RED);
    assert_eq!(f.pixel(1, 3), [0, 0, 0, 0]);
    assert_eq!(f.pixel(2, 5), [0, 0, 0, 0]);
}

#[test]
fn contain_blur_keeps_sharp_foreground() {
    let f = fit_rgba(&solid(8, 4, RED), 8, 8, FitMode::ContainBlur).unwrap();
    assert_eq!(f.pixel(4, 4), RED);
}

#[test]
fn source_reuses_fitted_frame_until_size_changes() {
    let layer = ImageLayer {
        path: "in-memory.png".into(),
        fit: FitMode::Fill,
    };
    let mut src = ImageSource::from_pixels(layer, solid(2, 2, [0, 255, 0, 255]));
    let a = src.read_next_frame(req(4, 4)).unwrap().unwrap();
    let b = src.read_next_frame(req(4, 4)).unwrap().unwrap();
    assert_eq!(a, b);
    let c = src.read_next_frame(req(6, 2)).unwrap().unwrap();
    assert_eq!((c.width, c.height), (6, 2));
}

#[test]
fn open_decodes_png_from_disk() {
    let dir = std::env::temp_dir().join(format!("clipweave-image-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("blue.png");
    solid(3, 3, [0, 0, 255, 255]).save(&path).unwrap();

    let mut src = ImageSource::open(ImageLayer {
        path: path.clone(),
        fit: FitMode::Cover,
    })
    .unwrap();
    let f = src.read_next_frame(req(6, 6)).unwrap().unwrap();
    assert_eq!(f.pixel(5, 5), [0, 0, 255, 255]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn resize_mode_alias_is_accepted() {
    let layer: ImageLayer =
        serde_json::from_str(r#"{"path":"a.png","resizeMode":"contain-blur"}"#).unwrap();
    assert_eq!(layer.fit, FitMode::ContainBlur);
    let layer: ImageLayer = serde_json::from_str(r#"{"path":"a.png"}"#).unwrap();
    assert_eq!(layer.fit, FitMode::Contain);
}
