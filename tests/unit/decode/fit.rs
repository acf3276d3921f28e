use super::*;

#[test]
fn cover_fills_and_crops_wide_source() {
    let g = fit_geometry(1920, 1080, 100, 100, FitMode::Cover);
    assert_eq!((g.width, g.height), (178, 100));
    assert_eq!((g.offset_x, g.offset_y), (-39, 0));
    assert_eq!(
        ffmpeg_filter(1920, 1080, 100, 100, FitMode::Cover),
        "format=rgba,scale=178:100,crop=100:100"
    );
}

#[test]
fn contain_letterboxes_wide_source() {
    let g = fit_geometry(1920, 1080, 640, 640, FitMode::Contain);
    assert_eq!((g.width, g.height), (640, 360));
    assert_eq!((g.offset_x, g.offset_y), (0, 140));
    assert_eq!(
        ffmpeg_filter(1920, 1080, 640, 640, FitMode::Contain),
        "format=rgba,scale=640:360,pad=640:640:0:140:color=black@0"
    );
}

#[test]
fn fill_ignores_aspect() {
    let g = fit_geometry(10, 1000, 64, 32, FitMode::Fill);
    assert_eq!((g.width, g.height, g.offset_x, g.offset_y), (64, 32, 0, 0));
    assert_eq!(
        ffmpeg_filter(10, 1000, 64, 32, FitMode::Fill),
        "format=rgba,scale=64:32"
    );
}

#[test]
fn scale_down_never_upscales() {
    let small = fit_geometry(20, 10, 100, 100, FitMode::ScaleDown);
    assert_eq!((small.width, small.height), (20, 10));
    assert_eq!((small.offset_x, small.offset_y), (40, 45));

    let big = fit_geometry(400, 200, 100, 100, FitMode::ScaleDown);
    assert_eq!((big.width, big.height), (100, 50));
}

#[test]
fn contain_blur_overlays_foreground_on_cover_background() {
    let f = ffmpeg_filter(1920, 1080, 100, 100, FitMode::ContainBlur);
    assert!(f.contains("[bg]scale=178:100,crop=100:100,boxblur=20[bgb]"));
    assert!(f.contains("[fg]scale=100:56[fgs]"));
    assert!(f.ends_with("overlay=0:22"));
}

#[test]
fn every_mode_keeps_positive_dimensions_for_degenerate_inputs() {
    for mode in [
        FitMode::Cover,
        FitMode::Contain,
        FitMode::ContainBlur,
        FitMode::Fill,
        FitMode::ScaleDown,
    ] {
        let g = fit_geometry(0, 0, 8, 8, mode);
        assert!(g.width >= 1 && g.height >= 1, "{mode:?}");
    }
}

#[test]
fn serde_accepts_stretch_alias() {
    let m: FitMode = serde_json::from_str("\"stretch\"").unwrap();
    assert_eq!(m, FitMode::Fill);
    let m: FitMode = serde_json::from_str("\"contain-blur\"").unwrap();
    assert_eq!(m, FitMode::ContainBlur);
}
