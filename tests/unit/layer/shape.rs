use super::*;
use crate::foundation::core::Fps;

fn req(width: u32, height: u32) -> FrameRequest {
    FrameRequest {
        progress: 0.0,
        source_time: 0.0,
        element_duration: 1.0,
        width,
        height,
        fps: Fps::new(30, 1).unwrap(),
        clip_index: 0,
    }
}

fn close_to(px: [u8; 4], want: [u8; 4]) -> bool {
    px.iter().zip(want).all(|(a, b)| a.abs_diff(b) <= 1)
}

#[test]
fn rect_is_centered_in_frame() {
    let mut src = ShapeSource::new(ShapeLayer {
        shape: ShapeKind::Rect,
        color: Rgba8::rgb(200, 40, 40),
        width: Some(4.0),
        height: Some(4.0),
        corner_radius: 0.0,
    });
    let f = src.read_next_frame(req(8, 8)).unwrap().unwrap();
    let center = f.pixel(3, 3);
    assert!(close_to(center, [200, 40, 40, 255]), "{center:?}");
    assert!(close_to(f.pixel(5, 2), [200, 40, 40, 255]));
    assert_eq!(f.pixel(0, 0)[3], 0);
    assert_eq!(f.pixel(7, 7)[3], 0);
    assert_eq!(f.pixel(1, 4)[3], 0);
}

#[test]
fn rect_defaults_to_full_frame() {
    let mut src = ShapeSource::new(ShapeLayer {
        shape: ShapeKind::Rect,
        color: Rgba8::rgb(0, 0, 255),
        width: None,
        height: None,
        corner_radius: 0.0,
    });
    let f = src.read_next_frame(req(6, 4)).unwrap().unwrap();
    assert!(close_to(f.pixel(0, 0), [0, 0, 255, 255]));
    assert!(close_to(f.pixel(5, 3), [0, 0, 255, 255]));
}

#[test]
fn circle_leaves_corners_empty() {
    let mut src = ShapeSource::new(ShapeLayer {
        shape: ShapeKind::Circle,
        color: Rgba8::rgb(255, 255, 255),
        width: None,
        height: None,
        corner_radius: 0.0,
    });
    let f = src.read_next_frame(req(20, 20)).unwrap().unwrap();
    assert!(close_to(f.pixel(10, 10), [255, 255, 255, 255]));
    assert_eq!(f.pixel(0, 0)[3], 0);
    assert_eq!(f.pixel(19, 19)[3], 0);
}

#[test]
fn shape_json_accepts_ellipse_and_camel_case() {
    let layer: ShapeLayer = serde_json::from_str(
        r##"{"shape":"ellipse","color":"#ff0000","width":10,"cornerRadius":3}"##,
    )
    .unwrap();
    assert_eq!(layer.shape, ShapeKind::Circle);
    assert_eq!(layer.width, Some(10.0));
    assert_eq!(layer.height, None);
    assert_eq!(layer.corner_radius, 3.0);
}
