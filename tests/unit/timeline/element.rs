use std::sync::{Arc, Mutex};

use super::*;
use crate::animation::anim::{Property, Timing, Tween};
use crate::animation::ease::Ease;
use crate::foundation::core::Fps;
use crate::layer::{FillLayer, ImageLayer};
use crate::foundation::color::Rgba8;

fn fill(color: Rgba8) -> Layer {
    Layer::Fill(FillLayer { color })
}

fn req() -> FrameRequest {
    FrameRequest {
        progress: 0.0,
        source_time: 0.0,
        element_duration: 2.0,
        width: 4,
        height: 4,
        fps: Fps::new(10, 1).unwrap(),
        clip_index: 0,
    }
}

fn opacity_tween(from: f64, to: f64) -> Animation {
    Animation::Tween(Tween {
        property: Property::Opacity,
        from,
        to,
        easing: Ease::Linear,
        timing: Timing::new(0.0, 2.0),
    })
}

struct Recording(Arc<Mutex<Vec<FrameRequest>>>);

impl FrameSource for Recording {
    fn read_next_frame(&mut self, req: FrameRequest) -> ClipweaveResult<Option<FrameRGBA>> {
        self.0.lock().unwrap().push(req);
        Ok(None)
    }
}

#[test]
fn new_validates_window() {
    assert!(Element::new(0.0, 1.0, fill(Rgba8::rgb(0, 0, 0))).is_ok());
    assert!(Element::new(-1.0, 1.0, fill(Rgba8::rgb(0, 0, 0))).is_err());
    assert!(Element::new(0.0, 0.0, fill(Rgba8::rgb(0, 0, 0))).is_err());
    assert!(Element::new(f64::NAN, 1.0, fill(Rgba8::rgb(0, 0, 0))).is_err());
    assert!(Element::new(0.0, f64::INFINITY, fill(Rgba8::rgb(0, 0, 0))).is_err());
}

#[test]
fn window_is_half_open() {
    let e = Element::new(1.0, 2.0, fill(Rgba8::rgb(0, 0, 0))).unwrap();
    assert_eq!(e.end(), 3.0);
    assert!(!e.contains(0.999));
    assert!(e.contains(1.0));
    assert!(e.contains(2.999));
    assert!(!e.contains(3.0));
}

#[test]
fn invalid_animation_is_rejected() {
    let bad = Animation::Tween(Tween {
        property: Property::X,
        from: f64::NAN,
        to: 1.0,
        easing: Ease::Linear,
        timing: Timing::new(0.0, 1.0),
    });
    let err = Element::new(0.0, 1.0, fill(Rgba8::rgb(0, 0, 0)))
        .unwrap()
        .with_animations(vec![bad])
        .unwrap_err();
    assert!(matches!(err, ClipweaveError::Animation(_)), "{err}");
}

#[test]
fn source_opens_lazily() {
    let mut e = Element::new(0.0, 2.0, fill(Rgba8::rgb(1, 2, 3))).unwrap();
    assert!(!e.is_open());
    let f = e.render(req(), 0.0).unwrap().unwrap();
    assert!(e.is_open());
    assert_eq!(f.pixel(0, 0), [1, 2, 3, 255]);
    e.close().unwrap();
}

#[test]
fn animated_opacity_scales_alpha() {
    let mut e = Element::new(0.0, 2.0, fill(Rgba8::rgb(255, 255, 255)))
        .unwrap()
        .with_animations(vec![opacity_tween(0.0, 1.0)])
        .unwrap();
    let f = e.render(req(), 1.0).unwrap().unwrap();
    assert_eq!(f.pixel(2, 2)[3], 128);
    assert_eq!(e.transform_at(2.0).opacity, 1.0);
}

#[test]
fn fully_transparent_element_is_skipped_without_opening() {
    let mut e = Element::new(0.0, 2.0, fill(Rgba8::rgb(255, 255, 255)))
        .unwrap()
        .with_animations(vec![opacity_tween(0.0, 1.0)])
        .unwrap();
    assert!(e.render(req(), 0.0).unwrap().is_none());
    assert!(!e.is_open());
}

#[test]
fn base_transform_applies_without_animations() {
    let mut e = Element::new(0.0, 1.0, fill(Rgba8::rgb(10, 10, 10)))
        .unwrap()
        .with_transform(TransformSnapshot {
            opacity: 0.5,
            ..TransformSnapshot::default()
        });
    let f = e.render(req(), 0.0).unwrap().unwrap();
    assert_eq!(f.pixel(0, 0)[3], 128);
}

#[test]
fn none_from_source_is_not_an_error() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut e = Element::new(0.0, 2.0, Layer::Custom(Box::new(Recording(seen.clone())))).unwrap();
    assert!(e.render(req(), 0.5).unwrap().is_none());
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn open_failure_marks_element_broken() {
    let mut e = Element::new(
        0.0,
        1.0,
        Layer::Image(ImageLayer {
            path: "/no/such/image.png".into(),
            fit: Default::default(),
        }),
    )
    .unwrap();
    assert!(e.render(req(), 0.0).is_err());
    // Subsequent frames draw nothing instead of failing again.
    assert!(e.render(req(), 0.1).unwrap().is_none());
    e.close().unwrap();
}
