use super::*;
use crate::foundation::color::Rgba8;
use crate::foundation::core::Fps;
use crate::encode::sink::InMemorySink;
use crate::layer::{FillLayer, Layer};
use crate::timeline::{Element, Track};

fn timeline(duration: f64) -> Timeline {
    let track = Track::new(0, "video").with_element(
        Element::new(
            0.0,
            duration,
            Layer::Fill(FillLayer {
                color: Rgba8::rgb(5, 6, 7),
            }),
        )
        .unwrap(),
    );
    Timeline::new().with_track(track).unwrap()
}

fn config() -> RenderConfig {
    RenderConfig::new("out.mp4")
        .with_size(4, 2)
        .with_fps(Fps::new(10, 1).unwrap())
}

#[test]
fn new_validates_inputs() {
    assert!(RenderSession::new(config(), Timeline::new()).is_err());
    assert!(RenderSession::new(config().with_size(3, 3), timeline(1.0)).is_err());
}

#[test]
fn frame_count_rounds_up() {
    let s = RenderSession::new(config(), timeline(2.0)).unwrap();
    assert_eq!(s.frame_count(), 20);
    let s = RenderSession::new(config(), timeline(2.05)).unwrap();
    assert_eq!(s.frame_count(), 21);
}

#[test]
fn render_to_pushes_every_frame() {
    let mut s = RenderSession::new(config(), timeline(1.0)).unwrap();
    let mut sink = InMemorySink::new();
    let stats = s.render_to(&mut sink).unwrap();
    assert_eq!(stats.frames_total, 10);
    assert!(sink.is_ended());
    assert_eq!(sink.frames().len(), 10);
    let sc = sink.config().unwrap();
    assert_eq!((sc.width, sc.height), (4, 2));
    for (i, (idx, f)) in sink.frames().iter().enumerate() {
        assert_eq!(idx.0, i as u64);
        assert_eq!(f.data.len(), 4 * 2 * 4);
        assert_eq!(f.pixel(3, 1), [5, 6, 7, 255]);
    }
}

#[test]
fn render_frame_at_composites_one_frame() {
    let mut s = RenderSession::new(config(), timeline(1.0)).unwrap();
    let f = s.render_frame_at(0.5).unwrap();
    assert_eq!(f.pixel(0, 0), [5, 6, 7, 255]);
    s.close().unwrap();
}

#[test]
fn temp_dir_guard_removes_unless_kept() {
    let parent = std::env::temp_dir();
    let removed = {
        let g = TempDirGuard::create(&parent, false).unwrap();
        assert!(g.path().is_dir());
        g.path().to_path_buf()
    };
    assert!(!removed.exists());

    let kept = {
        let g = TempDirGuard::create(&parent, true).unwrap();
        g.path().to_path_buf()
    };
    assert!(kept.is_dir());
    std::fs::remove_dir_all(&kept).unwrap();
}
