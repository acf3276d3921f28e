use std::sync::{Arc, Mutex};

use super::*;
use crate::foundation::color::Rgba8;
use crate::layer::{FillLayer, FrameSource, ImageLayer, Layer};

fn fps(n: u32) -> Fps {
    Fps::new(n, 1).unwrap()
}

fn fill(start: f64, duration: f64, r: u8) -> Element {
    Element::new(
        start,
        duration,
        Layer::Fill(FillLayer {
            color: Rgba8::rgb(r, 0, 0),
        }),
    )
    .unwrap()
}

struct Recording(Arc<Mutex<Vec<FrameRequest>>>);

impl FrameSource for Recording {
    fn read_next_frame(&mut self, req: FrameRequest) -> ClipweaveResult<Option<FrameRGBA>> {
        self.0.lock().unwrap().push(req);
        Ok(Some(FrameRGBA::transparent(req.width, req.height)))
    }
}

struct FailingDecoder;

impl FrameSource for FailingDecoder {
    fn read_next_frame(&mut self, _req: FrameRequest) -> ClipweaveResult<Option<FrameRGBA>> {
        Err(ClipweaveError::decode("ffmpeg exited with status 1"))
    }
}

#[test]
fn clip_index_concatenates_digits() {
    assert_eq!(clip_index(0, 0), 0);
    assert_eq!(clip_index(2, 5), 25);
    assert_eq!(clip_index(12, 3), 123);
    assert_eq!(clip_index(1, 10), 110);
    assert_eq!(clip_index(3, 99), 399);
    assert_eq!(clip_index(3, 100), 3100);
}

#[test]
fn quantize_snaps_to_frame_grid() {
    let q = quantize(0.25, 1.0, fps(10));
    assert_eq!(q.num_frames, 10);
    assert_eq!(q.frame, 2);
    assert!((q.progress - 0.2).abs() < 1e-12);
    assert!((q.source_time - 0.2).abs() < 1e-12);
}

#[test]
fn quantize_absorbs_float_noise_at_boundaries() {
    // 7 * (1/3) * 3 is 6.999999999999999 in f64.
    let t = 7.0 * (1.0 / 3.0);
    let q = quantize(t, 10.0, fps(3));
    assert_eq!(q.frame, 7);
}

#[test]
fn quantize_never_reaches_one() {
    let q = quantize(1.0, 1.0, fps(10));
    assert_eq!(q.frame, 9);
    assert!(q.progress < 1.0);

    let short = quantize(0.01, 0.02, fps(10));
    assert_eq!(short.num_frames, 1);
    assert_eq!(short.progress, 0.0);
}

#[test]
fn progress_is_monotonic_over_an_element() {
    let mut last = -1.0;
    for i in 0..20 {
        let q = quantize(f64::from(i) / 10.0, 2.0, fps(10));
        assert!(q.progress >= last);
        assert!((0.0..1.0).contains(&q.progress));
        last = q.progress;
    }
}

#[test]
fn push_sorts_by_start_and_keeps_insertion_indices() {
    let track = Track::new(1, "video")
        .with_element(fill(4.0, 1.0, 1))
        .with_element(fill(0.0, 2.0, 2))
        .with_element(fill(2.0, 2.0, 3));
    let starts: Vec<f64> = track.elements().iter().map(Element::start).collect();
    assert_eq!(starts, [0.0, 2.0, 4.0]);
    let clips: Vec<u64> = track.elements().iter().map(Element::clip_index).collect();
    assert_eq!(clips, [11, 12, 10]);
    assert_eq!(track.end_time(), 5.0);
    assert_eq!(track.kind(), "video");
}

#[test]
fn boundary_belongs_to_the_next_element() {
    let mut track = Track::new(0, "video")
        .with_element(fill(0.0, 3.0, 10))
        .with_element(fill(3.0, 3.0, 20));
    let a = track.frame_at(2.999, 2, 2, fps(25)).unwrap().unwrap();
    let b = track.frame_at(3.0, 2, 2, fps(25)).unwrap().unwrap();
    assert_eq!(a.pixel(0, 0)[0], 10);
    assert_eq!(b.pixel(0, 0)[0], 20);
    assert!(track.frame_at(6.0, 2, 2, fps(25)).unwrap().is_none());
}

#[test]
fn overlap_picks_earliest_start() {
    let track = Track::new(0, "video")
        .with_element(fill(1.0, 3.0, 1))
        .with_element(fill(0.0, 3.0, 2));
    assert_eq!(track.active_index(2.0), Some(0));
    assert_eq!(track.elements()[0].start(), 0.0);
}

#[test]
fn frame_request_carries_quantized_values() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let element = Element::new(1.0, 2.0, Layer::Custom(Box::new(Recording(seen.clone())))).unwrap();
    let mut track = Track::new(4, "video").with_element(element);

    track.frame_at(1.55, 8, 6, fps(10)).unwrap();
    let reqs = seen.lock().unwrap();
    let req = reqs[0];
    assert_eq!((req.width, req.height), (8, 6));
    assert!((req.progress - 0.25).abs() < 1e-12);
    assert!((req.source_time - 0.5).abs() < 1e-12);
    assert_eq!(req.element_duration, 2.0);
    assert_eq!(req.clip_index, 40);
}

#[test]
fn non_decode_failures_are_skipped() {
    let broken = Element::new(
        0.0,
        1.0,
        Layer::Image(ImageLayer {
            path: "/missing.png".into(),
            fit: Default::default(),
        }),
    )
    .unwrap();
    let mut track = Track::new(0, "video").with_element(broken);
    assert!(track.frame_at(0.0, 2, 2, fps(10)).unwrap().is_none());
    assert!(track.frame_at(0.5, 2, 2, fps(10)).unwrap().is_none());
}

#[test]
fn decode_failures_propagate() {
    let element = Element::new(0.0, 1.0, Layer::Custom(Box::new(FailingDecoder))).unwrap();
    let mut track = Track::new(0, "video").with_element(element);
    let err = track.frame_at(0.0, 2, 2, fps(10)).unwrap_err();
    assert!(matches!(err, ClipweaveError::Decode(_)));
    track.close_all().unwrap();
}
