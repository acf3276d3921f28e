use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::new(10, 1).unwrap(),
        format: OutputFormat::Mp4,
        audio_path: None,
    }
}

#[test]
fn captures_frames_in_order() {
    let mut sink = InMemorySink::new();
    assert!(sink.config().is_none());
    sink.begin(cfg()).unwrap();
    for i in 0..3 {
        sink.push_frame(FrameIndex(i), &FrameRGBA::transparent(2, 2))
            .unwrap();
    }
    sink.end().unwrap();

    assert!(sink.is_ended());
    assert_eq!(sink.config(), Some(&cfg()));
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, [0, 1, 2]);
}

#[test]
fn rejects_repeated_or_backwards_indices() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    let f = FrameRGBA::transparent(2, 2);
    sink.push_frame(FrameIndex(5), &f).unwrap();
    assert!(sink.push_frame(FrameIndex(5), &f).is_err());
    assert!(sink.push_frame(FrameIndex(4), &f).is_err());
    sink.push_frame(FrameIndex(6), &f).unwrap();
}

#[test]
fn begin_resets_previous_capture() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &FrameRGBA::transparent(2, 2))
        .unwrap();
    sink.end().unwrap();
    sink.begin(cfg()).unwrap();
    assert!(sink.frames().is_empty());
    assert!(!sink.is_ended());
}
