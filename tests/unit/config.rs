use super::*;

fn format_of(path: &str) -> OutputFormat {
    OutputFormat::from_path(Path::new(path))
}

#[test]
fn format_follows_extension() {
    assert_eq!(format_of("a/b.gif"), OutputFormat::Gif);
    assert_eq!(format_of("B.GIF"), OutputFormat::Gif);
    assert_eq!(format_of("b.mp4"), OutputFormat::Mp4);
    assert_eq!(format_of("noext"), OutputFormat::Mp4);
}

#[test]
fn defaults_are_square_at_25fps() {
    let cfg = RenderConfig::new("out.mp4");
    assert_eq!((cfg.width, cfg.height), (640, 640));
    assert_eq!(cfg.fps, Fps::new(25, 1).unwrap());
    assert_eq!(cfg.bg_rgba, [0, 0, 0, 255]);
    assert_eq!(cfg.canvas().frame_len(), 640 * 640 * 4);
    cfg.validate().unwrap();
}

#[test]
fn mp4_requires_even_dimensions() {
    let err = RenderConfig::new("out.mp4")
        .with_size(641, 480)
        .validate()
        .unwrap_err();
    assert!(err.to_string().contains("even"));
    RenderConfig::new("out.gif")
        .with_size(641, 481)
        .validate()
        .unwrap();
}

#[test]
fn empty_output_and_zero_size_are_rejected() {
    assert!(RenderConfig::new("").validate().is_err());
    let zero = RenderConfig::new("a.mp4").with_size(0, 2);
    assert!(zero.validate().is_err());
}

#[test]
fn missing_audio_file_is_rejected() {
    let mut cfg = RenderConfig::new("out.mp4");
    cfg.audio_path = Some("/no/such/audio.mp3".into());
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("audio.mp3"));
}
