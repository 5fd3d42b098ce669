use super::*;

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &[0; 4], [0, 0, 0, 255]).is_err());
}

#[test]
fn preset_config_validates() {
    let cfg = CaptureConfig::for_preset(QualityPreset::High);
    assert_eq!(cfg.canvas, Canvas::new(1920, 1080).unwrap());
    assert_eq!(cfg.fps, Fps::new(30, 1).unwrap());
    assert_eq!(cfg.safety_buffer_secs, 1.0);
    cfg.validate().unwrap();

    let bad = CaptureConfig {
        timeout_secs: Some(0.0),
        ..cfg.clone()
    };
    assert!(bad.validate().is_err());
    let bad = CaptureConfig {
        fps: Fps { num: 0, den: 1 },
        ..cfg
    };
    assert!(bad.validate().is_err());
}

#[test]
fn raw_sink_emits_one_opaque_chunk_per_frame() {
    let mut sink = RawFrameSink::new();
    let cfg = CaptureConfig {
        bg_rgba: [255, 255, 255, 255],
        ..CaptureConfig::for_preset(QualityPreset::Standard)
    };
    sink.begin(&cfg).unwrap();

    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![100, 0, 0, 128],
        premultiplied: true,
    };
    let mut out = Vec::new();
    sink.encode(&frame, &mut out).unwrap();
    sink.encode(&frame, &mut out).unwrap();
    sink.finish(&mut out).unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!(out[0], vec![227, 127, 127, 255]);
    assert_eq!(sink.frames_encoded(), 2);
    assert_eq!(sink.format().extension, "rgba");
}
