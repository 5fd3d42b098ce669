use super::*;
use crate::capture::sink::RawFrameSink;
use crate::foundation::core::{Canvas, Fps};
use crate::narration::{EstimatedNarrator, NarrationId, NarrationRequest, NarrationTicket};
use crate::render::FrameView;
use crate::script::fixtures::script_6_8_10;

const FRAME_BYTES: usize = 4 * 4 * 4;

/// Paints the scene index into the red channel.
struct IndexRenderer;

impl FrameRenderer for IndexRenderer {
    fn canvas(&self) -> Canvas {
        Canvas::new(4, 4).unwrap()
    }

    fn render(&mut self, view: &FrameView<'_>) -> SlidesageResult<FrameRGBA> {
        Ok(FrameRGBA {
            width: 4,
            height: 4,
            data: [view.scene_index as u8, 0, 0, 255].repeat(16),
            premultiplied: true,
        })
    }
}

struct FixedNarrator(Option<f64>);

impl NarrationProvider for FixedNarrator {
    fn speak(&mut self, _request: &NarrationRequest) -> SlidesageResult<NarrationTicket> {
        Ok(match self.0 {
            Some(duration_secs) => NarrationTicket::Timed { duration_secs },
            None => NarrationTicket::Pending,
        })
    }

    fn cancel(&mut self, _id: NarrationId) {}
}

fn opts(mode: PlaybackMode) -> ExplainerSessionOpts {
    ExplainerSessionOpts {
        playback: PlaybackConfig::with_mode(mode),
        capture: CaptureConfig {
            canvas: Canvas::new(4, 4).unwrap(),
            fps: Fps::new(10, 1).unwrap(),
            ..CaptureConfig::for_preset(Default::default())
        },
    }
}

fn session(narrator: Box<dyn NarrationProvider>, opts: ExplainerSessionOpts) -> ExplainerSession {
    let script = script_6_8_10();
    let media = vec![MediaHandle::default(); script.scenes.len()];
    ExplainerSession::new(
        &script,
        media,
        Box::new(IndexRenderer),
        narrator,
        Box::new(RawFrameSink::new()),
        opts,
    )
    .unwrap()
}

fn scene_of_slot(artifact: &CaptureArtifact, slot: usize) -> u8 {
    artifact.bytes[slot * FRAME_BYTES]
}

#[test]
fn fixed_recording_covers_the_timeline_plus_safety_buffer() {
    let mut s = session(
        Box::new(EstimatedNarrator::default()),
        opts(PlaybackMode::FixedDuration),
    );
    assert!((s.default_timeout_secs() - 25.0).abs() < 1e-9);

    let artifact = s.record().unwrap();
    assert!(s.last_stats().completed);
    assert!((250..=252).contains(&artifact.frame_count));
    assert_eq!(artifact.bytes.len(), artifact.frame_count as usize * FRAME_BYTES);
    assert_eq!(artifact.chunk_count, artifact.frame_count as usize);

    assert_eq!(scene_of_slot(&artifact, 0), 0);
    assert_eq!(scene_of_slot(&artifact, 59), 0);
    assert_eq!(scene_of_slot(&artifact, 60), 1);
    assert_eq!(scene_of_slot(&artifact, 139), 1);
    assert_eq!(scene_of_slot(&artifact, 140), 2);
    assert_eq!(scene_of_slot(&artifact, artifact.frame_count as usize - 1), 2);
    assert_eq!(s.driver().phase(), PlaybackPhase::Completed);
    assert_eq!(s.scheduler.pending_count(), 0);
}

#[test]
fn speech_gated_recording_follows_narration() {
    let mut s = session(
        Box::new(FixedNarrator(Some(1.0))),
        opts(PlaybackMode::SpeechGated),
    );
    let artifact = s.record().unwrap();

    assert!(s.last_stats().completed);
    // Three one-second narrations plus delays, fade-outs and the safety buffer: 5.9 s.
    assert!((58..=61).contains(&artifact.frame_count), "{}", artifact.frame_count);
    assert_eq!(scene_of_slot(&artifact, 0), 0);
    assert_eq!(scene_of_slot(&artifact, artifact.frame_count as usize - 1), 2);
}

#[test]
fn stalled_narration_is_cut_off_by_the_timeout() {
    let mut o = opts(PlaybackMode::SpeechGated);
    o.capture.timeout_secs = Some(3.0);
    let mut s = session(Box::new(FixedNarrator(None)), o);

    let artifact = s.record().unwrap();
    assert!(!s.last_stats().completed);
    assert!((30..=32).contains(&artifact.frame_count));
    assert_eq!(scene_of_slot(&artifact, artifact.frame_count as usize - 1), 0);
}

#[test]
fn recording_twice_restarts_from_the_first_scene() {
    let mut s = session(
        Box::new(EstimatedNarrator::default()),
        opts(PlaybackMode::FixedDuration),
    );
    let first = s.record().unwrap();
    let second = s.record().unwrap();
    assert_eq!(first.frame_count, second.frame_count);
    assert_eq!(scene_of_slot(&second, 0), 0);
}

#[test]
fn recording_while_paused_is_rejected() {
    let mut s = session(
        Box::new(EstimatedNarrator::default()),
        opts(PlaybackMode::FixedDuration),
    );
    s.driver_mut().start().unwrap();
    s.driver_mut().pause().unwrap();

    let err = s.record().unwrap_err();
    assert!(matches!(err, SlidesageError::Capture(_)));
    assert_eq!(s.driver().phase(), PlaybackPhase::Paused);
}

#[test]
fn mismatched_canvas_is_rejected() {
    let script = script_6_8_10();
    let mut o = opts(PlaybackMode::FixedDuration);
    o.capture.canvas = Canvas::new(8, 8).unwrap();
    let err = ExplainerSession::new(
        &script,
        vec![MediaHandle::default(); 3],
        Box::new(IndexRenderer),
        Box::new(EstimatedNarrator::default()),
        Box::new(RawFrameSink::new()),
        o,
    )
    .unwrap_err();
    assert!(matches!(err, SlidesageError::Validation(_)));
}

#[test]
fn speech_gated_timeout_accounts_for_long_narration() {
    let s = session(
        Box::new(EstimatedNarrator::default()),
        opts(PlaybackMode::SpeechGated),
    );
    // Declared durations dominate the word estimates of the fixture.
    let expected = 2.0 * 24.0 + 0.2 + 2.0 * 0.1 + 3.0 * 0.5 + 1.0;
    assert!((s.default_timeout_secs() - expected).abs() < 1e-9);
}

#[test]
fn stills_show_the_scene_at_the_requested_time() {
    let mut s = session(
        Box::new(EstimatedNarrator::default()),
        opts(PlaybackMode::FixedDuration),
    );
    assert_eq!(s.render_still(7.0).unwrap().data[0], 1);
    assert_eq!(s.render_still(23.0).unwrap().data[0], 2);
    assert_eq!(s.render_still(0.0).unwrap().data[0], 0);
    assert_eq!(s.driver().phase(), PlaybackPhase::Idle);
    assert!(s.render_still(f64::NAN).is_err());
}

#[test]
fn speech_gated_stills_step_through_narration() {
    let mut s = session(
        Box::new(FixedNarrator(Some(1.0))),
        opts(PlaybackMode::SpeechGated),
    );
    assert_eq!(s.render_still(0.5).unwrap().data[0], 0);
    assert_eq!(s.render_still(2.0).unwrap().data[0], 1);
}
