use crate::capture::pipeline::{CaptureArtifact, CapturePipeline};
use crate::capture::sink::{CaptureConfig, CaptureSink};
use crate::foundation::core::Fps;
use crate::foundation::error::{SlidesageError, SlidesageResult};
use crate::media::handle::MediaHandle;
use crate::narration::{NarrationProvider, estimate_narration_secs};
use crate::playback::clock::{Clock, ManualClock};
use crate::playback::driver::{DriverDeps, PlaybackDriver};
use crate::playback::scheduler::ManualScheduler;
use crate::playback::state::{PlaybackConfig, PlaybackMode, PlaybackPhase};
use crate::render::frame::FrameRGBA;
use crate::render::{FrameRenderer, SceneContent};
use crate::script::model::Script;

/// Options for [`ExplainerSession`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExplainerSessionOpts {
    /// Playback behavior.
    pub playback: PlaybackConfig,
    /// Capture settings. A missing timeout is derived from the script.
    pub capture: CaptureConfig,
}

impl Default for ExplainerSessionOpts {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            capture: CaptureConfig::for_preset(Default::default()),
        }
    }
}

/// Counters from one [`ExplainerSession::record`] run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordStats {
    /// Clock steps taken.
    pub steps: u64,
    /// Frames the renderer produced.
    pub frames_rendered: u64,
    /// Frame slots the capture wrote.
    pub frames_captured: u64,
    /// Whether playback reached the end before capture stopped.
    pub completed: bool,
}

/// Deterministic, frame-stepped recording of a script.
///
/// The session owns a [`ManualClock`] and a [`ManualScheduler`] shared with its driver. Each
/// step advances the clock by one capture frame, fires the outstanding tick and offers the
/// newest frame to the capture pipeline.
pub struct ExplainerSession {
    title: String,
    clock: ManualClock,
    scheduler: ManualScheduler,
    driver: PlaybackDriver,
    capture: CapturePipeline,
    opts: ExplainerSessionOpts,
    last_stats: RecordStats,
}

impl std::fmt::Debug for ExplainerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplainerSession")
            .field("title", &self.title)
            .field("now", &self.clock.now_secs())
            .field("driver", &self.driver)
            .field("capture", &self.capture)
            .finish_non_exhaustive()
    }
}

impl ExplainerSession {
    /// Build a session for `script` with one media handle per scene.
    ///
    /// The script is validated, and the renderer's canvas must match the capture canvas.
    pub fn new(
        script: &Script,
        media: Vec<MediaHandle>,
        renderer: Box<dyn FrameRenderer>,
        narrator: Box<dyn NarrationProvider>,
        sink: Box<dyn CaptureSink>,
        opts: ExplainerSessionOpts,
    ) -> SlidesageResult<Self> {
        script.validate()?;
        opts.capture.validate()?;
        if renderer.canvas() != opts.capture.canvas {
            return Err(SlidesageError::validation(format!(
                "renderer canvas {}x{} does not match capture canvas {}x{}",
                renderer.canvas().width,
                renderer.canvas().height,
                opts.capture.canvas.width,
                opts.capture.canvas.height
            )));
        }

        let clock = ManualClock::new();
        let scheduler = ManualScheduler::new();
        let deps = DriverDeps {
            clock: Box::new(clock.clone()),
            scheduler: Box::new(scheduler.clone()),
            narrator,
            renderer,
        };
        let scenes = SceneContent::from_script(script, media);
        let driver = PlaybackDriver::new(&script.title, scenes, opts.playback.clone(), deps)?;

        Ok(Self {
            title: script.title.clone(),
            clock,
            scheduler,
            driver,
            capture: CapturePipeline::new(sink),
            opts,
            last_stats: RecordStats::default(),
        })
    }

    /// Script title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The playback driver.
    pub fn driver(&self) -> &PlaybackDriver {
        &self.driver
    }

    /// Mutable access for hosts delivering external events between steps.
    pub fn driver_mut(&mut self) -> &mut PlaybackDriver {
        &mut self.driver
    }

    /// Session clock, in seconds.
    pub fn now_secs(&self) -> f64 {
        self.clock.now_secs()
    }

    /// Counters of the last recording.
    pub fn last_stats(&self) -> RecordStats {
        self.last_stats
    }

    /// Capture timeout used when the options leave it unset.
    ///
    /// Fixed-duration playback gets the timeline length plus the safety buffer. Speech-gated
    /// playback may run past the declared durations, so it gets twice the longer of declared and
    /// estimated narration time per scene, plus narration delays, each scene's fade-out and the
    /// safety buffer.
    pub fn default_timeout_secs(&self) -> f64 {
        let safety = self.opts.capture.safety_buffer_secs;
        let timeline = self.driver.timeline();
        match self.opts.playback.mode {
            PlaybackMode::FixedDuration => timeline.total_duration() + safety,
            PlaybackMode::SpeechGated => {
                let cfg = &self.opts.playback;
                let (scenes, fades) = (0..timeline.len())
                    .filter_map(|i| {
                        let span = timeline.span(i)?;
                        let caption = self.driver.scene(i)?.caption.as_str();
                        let estimate = estimate_narration_secs(caption, cfg.words_per_second);
                        let fade = timeline
                            .fade()
                            .window_secs(span.duration.max(cfg.min_scene_secs));
                        Some((span.duration.max(estimate), fade))
                    })
                    .fold((0.0, 0.0), |(s, f), (scene, fade)| (s + scene, f + fade));
                let delays = cfg.first_narration_delay_secs
                    + cfg.advance_delay_secs * timeline.len().saturating_sub(1) as f64;
                2.0 * scenes + fades + delays + safety
            }
        }
    }

    /// Record the whole script: start capture, reset, start playback, and step until the
    /// capture stops on its own.
    ///
    /// Rejected while playback is paused. Capture errors stop the session and are returned.
    #[tracing::instrument(level = "info", skip(self), fields(title = %self.title))]
    pub fn record(&mut self) -> SlidesageResult<CaptureArtifact> {
        if self.driver.phase() == PlaybackPhase::Paused {
            return Err(SlidesageError::capture(
                "cannot start capture while playback is paused",
            ));
        }

        let mut cfg = self.opts.capture.clone();
        if cfg.timeout_secs.is_none() {
            cfg.timeout_secs = Some(self.default_timeout_secs());
        }
        let fps = cfg.fps;
        let t0 = self.clock.now_secs();
        let frames_before = self.driver.frames_rendered();

        self.capture.start_capture(cfg, t0)?;
        let stats = match self.run_capture(t0, fps) {
            Ok(stats) => stats,
            Err(err) => {
                if let Err(stop_err) = self.capture.stop_capture() {
                    tracing::warn!(%stop_err, "failed to stop capture after error");
                }
                return Err(err);
            }
        };
        self.last_stats = RecordStats {
            frames_rendered: self.driver.frames_rendered().saturating_sub(frames_before),
            ..stats
        };
        if !stats.completed {
            tracing::warn!(
                scene = self.driver.current_scene_index(),
                "capture stopped before playback completed"
            );
        }

        self.capture
            .take_artifact()
            .ok_or_else(|| SlidesageError::capture("capture finished without an artifact"))
    }

    fn run_capture(&mut self, t0: f64, fps: Fps) -> SlidesageResult<RecordStats> {
        self.driver.reset()?;
        self.driver.start()?;

        let mut stats = RecordStats::default();
        loop {
            let now = self.clock.now_secs();
            if let Some(frame) = self.driver.last_frame() {
                stats.frames_captured += self.capture.offer_frame(frame, now)?;
            }
            if self.driver.phase() == PlaybackPhase::Completed {
                stats.completed = true;
                self.capture.playback_completed(now);
            }
            if self.capture.poll(now)? {
                return Ok(stats);
            }

            stats.steps += 1;
            // Absolute positioning keeps microsecond rounding from accumulating.
            self.clock.set_secs(t0 + fps.frames_to_secs(stats.steps));
            while let Some(handle) = self.scheduler.take_due() {
                self.driver.tick(handle)?;
            }
        }
    }

    /// Render the frame shown `at_secs` into playback, then reset.
    ///
    /// Fixed-duration playback jumps straight to the position. Speech-gated playback steps at
    /// the capture rate, since scene changes depend on narration timing.
    pub fn render_still(&mut self, at_secs: f64) -> SlidesageResult<FrameRGBA> {
        if !at_secs.is_finite() || at_secs < 0.0 {
            return Err(SlidesageError::validation(
                "still time must be finite and >= 0",
            ));
        }
        let t0 = self.clock.now_secs();
        self.driver.reset()?;
        self.driver.start()?;

        match self.opts.playback.mode {
            PlaybackMode::FixedDuration => {
                self.clock.set_secs(t0 + at_secs);
                if let Some(handle) = self.scheduler.take_due() {
                    self.driver.tick(handle)?;
                }
            }
            PlaybackMode::SpeechGated => {
                let fps = self.opts.capture.fps;
                let steps = fps.secs_to_frames_floor(at_secs);
                for step in 1..=steps {
                    self.clock.set_secs(t0 + fps.frames_to_secs(step));
                    let Some(handle) = self.scheduler.take_due() else {
                        break;
                    };
                    self.driver.tick(handle)?;
                }
                self.clock.set_secs(t0 + at_secs);
                if let Some(handle) = self.scheduler.take_due() {
                    self.driver.tick(handle)?;
                }
            }
        }

        let frame = self
            .driver
            .last_frame()
            .cloned()
            .ok_or_else(|| SlidesageError::playback("no frame was rendered"))?;
        self.driver.reset()?;
        Ok(frame)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/explainer.rs"]
mod tests;
