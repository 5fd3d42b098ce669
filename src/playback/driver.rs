use crate::foundation::error::{SlidesageError, SlidesageResult};
use crate::foundation::math::clamp01;
use crate::media::handle::MediaHandle;
use crate::media::transport::{MediaTransport, TransportError};
use crate::narration::{
    NarrationId, NarrationOutcome, NarrationProvider, NarrationRequest, NarrationTicket,
    VoiceHint, estimate_narration_secs,
};
use crate::playback::clock::Clock;
use crate::playback::scheduler::{TickHandle, TickScheduler};
use crate::playback::state::{PlaybackConfig, PlaybackMode, PlaybackPhase, PlaybackState};
use crate::render::frame::FrameRGBA;
use crate::render::layout::progress_fraction;
use crate::render::{FrameRenderer, FrameView, SceneContent};
use crate::timeline::schedule::Timeline;

/// Named inputs to the playback state machine.
#[derive(Clone, Debug)]
pub enum PlaybackEvent {
    /// Begin playback from scene 0.
    Start,
    /// Freeze playback.
    Pause,
    /// Continue after a pause.
    Resume,
    /// Return to scene 0 and stop.
    Reset,
    /// Finish the current scene now.
    Skip,
    /// A scheduled frame tick fired.
    Tick(TickHandle),
    /// The narration provider finished a request.
    NarrationComplete {
        /// Request that finished.
        id: NarrationId,
        /// How it ended.
        outcome: NarrationOutcome,
    },
    /// Background media for a scene finished loading.
    MediaReady {
        /// Scene the media belongs to.
        scene: usize,
        /// Loaded media.
        media: MediaHandle,
    },
}

/// Whether an event changed the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// The event was handled.
    Applied,
    /// The event was stale or not valid in the current phase; nothing changed.
    Ignored,
}

/// Collaborators injected into the driver.
pub struct DriverDeps {
    /// Time source.
    pub clock: Box<dyn Clock>,
    /// Frame tick source.
    pub scheduler: Box<dyn TickScheduler>,
    /// Speech synthesis.
    pub narrator: Box<dyn NarrationProvider>,
    /// Frame renderer.
    pub renderer: Box<dyn FrameRenderer>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum NarrationWait {
    /// Narration will be requested at `at`.
    Scheduled { at: f64 },
    /// Waiting for the provider's completion signal.
    Pending { id: NarrationId, requested_at: f64 },
    /// Narration counts as finished at `at`.
    Deadline { id: NarrationId, at: f64 },
    /// Narration finished.
    Done,
}

/// Speech-gated fade-out before leaving a scene.
#[derive(Clone, Copy, Debug, PartialEq)]
struct FadeOut {
    until: f64,
    window: f64,
}

/// Single-writer playback state machine.
///
/// All inputs arrive through [`PlaybackDriver::dispatch`]. The driver keeps at most one
/// tick outstanding, renders only on ticks while playing (plus one frame on start,
/// resume and reset), and owns every media transport.
pub struct PlaybackDriver {
    title: String,
    scenes: Vec<SceneContent>,
    timeline: Timeline,
    config: PlaybackConfig,
    clock: Box<dyn Clock>,
    scheduler: Box<dyn TickScheduler>,
    narrator: Box<dyn NarrationProvider>,
    renderer: Box<dyn FrameRenderer>,
    transports: Vec<Box<dyn MediaTransport>>,
    state: PlaybackState,
    wait: NarrationWait,
    leaving: Option<FadeOut>,
    pending_tick: Option<TickHandle>,
    next_narration_id: u64,
    last_frame: Option<FrameRGBA>,
    frames_rendered: u64,
}

impl std::fmt::Debug for PlaybackDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackDriver")
            .field("title", &self.title)
            .field("scenes", &self.scenes.len())
            .field("config", &self.config)
            .field("state", &self.state)
            .field("wait", &self.wait)
            .field("leaving", &self.leaving)
            .field("pending_tick", &self.pending_tick)
            .field("frames_rendered", &self.frames_rendered)
            .finish_non_exhaustive()
    }
}

impl PlaybackDriver {
    /// Build a driver over `scenes`. Fails on an empty list or invalid durations.
    pub fn new(
        title: impl Into<String>,
        scenes: Vec<SceneContent>,
        config: PlaybackConfig,
        deps: DriverDeps,
    ) -> SlidesageResult<Self> {
        config.validate()?;
        let durations: Vec<f64> = scenes.iter().map(|s| s.duration_secs).collect();
        let timeline = Timeline::new(&durations)?;
        let transports = scenes.iter().map(|s| s.media.transport()).collect();
        let wait = NarrationWait::Scheduled {
            at: config.first_narration_delay_secs,
        };

        Ok(Self {
            title: title.into(),
            scenes,
            timeline,
            config,
            clock: deps.clock,
            scheduler: deps.scheduler,
            narrator: deps.narrator,
            renderer: deps.renderer,
            transports,
            state: PlaybackState::default(),
            wait,
            leaving: None,
            pending_tick: None,
            next_narration_id: 0,
            last_frame: None,
            frames_rendered: 0,
        })
    }

    /// Apply one event.
    #[tracing::instrument(level = "debug", skip(self), fields(phase = ?self.state.phase))]
    pub fn dispatch(&mut self, event: PlaybackEvent) -> SlidesageResult<Dispatch> {
        let now = self.clock.now_secs();
        match event {
            PlaybackEvent::Start => Ok(self.on_start(now)),
            PlaybackEvent::Pause => Ok(self.on_pause(now)),
            PlaybackEvent::Resume => Ok(self.on_resume(now)),
            PlaybackEvent::Reset => Ok(self.on_reset(now)),
            PlaybackEvent::Skip => Ok(self.on_skip(now)),
            PlaybackEvent::Tick(handle) => Ok(self.on_tick(handle, now)),
            PlaybackEvent::NarrationComplete { id, outcome } => {
                Ok(self.on_narration_complete(id, outcome, now))
            }
            PlaybackEvent::MediaReady { scene, media } => self.on_media_ready(scene, media, now),
        }
    }

    /// Shorthand for `dispatch(Start)`.
    pub fn start(&mut self) -> SlidesageResult<Dispatch> {
        self.dispatch(PlaybackEvent::Start)
    }

    /// Shorthand for `dispatch(Pause)`.
    pub fn pause(&mut self) -> SlidesageResult<Dispatch> {
        self.dispatch(PlaybackEvent::Pause)
    }

    /// Shorthand for `dispatch(Resume)`.
    pub fn resume(&mut self) -> SlidesageResult<Dispatch> {
        self.dispatch(PlaybackEvent::Resume)
    }

    /// Shorthand for `dispatch(Reset)`.
    pub fn reset(&mut self) -> SlidesageResult<Dispatch> {
        self.dispatch(PlaybackEvent::Reset)
    }

    /// Shorthand for `dispatch(Skip)`.
    pub fn skip(&mut self) -> SlidesageResult<Dispatch> {
        self.dispatch(PlaybackEvent::Skip)
    }

    /// Shorthand for `dispatch(Tick(handle))`.
    pub fn tick(&mut self, handle: TickHandle) -> SlidesageResult<Dispatch> {
        self.dispatch(PlaybackEvent::Tick(handle))
    }

    /// Shorthand for `dispatch(NarrationComplete { .. })`.
    pub fn narration_complete(
        &mut self,
        id: NarrationId,
        outcome: NarrationOutcome,
    ) -> SlidesageResult<Dispatch> {
        self.dispatch(PlaybackEvent::NarrationComplete { id, outcome })
    }

    /// Shorthand for `dispatch(MediaReady { .. })`.
    pub fn media_ready(&mut self, scene: usize, media: MediaHandle) -> SlidesageResult<Dispatch> {
        self.dispatch(PlaybackEvent::MediaReady { scene, media })
    }

    /// Current phase.
    pub fn phase(&self) -> PlaybackPhase {
        self.state.phase
    }

    /// Full bookkeeping snapshot.
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Driver configuration.
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Scene schedule derived from the scene durations.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Content of scene `index`.
    pub fn scene(&self, index: usize) -> Option<&SceneContent> {
        self.scenes.get(index)
    }

    /// Scene on screen.
    pub fn current_scene_index(&self) -> usize {
        self.state.current_scene_index
    }

    /// Seconds spent in the current scene, excluding paused time.
    pub fn scene_elapsed_secs(&self) -> f64 {
        if self.state.phase == PlaybackPhase::Idle {
            return 0.0;
        }
        self.scene_elapsed_at(self.state.current_scene_index, self.accounting_now())
    }

    /// Progress within the current scene, `[0, 1]`.
    pub fn scene_progress(&self) -> f64 {
        self.position(self.accounting_now()).1
    }

    /// Filled fraction of the progress bar.
    pub fn progress_fraction(&self) -> f64 {
        let (index, progress, _) = self.position(self.accounting_now());
        progress_fraction(index, progress, self.scenes.len())
    }

    /// Most recently rendered frame.
    pub fn last_frame(&self) -> Option<&FrameRGBA> {
        self.last_frame.as_ref()
    }

    /// Number of frames rendered so far.
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Outstanding tick, if any.
    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending_tick
    }

    /// Narration request the driver is waiting on, if any.
    pub fn active_narration(&self) -> Option<NarrationId> {
        match self.wait {
            NarrationWait::Pending { id, .. } | NarrationWait::Deadline { id, .. } => Some(id),
            NarrationWait::Scheduled { .. } | NarrationWait::Done => None,
        }
    }

    /// Media clock of scene `index` at the current time.
    pub fn media_position(&self, index: usize) -> Option<f64> {
        let now = self.clock.now_secs();
        self.transports.get(index).map(|t| t.position(now))
    }

    /// Whether the media of scene `index` is advancing.
    pub fn media_playing(&self, index: usize) -> Option<bool> {
        self.transports.get(index).map(|t| t.is_playing())
    }

    /// Swap the transport controlling scene `index`.
    pub fn replace_transport(
        &mut self,
        index: usize,
        transport: Box<dyn MediaTransport>,
    ) -> SlidesageResult<()> {
        let slot = self.transports.get_mut(index).ok_or_else(|| {
            SlidesageError::playback(format!("scene index {index} out of range"))
        })?;
        *slot = transport;
        Ok(())
    }

    /// Render frame 0 without changing state. Used before the first start.
    pub fn render_idle_frame(&mut self) {
        let now = self.clock.now_secs();
        self.render(now);
    }

    fn on_start(&mut self, now: f64) -> Dispatch {
        match self.state.phase {
            PlaybackPhase::Playing | PlaybackPhase::Paused => return Dispatch::Ignored,
            PlaybackPhase::Idle | PlaybackPhase::Completed => {}
        }
        self.cancel_tick();
        self.cancel_narration();
        for i in 0..self.transports.len() {
            self.transport_op(i, now, |t, now| t.pause(now));
            self.transport_op(i, now, |t, now| t.rewind(now));
        }

        self.state = PlaybackState {
            phase: PlaybackPhase::Playing,
            start_wall_clock: Some(now),
            current_scene_index: 0,
            scene_start_wall_clock: Some(now),
            speech_complete: false,
            transition_in_flight: false,
            frozen_at: None,
        };
        self.wait = NarrationWait::Scheduled {
            at: now + self.config.first_narration_delay_secs,
        };
        self.leaving = None;
        self.transport_op(0, now, |t, now| t.play(now));
        tracing::debug!(mode = ?self.config.mode, "playback started");

        self.render(now);
        self.schedule_tick();
        Dispatch::Applied
    }

    fn on_pause(&mut self, now: f64) -> Dispatch {
        if self.state.phase != PlaybackPhase::Playing {
            return Dispatch::Ignored;
        }
        self.cancel_tick();
        self.cancel_narration();
        self.wait = NarrationWait::Scheduled { at: now };
        // The scene's narration is spoken again after resume, so a fade-out restarts too.
        self.leaving = None;
        self.state.speech_complete = false;
        self.state.transition_in_flight = false;
        self.state.phase = PlaybackPhase::Paused;
        self.state.frozen_at = Some(now);
        let index = self.state.current_scene_index;
        self.transport_op(index, now, |t, now| t.pause(now));
        tracing::debug!(scene = index, "playback paused");
        Dispatch::Applied
    }

    fn on_resume(&mut self, now: f64) -> Dispatch {
        if self.state.phase != PlaybackPhase::Paused {
            return Dispatch::Ignored;
        }
        let gap = self.state.frozen_at.map_or(0.0, |at| (now - at).max(0.0));
        let shift = |v: &mut Option<f64>| {
            if let Some(v) = v {
                *v += gap;
            }
        };
        shift(&mut self.state.start_wall_clock);
        shift(&mut self.state.scene_start_wall_clock);
        if let NarrationWait::Scheduled { at } = &mut self.wait {
            *at += gap;
        }
        self.state.frozen_at = None;
        self.state.phase = PlaybackPhase::Playing;
        let index = self.state.current_scene_index;
        self.transport_op(index, now, |t, now| t.play(now));
        tracing::debug!(scene = index, gap, "playback resumed");

        self.render(now);
        self.schedule_tick();
        Dispatch::Applied
    }

    fn on_reset(&mut self, now: f64) -> Dispatch {
        self.cancel_tick();
        self.cancel_narration();
        for i in 0..self.transports.len() {
            self.transport_op(i, now, |t, now| t.pause(now));
            self.transport_op(i, now, |t, now| t.rewind(now));
        }
        self.state = PlaybackState::default();
        self.wait = NarrationWait::Scheduled {
            at: self.config.first_narration_delay_secs,
        };
        self.leaving = None;
        tracing::debug!("playback reset");
        self.render(now);
        Dispatch::Applied
    }

    fn on_skip(&mut self, now: f64) -> Dispatch {
        if self.state.phase != PlaybackPhase::Playing || self.state.transition_in_flight {
            return Dispatch::Ignored;
        }
        let index = self.state.current_scene_index;
        tracing::debug!(scene = index, "scene skipped");
        let finished = match self.config.mode {
            PlaybackMode::FixedDuration => {
                let end = self.timeline.span(index).map_or(0.0, |s| s.end());
                let elapsed = self.total_elapsed(now);
                if let Some(start) = &mut self.state.start_wall_clock {
                    *start -= (end - elapsed).max(0.0);
                }
                self.sync_fixed(now)
            }
            PlaybackMode::SpeechGated => {
                self.cancel_narration();
                self.wait = NarrationWait::Done;
                self.state.speech_complete = true;
                self.leaving = None;
                self.leave_scene(now)
            }
        };
        self.render(now);
        if finished {
            self.complete(now);
        }
        Dispatch::Applied
    }

    fn on_tick(&mut self, handle: TickHandle, now: f64) -> Dispatch {
        if self.state.phase != PlaybackPhase::Playing || self.pending_tick != Some(handle) {
            return Dispatch::Ignored;
        }
        self.pending_tick = None;

        let finished = match self.config.mode {
            PlaybackMode::FixedDuration => self.sync_fixed(now),
            PlaybackMode::SpeechGated => self.sync_speech_gated(now),
        };
        self.render(now);
        if finished {
            self.complete(now);
        } else {
            self.schedule_tick();
        }
        Dispatch::Applied
    }

    fn on_narration_complete(
        &mut self,
        id: NarrationId,
        outcome: NarrationOutcome,
        now: f64,
    ) -> Dispatch {
        if self.state.phase != PlaybackPhase::Playing || self.state.transition_in_flight {
            return Dispatch::Ignored;
        }
        let NarrationWait::Pending {
            id: waiting,
            requested_at,
        } = self.wait
        else {
            return Dispatch::Ignored;
        };
        if waiting != id {
            return Dispatch::Ignored;
        }

        match outcome {
            NarrationOutcome::Finished => {
                tracing::debug!(?id, "narration finished");
                self.wait = NarrationWait::Done;
                self.state.speech_complete = true;
                if self.advance_speech_gated(now) {
                    self.complete(now);
                }
            }
            NarrationOutcome::Failed(reason) => {
                let estimate = self.narration_estimate(self.state.current_scene_index);
                tracing::warn!(?id, %reason, estimate, "narration failed, using estimate");
                self.wait = NarrationWait::Deadline {
                    id,
                    at: requested_at + estimate,
                };
            }
        }
        Dispatch::Applied
    }

    fn on_media_ready(
        &mut self,
        scene: usize,
        media: MediaHandle,
        now: f64,
    ) -> SlidesageResult<Dispatch> {
        if scene >= self.scenes.len() {
            return Err(SlidesageError::playback(format!(
                "media for scene {scene} out of range ({} scenes)",
                self.scenes.len()
            )));
        }
        tracing::debug!(scene, kind = media.kind(), "media ready");
        self.transport_op(scene, now, |t, now| t.pause(now));
        self.transports[scene] = media.transport();
        self.scenes[scene].media = media;
        if self.state.phase == PlaybackPhase::Playing && scene == self.state.current_scene_index {
            self.transport_op(scene, now, |t, now| t.play(now));
        }
        Ok(Dispatch::Applied)
    }

    /// Move to the scene the timeline says is current. Returns true once time is up.
    fn sync_fixed(&mut self, now: f64) -> bool {
        let elapsed = self.total_elapsed(now);
        let pos = self.timeline.scene_at(elapsed);
        if pos.index != self.state.current_scene_index {
            self.enter_scene(pos.index, now);
        }
        elapsed >= self.timeline.total_duration()
    }

    /// Drive narration for the current scene. Returns true once the last scene is done.
    fn sync_speech_gated(&mut self, now: f64) -> bool {
        let wait = self.wait;
        match wait {
            NarrationWait::Scheduled { at } if now >= at => self.request_narration(now),
            NarrationWait::Deadline { id, at } if now >= at => {
                tracing::debug!(?id, "narration deadline reached");
                self.wait = NarrationWait::Done;
                self.state.speech_complete = true;
            }
            _ => {}
        }
        self.advance_speech_gated(now)
    }

    /// Once narration is done, fade the scene out and then advance. Returns true when the
    /// last scene has faded out.
    fn advance_speech_gated(&mut self, now: f64) -> bool {
        if !self.state.speech_complete {
            return false;
        }
        let fade_out = match self.leaving {
            Some(fade_out) => fade_out,
            None => {
                let window = self.timeline.fade().window_secs(self.gated_duration());
                let fade_out = FadeOut {
                    until: now + window,
                    window,
                };
                self.leaving = Some(fade_out);
                self.state.transition_in_flight = true;
                tracing::debug!(scene = self.state.current_scene_index, window, "scene fading out");
                fade_out
            }
        };
        if now < fade_out.until {
            return false;
        }
        self.leave_scene(now)
    }

    /// Move to the next scene now. Returns true when there is none; the last scene keeps
    /// its fade-out so the final frame stays dark.
    fn leave_scene(&mut self, now: f64) -> bool {
        let index = self.state.current_scene_index;
        if index + 1 >= self.scenes.len() {
            return true;
        }
        self.leaving = None;
        self.state.transition_in_flight = true;
        self.enter_scene(index + 1, now);
        self.state.scene_start_wall_clock = Some(now);
        self.state.speech_complete = false;
        self.wait = NarrationWait::Scheduled {
            at: now + self.config.advance_delay_secs,
        };
        false
    }

    fn enter_scene(&mut self, index: usize, now: f64) {
        let from = self.state.current_scene_index;
        self.transport_op(from, now, |t, now| t.pause(now));
        self.state.current_scene_index = index;
        self.transport_op(index, now, |t, now| t.rewind(now));
        self.transport_op(index, now, |t, now| t.play(now));
        tracing::debug!(from, to = index, "scene advanced");
    }

    fn request_narration(&mut self, now: f64) {
        let index = self.state.current_scene_index;
        self.next_narration_id += 1;
        let id = NarrationId(self.next_narration_id);
        let scene = &self.scenes[index];
        let request = NarrationRequest {
            id,
            scene_index: index,
            speaker: scene.speaker,
            text: scene.caption.clone(),
            voice: VoiceHint::for_speaker(scene.speaker),
        };

        self.wait = match self.narrator.speak(&request) {
            Ok(NarrationTicket::Pending) => NarrationWait::Pending {
                id,
                requested_at: now,
            },
            Ok(NarrationTicket::Timed { duration_secs }) => NarrationWait::Deadline {
                id,
                at: now + duration_secs.max(0.0),
            },
            Err(err) => {
                let estimate = self.narration_estimate(index);
                tracing::warn!(%err, scene = index, estimate, "narration unavailable, using estimate");
                NarrationWait::Deadline {
                    id,
                    at: now + estimate,
                }
            }
        };
        self.state.transition_in_flight = false;
        tracing::debug!(?id, scene = index, "narration requested");
    }

    fn complete(&mut self, now: f64) {
        self.cancel_tick();
        self.cancel_narration();
        for i in 0..self.transports.len() {
            self.transport_op(i, now, |t, now| t.pause(now));
        }
        self.state.phase = PlaybackPhase::Completed;
        self.state.transition_in_flight = false;
        self.state.frozen_at = Some(now);
        tracing::debug!(frames = self.frames_rendered, "playback completed");
    }

    fn cancel_tick(&mut self) {
        if let Some(handle) = self.pending_tick.take() {
            self.scheduler.cancel_tick(handle);
        }
    }

    fn schedule_tick(&mut self) {
        self.cancel_tick();
        self.pending_tick = Some(self.scheduler.request_tick());
    }

    fn cancel_narration(&mut self) {
        if let Some(id) = self.active_narration() {
            self.narrator.cancel(id);
        }
    }

    fn transport_op(
        &mut self,
        index: usize,
        now: f64,
        op: impl FnOnce(&mut dyn MediaTransport, f64) -> Result<(), TransportError>,
    ) {
        let Some(transport) = self.transports.get_mut(index) else {
            return;
        };
        // Pausing media that is already paused is expected on every exit path.
        if let Err(err) = op(transport.as_mut(), now) {
            tracing::trace!(%err, scene = index, "media transport op skipped");
        }
    }

    fn narration_estimate(&self, index: usize) -> f64 {
        self.scenes.get(index).map_or(0.0, |s| {
            estimate_narration_secs(&s.caption, self.config.words_per_second)
        })
    }

    fn accounting_now(&self) -> f64 {
        match self.state.phase {
            PlaybackPhase::Paused | PlaybackPhase::Completed => self
                .state
                .frozen_at
                .unwrap_or_else(|| self.clock.now_secs()),
            PlaybackPhase::Idle | PlaybackPhase::Playing => self.clock.now_secs(),
        }
    }

    fn total_elapsed(&self, now: f64) -> f64 {
        self.state
            .start_wall_clock
            .map_or(0.0, |start| (now - start).max(0.0))
    }

    /// `(scene index, progress, opacity)` at `now`.
    fn position(&self, now: f64) -> (usize, f64, f64) {
        if self.state.phase == PlaybackPhase::Idle {
            let opacity = self.timeline.fade().opacity_at(0.0, self.scenes[0].duration_secs);
            return (0, 0.0, opacity);
        }
        match self.config.mode {
            PlaybackMode::FixedDuration => {
                let pos = self.timeline.scene_at(self.total_elapsed(now));
                (pos.index, pos.progress, self.timeline.opacity_for(pos))
            }
            PlaybackMode::SpeechGated => {
                let index = self.state.current_scene_index;
                let duration = self.gated_duration();
                let elapsed = self
                    .state
                    .scene_start_wall_clock
                    .map_or(0.0, |s| (now - s).max(0.0));
                let progress = clamp01(elapsed / duration);
                let fade = self.timeline.fade();
                let window = fade.window_secs(duration);
                // The fade-out follows the narration, not the declared duration.
                let mut opacity = if elapsed < window {
                    fade.fade_in.apply(elapsed / window)
                } else {
                    1.0
                };
                if let Some(fade_out) = self.leaving {
                    let remaining = if fade_out.window > 0.0 {
                        clamp01((fade_out.until - now) / fade_out.window)
                    } else {
                        0.0
                    };
                    opacity *= fade.fade_out.apply(remaining);
                }
                (index, progress, clamp01(opacity))
            }
        }
    }

    /// Visual length of the current scene in speech-gated mode.
    fn gated_duration(&self) -> f64 {
        self.scenes[self.state.current_scene_index]
            .duration_secs
            .max(self.config.min_scene_secs)
    }

    fn render(&mut self, now: f64) {
        let (index, progress, opacity) = self.position(now);
        let media_time = self.transports.get(index).map_or(0.0, |t| t.position(now));
        let elapsed_secs = match self.state.phase {
            PlaybackPhase::Idle => 0.0,
            _ => self.scene_elapsed_at(index, now),
        };
        let view = FrameView {
            title: &self.title,
            scene: &self.scenes[index],
            scene_index: index,
            scene_count: self.scenes.len(),
            progress,
            opacity,
            media_time,
            elapsed_secs,
        };
        match self.renderer.render(&view) {
            Ok(frame) => {
                self.last_frame = Some(frame);
                self.frames_rendered += 1;
            }
            Err(err) => tracing::warn!(%err, scene = index, "frame render failed"),
        }
    }

    fn scene_elapsed_at(&self, index: usize, now: f64) -> f64 {
        match self.config.mode {
            PlaybackMode::FixedDuration => {
                let start = self.timeline.span(index).map_or(0.0, |s| s.start);
                (self.total_elapsed(now) - start).max(0.0)
            }
            PlaybackMode::SpeechGated => self
                .state
                .scene_start_wall_clock
                .map_or(0.0, |s| (now - s).max(0.0)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/driver.rs"]
mod tests;
