use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::{
    adaptive::{
        lock_or_recover, AdaptiveController, AdaptiveSnapshot, Adjustment, InteractionHandle,
    },
    audio::{AudioBackend, AudioGraph, GainStage},
    automation::{FrameTargets, ParameterScheduler},
    config::EngineConfig,
    mapping,
    profile::SoundProfile,
    timeline::TimeSource,
    DriftwaveError, Result,
};

/// Position of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub elapsed_seconds: f64,
    pub remaining_seconds: f64,
    /// Always within `[0, 1]`.
    pub progress: f64,
}

/// Emitted once when a session runs to the end of its profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEvent {
    pub profile_id: String,
    pub profile_name: String,
    pub duration_seconds: u32,
    pub pro_mode_enabled: bool,
    /// True if any adaptive offset was non-zero when the session ended.
    pub was_adapted: bool,
}

/// Result of a single [`Engine::frame`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No session is playing.
    Idle,
    /// Targets were computed and pushed to the audio graph.
    Updated(FrameTargets),
    /// The session reached its duration and has been stopped.
    Completed(CompletionEvent),
}

/// Parameter that can be auditioned outside of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewLayer {
    Frequency,
    Texture,
    Density,
}

impl FromStr for PreviewLayer {
    type Err = DriftwaveError;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "frequency" => Ok(Self::Frequency),
            "texture" => Ok(Self::Texture),
            "density" => Ok(Self::Density),
            _ => Err(DriftwaveError::UnknownLayer(name.to_string())),
        }
    }
}

type CompletionListener = Box<dyn FnMut(&CompletionEvent) + Send>;

#[derive(Debug)]
struct Session {
    profile: Arc<SoundProfile>,
    /// Copied at session creation; loading another profile mid-session does
    /// not move the finish line.
    duration_seconds: u32,
    /// Clock reading at which elapsed time is zero. Shifted on resume.
    started_at: f64,
    /// Elapsed time frozen by `pause`.
    paused_elapsed: Option<f64>,
}

impl Session {
    fn elapsed_at(&self, now: f64) -> f64 {
        match self.paused_elapsed {
            Some(elapsed) => elapsed,
            None => (now - self.started_at).max(0.0),
        }
    }
}

/// Owns one session at a time and drives an [`AudioGraph`] from a profile.
///
/// Hosts call [`Engine::frame`] once per rendering frame. Lifecycle calls take
/// `&mut self`, so they can never interleave with a frame; interactions from
/// other threads go through an [`InteractionHandle`].
pub struct Engine {
    config: EngineConfig,
    scheduler: ParameterScheduler,
    graph: Box<dyn AudioGraph + Send>,
    clock: Arc<dyn TimeSource>,
    adaptive: Arc<Mutex<AdaptiveController>>,
    profile: Option<Arc<SoundProfile>>,
    session: Option<Session>,
    playing: bool,
    master_volume: f64,
    preview_deadline: Option<f64>,
    listeners: Vec<CompletionListener>,
}

impl Engine {
    /// Acquires an audio graph from `backend`. Fails with
    /// [`DriftwaveError::AudioUnavailable`] if the platform refuses.
    pub fn new(
        config: EngineConfig,
        backend: &dyn AudioBackend,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self> {
        let mut graph = backend.open().map_err(|err| {
            tracing::error!(%err, "could not acquire audio graph");
            err
        })?;

        let master_volume = config.master_volume.clamp(0.0, 1.0);
        graph.set_gain(GainStage::Master, master_volume, 0.0);

        Ok(Self {
            scheduler: ParameterScheduler::new(config.clone()),
            adaptive: Arc::new(Mutex::new(AdaptiveController::new(config.adaptive.clone()))),
            config,
            graph,
            clock,
            profile: None,
            session: None,
            playing: false,
            master_volume,
            preview_deadline: None,
            listeners: Vec::new(),
        })
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn profile(&self) -> Option<&Arc<SoundProfile>> {
        self.profile.as_ref()
    }

    pub fn master_volume(&self) -> f64 {
        self.master_volume
    }

    /// Makes `profile` the one used by the next `play`. Always discards the
    /// adaptation history. A running session keeps its own profile.
    pub fn load_profile(&mut self, profile: Arc<SoundProfile>) {
        tracing::info!(id = %profile.id, name = %profile.name, "profile loaded");
        lock_or_recover(&self.adaptive).reset();
        self.profile = Some(profile);
    }

    /// Starts or resumes a session. Does nothing if already playing or if no
    /// profile is loaded.
    pub fn play(&mut self) {
        if self.playing {
            return;
        }
        let Some(profile) = self.profile.clone() else {
            tracing::debug!("play ignored, no profile loaded");
            return;
        };

        let now = self.clock.now();
        let session = match self.session.take() {
            Some(mut paused) if Arc::ptr_eq(&paused.profile, &profile) => {
                let elapsed = paused.paused_elapsed.take().unwrap_or(0.0);
                paused.started_at = now - elapsed;
                tracing::info!(id = %profile.id, elapsed, "session resumed");
                paused
            }
            _ => {
                tracing::info!(
                    id = %profile.id,
                    duration = profile.duration_seconds,
                    "session started"
                );
                Session {
                    duration_seconds: profile.duration_seconds,
                    profile,
                    started_at: now,
                    paused_elapsed: None,
                }
            }
        };

        if self.preview_deadline.take().is_some() {
            self.graph.stop_oscillator();
        }
        self.graph.start_oscillator();
        self.graph
            .set_gain(GainStage::Master, self.master_volume, self.config.slow_glide_seconds);

        lock_or_recover(&self.adaptive).open_window(session.started_at);
        self.session = Some(session);
        self.playing = true;
    }

    /// Halts the oscillator and frame updates, keeping the position and the
    /// adaptive state. Does nothing if not playing.
    pub fn pause(&mut self) {
        if !self.playing {
            return;
        }
        let now = self.clock.now();
        self.halt();
        if let Some(session) = self.session.as_mut() {
            let elapsed = session.elapsed_at(now);
            session.paused_elapsed = Some(elapsed);
            tracing::info!(elapsed, "session paused");
        }
    }

    /// Like `pause`, but also forgets the session position.
    pub fn stop(&mut self) {
        if self.playing {
            self.halt();
        }
        if self.session.take().is_some() {
            tracing::info!("session stopped");
        }
    }

    fn halt(&mut self) {
        self.playing = false;
        self.graph.stop_oscillator();
        lock_or_recover(&self.adaptive).close_window();
    }

    /// Per-frame callback. Expires previews, completes the session when its
    /// duration is reached, and otherwise pushes fresh targets to the graph.
    pub fn frame(&mut self) -> TickOutcome {
        let now = self.clock.now();
        self.expire_preview(now);

        if !self.playing {
            return TickOutcome::Idle;
        }
        let Some(session) = self.session.as_ref() else {
            return TickOutcome::Idle;
        };

        let duration = f64::from(session.duration_seconds);
        let elapsed = session.elapsed_at(now);
        if elapsed >= duration {
            return match self.session.take() {
                Some(session) => TickOutcome::Completed(self.complete(session)),
                None => TickOutcome::Idle,
            };
        }

        let offsets = lock_or_recover(&self.adaptive).offsets();
        let targets = self
            .scheduler
            .compute_at_elapsed(&session.profile, elapsed, now, offsets);
        self.scheduler.push(&targets, self.graph.as_mut());
        TickOutcome::Updated(targets)
    }

    fn complete(&mut self, session: Session) -> CompletionEvent {
        let snapshot = lock_or_recover(&self.adaptive).snapshot();
        self.halt();

        let event = CompletionEvent {
            profile_id: session.profile.id.clone(),
            profile_name: session.profile.name.clone(),
            duration_seconds: session.duration_seconds,
            pro_mode_enabled: snapshot.pro_mode,
            was_adapted: !snapshot.offsets.is_zero(),
        };

        tracing::info!(
            id = %event.profile_id,
            was_adapted = event.was_adapted,
            "session complete"
        );
        for listener in &mut self.listeners {
            listener(&event);
        }
        event
    }

    /// Registers a callback invoked on every session completion.
    pub fn on_complete<F>(&mut self, listener: F)
    where
        F: FnMut(&CompletionEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn progress(&self) -> Progress {
        let now = self.clock.now();
        let (elapsed, duration) = match &self.session {
            Some(session) => {
                let duration = f64::from(session.duration_seconds);
                (session.elapsed_at(now).min(duration), duration)
            }
            None => (
                0.0,
                self.profile
                    .as_ref()
                    .map(|p| f64::from(p.duration_seconds))
                    .unwrap_or(0.0),
            ),
        };

        Progress {
            elapsed_seconds: elapsed,
            remaining_seconds: (duration - elapsed).max(0.0),
            progress: if duration > 0.0 {
                (elapsed / duration).clamp(0.0, 1.0)
            } else {
                0.0
            },
        }
    }

    pub fn set_pro_mode(&mut self, enabled: bool) -> Result<()> {
        self.lock_adaptive()?.set_pro_mode(enabled);
        tracing::info!(enabled, "pro mode toggled");
        Ok(())
    }

    pub fn pro_mode(&self) -> Result<bool> {
        Ok(self.lock_adaptive()?.pro_mode())
    }

    pub fn adaptive_snapshot(&self) -> Result<AdaptiveSnapshot> {
        Ok(self.lock_adaptive()?.snapshot())
    }

    /// Records a listener interaction. Ignored unless Pro Mode is on and a
    /// session is playing.
    pub fn record_interaction(&self) -> Result<Adjustment> {
        let now = self.clock.now();
        Ok(self.lock_adaptive()?.record_interaction(now))
    }

    /// Handle for recording interactions from input-handling threads.
    pub fn interaction_handle(&self) -> InteractionHandle {
        InteractionHandle::new(self.adaptive.clone(), self.clock.clone())
    }

    /// Applies one layer value directly to the graph. Outside a session the
    /// oscillator is started and stopped again after the preview timeout.
    pub fn preview_layer(&mut self, layer: PreviewLayer, value: f64) {
        let value = value.clamp(0.0, 1.0);
        let slow = self.config.slow_glide_seconds;
        let fast = self.config.fast_glide_seconds;

        if !self.playing {
            if self.preview_deadline.is_none() {
                self.graph.start_oscillator();
                self.graph.set_gain(GainStage::Gate, 1.0, fast);
            }
            self.preview_deadline = Some(self.clock.now() + self.config.preview_timeout_seconds);
        }

        match layer {
            PreviewLayer::Frequency => self.graph.set_frequency(mapping::frequency_hz(value), fast),
            PreviewLayer::Texture => {
                let texture = mapping::texture(value);
                self.graph.set_cutoff(texture.cutoff_hz, slow);
                self.graph.set_q(texture.q, slow);
            }
            PreviewLayer::Density => {
                self.graph
                    .set_gain(GainStage::Density, mapping::texture(value).density_gain, slow)
            }
        }
        tracing::debug!(?layer, value, "layer preview");
    }

    /// True while a preview started outside a session is still sounding.
    pub fn is_previewing(&self) -> bool {
        self.preview_deadline.is_some()
    }

    fn expire_preview(&mut self, now: f64) {
        if let Some(deadline) = self.preview_deadline {
            if now >= deadline {
                self.preview_deadline = None;
                if !self.playing {
                    self.graph.stop_oscillator();
                }
            }
        }
    }

    /// Sets the master gain, clamped to `[0, 1]`.
    pub fn set_master_volume(&mut self, volume: f64) {
        self.master_volume = volume.clamp(0.0, 1.0);
        self.graph
            .set_gain(GainStage::Master, self.master_volume, self.config.slow_glide_seconds);
    }

    fn lock_adaptive(&self) -> Result<MutexGuard<'_, AdaptiveController>> {
        self.adaptive
            .lock()
            .map_err(|_| DriftwaveError::msg("adaptive state has been poisoned"))
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("profile", &self.profile.as_ref().map(|p| p.id.as_str()))
            .field("session", &self.session)
            .field("playing", &self.playing)
            .field("master_volume", &self.master_volume)
            .field("preview_deadline", &self.preview_deadline)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        audio::{RecordingBackend, RecordingGraph, UnavailableBackend},
        profile::{CurvePoint, SilenceBlock},
        timeline::ManualClock,
    };

    struct Rig {
        engine: Engine,
        clock: ManualClock,
        graph: RecordingGraph,
        events: Arc<Mutex<Vec<CompletionEvent>>>,
    }

    fn rig() -> Rig {
        let clock = ManualClock::new();
        let backend = RecordingBackend::new();
        let mut engine =
            Engine::new(EngineConfig::default(), &backend, Arc::new(clock.clone())).unwrap();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        engine.on_complete(move |event| sink.lock().unwrap().push(event.clone()));
        Rig {
            engine,
            clock,
            graph: backend.graph(),
            events,
        }
    }

    fn flat_profile(duration_seconds: u32) -> Arc<SoundProfile> {
        let mut profile = SoundProfile::new("flat", "Flat", duration_seconds);
        profile.base_frequency_curve = vec![CurvePoint::new(0.0, 0.5)];
        Arc::new(profile)
    }

    /// Advances in quarter-second frames until `seconds` have passed.
    fn run_for(rig: &mut Rig, seconds: f64) -> Vec<TickOutcome> {
        let mut outcomes = Vec::new();
        let frames = (seconds / 0.25).round() as usize;
        for _ in 0..frames {
            rig.clock.advance(0.25);
            outcomes.push(rig.engine.frame());
        }
        outcomes
    }

    #[test]
    fn unavailable_backend_fails_construction() {
        let err = Engine::new(
            EngineConfig::default(),
            &UnavailableBackend::new("denied"),
            Arc::new(ManualClock::new()),
        )
        .unwrap_err();
        assert!(matches!(err, DriftwaveError::AudioUnavailable(_)));
    }

    #[test]
    fn play_without_profile_is_a_no_op() {
        let mut rig = rig();
        rig.engine.play();
        assert!(!rig.engine.is_playing());
        assert_eq!(rig.engine.frame(), TickOutcome::Idle);
        assert_eq!(rig.graph.snapshot().oscillator_starts, 0);
    }

    #[test]
    fn play_twice_starts_once() {
        let mut rig = rig();
        rig.engine.load_profile(flat_profile(100));
        rig.engine.play();
        rig.engine.play();
        assert!(rig.engine.is_playing());
        assert_eq!(rig.graph.snapshot().oscillator_starts, 1);
    }

    #[test]
    fn full_session_completes_exactly_once() {
        let mut rig = rig();
        rig.engine.load_profile(flat_profile(100));
        rig.engine.play();

        let outcomes = run_for(&mut rig, 110.0);
        let completions = outcomes
            .iter()
            .filter(|o| matches!(o, TickOutcome::Completed(_)))
            .count();
        assert_eq!(completions, 1);
        assert!(matches!(outcomes.last(), Some(TickOutcome::Idle)));

        let events = rig.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0],
            CompletionEvent {
                profile_id: "flat".into(),
                profile_name: "Flat".into(),
                duration_seconds: 100,
                pro_mode_enabled: false,
                was_adapted: false,
            }
        );
        assert!(!rig.engine.is_playing());
        assert!(!rig.graph.snapshot().oscillator_running);
    }

    #[test]
    fn progress_tracks_elapsed_time() {
        let mut rig = rig();
        rig.engine.load_profile(flat_profile(100));
        assert_eq!(rig.engine.progress().remaining_seconds, 100.0);

        rig.engine.play();
        run_for(&mut rig, 25.0);
        let progress = rig.engine.progress();
        assert_eq!(progress.elapsed_seconds, 25.0);
        assert_eq!(progress.remaining_seconds, 75.0);
        assert_eq!(progress.progress, 0.25);
    }

    #[test]
    fn pause_freezes_position_and_silences_frames() {
        let mut rig = rig();
        rig.engine.load_profile(flat_profile(100));
        rig.engine.play();
        run_for(&mut rig, 10.0);

        rig.engine.pause();
        rig.graph.clear_history();
        let stray = rig.graph.snapshot().updates_while_stopped;
        let outcomes = run_for(&mut rig, 30.0);
        assert!(outcomes.iter().all(|o| *o == TickOutcome::Idle));
        assert!(rig.graph.history().is_empty());
        assert_eq!(rig.graph.snapshot().updates_while_stopped, stray);
        assert_eq!(rig.engine.progress().elapsed_seconds, 10.0);

        rig.engine.play();
        run_for(&mut rig, 5.0);
        assert_eq!(rig.engine.progress().elapsed_seconds, 15.0);
        assert_eq!(rig.graph.snapshot().oscillator_starts, 2);
    }

    #[test]
    fn stop_forgets_position() {
        let mut rig = rig();
        rig.engine.load_profile(flat_profile(100));
        rig.engine.play();
        run_for(&mut rig, 10.0);
        rig.engine.stop();
        assert_eq!(rig.engine.progress().elapsed_seconds, 0.0);

        rig.engine.play();
        run_for(&mut rig, 1.0);
        assert_eq!(rig.engine.progress().elapsed_seconds, 1.0);
    }

    #[test]
    fn overlapping_silence_gates_the_union() {
        let mut rig = rig();
        let mut profile = SoundProfile::new("gaps", "Gaps", 100);
        profile.silence_blocks = vec![SilenceBlock::new(10.0, 5.0), SilenceBlock::new(12.0, 5.0)];
        rig.engine.load_profile(Arc::new(profile));
        rig.engine.play();

        for (i, outcome) in run_for(&mut rig, 20.0).into_iter().enumerate() {
            let elapsed = (i + 1) as f64 * 0.25;
            let TickOutcome::Updated(targets) = outcome else {
                panic!("expected an update at {elapsed}");
            };
            let expected = if (10.0..17.0).contains(&elapsed) { 0.0 } else { 1.0 };
            assert_eq!(targets.gate, expected, "gate at {elapsed}");
        }
    }

    #[test]
    fn pro_mode_adaptation_is_reported_on_completion() {
        let mut rig = rig();
        rig.engine.load_profile(flat_profile(60));
        rig.engine.set_pro_mode(true).unwrap();
        rig.engine.play();
        run_for(&mut rig, 5.0);
        assert_eq!(rig.engine.record_interaction().unwrap(), Adjustment::Calmed);

        let lowered = match rig.engine.frame() {
            TickOutcome::Updated(targets) => targets.base_frequency_hz,
            other => panic!("unexpected {other:?}"),
        };
        assert!(lowered < mapping::frequency_hz(0.5));

        run_for(&mut rig, 60.0);
        let events = rig.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].pro_mode_enabled);
        assert!(events[0].was_adapted);
    }

    #[test]
    fn interactions_outside_a_session_are_ignored() {
        let mut rig = rig();
        rig.engine.load_profile(flat_profile(60));
        rig.engine.set_pro_mode(true).unwrap();
        assert_eq!(rig.engine.record_interaction().unwrap(), Adjustment::Ignored);

        rig.engine.play();
        rig.engine.pause();
        assert_eq!(rig.engine.record_interaction().unwrap(), Adjustment::Ignored);
        assert_eq!(rig.engine.adaptive_snapshot().unwrap().interaction_count, 0);
    }

    #[test]
    fn loading_a_profile_resets_adaptation() {
        let mut rig = rig();
        rig.engine.load_profile(flat_profile(60));
        rig.engine.set_pro_mode(true).unwrap();
        rig.engine.play();
        rig.clock.advance(1.0);
        rig.engine.record_interaction().unwrap();
        rig.engine.pause();

        rig.engine.load_profile(flat_profile(60));
        let snapshot = rig.engine.adaptive_snapshot().unwrap();
        assert_eq!(snapshot.interaction_count, 0);
        assert!(snapshot.offsets.is_zero());
        assert!(snapshot.pro_mode);
    }

    #[test]
    fn pause_preserves_adaptation() {
        let mut rig = rig();
        rig.engine.load_profile(flat_profile(60));
        rig.engine.set_pro_mode(true).unwrap();
        rig.engine.play();
        rig.clock.advance(1.0);
        rig.engine.record_interaction().unwrap();
        rig.engine.pause();
        rig.engine.play();

        let snapshot = rig.engine.adaptive_snapshot().unwrap();
        assert_eq!(snapshot.interaction_count, 1);
        assert!(!snapshot.offsets.is_zero());
    }

    #[test]
    fn disabling_pro_mode_clears_offsets_mid_session() {
        let mut rig = rig();
        rig.engine.load_profile(flat_profile(60));
        rig.engine.set_pro_mode(true).unwrap();
        rig.engine.play();
        rig.clock.advance(1.0);
        rig.engine.record_interaction().unwrap();
        rig.engine.set_pro_mode(false).unwrap();
        let snapshot = rig.engine.adaptive_snapshot().unwrap();
        assert!(snapshot.offsets.is_zero());
        assert_eq!(snapshot.interaction_count, 0);
    }

    #[test]
    fn re_enabling_pro_mode_does_not_inherit_old_interactions() {
        let mut rig = rig();
        rig.engine.load_profile(flat_profile(6000));
        rig.engine.set_pro_mode(true).unwrap();
        rig.engine.play();
        for _ in 0..20 {
            rig.clock.advance(1.0);
            rig.engine.record_interaction().unwrap();
        }

        rig.engine.set_pro_mode(false).unwrap();
        rig.engine.set_pro_mode(true).unwrap();
        rig.clock.advance(600.0);
        assert_eq!(rig.engine.record_interaction().unwrap(), Adjustment::Enriched);
        assert_eq!(rig.engine.adaptive_snapshot().unwrap().interaction_count, 1);
    }

    #[test]
    fn running_session_keeps_its_own_profile() {
        let mut rig = rig();
        rig.engine.load_profile(flat_profile(20));
        rig.engine.play();
        rig.engine.load_profile(flat_profile(500));

        let outcomes = run_for(&mut rig, 21.0);
        assert!(outcomes
            .iter()
            .any(|o| matches!(o, TickOutcome::Completed(e) if e.duration_seconds == 20)));
    }

    #[test]
    fn preview_stops_itself_when_idle() {
        let mut rig = rig();
        rig.engine.preview_layer(PreviewLayer::Frequency, 1.0);
        let snapshot = rig.graph.snapshot();
        assert!(snapshot.oscillator_running);
        assert!((snapshot.frequency_hz.unwrap() - 400.0).abs() < 1e-9);

        rig.clock.advance(0.25);
        rig.engine.frame();
        assert!(rig.engine.is_previewing());

        rig.clock.advance(0.3);
        rig.engine.frame();
        assert!(!rig.engine.is_previewing());
        assert!(!rig.graph.snapshot().oscillator_running);
    }

    #[test]
    fn preview_during_session_leaves_oscillator_running() {
        let mut rig = rig();
        rig.engine.load_profile(flat_profile(60));
        rig.engine.play();
        rig.engine.preview_layer(PreviewLayer::Texture, 1.0);
        assert!(!rig.engine.is_previewing());
        assert_eq!(rig.graph.snapshot().cutoff_hz, Some(200.0));

        run_for(&mut rig, 2.0);
        assert!(rig.graph.snapshot().oscillator_running);
    }

    #[test]
    fn density_preview_sets_density_gain() {
        let mut rig = rig();
        rig.engine.preview_layer(PreviewLayer::Density, 1.0);
        let snapshot = rig.graph.snapshot();
        assert!(snapshot.oscillator_running);
        assert!((snapshot.density_gain.unwrap() - 1.0).abs() < 1e-9);

        rig.engine.preview_layer(PreviewLayer::Density, 0.0);
        assert!((rig.graph.snapshot().density_gain.unwrap() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn preview_layer_names_parse() {
        assert_eq!("Density".parse::<PreviewLayer>().unwrap(), PreviewLayer::Density);
        let err = "sparkle".parse::<PreviewLayer>().unwrap_err();
        assert!(matches!(err, DriftwaveError::UnknownLayer(name) if name == "sparkle"));
    }

    #[test]
    fn master_volume_is_clamped() {
        let mut rig = rig();
        rig.engine.set_master_volume(1.7);
        assert_eq!(rig.engine.master_volume(), 1.0);
        assert_eq!(rig.graph.snapshot().master_gain, Some(1.0));
        rig.engine.set_master_volume(-0.2);
        assert_eq!(rig.graph.snapshot().master_gain, Some(0.0));
    }

    #[test]
    fn completion_event_serialises_camel_case() {
        let event = CompletionEvent {
            profile_id: "a".into(),
            profile_name: "A".into(),
            duration_seconds: 10,
            pro_mode_enabled: true,
            was_adapted: false,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"profileId\":\"a\""));
        assert!(json.contains("\"wasAdapted\":false"));
    }
}
