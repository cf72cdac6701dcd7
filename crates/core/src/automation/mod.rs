use std::f64::consts::TAU;

use crate::{
    adaptive::Offsets,
    audio::{AudioGraph, GainStage},
    config::EngineConfig,
    curve::interpolate,
    mapping::{self, ControlTarget, ParameterUpdate},
    profile::SoundProfile,
};

/// Every control value computed for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTargets {
    pub progress: f64,
    /// Base pitch before modulation.
    pub base_frequency_hz: f64,
    /// LFO pitch deviation added on top of the base pitch.
    pub deviation_hz: f64,
    pub cutoff_hz: f64,
    pub q: f64,
    pub density_gain: f64,
    /// 0 inside a silence block, 1 elsewhere.
    pub gate: f64,
    pub pan: f64,
    slow_glide: f64,
    fast_glide: f64,
}

impl FrameTargets {
    pub fn oscillator_hz(&self) -> f64 {
        self.base_frequency_hz + self.deviation_hz
    }

    /// Flattens the targets into updates carrying their glide constants.
    pub fn updates(&self) -> [ParameterUpdate; 6] {
        [
            ParameterUpdate::new(
                ControlTarget::OscillatorFrequency,
                self.oscillator_hz(),
                self.fast_glide,
            ),
            ParameterUpdate::new(ControlTarget::FilterCutoff, self.cutoff_hz, self.slow_glide),
            ParameterUpdate::new(ControlTarget::FilterQ, self.q, self.slow_glide),
            ParameterUpdate::new(
                ControlTarget::Gain(GainStage::Density),
                self.density_gain,
                self.slow_glide,
            ),
            ParameterUpdate::new(ControlTarget::Pan, self.pan, self.slow_glide),
            ParameterUpdate::new(ControlTarget::Gain(GainStage::Gate), self.gate, self.fast_glide),
        ]
    }
}

/// Gate value at `elapsed_seconds`: closed if any block contains it.
pub fn silence_gate(profile: &SoundProfile, elapsed_seconds: f64) -> f64 {
    if profile.is_silent_at(elapsed_seconds) {
        0.0
    } else {
        1.0
    }
}

/// Stateless per-frame computation of audio graph targets from a profile.
#[derive(Debug, Clone)]
pub struct ParameterScheduler {
    config: EngineConfig,
}

impl ParameterScheduler {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Computes the targets for `progress` (clamped to `[0, 1]`) with the
    /// free-running oscillators at `phase_time` seconds.
    pub fn compute(
        &self,
        profile: &SoundProfile,
        progress: f64,
        phase_time: f64,
        offsets: Offsets,
    ) -> FrameTargets {
        let progress = progress.clamp(0.0, 1.0);
        let elapsed_seconds = progress * f64::from(profile.duration_seconds);
        self.compute_inner(profile, progress, elapsed_seconds, phase_time, offsets)
    }

    /// Same as [`ParameterScheduler::compute`], positioned by elapsed seconds.
    /// Silence gating then sees the exact elapsed time instead of one
    /// recovered from a rounded progress fraction.
    pub fn compute_at_elapsed(
        &self,
        profile: &SoundProfile,
        elapsed_seconds: f64,
        phase_time: f64,
        offsets: Offsets,
    ) -> FrameTargets {
        let duration = f64::from(profile.duration_seconds);
        let elapsed_seconds = elapsed_seconds.clamp(0.0, duration);
        let progress = if duration > 0.0 {
            elapsed_seconds / duration
        } else {
            1.0
        };
        self.compute_inner(profile, progress, elapsed_seconds, phase_time, offsets)
    }

    fn compute_inner(
        &self,
        profile: &SoundProfile,
        progress: f64,
        elapsed_seconds: f64,
        phase_time: f64,
        offsets: Offsets,
    ) -> FrameTargets {
        let pitch = interpolate(&profile.base_frequency_curve, progress) + offsets.frequency;
        let base_frequency_hz = mapping::frequency_hz(pitch);

        let roughness = interpolate(&profile.texture_density_map, progress) + offsets.texture;
        let texture = mapping::texture(roughness);

        let lfo = profile.modulation.kind.lfo();
        let deviation_hz = if lfo.frequency_hz != 0.0 {
            let lfo_value = (TAU * lfo.frequency_hz * phase_time).sin();
            lfo_value
                * lfo.depth
                * (profile.modulation.intensity + offsets.modulation)
                * self.config.max_deviation_hz
        } else {
            0.0
        };

        let gate = silence_gate(profile, elapsed_seconds);

        FrameTargets {
            progress,
            base_frequency_hz,
            deviation_hz,
            cutoff_hz: texture.cutoff_hz,
            q: texture.q,
            density_gain: texture.density_gain,
            gate,
            pan: self.pan_at(phase_time),
            slow_glide: self.config.slow_glide_seconds,
            fast_glide: self.config.fast_glide_seconds,
        }
    }

    /// Slow stereo drift, independent of any profile.
    pub fn pan_at(&self, phase_time: f64) -> f64 {
        let period = self.config.pan_period_seconds;
        if period <= 0.0 {
            return 0.0;
        }
        self.config.pan_depth * (TAU * phase_time / period).sin()
    }

    pub fn push(&self, targets: &FrameTargets, graph: &mut dyn AudioGraph) {
        for update in targets.updates() {
            update.apply_to(graph);
        }
    }
}
