//! Perceptual to physical unit conversions and the control updates that carry
//! their results to the audio graph.

use serde::{Deserialize, Serialize};

use crate::audio::{AudioGraph, GainStage};

pub const MIN_FREQUENCY_HZ: f64 = 80.0;
pub const MAX_FREQUENCY_HZ: f64 = 400.0;
pub const MIN_CUTOFF_HZ: f64 = 200.0;
pub const MAX_CUTOFF_HZ: f64 = 2000.0;
pub const MIN_Q: f64 = 0.5;
pub const MAX_Q: f64 = 8.0;

/// Maps a perceptual pitch in `[0, 1]` onto `[80, 400]` Hz exponentially.
pub fn frequency_hz(value: f64) -> f64 {
    let v = value.clamp(0.0, 1.0);
    MIN_FREQUENCY_HZ * (MAX_FREQUENCY_HZ / MIN_FREQUENCY_HZ).powf(v)
}

/// Filter and density settings derived from a roughness value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureParams {
    pub cutoff_hz: f64,
    pub q: f64,
    pub density_gain: f64,
}

/// Rougher texture closes the filter and raises resonance and density.
pub fn texture(roughness: f64) -> TextureParams {
    let v = roughness.clamp(0.0, 1.0);
    TextureParams {
        cutoff_hz: MAX_CUTOFF_HZ - v * (MAX_CUTOFF_HZ - MIN_CUTOFF_HZ),
        q: MIN_Q + v * (MAX_Q - MIN_Q),
        density_gain: 0.7 + 0.3 * v,
    }
}

/// Closed set of modulation styles a profile can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModulationKind {
    #[default]
    Stable,
    Gentle,
    Irregular,
}

impl<'de> Deserialize<'de> for ModulationKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}

/// Pitch LFO settings for a [`ModulationKind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LfoShape {
    pub frequency_hz: f64,
    pub depth: f64,
}

impl ModulationKind {
    /// Parses a style name; unknown names resolve to `Stable`.
    pub fn parse(name: &str) -> Self {
        match name {
            "gentle" => Self::Gentle,
            "irregular" => Self::Irregular,
            _ => Self::Stable,
        }
    }

    pub fn lfo(self) -> LfoShape {
        match self {
            Self::Stable => LfoShape {
                frequency_hz: 0.0,
                depth: 0.0,
            },
            Self::Gentle => LfoShape {
                frequency_hz: 0.2,
                depth: 0.5,
            },
            Self::Irregular => LfoShape {
                frequency_hz: 0.7,
                depth: 1.0,
            },
        }
    }
}

/// Control surface a [`ParameterUpdate`] can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlTarget {
    OscillatorFrequency,
    FilterCutoff,
    FilterQ,
    Gain(GainStage),
    Pan,
}

/// Concrete value routed to an audio graph control, with the glide used to
/// approach it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterUpdate {
    pub target: ControlTarget,
    pub value: f64,
    pub glide_seconds: f64,
}

impl ParameterUpdate {
    pub fn new(target: ControlTarget, value: f64, glide_seconds: f64) -> Self {
        Self {
            target,
            value,
            glide_seconds,
        }
    }

    pub fn apply_to(&self, graph: &mut dyn AudioGraph) {
        match self.target {
            ControlTarget::OscillatorFrequency => {
                graph.set_frequency(self.value, self.glide_seconds)
            }
            ControlTarget::FilterCutoff => graph.set_cutoff(self.value, self.glide_seconds),
            ControlTarget::FilterQ => graph.set_q(self.value, self.glide_seconds),
            ControlTarget::Gain(stage) => graph.set_gain(stage, self.value, self.glide_seconds),
            ControlTarget::Pan => graph.set_pan(self.value, self.glide_seconds),
        }
    }
}
