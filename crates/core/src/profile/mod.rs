use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{mapping::ModulationKind, DriftwaveError, Result};

/// A single control point of an automation curve. `time` is a fraction of the
/// session, `value` a perceptual value; both nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub time: f64,
    pub value: f64,
}

impl CurvePoint {
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// Modulation settings of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Modulation {
    #[serde(rename = "type", default)]
    pub kind: ModulationKind,
    #[serde(default)]
    pub intensity: f64,
}

/// Interval during which the output gate is closed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SilenceBlock {
    pub start_seconds: f64,
    pub duration_seconds: f64,
}

impl SilenceBlock {
    pub fn new(start_seconds: f64, duration_seconds: f64) -> Self {
        Self {
            start_seconds,
            duration_seconds,
        }
    }

    /// Half-open containment: `[start, start + duration)`.
    pub fn contains(&self, elapsed_seconds: f64) -> bool {
        elapsed_seconds >= self.start_seconds
            && elapsed_seconds < self.start_seconds + self.duration_seconds
    }
}

/// Declarative description of a timed soundscape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundProfile {
    pub id: String,
    pub name: String,
    pub duration_seconds: u32,
    #[serde(default)]
    pub base_frequency_curve: Vec<CurvePoint>,
    #[serde(default)]
    pub texture_density_map: Vec<CurvePoint>,
    #[serde(default)]
    pub modulation: Modulation,
    #[serde(default)]
    pub silence_blocks: Vec<SilenceBlock>,
}

impl SoundProfile {
    /// Creates a profile with empty curves, no modulation and no silence.
    pub fn new(id: impl Into<String>, name: impl Into<String>, duration_seconds: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration_seconds,
            base_frequency_curve: Vec::new(),
            texture_density_map: Vec::new(),
            modulation: Modulation::default(),
            silence_blocks: Vec::new(),
        }
    }

    /// Decodes and validates a profile from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let profile: Self = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Reads, decodes and validates a profile file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects profiles the engine cannot run. Curve content is never
    /// rejected; the interpolator copes with anything.
    pub fn validate(&self) -> Result<()> {
        if self.duration_seconds == 0 {
            return Err(DriftwaveError::InvalidProfile(format!(
                "profile `{}` must last at least one second",
                self.id
            )));
        }

        for block in &self.silence_blocks {
            let start_ok = block.start_seconds.is_finite() && block.start_seconds >= 0.0;
            let duration_ok = block.duration_seconds.is_finite() && block.duration_seconds > 0.0;
            if !start_ok || !duration_ok {
                return Err(DriftwaveError::InvalidProfile(format!(
                    "profile `{}` has a malformed silence block at {}s",
                    self.id, block.start_seconds
                )));
            }
        }

        Ok(())
    }

    /// True if `elapsed_seconds` falls inside any silence block.
    pub fn is_silent_at(&self, elapsed_seconds: f64) -> bool {
        self.silence_blocks
            .iter()
            .any(|block| block.contains(elapsed_seconds))
    }

    pub fn summary(&self) -> ProfileSummary {
        let silent_seconds = union_length(&self.silence_blocks, f64::from(self.duration_seconds));
        ProfileSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            duration_seconds: self.duration_seconds,
            frequency_points: self.base_frequency_curve.len(),
            texture_points: self.texture_density_map.len(),
            modulation: self.modulation.kind,
            silent_seconds,
        }
    }
}

/// Human oriented digest of a profile, printed by the CLI `check` command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub id: String,
    pub name: String,
    pub duration_seconds: u32,
    pub frequency_points: usize,
    pub texture_points: usize,
    pub modulation: ModulationKind,
    /// Seconds muted within the session, overlapping blocks counted once.
    pub silent_seconds: f64,
}

fn union_length(blocks: &[SilenceBlock], horizon: f64) -> f64 {
    let mut spans: Vec<(f64, f64)> = blocks
        .iter()
        .map(|b| {
            (
                b.start_seconds.min(horizon),
                (b.start_seconds + b.duration_seconds).min(horizon),
            )
        })
        .filter(|(start, end)| end > start)
        .collect();
    spans.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut total = 0.0;
    let mut current: Option<(f64, f64)> = None;
    for (start, end) in spans {
        current = match current {
            Some((cs, ce)) if start <= ce => Some((cs, ce.max(end))),
            Some((cs, ce)) => {
                total += ce - cs;
                Some((start, end))
            }
            None => Some((start, end)),
        };
    }
    if let Some((cs, ce)) = current {
        total += ce - cs;
    }
    total
}
