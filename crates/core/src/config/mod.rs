use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub frame: FrameConfig,
}

impl AppConfig {
    /// Decodes a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and decodes a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

/// Tunables for the automation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Glide used for cutoff, resonance, density and pan.
    pub slow_glide_seconds: f64,
    /// Glide used for the oscillator frequency and the silence gate.
    pub fast_glide_seconds: f64,
    pub pan_depth: f64,
    pub pan_period_seconds: f64,
    /// Pitch deviation in Hz at full LFO depth and intensity.
    pub max_deviation_hz: f64,
    pub preview_timeout_seconds: f64,
    pub master_volume: f64,
    pub adaptive: AdaptiveConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            slow_glide_seconds: 0.1,
            fast_glide_seconds: 0.05,
            pan_depth: 0.1,
            pan_period_seconds: 20.0,
            max_deviation_hz: 20.0,
            preview_timeout_seconds: 0.5,
            master_volume: 0.8,
            adaptive: AdaptiveConfig::default(),
        }
    }
}

/// Thresholds and step sizes for Pro Mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    /// Symmetric bound applied to every offset.
    pub offset_bound: f64,
    /// Interactions per minute above which the sound is calmed.
    pub calm_rate_per_minute: f64,
    /// Interactions per minute below which sustained focus is rewarded.
    pub focus_rate_per_minute: f64,
    pub focus_after_seconds: f64,
    pub calm_step: f64,
    pub enrich_step: f64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            offset_bound: 0.1,
            calm_rate_per_minute: 2.0,
            focus_rate_per_minute: 0.5,
            focus_after_seconds: 300.0,
            calm_step: 0.01,
            enrich_step: 0.005,
        }
    }
}

/// Frame pacing used by hosts that drive [`crate::Engine::frame`] from a loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub frames_per_second: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            frames_per_second: 60,
        }
    }
}

impl FrameConfig {
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / f64::from(self.frames_per_second.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            AppConfig::from_json_str(r#"{ "engine": { "pan_depth": 0.2 } }"#).unwrap();
        assert_eq!(config.engine.pan_depth, 0.2);
        assert_eq!(config.engine.slow_glide_seconds, 0.1);
        assert_eq!(config.engine.adaptive.offset_bound, 0.1);
        assert_eq!(config.frame.frames_per_second, 60);
    }

    #[test]
    fn zero_frame_rate_does_not_divide_by_zero() {
        let frame = FrameConfig {
            frames_per_second: 0,
        };
        assert_eq!(frame.frame_interval(), std::time::Duration::from_secs(1));
    }
}
