//! Pro Mode: a bounded feedback loop driven by how often the listener
//! interacts with the host during a session.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::{config::AdaptiveConfig, timeline::TimeSource, DriftwaveError, Result};

/// Additive adjustments applied to curve-derived values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Offsets {
    pub frequency: f64,
    pub texture: f64,
    pub modulation: f64,
}

impl Offsets {
    pub fn is_zero(&self) -> bool {
        self.frequency == 0.0 && self.texture == 0.0 && self.modulation == 0.0
    }
}

/// What a recorded interaction did to the offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// Pro Mode off or no session running; nothing was counted.
    Ignored,
    /// High interaction rate: pitch and texture pushed down.
    Calmed,
    /// Sustained low rate: modulation nudged up.
    Enriched,
    Unchanged,
}

/// Copy of the adaptive state for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveSnapshot {
    pub pro_mode: bool,
    pub interaction_count: u64,
    pub offsets: Offsets,
}

#[derive(Debug, Clone)]
pub struct AdaptiveController {
    config: AdaptiveConfig,
    pro_mode: bool,
    interaction_count: u64,
    offsets: Offsets,
    /// Clock reading at which the running session's elapsed time is zero.
    window_origin: Option<f64>,
}

impl AdaptiveController {
    pub fn new(config: AdaptiveConfig) -> Self {
        Self {
            config,
            pro_mode: false,
            interaction_count: 0,
            offsets: Offsets::default(),
            window_origin: None,
        }
    }

    pub fn pro_mode(&self) -> bool {
        self.pro_mode
    }

    pub fn offsets(&self) -> Offsets {
        self.offsets
    }

    pub fn interaction_count(&self) -> u64 {
        self.interaction_count
    }

    pub fn snapshot(&self) -> AdaptiveSnapshot {
        AdaptiveSnapshot {
            pro_mode: self.pro_mode,
            interaction_count: self.interaction_count,
            offsets: self.offsets,
        }
    }

    /// Discards all adaptation history. Pro Mode itself stays as it was.
    pub fn reset(&mut self) {
        self.interaction_count = 0;
        self.offsets = Offsets::default();
    }

    /// Disabling discards the interaction count and every offset. Enabling has
    /// no effect until the next interaction.
    pub fn set_pro_mode(&mut self, enabled: bool) {
        self.pro_mode = enabled;
        if !enabled {
            self.reset();
        }
    }

    /// Marks a session as running, with elapsed time measured from `origin`.
    pub fn open_window(&mut self, origin: f64) {
        self.window_origin = Some(origin);
    }

    pub fn close_window(&mut self) {
        self.window_origin = None;
    }

    pub fn is_window_open(&self) -> bool {
        self.window_origin.is_some()
    }

    /// Counts an interaction at clock reading `now` and updates the offsets
    /// from the resulting interactions-per-minute rate.
    pub fn record_interaction(&mut self, now: f64) -> Adjustment {
        let origin = match self.window_origin {
            Some(origin) if self.pro_mode => origin,
            _ => return Adjustment::Ignored,
        };

        self.interaction_count += 1;
        let elapsed_seconds = (now - origin).max(0.0);
        // An interaction at the very start of a session reads as an infinite rate.
        let rate = self.interaction_count as f64 / (elapsed_seconds / 60.0);
        let bound = self.config.offset_bound;

        let adjustment = if rate > self.config.calm_rate_per_minute {
            self.offsets.frequency = (self.offsets.frequency - self.config.calm_step).max(-bound);
            self.offsets.texture = (self.offsets.texture - self.config.calm_step).max(-bound);
            Adjustment::Calmed
        } else if elapsed_seconds > self.config.focus_after_seconds
            && rate < self.config.focus_rate_per_minute
        {
            self.offsets.modulation =
                (self.offsets.modulation + self.config.enrich_step).min(bound);
            Adjustment::Enriched
        } else {
            Adjustment::Unchanged
        };

        if adjustment != Adjustment::Unchanged {
            tracing::debug!(
                count = self.interaction_count,
                rate,
                ?adjustment,
                offsets = ?self.offsets,
                "adaptive offsets updated"
            );
        }

        adjustment
    }
}

/// Cloneable handle that lets input-handling code record interactions while
/// the engine keeps ticking. Each update holds the lock for the full
/// read-modify-write.
#[derive(Clone)]
pub struct InteractionHandle {
    shared: Arc<Mutex<AdaptiveController>>,
    clock: Arc<dyn TimeSource>,
}

impl InteractionHandle {
    pub(crate) fn new(shared: Arc<Mutex<AdaptiveController>>, clock: Arc<dyn TimeSource>) -> Self {
        Self { shared, clock }
    }

    pub fn record(&self) -> Result<Adjustment> {
        let now = self.clock.now();
        let mut controller = self
            .shared
            .lock()
            .map_err(|_| DriftwaveError::msg("adaptive state has been poisoned"))?;
        Ok(controller.record_interaction(now))
    }
}

impl fmt::Debug for InteractionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionHandle").finish()
    }
}

/// Locks the shared controller, recovering the data if a writer panicked.
/// Used on paths that must not fail mid-frame.
pub(crate) fn lock_or_recover(
    shared: &Mutex<AdaptiveController>,
) -> MutexGuard<'_, AdaptiveController> {
    shared.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("recovering poisoned adaptive state");
        poisoned.into_inner()
    })
}
