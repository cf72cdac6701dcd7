use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::{mapping::ParameterUpdate, mapping::ControlTarget, DriftwaveError, Result};

/// Gain stages of the synthesis chain, in signal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GainStage {
    Density,
    Gate,
    Master,
}

/// Control surface of the synthesis back end
/// (oscillator → filter → density → panner → gate → master).
///
/// Every setter glides exponentially towards its target over `glide_seconds`.
/// Implementations must not block.
pub trait AudioGraph {
    /// Creates (or re-creates) the oscillator voice.
    fn start_oscillator(&mut self);
    /// Tears the oscillator voice down. No-op when it is not running.
    fn stop_oscillator(&mut self);
    fn set_frequency(&mut self, hz: f64, glide_seconds: f64);
    fn set_cutoff(&mut self, hz: f64, glide_seconds: f64);
    fn set_q(&mut self, q: f64, glide_seconds: f64);
    fn set_gain(&mut self, stage: GainStage, value: f64, glide_seconds: f64);
    /// `value` is in `[-1, 1]`, left to right.
    fn set_pan(&mut self, value: f64, glide_seconds: f64);
}

/// Factory for [`AudioGraph`] instances. Acquisition is the only fallible
/// step; the platform may refuse to create an audio context.
pub trait AudioBackend {
    fn open(&self) -> Result<Box<dyn AudioGraph + Send>>;
}

/// Latest state pushed into a [`RecordingGraph`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSnapshot {
    pub oscillator_running: bool,
    /// Number of times the oscillator was started.
    pub oscillator_starts: usize,
    pub frequency_hz: Option<f64>,
    pub cutoff_hz: Option<f64>,
    pub q: Option<f64>,
    pub density_gain: Option<f64>,
    pub gate_gain: Option<f64>,
    pub master_gain: Option<f64>,
    pub pan: Option<f64>,
    /// Total updates received while the oscillator was stopped.
    pub updates_while_stopped: usize,
}

const HISTORY_LIMIT: usize = 1024;

#[derive(Debug, Default)]
struct RecordingState {
    snapshot: GraphSnapshot,
    history: VecDeque<ParameterUpdate>,
}

/// In-memory graph that remembers the most recent value of every control and
/// a bounded log of updates. Clones share the same state, so a test can keep
/// one clone while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingGraph {
    shared: Arc<Mutex<RecordingState>>,
}

impl RecordingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        self.lock().snapshot.clone()
    }

    /// Most recent updates, oldest first.
    pub fn history(&self) -> Vec<ParameterUpdate> {
        self.lock().history.iter().copied().collect()
    }

    pub fn clear_history(&self) {
        self.lock().history.clear();
    }

    fn record(&self, update: ParameterUpdate) {
        let mut state = self.lock();
        if !state.snapshot.oscillator_running {
            state.snapshot.updates_while_stopped += 1;
        }

        let snapshot = &mut state.snapshot;
        match update.target {
            ControlTarget::OscillatorFrequency => snapshot.frequency_hz = Some(update.value),
            ControlTarget::FilterCutoff => snapshot.cutoff_hz = Some(update.value),
            ControlTarget::FilterQ => snapshot.q = Some(update.value),
            ControlTarget::Gain(GainStage::Density) => snapshot.density_gain = Some(update.value),
            ControlTarget::Gain(GainStage::Gate) => snapshot.gate_gain = Some(update.value),
            ControlTarget::Gain(GainStage::Master) => snapshot.master_gain = Some(update.value),
            ControlTarget::Pan => snapshot.pan = Some(update.value),
        }

        if state.history.len() == HISTORY_LIMIT {
            state.history.pop_front();
        }
        state.history.push_back(update);
    }

    // Inspection must keep working after a panicking test thread.
    fn lock(&self) -> MutexGuard<'_, RecordingState> {
        self.shared
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AudioGraph for RecordingGraph {
    fn start_oscillator(&mut self) {
        let mut state = self.lock();
        state.snapshot.oscillator_running = true;
        state.snapshot.oscillator_starts += 1;
    }

    fn stop_oscillator(&mut self) {
        self.lock().snapshot.oscillator_running = false;
    }

    fn set_frequency(&mut self, hz: f64, glide_seconds: f64) {
        self.record(ParameterUpdate::new(
            ControlTarget::OscillatorFrequency,
            hz,
            glide_seconds,
        ));
    }

    fn set_cutoff(&mut self, hz: f64, glide_seconds: f64) {
        self.record(ParameterUpdate::new(ControlTarget::FilterCutoff, hz, glide_seconds));
    }

    fn set_q(&mut self, q: f64, glide_seconds: f64) {
        self.record(ParameterUpdate::new(ControlTarget::FilterQ, q, glide_seconds));
    }

    fn set_gain(&mut self, stage: GainStage, value: f64, glide_seconds: f64) {
        self.record(ParameterUpdate::new(
            ControlTarget::Gain(stage),
            value,
            glide_seconds,
        ));
    }

    fn set_pan(&mut self, value: f64, glide_seconds: f64) {
        self.record(ParameterUpdate::new(ControlTarget::Pan, value, glide_seconds));
    }
}

/// Backend handing out clones of a single [`RecordingGraph`].
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    graph: RecordingGraph,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view over the graph the engine will drive.
    pub fn graph(&self) -> RecordingGraph {
        self.graph.clone()
    }
}

impl AudioBackend for RecordingBackend {
    fn open(&self) -> Result<Box<dyn AudioGraph + Send>> {
        Ok(Box::new(self.graph.clone()))
    }
}

/// Backend for platforms without audio output. Always refuses.
#[derive(Debug, Clone)]
pub struct UnavailableBackend {
    reason: String,
}

impl UnavailableBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl AudioBackend for UnavailableBackend {
    fn open(&self) -> Result<Box<dyn AudioGraph + Send>> {
        Err(DriftwaveError::audio_unavailable(self.reason.clone()))
    }
}
