use driftwave_core::{AudioBackend, AudioGraph, GainStage};

/// Audio graph that only reports what it is asked to do. Useful on machines
/// without an output device and for watching automation in the log.
#[derive(Debug, Default)]
pub struct LoggingGraph {
    running: bool,
}

impl AudioGraph for LoggingGraph {
    fn start_oscillator(&mut self) {
        self.running = true;
        tracing::debug!("oscillator started");
    }

    fn stop_oscillator(&mut self) {
        if self.running {
            self.running = false;
            tracing::debug!("oscillator stopped");
        }
    }

    fn set_frequency(&mut self, hz: f64, glide_seconds: f64) {
        tracing::trace!(hz, glide_seconds, "frequency");
    }

    fn set_cutoff(&mut self, hz: f64, glide_seconds: f64) {
        tracing::trace!(hz, glide_seconds, "cutoff");
    }

    fn set_q(&mut self, q: f64, glide_seconds: f64) {
        tracing::trace!(q, glide_seconds, "resonance");
    }

    fn set_gain(&mut self, stage: GainStage, value: f64, glide_seconds: f64) {
        tracing::trace!(?stage, value, glide_seconds, "gain");
    }

    fn set_pan(&mut self, value: f64, glide_seconds: f64) {
        tracing::trace!(value, glide_seconds, "pan");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingBackend;

impl AudioBackend for LoggingBackend {
    fn open(&self) -> driftwave_core::Result<Box<dyn AudioGraph + Send>> {
        Ok(Box::new(LoggingGraph::default()))
    }
}
