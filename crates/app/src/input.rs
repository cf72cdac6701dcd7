use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

/// Background thread that fires `action` every `pause` until stopped.
/// Stopping wakes the thread at once instead of waiting out the pause.
pub struct SimulatedInput {
    shutdown: Sender<()>,
    worker: JoinHandle<()>,
}

impl SimulatedInput {
    pub fn spawn<F>(pause: Duration, mut action: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (shutdown, signal) = mpsc::channel::<()>();
        let worker = std::thread::spawn(move || loop {
            match signal.recv_timeout(pause) {
                Err(RecvTimeoutError::Timeout) => action(),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        Self { shutdown, worker }
    }

    pub fn stop(self) {
        let _ = self.shutdown.send(());
        if self.worker.join().is_err() {
            tracing::warn!("simulated input thread panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    fn stop_does_not_wait_for_the_next_interaction() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let input = SimulatedInput::spawn(Duration::from_secs(60), move || {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        let started = Instant::now();
        input.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(fired.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn fires_repeatedly_until_stopped() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let input = SimulatedInput::spawn(Duration::from_millis(5), move || {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        let deadline = Instant::now() + Duration::from_secs(5);
        while fired.load(Ordering::Relaxed) < 3 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        input.stop();
        assert!(fired.load(Ordering::Relaxed) >= 3);
    }
}
