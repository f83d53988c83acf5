//! Simulated conversion progress.
//!
//! The backend reports nothing until it is done, so while a request is in
//! flight a ticker thread produces a decelerating estimate that stalls at
//! [`SIMULATED_CEILING`]. Only a confirmed success moves progress to 100.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const SIMULATED_CEILING: f32 = 95.0;
pub const COMPLETE: f32 = 100.0;

/// One tick of the ramp: +3 below 30, +2 below 50, +1 below 80, +0.5 below 95.
pub fn next_progress(current: f32) -> f32 {
    let next = if current < 30.0 {
        current + 3.0
    } else if current < 50.0 {
        current + 2.0
    } else if current < 80.0 {
        current + 1.0
    } else {
        current + 0.5
    };
    next.min(SIMULATED_CEILING)
}

/// Handle to a running ticker thread.
///
/// Dropping the handle stops the thread and waits for it, so no tick is
/// delivered once the owner has moved on. The thread also exits on its own
/// when `on_tick` returns `false`, e.g. because nobody is listening anymore.
pub struct ProgressTicker {
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    pub fn start<F>(interval: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(f32) -> bool + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let worker = thread::spawn(move || {
            let mut progress = 0.0_f32;
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        progress = next_progress(progress);
                        if !on_tick(progress) || progress >= SIMULATED_CEILING {
                            break;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Self {
            stop: Some(stop_tx),
            worker: Some(worker),
        }
    }

    pub fn stop(mut self) {
        self.release();
    }

    fn release(&mut self) {
        // Dropping the sender wakes the worker immediately.
        self.stop.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("Progress ticker thread panicked");
            }
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.release();
    }
}
