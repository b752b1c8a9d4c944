//! PIR motion sensor polling.
//!
//! The sensor holds its output high for as long as it sees movement. A
//! dedicated thread samples the line and reports each low-to-high edge as one
//! motion event on a tokio channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

use super::GpioLine;

/// Turns a stream of samples into rising edges.
#[derive(Debug, Default)]
pub struct EdgeDetector {
    last: bool,
}

impl EdgeDetector {
    /// Returns true when `level` is high and the previous sample was low.
    pub fn sample(&mut self, level: bool) -> bool {
        let rising = level && !self.last;
        self.last = level;
        rising
    }
}

/// Background poller of the PIR line.
pub struct MotionWatcher {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MotionWatcher {
    /// Start polling `line` every `interval`, sending `()` per motion event.
    pub fn spawn(
        mut line: Box<dyn GpioLine>,
        interval: Duration,
        events: UnboundedSender<()>,
    ) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = running.clone();

        let handle = thread::spawn(move || {
            let mut edges = EdgeDetector::default();
            let mut read_failed = false;

            while thread_running.load(Ordering::SeqCst) {
                match line.level() {
                    Ok(level) => {
                        read_failed = false;
                        if edges.sample(level) && events.send(()).is_err() {
                            // Receiver gone: the daemon is shutting down
                            break;
                        }
                    }
                    Err(e) => {
                        // Log once per failure streak
                        if !read_failed {
                            log_error!("Motion sensor read failed: {e}");
                        }
                        read_failed = true;
                    }
                }
                thread::sleep(interval);
            }

            log_debug!("Motion watcher on {} stopped", line.describe());
        });

        Self {
            running,
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MotionWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
