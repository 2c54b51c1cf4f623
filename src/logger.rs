//! Timing logger used around discovery and loading.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{info, warn};

/// Timer and message sink, modelled on `console.time` / `console.timeEnd`.
pub trait ExportLogger {
    fn time(&self, label: &str);
    fn time_end(&self, label: &str);
    fn log(&self, message: &str);
}

/// Discards everything. Used whenever logging is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl ExportLogger for NoopLogger {
    fn time(&self, _label: &str) {}
    fn time_end(&self, _label: &str) {}
    fn log(&self, _message: &str) {}
}

/// Writes timings and messages through `tracing` at INFO level.
#[derive(Debug, Default)]
pub struct TracingLogger {
    timers: RefCell<HashMap<String, Instant>>,
}

impl TracingLogger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExportLogger for TracingLogger {
    fn time(&self, label: &str) {
        self.timers
            .borrow_mut()
            .insert(label.to_string(), Instant::now());
    }

    fn time_end(&self, label: &str) {
        match self.timers.borrow_mut().remove(label) {
            Some(started) => {
                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                info!("{}: {:.3}ms", label, elapsed_ms);
            }
            None => warn!("No such timer: {}", label),
        }
    }

    fn log(&self, message: &str) {
        info!("{}", message);
    }
}
