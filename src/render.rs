//! Single-line progress output.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::progress::{ProgressEvent, ProgressHook};

/// Standard output, or a buffer in tests. Shared between the main flow and the progress hook.
pub type SharedOutput = Arc<Mutex<dyn Write + Send>>;

pub fn stdout() -> SharedOutput {
    Arc::new(Mutex::new(io::stdout()))
}

pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Rewrites one terminal line per event using a leading carriage return.
pub struct ProgressRenderer {
    out: SharedOutput,
    last_width: usize,
}

impl ProgressRenderer {
    pub fn new(out: SharedOutput) -> Self {
        Self { out, last_width: 0 }
    }

    pub fn render(&mut self, event: ProgressEvent) -> io::Result<()> {
        let line = format!(
            "{}% ({}/{} bytes)",
            event.percent, event.transferred, event.total
        );
        // blank out the tail of a longer previous line
        let pad = self.last_width.saturating_sub(line.len());

        let mut out = lock(&self.out);
        write!(out, "\r{line}{:pad$}", "")?;
        out.flush()?;

        self.last_width = line.len();
        Ok(())
    }

    pub fn into_hook(self) -> ProgressHook {
        let renderer = Mutex::new(self);
        Arc::new(move |event| {
            if let Err(err) = lock(&renderer).render(event) {
                tracing::debug!(error = %err, "failed to render progress");
            }
        })
    }
}
