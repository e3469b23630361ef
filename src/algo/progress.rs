//! Progress reporting for multi-pass operations.
//!
//! ```
//! use rigmesh::algo::Progress;
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//! progress.report(1, 4, "splitting edges");
//! ```

/// Callback receiving `(current, total, message)` updates.
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Create a reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Report phase `phase` of `phases` within iteration `iteration` of `iterations`.
    ///
    /// Iterations are split into equal slices and each phase advances its slice
    /// evenly, so the reported value only ever grows over a run.
    pub fn report_phase(
        &self,
        iteration: usize,
        iterations: usize,
        phase: usize,
        phases: usize,
        message: &str,
    ) {
        if iterations == 0 || phases == 0 {
            return;
        }
        let total = iterations * phases;
        let current = (iteration * phases + phase).min(total);
        (self.callback)(current, total, message);
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_phases_are_monotonic() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |current, total, _| {
            sink.lock().unwrap().push((current, total));
        });

        for iteration in 0..2 {
            for phase in 0..4 {
                progress.report_phase(iteration, 2, phase, 4, "step");
            }
        }
        progress.report_phase(2, 2, 0, 4, "done");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 9);
        assert!(seen.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(*seen.last().unwrap(), (8, 8));
    }

    #[test]
    fn test_empty_ranges_are_ignored() {
        let progress = Progress::new(|_, _, _| panic!("should not be called"));
        progress.report_phase(0, 0, 0, 4, "nothing");
        progress.report_phase(0, 1, 0, 0, "nothing");
    }
}
