//! Progress reporting and cancellation for long-running algorithms.
//!
//! Both hooks are plain boxed closures invoked synchronously on the thread
//! that runs the algorithm. They are `Send + Sync` so an algorithm object
//! carrying them can be moved to a worker thread.
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//! use fastmarch::algo::{Cancellation, Progress};
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//!
//! let flag = Arc::new(AtomicBool::new(false));
//! let cancel = Cancellation::from_flag(flag.clone());
//! assert!(!cancel.is_cancelled());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives:
/// - `current`: Current step
/// - `total`: Total number of steps (an upper bound when the exact count is unknown)
/// - `message`: Description of the current operation
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

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
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

/// A cancellation check polled between algorithm steps.
///
/// Returning `true` asks the algorithm to stop as soon as possible. The
/// algorithm reports the interruption through its return value; partial
/// results stay readable.
pub struct Cancellation {
    check: Box<dyn Fn() -> bool + Send + Sync>,
}

impl Cancellation {
    /// Create a cancellation check from a predicate.
    pub fn new<F>(check: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self {
            check: Box::new(check),
        }
    }

    /// Cancel when the shared flag is set.
    pub fn from_flag(flag: Arc<AtomicBool>) -> Self {
        Self::new(move || flag.load(Ordering::Relaxed))
    }

    /// A check that never cancels.
    pub fn never() -> Self {
        Self::new(|| false)
    }

    /// Poll the check.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        (self.check)()
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::never()
    }
}

impl std::fmt::Debug for Cancellation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cancellation").finish_non_exhaustive()
    }
}
