use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared stop flag for in-progress requests.
///
/// Clones share the same flag. The engine checks it when a request starts
/// and between sweep configurations; a `solve` call that is already running
/// is never interrupted.
///
/// # Examples
///
/// ```
/// use optimizer_engine::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// handle.stop();
/// assert!(token.is_stopped());
/// token.resume();
/// assert!(!handle.is_stopped());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    stopped: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks running requests to stop at their next check point.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Clears the stop request so new requests can run.
    pub fn resume(&self) {
        self.stopped.store(false, Ordering::SeqCst);
    }

    /// Whether a stop was requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}
