use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cross-thread request to stop a running handshake.
///
/// Clones share the same flag. See
/// [`Session::handshake_until`](crate::Session::handshake_until).
#[derive(Debug, Clone, Default)]
pub struct Cancel(Arc<AtomicBool>);

impl Cancel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clear the flag so the same `Cancel` can be used again.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }
}
