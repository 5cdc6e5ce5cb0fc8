use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Alive flag for one mounted screen, shared by everything that writes its
/// state from an async continuation.
///
/// Retiring does not cancel in-flight requests; it only suppresses the state
/// writes their completions would perform.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    alive: Arc<AtomicBool>,
}

impl Lifecycle {
    #[must_use]
    pub fn mounted() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Mark the owning screen as torn down.
    pub fn retire(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::mounted()
    }
}
