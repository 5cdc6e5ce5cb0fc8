use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;

/// Transient status line shown after a mutation settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Failure,
}

/// Single debounced notice slot per screen.
///
/// Publishing bumps a generation counter and arms one expiry timer; the
/// timer only clears the slot if its generation is still current, so a
/// notice that arrives before an older one expires restarts the clock
/// instead of queueing behind it.
#[derive(Clone)]
pub struct NoticeSlot {
    inner: Arc<NoticeSlotInner>,
}

struct NoticeSlotInner {
    current: Mutex<Option<Notice>>,
    generation: AtomicU64,
    ttl: Duration,
}

impl NoticeSlot {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(NoticeSlotInner {
                current: Mutex::new(None),
                generation: AtomicU64::new(0),
                ttl,
            }),
        }
    }

    pub fn success(&self, text: impl Into<String>) {
        self.publish(NoticeKind::Success, text);
    }

    pub fn failure(&self, text: impl Into<String>) {
        self.publish(NoticeKind::Failure, text);
    }

    pub fn publish(&self, kind: NoticeKind, text: impl Into<String>) {
        let text = text.into();
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.lock() = Some(Notice { kind, text });
        // Outside a runtime the notice simply stays until replaced.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let slot = self.clone();
            handle.spawn(async move {
                tokio::time::sleep(slot.inner.ttl).await;
                slot.expire(generation);
            });
        }
    }

    /// Clear immediately and invalidate any armed timer.
    pub fn clear(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        *self.lock() = None;
    }

    #[must_use]
    pub fn current(&self) -> Option<Notice> {
        self.lock().clone()
    }

    fn expire(&self, generation: u64) {
        if self.inner.generation.load(Ordering::SeqCst) == generation {
            *self.lock() = None;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Notice>> {
        self.inner
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for NoticeSlot {
    /// Matches the on-screen toast duration.
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}
