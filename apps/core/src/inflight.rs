use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Per-chat single-flight marker for submissions.
///
/// There is no cancellation of an in-flight request; instead the trigger
/// is disabled while one is running. A marker older than `max_age` is
/// treated as abandoned so a crashed task cannot wedge the chat forever.
#[derive(Debug)]
pub struct InflightGuard {
    inner: DashMap<i64, Instant>,
    max_age: Duration,
}

impl InflightGuard {
    pub fn new(max_age: Duration) -> Self {
        Self {
            inner: DashMap::new(),
            max_age,
        }
    }

    /// Try to mark a submission as running. Returns false while a fresh
    /// marker exists — the caller must refuse the duplicate trigger.
    pub fn try_acquire(&self, chat_id: i64) -> bool {
        use dashmap::mapref::entry::Entry;

        let now = Instant::now();
        match self.inner.entry(chat_id) {
            Entry::Vacant(vacant) => {
                vacant.insert(now);
                true
            }
            Entry::Occupied(mut occupied) => {
                // Stale marker: take it over.
                if now.duration_since(*occupied.get()) >= self.max_age {
                    occupied.insert(now);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Release after the submission resolves, success or failure.
    pub fn release(&self, chat_id: i64) {
        self.inner.remove(&chat_id);
    }

    /// Sweep abandoned markers. Call periodically from a background task.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.inner
            .retain(|_, started| now.duration_since(*started) < self.max_age);
    }
}

// ── Tests ──
