//! Reference-counted busy indicator.
//!
//! Every locked request holds an [`ActivityGuard`] for as long as it is in
//! flight. The count lives inside a `watch` channel so that the count and
//! the visibility notification change together: subscribers are woken only
//! when the indicator flips between hidden (0) and shown (>0).

use std::sync::Arc;
use tokio::sync::watch;

/// Shared in-flight request counter driving the busy overlay.
#[derive(Debug)]
pub struct ActivityLock {
    count: watch::Sender<usize>,
}

impl Default for ActivityLock {
    fn default() -> Self {
        let (count, _) = watch::channel(0);
        Self { count }
    }
}

impl ActivityLock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Increment the counter. The overlay becomes visible on 0 -> 1.
    pub fn acquire(self: &Arc<Self>) -> ActivityGuard {
        self.count.send_if_modified(|count| {
            *count += 1;
            *count == 1
        });
        tracing::trace!(count = self.count(), "activity acquired");
        ActivityGuard {
            lock: Arc::clone(self),
        }
    }

    /// Decrement the counter. The overlay hides on 1 -> 0.
    fn release(&self) {
        self.count.send_if_modified(|count| match count.checked_sub(1) {
            Some(next) => {
                *count = next;
                next == 0
            }
            None => {
                tracing::warn!("activity released while not held");
                false
            }
        });
        tracing::trace!(count = self.count(), "activity released");
    }

    /// Number of requests currently in flight.
    pub fn count(&self) -> usize {
        *self.count.borrow()
    }

    /// Whether the busy overlay should be visible.
    pub fn is_busy(&self) -> bool {
        self.count() > 0
    }

    /// Receiver that changes whenever visibility flips.
    ///
    /// Read `*rx.borrow() > 0` after each change for the current visibility.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.count.subscribe()
    }
}

/// Holds one unit of the activity count; releases it on drop.
///
/// Dropping covers every exit path of a request future: completion,
/// timeout, abort, or the future itself being dropped.
#[derive(Debug)]
#[must_use = "dropping the guard releases the activity immediately"]
pub struct ActivityGuard {
    lock: Arc<ActivityLock>,
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        self.lock.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tracks_guards() {
        let lock = ActivityLock::new();
        assert!(!lock.is_busy());

        let first = lock.acquire();
        let second = lock.acquire();
        assert_eq!(lock.count(), 2);
        assert!(lock.is_busy());

        drop(first);
        assert_eq!(lock.count(), 1);
        assert!(lock.is_busy());

        drop(second);
        assert_eq!(lock.count(), 0);
        assert!(!lock.is_busy());
    }

    #[test]
    fn test_release_never_goes_negative() {
        let lock = ActivityLock::new();
        lock.release();
        assert_eq!(lock.count(), 0);

        let guard = lock.acquire();
        assert_eq!(lock.count(), 1);
        drop(guard);
        assert_eq!(lock.count(), 0);
    }

    #[tokio::test]
    async fn test_subscribers_see_only_visibility_flips() {
        let lock = ActivityLock::new();
        let mut rx = lock.subscribe();

        let first = lock.acquire();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);

        let second = lock.acquire();
        assert!(!rx.has_changed().unwrap());

        drop(first);
        assert!(!rx.has_changed().unwrap());

        drop(second);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 0);
    }

    #[test]
    fn test_interleaved_sequences_match_started_minus_completed() {
        let lock = ActivityLock::new();
        let mut guards = Vec::new();
        let mut started = 0usize;
        let mut completed = 0usize;

        for step in 0..40 {
            if step % 3 == 2 && !guards.is_empty() {
                guards.remove(0);
                completed += 1;
            } else {
                guards.push(lock.acquire());
                started += 1;
            }
            assert_eq!(lock.count(), started - completed);
            assert_eq!(lock.is_busy(), started > completed);
        }

        guards.clear();
        assert_eq!(lock.count(), 0);
    }
}
