//! Live-connection accounting.
//!
//! The counter is its own synchronization domain, independent of the board
//! lock. Increments and decrements are atomic; [`SessionRegistry::active`]
//! is a plain load and may be stale by the time the caller uses it, which is
//! acceptable for the greeting text.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    active: Arc<AtomicUsize>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more live session until the returned guard is dropped.
    #[must_use = "the session is released as soon as the guard is dropped"]
    pub fn enter(&self) -> SessionGuard {
        self.active.fetch_add(1, Ordering::AcqRel);
        SessionGuard {
            active: Arc::clone(&self.active),
        }
    }

    /// Number of live sessions.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }
}

/// Decrements the registry on drop, whichever way the session ends.
#[derive(Debug)]
pub struct SessionGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn guard_counts_while_alive() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.active(), 0);

        let first = registry.enter();
        let second = registry.enter();
        assert_eq!(registry.active(), 2);

        drop(first);
        assert_eq!(registry.active(), 1);
        drop(second);
        assert_eq!(registry.active(), 0);
    }

    #[test]
    fn clones_share_the_counter() {
        let registry = SessionRegistry::new();
        let clone = registry.clone();
        let _guard = clone.enter();
        assert_eq!(registry.active(), 1);
    }

    #[test]
    fn guard_released_on_panic() {
        let registry = SessionRegistry::new();
        let worker = {
            let registry = registry.clone();
            thread::spawn(move || {
                let _guard = registry.enter();
                panic!("handler failure");
            })
        };
        assert!(worker.join().is_err());
        assert_eq!(registry.active(), 0);
    }

    #[test]
    fn concurrent_sessions_settle_to_zero() {
        let registry = SessionRegistry::new();
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        let _guard = registry.enter();
                        assert!(registry.active() >= 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.active(), 0);
    }
}
