//! `ReentrantLock`: Exclusive ownership that the owning thread may re-enter.
//!
//! The lock wraps `parking_lot::ReentrantMutex`, which only hands out shared
//! references. Mutation goes through a `RefCell` borrowed for the duration of
//! a single [`ReentrantLock::with`] call, so nested `lock()` calls are fine but
//! nested `with()` calls on the same lock are not.

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::cell::RefCell;
use std::fmt;

/// An exclusive lock that the current owner may acquire again without blocking.
///
/// Release happens when the last guard held by the owner is dropped. Only the
/// owning thread holds guards, so a release by any other thread is impossible.
pub struct ReentrantLock<T> {
    inner: ReentrantMutex<RefCell<T>>,
}

/// RAII guard returned by [`ReentrantLock::lock`].
///
/// The guard is `!Send`: it must be dropped on the thread that acquired it.
pub struct ReentrantLockGuard<'a, T> {
    guard: ReentrantMutexGuard<'a, RefCell<T>>,
}

impl<T> ReentrantLock<T> {
    /// Create a new unlocked lock around `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: ReentrantMutex::new(RefCell::new(value)),
        }
    }

    /// Acquire the lock, blocking while another thread owns it.
    ///
    /// Calling this again from the owning thread returns immediately.
    #[inline]
    pub fn lock(&self) -> ReentrantLockGuard<'_, T> {
        ReentrantLockGuard {
            guard: self.inner.lock(),
        }
    }

    /// Try to acquire the lock without blocking.
    ///
    /// Succeeds if the lock is free or already owned by the calling thread.
    #[inline]
    pub fn try_lock(&self) -> Option<ReentrantLockGuard<'_, T>> {
        self.inner.try_lock().map(|guard| ReentrantLockGuard { guard })
    }

    /// Check whether any thread currently owns the lock.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    /// Check whether the calling thread owns the lock.
    #[inline]
    pub fn is_held_by_current_thread(&self) -> bool {
        self.inner.is_owned_by_current_thread()
    }

    /// Run `f` with exclusive access to the protected value.
    ///
    /// # Panics
    ///
    /// Panics if `f` calls `with` on the same lock again.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.lock().with(f)
    }

    /// Consume the lock and return the protected value.
    pub fn into_inner(self) -> T {
        self.inner.into_inner().into_inner()
    }
}

impl<T> ReentrantLockGuard<'_, T> {
    /// Run `f` with exclusive access to the protected value.
    ///
    /// # Panics
    ///
    /// Panics if the value is already borrowed by an enclosing `with`.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.guard.borrow_mut())
    }
}

impl<T: Default> Default for ReentrantLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for ReentrantLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReentrantLock")
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_lock_is_reentrant_for_owner() {
        let lock = ReentrantLock::new(0u32);
        let outer = lock.lock();
        let inner = lock.lock();
        inner.with(|v| *v += 1);
        drop(inner);
        outer.with(|v| *v += 1);
        drop(outer);
        assert_eq!(lock.with(|v| *v), 2);
    }

    #[test]
    fn test_lock_excludes_other_threads() {
        let lock = Arc::new(ReentrantLock::new(()));
        let guard = lock.lock();

        let other = Arc::clone(&lock);
        let contended = thread::spawn(move || other.try_lock().is_some())
            .join()
            .unwrap();
        assert!(!contended);

        drop(guard);
        let other = Arc::clone(&lock);
        let free = thread::spawn(move || other.try_lock().is_some())
            .join()
            .unwrap();
        assert!(free);
    }

    #[test]
    fn test_release_only_after_last_owner_guard() {
        let lock = Arc::new(ReentrantLock::new(Vec::new()));
        let outer = lock.lock();
        let inner = lock.lock();
        drop(inner);
        assert!(lock.is_locked());

        let (tx, rx) = mpsc::channel();
        let other = Arc::clone(&lock);
        let waiter = thread::spawn(move || {
            other.with(|v| v.push("waiter"));
            tx.send(()).unwrap();
        });

        // Still owned by this thread through `outer`.
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        outer.with(|v| v.push("owner"));
        drop(outer);

        rx.recv_timeout(Duration::from_secs(2)).unwrap();
        waiter.join().unwrap();
        assert_eq!(Arc::try_unwrap(lock).unwrap().into_inner(), vec!["owner", "waiter"]);
    }

    #[test]
    fn test_held_by_current_thread() {
        let lock = Arc::new(ReentrantLock::new(()));
        assert!(!lock.is_held_by_current_thread());
        let guard = lock.lock();
        assert!(lock.is_held_by_current_thread());

        let other = Arc::clone(&lock);
        let seen = thread::spawn(move || other.is_held_by_current_thread())
            .join()
            .unwrap();
        assert!(!seen);
        drop(guard);
        assert!(!lock.is_held_by_current_thread());
    }

    #[test]
    #[should_panic]
    fn test_nested_with_panics() {
        let lock = ReentrantLock::new(0);
        lock.with(|_| lock.with(|v| *v += 1));
    }
}
