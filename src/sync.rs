//! Poison recovery helpers for std::sync locks
//!
//! A panicking observer handler must not wedge the store, so every lock in the
//! crate is taken through these helpers, which log and keep going.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Extension trait for Mutex with poison recovery
pub(crate) trait MutexExt<T> {
    fn lock_recovered(&self) -> MutexGuard<'_, T>;
}

/// Extension trait for RwLock with poison recovery
pub(crate) trait RwLockExt<T> {
    fn read_recovered(&self) -> RwLockReadGuard<'_, T>;

    fn write_recovered(&self) -> RwLockWriteGuard<'_, T>;
}

impl<T> MutexExt<T> for Mutex<T> {
    fn lock_recovered(&self) -> MutexGuard<'_, T> {
        self.lock().unwrap_or_else(|poisoned| {
            log::warn!("Mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl<T> RwLockExt<T> for RwLock<T> {
    fn read_recovered(&self) -> RwLockReadGuard<'_, T> {
        self.read().unwrap_or_else(|poisoned| {
            log::warn!("RwLock was poisoned (read), recovering");
            poisoned.into_inner()
        })
    }

    fn write_recovered(&self) -> RwLockWriteGuard<'_, T> {
        self.write().unwrap_or_else(|poisoned| {
            log::warn!("RwLock was poisoned (write), recovering");
            poisoned.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_recovers_poisoned_rwlock() {
        let lock = Arc::new(RwLock::new(1));
        let clone = Arc::clone(&lock);
        let _ = thread::spawn(move || {
            let _guard = clone.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(lock.is_poisoned());
        *lock.write_recovered() = 2;
        assert_eq!(*lock.read_recovered(), 2);
    }

    #[test]
    fn test_recovers_poisoned_mutex() {
        let lock = Arc::new(Mutex::new(vec![1]));
        let clone = Arc::clone(&lock);
        let _ = thread::spawn(move || {
            let _guard = clone.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        lock.lock_recovered().push(2);
        assert_eq!(*lock.lock_recovered(), vec![1, 2]);
    }
}
