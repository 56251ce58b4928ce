//! Timing and synchronisation primitives.
//!
//! The core never sleeps or locks through `std` directly; everything goes
//! through [`Platform`] so tests can run on a virtual clock and record lock
//! order.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Named binary semaphore.
pub trait Semaphore: Send + Sync {
    fn name(&self) -> &str;
    fn lock(&self);
    fn unlock(&self);
}

/// OS services the core depends on.
pub trait Platform: Send + Sync {
    fn create_semaphore(&self, name: &str) -> Arc<dyn Semaphore>;

    /// Called when a semaphore is retired on detach.
    fn delete_semaphore(&self, semaphore: &Arc<dyn Semaphore>) {
        let _ = semaphore;
    }

    fn delay_ms(&self, ms: u32);

    /// Monotonic milliseconds.
    fn now_ms(&self) -> u64;
}

/// Binary semaphore built on a mutex and condition variable.
pub struct BinarySemaphore {
    name: String,
    locked: Mutex<bool>,
    released: Condvar,
}

impl BinarySemaphore {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            locked: Mutex::new(false),
            released: Condvar::new(),
        }
    }
}

impl Semaphore for BinarySemaphore {
    fn name(&self) -> &str {
        &self.name
    }

    fn lock(&self) {
        let mut locked = self.locked.lock();
        while *locked {
            self.released.wait(&mut locked);
        }
        *locked = true;
    }

    fn unlock(&self) {
        *self.locked.lock() = false;
        self.released.notify_one();
    }
}

/// Platform backed by `std::thread::sleep` and `Instant`.
pub struct StdPlatform {
    epoch: Instant,
}

impl Default for StdPlatform {
    fn default() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl StdPlatform {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Platform for StdPlatform {
    fn create_semaphore(&self, name: &str) -> Arc<dyn Semaphore> {
        Arc::new(BinarySemaphore::new(name))
    }

    fn delay_ms(&self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms as u64));
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

/// Holds a semaphore until dropped.
pub struct SemaphoreGuard<'a> {
    semaphore: &'a dyn Semaphore,
}

impl<'a> SemaphoreGuard<'a> {
    pub fn acquire(semaphore: &'a dyn Semaphore) -> Self {
        semaphore.lock();
        Self { semaphore }
    }
}

impl Drop for SemaphoreGuard<'_> {
    fn drop(&mut self) {
        self.semaphore.unlock();
    }
}

/// A set of per-slot locks taken together.
///
/// Locks are taken from the highest slot index down to slot 0 and released
/// in the opposite order when the set is dropped.
pub struct SlotLockSet<'a> {
    guards: Vec<SemaphoreGuard<'a>>,
}

impl<'a> SlotLockSet<'a> {
    /// Lock every semaphore of `ascending` (indexed by slot), highest slot first.
    pub fn acquire(ascending: &[&'a dyn Semaphore]) -> Self {
        let guards = ascending
            .iter()
            .rev()
            .map(|semaphore| SemaphoreGuard::acquire(*semaphore))
            .collect();
        Self { guards }
    }
}

impl Drop for SlotLockSet<'_> {
    fn drop(&mut self) {
        while let Some(guard) = self.guards.pop() {
            drop(guard);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Recorder {
        name: String,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Semaphore for Recorder {
        fn name(&self) -> &str {
            &self.name
        }
        fn lock(&self) {
            self.log.lock().push(format!("lock {}", self.name));
        }
        fn unlock(&self) {
            self.log.lock().push(format!("unlock {}", self.name));
        }
    }

    #[test]
    fn test_slot_lock_set_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sems: Vec<Recorder> = (0..3)
            .map(|i| Recorder {
                name: i.to_string(),
                log: log.clone(),
            })
            .collect();
        let refs: Vec<&dyn Semaphore> = sems.iter().map(|s| s as &dyn Semaphore).collect();

        {
            let _set = SlotLockSet::acquire(&refs);
        }

        assert_eq!(
            *log.lock(),
            vec!["lock 2", "lock 1", "lock 0", "unlock 0", "unlock 1", "unlock 2"]
        );
    }

    #[test]
    fn test_binary_semaphore_excludes() {
        let sem = Arc::new(BinarySemaphore::new("test"));
        let entered = Arc::new(AtomicBool::new(false));

        sem.lock();
        let handle = {
            let sem = sem.clone();
            let entered = entered.clone();
            std::thread::spawn(move || {
                sem.lock();
                entered.store(true, Ordering::SeqCst);
                sem.unlock();
            })
        };

        std::thread::sleep(Duration::from_millis(20));
        assert!(!entered.load(Ordering::SeqCst));
        sem.unlock();
        handle.join().unwrap();
        assert!(entered.load(Ordering::SeqCst));
    }
}
