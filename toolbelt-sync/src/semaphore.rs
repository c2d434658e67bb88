//! Counting semaphore over a `Mutex` and a `Condvar`.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::{Result, SyncError};

/// Bounds how many units of a resource are in use at once.
pub struct Semaphore {
    capacity: usize,
    held: Mutex<usize>,
    freed: Condvar,
}

impl Semaphore {
    /// Semaphore with `capacity` units, none held.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            held: Mutex::new(0),
            freed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether `n` more units fit next to `held`.  `held` never exceeds capacity.
    fn fits(&self, held: usize, n: usize) -> bool {
        n <= self.capacity - held
    }

    fn check(&self, n: usize) -> Result<()> {
        if n > self.capacity {
            return Err(SyncError::ExceedsCapacity {
                requested: n,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Take `n` units, blocking until they are free.
    pub fn p(&self, n: usize) -> Result<()> {
        self.check(n)?;
        let mut held = self.lock();
        if !self.fits(*held, n) {
            log::debug!("semaphore contended: {} held, {} requested", *held, n);
        }
        while !self.fits(*held, n) {
            held = self.freed.wait(held).unwrap_or_else(PoisonError::into_inner);
        }
        *held += n;
        Ok(())
    }

    /// Give back `n` units.
    pub fn v(&self, n: usize) -> Result<()> {
        let mut held = self.lock();
        if n > *held {
            return Err(SyncError::OverRelease {
                requested: n,
                held: *held,
            });
        }
        *held -= n;
        drop(held);
        self.freed.notify_all();
        Ok(())
    }

    /// Take one unit, blocking until it is free.
    pub fn acquire(&self) -> Result<()> {
        self.p(1)
    }

    /// Give back one unit.
    pub fn release(&self) -> Result<()> {
        self.v(1)
    }

    /// Take `n` units only if they are free right now.
    pub fn try_p(&self, n: usize) -> Result<bool> {
        self.check(n)?;
        let mut held = self.lock();
        if !self.fits(*held, n) {
            return Ok(false);
        }
        *held += n;
        Ok(true)
    }

    /// Take one unit if free right now.
    pub fn try_acquire(&self) -> bool {
        matches!(self.try_p(1), Ok(true))
    }

    /// Take one unit, released when the returned permit is dropped.
    pub fn acquire_guard(&self) -> Result<Permit<'_>> {
        self.p(1)?;
        Ok(Permit { sem: self })
    }

    /// Total units.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Units currently held.
    pub fn held(&self) -> usize {
        *self.lock()
    }

    /// Units that can be taken without blocking.
    pub fn available(&self) -> usize {
        self.capacity - *self.lock()
    }
}

/// One unit of a [`Semaphore`], held until drop.
pub struct Permit<'a> {
    sem: &'a Semaphore,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        // The permit's own unit is still counted, so this cannot over-release.
        if let Err(e) = self.sem.v(1) {
            log::warn!("permit release failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_bounds_concurrency() {
        let sem = Arc::new(Semaphore::new(4));
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let (sem, active, peak) = (Arc::clone(&sem), Arc::clone(&active), Arc::clone(&peak));
                thread::spawn(move || {
                    let _permit = sem.acquire_guard().unwrap();
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(2));
                    active.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 4);
        assert_eq!(sem.held(), 0);
    }

    #[test]
    fn test_p_v_counts() {
        let sem = Semaphore::new(3);
        sem.p(2).unwrap();
        assert_eq!(sem.available(), 1);
        assert!(!sem.try_p(2).unwrap());
        assert!(sem.try_acquire());
        assert!(!sem.try_acquire());
        sem.v(3).unwrap();
        assert_eq!(sem.held(), 0);
    }

    #[test]
    fn test_blocked_p_wakes_on_v() {
        let sem = Arc::new(Semaphore::new(2));
        sem.p(2).unwrap();
        let waiter = {
            let sem = Arc::clone(&sem);
            thread::spawn(move || sem.p(2))
        };
        thread::sleep(Duration::from_millis(20));
        assert_eq!(sem.held(), 2);
        sem.v(2).unwrap();
        waiter.join().unwrap().unwrap();
        assert_eq!(sem.held(), 2);
    }

    #[test]
    fn test_capacity_near_usize_max() {
        let sem = Semaphore::new(usize::MAX);
        sem.p(usize::MAX - 1).unwrap();
        assert!(!sem.try_p(2).unwrap());
        assert!(sem.try_acquire());
        assert_eq!(sem.available(), 0);
        assert!(!sem.try_acquire());
        sem.v(usize::MAX).unwrap();
        assert_eq!(sem.held(), 0);
    }

    #[test]
    fn test_errors() {
        let sem = Semaphore::new(2);
        assert_eq!(
            sem.p(3),
            Err(SyncError::ExceedsCapacity {
                requested: 3,
                capacity: 2
            })
        );
        assert_eq!(
            sem.release(),
            Err(SyncError::OverRelease {
                requested: 1,
                held: 0
            })
        );

        let empty = Semaphore::new(0);
        assert!(matches!(empty.acquire(), Err(SyncError::ExceedsCapacity { .. })));
        assert!(!empty.try_acquire());
    }
}
