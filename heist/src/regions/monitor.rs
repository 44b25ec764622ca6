//! # Monitor Primitive
//!
//! Every shared region is a `Monitor<T>`: one mutex guarding the region state
//! and one condition variable signalled on every state change.
//!
//! ## Key Concepts
//! - Waits always re-test their predicate after waking (`Condvar::wait_while`),
//!   so spurious or stale wake-ups only cost a re-check.
//! - Signalling is broadcast (`notify_all`); waiters filter on their own
//!   predicate, which keeps identity-based hand-offs free of lost wake-ups.
//! - Poisoning is surfaced as `HeistError::Poisoned` instead of a panic.

use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard};

use crate::error::{HeistError, HeistResult};
use crate::log_region;

pub struct Monitor<T> {
    /// Region name used in diagnostics
    name: &'static str,
    state: Mutex<T>,
    changed: Condvar,
}

impl<T> Monitor<T> {
    pub fn new(name: &'static str, state: T) -> Self {
        Self {
            name,
            state: Mutex::new(state),
            changed: Condvar::new(),
        }
    }

    /// Acquire the region lock.
    pub fn enter(&self) -> HeistResult<MutexGuard<'_, T>> {
        self.state.lock().map_err(|_| self.poisoned())
    }

    /// Release the lock and sleep until `condition` turns false.
    ///
    /// The lock is held again when this returns, with `condition` known false.
    pub fn wait_while<'a, F>(
        &self,
        guard: MutexGuard<'a, T>,
        condition: F,
    ) -> HeistResult<MutexGuard<'a, T>>
    where
        F: FnMut(&mut T) -> bool,
    {
        log_region!(self.name, "waiting");
        let guard = self
            .changed
            .wait_while(guard, condition)
            .map_err(|_| self.poisoned())?;
        log_region!(self.name, "resumed");
        Ok(guard)
    }

    /// Wake every thread waiting on this region.
    pub fn notify_all(&self) {
        self.changed.notify_all();
    }

    /// Run a read-only closure under the lock.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> HeistResult<R> {
        let guard = self.enter()?;
        Ok(f(&guard))
    }

    fn poisoned(&self) -> HeistError {
        log_region!(self.name, "lock poisoned");
        HeistError::Poisoned { region: self.name }
    }
}

impl<T> fmt::Debug for Monitor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_wait_while_wakes_on_change() {
        let monitor = Arc::new(Monitor::new("counter", 0u32));

        let waiter = {
            let monitor = Arc::clone(&monitor);
            thread::spawn(move || {
                let guard = monitor.enter().unwrap();
                let guard = monitor.wait_while(guard, |value| *value < 3).unwrap();
                *guard
            })
        };

        for _ in 0..3 {
            let mut guard = monitor.enter().unwrap();
            *guard += 1;
            drop(guard);
            monitor.notify_all();
        }

        assert_eq!(waiter.join().unwrap(), 3);
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let monitor = Arc::new(Monitor::new("fragile", ()));

        let poisoner = {
            let monitor = Arc::clone(&monitor);
            thread::spawn(move || {
                let _guard = monitor.enter().unwrap();
                panic!("poison the region");
            })
        };
        assert!(poisoner.join().is_err());

        let err = monitor.enter().unwrap_err();
        assert_eq!(err, HeistError::Poisoned { region: "fragile" });
    }
}
