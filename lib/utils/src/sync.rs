//! Synchronization helpers shared by the bus crates.

use spin::Once;

/// A single-shot completion latch.
///
/// One writer fires it with [Completion::complete]; any number of readers may block in
/// [Completion::wait] before or after that. Once fired it stays fired: there is no reset,
/// and every later wait returns immediately.
pub struct Completion {
    done: Once<()>,
}

impl Completion {
    pub const fn new() -> Completion {
        Completion { done: Once::new() }
    }

    /// Fire the latch.
    ///
    /// Return `true` for the call that actually fired it and `false` for every later call.
    pub fn complete(&self) -> bool {
        let mut fired = false;
        self.done.call_once(|| fired = true);
        fired
    }

    /// Spin until the latch has fired.
    pub fn wait(&self) {
        self.done.wait();
    }

    /// Check the latch without blocking.
    pub fn is_completed(&self) -> bool {
        self.done.is_completed()
    }
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Completion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Completion")
            .field("done", &self.is_completed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{Arc, Barrier},
        thread,
    };

    #[test]
    fn fires_once() {
        let c = Completion::new();
        assert!(!c.is_completed());
        assert!(c.complete());
        assert!(!c.complete());
        assert!(c.is_completed());
    }

    #[test]
    fn wait_after_complete_returns() {
        let c = Completion::new();
        c.complete();
        c.wait();
        c.wait();
    }

    #[test]
    fn wakes_early_and_late_waiters() {
        let c = Arc::new(Completion::new());
        let start = Arc::new(Barrier::new(5));
        let early: Vec<_> = (0..4)
            .map(|_| {
                let c = c.clone();
                let start = start.clone();
                thread::spawn(move || {
                    start.wait();
                    c.wait();
                })
            })
            .collect();
        start.wait();
        assert!(c.complete());
        for t in early {
            t.join().unwrap();
        }
        let late = {
            let c = c.clone();
            thread::spawn(move || c.wait())
        };
        late.join().unwrap();
    }
}
