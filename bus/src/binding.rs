//! Per-device binding slot.
//!
//! The slot holds two things. The serialization lock is held by the dispatcher for the whole
//! probe or remove sequence, so at most one binder call runs on a device at a time and a
//! device never has more than one driver. The published driver sits behind its own lock and
//! is only held for the instant it is read or written, so driver hooks running under the
//! serialization lock can still ask which driver is bound.
use alloc::sync::Arc;
use core::sync::atomic::{AtomicU8, Ordering};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use spin::{Mutex, MutexGuard, RwLock};

/// Where a device is in its binding lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum BindState {
    Unbound = 0,
    /// A probe is in flight.
    Probing = 1,
    Bound = 2,
}

/// State only touched with the serialization lock held.
#[derive(Default)]
struct Serial {
    /// The device's own registration pass has run.
    attached: bool,
}

pub(crate) struct BindSlot<D: ?Sized> {
    state: AtomicU8,
    serial: Mutex<Serial>,
    driver: RwLock<Option<Arc<D>>>,
}

impl<D: ?Sized> BindSlot<D> {
    pub const fn new() -> BindSlot<D> {
        BindSlot {
            state: AtomicU8::new(BindState::Unbound as u8),
            serial: Mutex::new(Serial { attached: false }),
            driver: RwLock::new(None),
        }
    }

    /// Take the device lock. Spins while another binder call runs on this device.
    pub fn lock(&self) -> BindGuard<'_, D> {
        BindGuard {
            slot: self,
            serial: self.serial.lock(),
        }
    }

    pub fn set_state(&self, state: BindState) {
        self.state.store(state.into(), Ordering::Release);
    }

    /// Readable without the lock, so observers can see `Probing`.
    pub fn state(&self) -> BindState {
        BindState::try_from(self.state.load(Ordering::Acquire)).unwrap_or(BindState::Unbound)
    }

    /// The published driver. Never waits for an in-flight probe or remove.
    pub fn driver(&self) -> Option<Arc<D>> {
        self.driver.read().clone()
    }
}

/// Proof that the device lock is held.
pub(crate) struct BindGuard<'a, D: ?Sized> {
    slot: &'a BindSlot<D>,
    serial: MutexGuard<'a, Serial>,
}

impl<D: ?Sized> BindGuard<'_, D> {
    pub fn is_occupied(&self) -> bool {
        self.slot.driver.read().is_some()
    }

    pub fn driver(&self) -> Option<Arc<D>> {
        self.slot.driver()
    }

    /// Make `driver` visible through the device's `driver()` accessor.
    pub fn publish(&mut self, driver: Arc<D>) {
        *self.slot.driver.write() = Some(driver);
    }

    pub fn clear(&mut self) -> Option<Arc<D>> {
        self.slot.driver.write().take()
    }

    /// Whether the device's own registration pass has already run.
    pub fn attached(&self) -> bool {
        self.serial.attached
    }

    pub fn mark_attached(&mut self) {
        self.serial.attached = true;
    }
}
