//! Peripheral ("slave") devices attached to a controller's link.
use crate::{
    binding::{BindSlot, BindState},
    debug_ex,
    driver::SlaveDriver,
    error::BusError,
    handle::{Handle, HandleRef},
    id::SlaveId,
    master::Master,
    naming::slave_dev_name,
    power::PowerDomain,
};
use alloc::{boxed::Box, sync::Arc};
use core::{
    fmt::Debug,
    sync::atomic::{AtomicBool, Ordering},
};
use spin::Mutex;
use utils::sync::Completion;

/// Properties a peripheral reports, from firmware or from its driver's `read_prop` hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlaveProperties {
    /// Longest delay in ms the device tolerates when the bus clock stops; 0 means unset.
    pub clk_stop_timeout: u32,
    pub wake_capable: bool,
}

pub struct Slave {
    id: SlaveId,
    dev_name: Box<str>,
    link_id: u32,
    master: HandleRef<Master>,
    power: Option<Arc<dyn PowerDomain>>,
    prop: Mutex<SlaveProperties>,
    probed: AtomicBool,
    probe_complete: Completion,
    last_error: Mutex<Option<BusError>>,
    pub(crate) binding: BindSlot<dyn SlaveDriver>,
}

impl Slave {
    /// Create a peripheral discovered on `master`'s link.
    pub fn new(master: &Handle<Master>, id: SlaveId) -> Result<Slave, BusError> {
        let link_id = master.link_id();
        Ok(Slave {
            id,
            dev_name: slave_dev_name(link_id, &id)?,
            link_id,
            master: master.create_ref(),
            power: None,
            prop: Mutex::new(SlaveProperties::default()),
            probed: AtomicBool::new(false),
            probe_complete: Completion::new(),
            last_error: Mutex::new(None),
            binding: BindSlot::new(),
        })
    }

    pub fn with_power_domain(mut self, power: Arc<dyn PowerDomain>) -> Slave {
        self.power = Some(power);
        self
    }

    /// Properties known before probe, e.g. parsed from firmware.
    pub fn with_properties(mut self, prop: SlaveProperties) -> Slave {
        *self.prop.get_mut() = prop;
        self
    }

    pub fn id(&self) -> SlaveId {
        self.id
    }

    pub fn dev_name(&self) -> &str {
        &self.dev_name
    }

    pub fn link_id(&self) -> u32 {
        self.link_id
    }

    /// The owning controller, if it is still alive.
    pub fn master(&self) -> Option<Handle<Master>> {
        self.master.get_handle()
    }

    pub(crate) fn is_child_of(&self, master: &Handle<Master>) -> bool {
        self.master.refers_to(master)
    }

    pub(crate) fn power_domain(&self) -> Option<&dyn PowerDomain> {
        self.power.as_deref()
    }

    pub fn properties(&self) -> SlaveProperties {
        *self.prop.lock()
    }

    /// Edit the property block in place.
    pub fn update_properties(&self, f: impl FnOnce(&mut SlaveProperties)) {
        f(&mut *self.prop.lock());
    }

    /// Whether the device has ever been probed successfully. Never blocks.
    pub fn is_probed(&self) -> bool {
        self.probed.load(Ordering::Acquire)
    }

    /// Block until the device has been probed successfully.
    ///
    /// Return at once if that already happened. Waits forever if it never does; there is no
    /// timeout and no cancellation.
    pub fn wait_probed(&self) {
        self.probe_complete.wait();
    }

    /// Mark probed and fire the completion. Only the first call has any effect.
    pub(crate) fn mark_probed(&self) -> bool {
        self.probed.store(true, Ordering::Release);
        self.probe_complete.complete()
    }

    pub fn state(&self) -> BindState {
        self.binding.state()
    }

    pub fn is_bound(&self) -> bool {
        self.state() == BindState::Bound
    }

    /// The bound driver. Already set while that driver's probe runs, so its hooks can see it.
    pub fn driver(&self) -> Option<Arc<dyn SlaveDriver>> {
        self.binding.driver()
    }

    /// Error of the most recent failed binding attempt, cleared by a successful one.
    pub fn last_error(&self) -> Option<BusError> {
        *self.last_error.lock()
    }

    pub(crate) fn set_last_error(&self, err: Option<BusError>) {
        *self.last_error.lock() = err;
    }
}

impl Debug for Slave {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Slave")
            .field("dev_name", &self.dev_name)
            .field("id", &self.id)
            .field("state", &self.state())
            .field("probed", &self.is_probed())
            .field("prop", &self.properties())
            .finish()
    }
}

impl Drop for Slave {
    fn drop(&mut self) {
        debug_ex!("Released peripheral '{}'.", self.dev_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction() {
        let m = Handle::from(Master::new("m", 3).unwrap());
        let s = Slave::new(&m, SlaveId::new(0x1234, 0x5678).with_unique_id(2))
            .unwrap()
            .with_properties(SlaveProperties {
                clk_stop_timeout: 50,
                wake_capable: true,
            });
        assert_eq!(s.dev_name(), "sdw:3:1234:5678:2");
        assert_eq!(s.link_id(), 3);
        assert!(s.is_child_of(&m));
        assert_eq!(s.properties().clk_stop_timeout, 50);
        assert!(!s.is_probed());
        assert_eq!(s.state(), BindState::Unbound);
    }

    #[test]
    fn mark_probed_fires_once() {
        let m = Handle::from(Master::new("m", 0).unwrap());
        let s = Slave::new(&m, SlaveId::new(1, 2)).unwrap();
        assert!(s.mark_probed());
        assert!(!s.mark_probed());
        assert!(s.is_probed());
        s.wait_probed();
    }

    #[test]
    fn parent_is_weak() {
        let m = Handle::from(Master::new("m", 0).unwrap());
        let s = Slave::new(&m, SlaveId::new(1, 2)).unwrap();
        assert!(s.master().is_some());
        drop(m);
        assert!(s.master().is_none());
    }
}
