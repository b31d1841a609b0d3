//! Controller ("master") devices: one per physical link.
use crate::{
    binding::{BindSlot, BindState},
    debug_ex,
    driver::MasterDriver,
    error::BusError,
    naming::{master_dev_name, try_box_str},
    power::PowerDomain,
};
use alloc::{boxed::Box, sync::Arc};
use core::{
    any::Any,
    fmt::Debug,
    sync::atomic::{AtomicU32, Ordering},
};

/// Opaque implementation data handed to the controller driver in probe.
pub type Payload = dyn Any + Send + Sync;

pub struct Master {
    name: Box<str>,
    dev_name: Box<str>,
    link_id: u32,
    parent: Option<Box<str>>,
    payload: Option<Arc<Payload>>,
    power: Option<Arc<dyn PowerDomain>>,
    /// Bus-level clock-stop timeout in ms: the largest value any bound peripheral reported.
    clk_stop_timeout: AtomicU32,
    pub(crate) binding: BindSlot<dyn MasterDriver>,
}

impl Master {
    /// Create a controller called `name` driving link `link_id`.
    ///
    /// `name` is what controller drivers are matched against; the bus-scoped device name is
    /// derived from `link_id`.
    pub fn new(name: &str, link_id: u32) -> Result<Master, BusError> {
        Ok(Master {
            name: try_box_str(name)?,
            dev_name: master_dev_name(link_id)?,
            link_id,
            parent: None,
            payload: None,
            power: None,
            clk_stop_timeout: AtomicU32::new(0),
            binding: BindSlot::new(),
        })
    }

    pub fn with_parent(mut self, parent: &str) -> Result<Master, BusError> {
        self.parent = Some(try_box_str(parent)?);
        Ok(self)
    }

    pub fn with_payload(mut self, payload: Arc<Payload>) -> Master {
        self.payload = Some(payload);
        self
    }

    pub fn with_power_domain(mut self, power: Arc<dyn PowerDomain>) -> Master {
        self.power = Some(power);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dev_name(&self) -> &str {
        &self.dev_name
    }

    pub fn link_id(&self) -> u32 {
        self.link_id
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_deref()
    }

    pub(crate) fn power_domain(&self) -> Option<&dyn PowerDomain> {
        self.power.as_deref()
    }

    pub fn clk_stop_timeout(&self) -> u32 {
        self.clk_stop_timeout.load(Ordering::Acquire)
    }

    /// Ratchet the bus-level timeout up to `timeout`; never lowers it.
    ///
    /// Return the value in effect afterwards.
    pub(crate) fn raise_clk_stop_timeout(&self, timeout: u32) -> u32 {
        let prev = self.clk_stop_timeout.fetch_max(timeout, Ordering::AcqRel);
        prev.max(timeout)
    }

    pub fn state(&self) -> BindState {
        self.binding.state()
    }

    pub fn is_bound(&self) -> bool {
        self.state() == BindState::Bound
    }

    /// The bound driver. Already set while that driver's probe runs, so its hooks can see it.
    pub fn driver(&self) -> Option<Arc<dyn MasterDriver>> {
        self.binding.driver()
    }
}

impl Debug for Master {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Master")
            .field("name", &self.name)
            .field("dev_name", &self.dev_name)
            .field("link_id", &self.link_id)
            .field("parent", &self.parent)
            .field("state", &self.state())
            .field("clk_stop_timeout", &self.clk_stop_timeout())
            .finish()
    }
}

impl Drop for Master {
    fn drop(&mut self) {
        debug_ex!("Released controller '{}'.", self.dev_name);
    }
}
