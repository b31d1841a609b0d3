//! The bus registry.
//!
//! A [Bus] owns the four collections (controllers, peripherals and one driver list per kind)
//! behind a single [RwLock], and is the only entry point for registration. Every
//! registration event runs one matching pass through the dispatcher; nothing is
//! re-evaluated later, and a failed probe is not retried until the device or a driver is
//! registered again.
//!
//! Lifecycle: create with [Bus::new], register drivers and devices, call [Bus::shutdown] on
//! system power-down, and [Bus::teardown] to unbind and forget everything.
use crate::{
    dispatch,
    driver::{DriverHooks, MasterDriver, SlaveDriver},
    error::BusError,
    handle::{Handle, same_object},
    master::Master,
    matcher::{BusDevice, master_matches, slave_matches},
    modalias,
    slave::Slave,
};
use alloc::{boxed::Box, sync::Arc, vec::Vec};
use log::{error, info, warn};
use spin::RwLock;

/// Runtime bus settings. [Default] takes the build-time values from the `config` crate.
///
/// The bus name is not configurable here: device names and modaliases both use
/// `config::BUS_NAME`, fixed at build time.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Clock-stop timeout in ms assumed for peripherals that report none.
    pub default_clk_stop_timeout_ms: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        BusConfig {
            default_clk_stop_timeout_ms: config::DEFAULT_CLK_STOP_TIMEOUT_MS,
        }
    }
}

#[derive(Default)]
struct BusState {
    masters: Vec<Handle<Master>>,
    slaves: Vec<Handle<Slave>>,
    master_drivers: Vec<Arc<dyn MasterDriver>>,
    slave_drivers: Vec<Arc<dyn SlaveDriver>>,
}

pub struct Bus {
    config: BusConfig,
    state: RwLock<BusState>,
}

impl Bus {
    pub fn new(config: BusConfig) -> Bus {
        info!("Bus '{}' initialized.", config::BUS_NAME);
        Bus {
            config,
            state: RwLock::new(BusState::default()),
        }
    }

    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    // region: Controllers

    /// Register a controller and bind it to the first matching controller driver.
    ///
    /// A probe failure leaves the controller registered and unbound; the error is logged.
    pub fn add_master(&self, master: Master) -> Result<Handle<Master>, BusError> {
        let master = Handle::from(master);
        {
            let mut state = self.state.write();
            if state.masters.iter().any(|m| m.dev_name() == master.dev_name()) {
                warn!("Controller '{}' already registered.", master.dev_name());
                return Err(BusError::DuplicateIdentity);
            }
            state.masters.push(master.clone());
        }
        info!(
            "Registered controller '{}' as {} (link {}).",
            master.name(),
            master.dev_name(),
            master.link_id()
        );
        let _ = dispatch::attach_master(self, &master);
        Ok(master)
    }

    /// Unregister a controller.
    ///
    /// The controller and its peripherals leave the bus together; the peripherals are unbound
    /// first, newest first. The device object lives on until the caller's last handle is
    /// dropped. Return the controller's remove hook error, if any, after cleanup.
    pub fn remove_master(&self, master: &Handle<Master>) -> Result<(), BusError> {
        let children = {
            let mut state = self.state.write();
            let Some(pos) = state.masters.iter().position(|m| m.ptr_eq(master)) else {
                return Err(BusError::InvalidArgument);
            };
            state.masters.remove(pos);
            let (children, rest): (Vec<_>, Vec<_>) = core::mem::take(&mut state.slaves)
                .into_iter()
                .partition(|s| s.is_child_of(master));
            state.slaves = rest;
            children
        };
        for slave in children.iter().rev() {
            info!("Unregistered peripheral {}.", slave.dev_name());
            let _ = dispatch::release_slave(slave);
        }
        info!("Unregistered controller {}.", master.dev_name());
        dispatch::release_master(master)
    }

    pub fn register_master_driver(&self, driver: Arc<dyn MasterDriver>) -> Result<(), BusError> {
        if !driver.hooks().contains(DriverHooks::PROBE) {
            error!("Driver {} didn't provide a probe routine.", driver.name());
            return Err(BusError::MissingProbeHook);
        }
        let masters = {
            let mut state = self.state.write();
            if state.master_drivers.iter().any(|d| same_object(d, &driver)) {
                return Err(BusError::InvalidArgument);
            }
            state.master_drivers.push(driver.clone());
            state.masters.clone()
        };
        info!("Registered controller driver '{}'.", driver.name());
        dispatch::driver_attach_masters(self, &driver, &masters);
        Ok(())
    }

    pub fn unregister_master_driver(&self, driver: &Arc<dyn MasterDriver>) -> Result<(), BusError> {
        let masters = {
            let mut state = self.state.write();
            let Some(pos) = state.master_drivers.iter().position(|d| same_object(d, driver)) else {
                return Err(BusError::InvalidArgument);
            };
            state.master_drivers.remove(pos);
            state.masters.clone()
        };
        dispatch::driver_detach_masters(driver, &masters);
        info!("Unregistered controller driver '{}'.", driver.name());
        Ok(())
    }

    /// Ask the controller's driver to start the link.
    ///
    /// `Ok(())` when the controller is unbound or its driver has no startup hook.
    pub fn master_startup(&self, master: &Handle<Master>) -> Result<(), BusError> {
        if !self.has_master(master) {
            return Err(BusError::InvalidArgument);
        }
        dispatch::with_master_driver(master, DriverHooks::STARTUP, |driver| {
            driver.startup(master)
        })
    }

    /// Forward an in-band wake to the controller's driver.
    pub fn master_process_wake_event(&self, master: &Handle<Master>) -> Result<(), BusError> {
        if !self.has_master(master) {
            return Err(BusError::InvalidArgument);
        }
        dispatch::with_master_driver(master, DriverHooks::WAKE_EVENT, |driver| {
            driver.process_wake_event(master)
        })
    }

    // endregion

    // region: Peripherals

    /// Register a peripheral and bind it to the first matching peripheral driver.
    ///
    /// The peripheral's controller must be registered on this bus, otherwise
    /// `InvalidArgument`. Finding no driver is not an error. A probe failure leaves the device
    /// registered and unbound, logged and kept in [Slave::last_error].
    pub fn add_slave(&self, slave: Slave) -> Result<Handle<Slave>, BusError> {
        let slave = Handle::from(slave);
        {
            let mut state = self.state.write();
            let parent = slave.master();
            if !parent.is_some_and(|p| state.masters.iter().any(|m| m.ptr_eq(&p))) {
                warn!("Peripheral '{}' has no controller on this bus.", slave.dev_name());
                return Err(BusError::InvalidArgument);
            }
            if state.slaves.iter().any(|s| s.dev_name() == slave.dev_name()) {
                warn!("Peripheral '{}' already registered.", slave.dev_name());
                return Err(BusError::DuplicateIdentity);
            }
            state.slaves.push(slave.clone());
        }
        info!("Registered peripheral {}.", slave.dev_name());
        let _ = dispatch::attach_slave(self, &slave);
        Ok(slave)
    }

    /// Unregister a peripheral, removing its driver first if bound.
    ///
    /// The device always leaves the bus; a failing remove hook is returned afterwards.
    pub fn remove_slave(&self, slave: &Handle<Slave>) -> Result<(), BusError> {
        {
            let mut state = self.state.write();
            let Some(pos) = state.slaves.iter().position(|s| s.ptr_eq(slave)) else {
                return Err(BusError::InvalidArgument);
            };
            state.slaves.remove(pos);
        }
        info!("Unregistered peripheral {}.", slave.dev_name());
        dispatch::release_slave(slave)
    }

    pub fn register_slave_driver(&self, driver: Arc<dyn SlaveDriver>) -> Result<(), BusError> {
        if !driver.hooks().contains(DriverHooks::PROBE) {
            error!("Driver {} didn't provide a probe routine.", driver.name());
            return Err(BusError::MissingProbeHook);
        }
        let slaves = {
            let mut state = self.state.write();
            if state.slave_drivers.iter().any(|d| same_object(d, &driver)) {
                return Err(BusError::InvalidArgument);
            }
            state.slave_drivers.push(driver.clone());
            state.slaves.clone()
        };
        info!("Registered peripheral driver '{}'.", driver.name());
        dispatch::driver_attach_slaves(self, &driver, &slaves);
        Ok(())
    }

    pub fn unregister_slave_driver(&self, driver: &Arc<dyn SlaveDriver>) -> Result<(), BusError> {
        let slaves = {
            let mut state = self.state.write();
            let Some(pos) = state.slave_drivers.iter().position(|d| same_object(d, driver)) else {
                return Err(BusError::InvalidArgument);
            };
            state.slave_drivers.remove(pos);
            state.slaves.clone()
        };
        dispatch::driver_detach_slaves(driver, &slaves);
        info!("Unregistered peripheral driver '{}'.", driver.name());
        Ok(())
    }

    // endregion

    /// Tell every bound driver the system is powering down.
    ///
    /// Newest devices first, peripherals before their controllers. Bindings are kept.
    pub fn shutdown(&self) {
        let (masters, slaves) = {
            let state = self.state.read();
            (state.masters.clone(), state.slaves.clone())
        };
        info!("Shutting down bus '{}'.", config::BUS_NAME);
        for slave in slaves.iter().rev() {
            dispatch::shutdown_slave(slave);
        }
        for master in masters.iter().rev() {
            dispatch::shutdown_master(master);
        }
    }

    /// Unregister every device and driver, running remove hooks on the way.
    pub fn teardown(&self) {
        for slave in self.slaves().iter().rev() {
            let _ = self.remove_slave(slave);
        }
        for master in self.masters().iter().rev() {
            let _ = self.remove_master(master);
        }
        let mut state = self.state.write();
        state.slave_drivers.clear();
        state.master_drivers.clear();
        info!("Bus '{}' torn down.", config::BUS_NAME);
    }

    /// `MODALIAS=<alias>` for `dev`.
    pub fn uevent(&self, dev: BusDevice<'_>) -> Result<Box<str>, BusError> {
        modalias::uevent(config::BUS_NAME, dev)
    }

    pub fn masters(&self) -> Vec<Handle<Master>> {
        self.state.read().masters.clone()
    }

    pub fn slaves(&self) -> Vec<Handle<Slave>> {
        self.state.read().slaves.clone()
    }

    pub fn find_master(&self, dev_name: &str) -> Option<Handle<Master>> {
        let state = self.state.read();
        state.masters.iter().find(|m| m.dev_name() == dev_name).cloned()
    }

    pub fn find_slave(&self, dev_name: &str) -> Option<Handle<Slave>> {
        let state = self.state.read();
        state.slaves.iter().find(|s| s.dev_name() == dev_name).cloned()
    }

    pub(crate) fn has_master(&self, master: &Handle<Master>) -> bool {
        self.state.read().masters.iter().any(|m| m.ptr_eq(master))
    }

    pub(crate) fn has_slave(&self, slave: &Handle<Slave>) -> bool {
        self.state.read().slaves.iter().any(|s| s.ptr_eq(slave))
    }

    pub(crate) fn master_drivers(&self) -> Vec<Arc<dyn MasterDriver>> {
        self.state.read().master_drivers.clone()
    }

    pub(crate) fn slave_drivers(&self) -> Vec<Arc<dyn SlaveDriver>> {
        self.state.read().slave_drivers.clone()
    }

    /// Whether a controller driver registered before `driver` also matches `master`.
    pub(crate) fn earlier_master_driver_matches(
        &self,
        driver: &Arc<dyn MasterDriver>,
        master: &Master,
    ) -> bool {
        let state = self.state.read();
        state
            .master_drivers
            .iter()
            .take_while(|d| !same_object(*d, driver))
            .any(|d| master_matches(master, d.as_ref()))
    }

    /// Whether a peripheral driver registered before `driver` also matches `slave`.
    pub(crate) fn earlier_slave_driver_matches(
        &self,
        driver: &Arc<dyn SlaveDriver>,
        slave: &Slave,
    ) -> bool {
        let state = self.state.read();
        state
            .slave_drivers
            .iter()
            .take_while(|d| !same_object(*d, driver))
            .any(|d| slave_matches(slave, d.as_ref()))
    }

    pub(crate) fn has_master_driver(&self, driver: &Arc<dyn MasterDriver>) -> bool {
        let state = self.state.read();
        state.master_drivers.iter().any(|d| same_object(d, driver))
    }

    pub(crate) fn has_slave_driver(&self, driver: &Arc<dyn SlaveDriver>) -> bool {
        let state = self.state.read();
        state.slave_drivers.iter().any(|d| same_object(d, driver))
    }
}

impl Default for Bus {
    fn default() -> Self {
        Bus::new(BusConfig::default())
    }
}
