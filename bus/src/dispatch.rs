//! Registration-event dispatch: run the matcher over the registered candidates and hand the
//! first match to the binder.
//!
//! Every pass works under the target device's binding lock and re-checks there that both the
//! device and the driver are still registered: a device or driver that left the bus after a
//! snapshot was taken is never bound. Driver hooks never run with the bus collections locked.
//! Lock order is always binding lock, then bus lock.
//!
//! When several drivers match a device, the one registered first wins. A device's own pass
//! reads the driver list under its binding lock, so it sees the drivers in registration
//! order. A driver pass that reaches a device whose own pass has not run yet leaves it alone
//! if an earlier registered driver also matches; the device's pass will pick that one.
use crate::{
    binder,
    binding::BindGuard,
    bus::Bus,
    debug_ex,
    driver::{DriverHooks, MasterDriver, SlaveDriver},
    error::{BusError, DriverError},
    handle::{Handle, same_object},
    master::Master,
    matcher::{master_matches, slave_matches},
    slave::Slave,
};
use alloc::sync::Arc;
use log::info;

/// Device registration pass for a peripheral.
///
/// Return `Ok(true)` if the device ended up bound, `Ok(false)` if no registered driver
/// matched, or the error of the one driver that matched and failed to probe. The drivers
/// after the first match are never consulted.
pub(crate) fn attach_slave(bus: &Bus, slave: &Handle<Slave>) -> Result<bool, BusError> {
    let mut slot = slave.binding.lock();
    slot.mark_attached();
    if slot.is_occupied() {
        return Ok(true);
    }
    if !bus.has_slave(slave) {
        return Ok(false);
    }
    for driver in &bus.slave_drivers() {
        if !slave_matches(slave, driver.as_ref()) || !bus.has_slave_driver(driver) {
            continue;
        }
        bind_slave(bus, slave, &mut slot, driver)?;
        return Ok(true);
    }
    debug_ex!("{}: no matching driver.", slave.dev_name());
    Ok(false)
}

/// Driver registration pass over the registered peripherals.
///
/// Return how many devices were bound. Probe failures are logged and recorded on the device;
/// they don't stop the pass.
pub(crate) fn driver_attach_slaves(
    bus: &Bus,
    driver: &Arc<dyn SlaveDriver>,
    slaves: &[Handle<Slave>],
) -> usize {
    let mut bound = 0;
    for slave in slaves {
        if !slave_matches(slave, driver.as_ref()) {
            continue;
        }
        let mut slot = slave.binding.lock();
        if slot.is_occupied() || !bus.has_slave(slave) {
            continue;
        }
        if !bus.has_slave_driver(driver) {
            break;
        }
        if !slot.attached() && bus.earlier_slave_driver_matches(driver, slave) {
            debug_ex!("{}: left to its own pass.", slave.dev_name());
            continue;
        }
        if bind_slave(bus, slave, &mut slot, driver).is_ok() {
            bound += 1;
        }
    }
    bound
}

fn bind_slave(
    bus: &Bus,
    slave: &Slave,
    slot: &mut BindGuard<'_, dyn SlaveDriver>,
    driver: &Arc<dyn SlaveDriver>,
) -> Result<(), BusError> {
    debug_ex!("{}: matched driver '{}'.", slave.dev_name(), driver.name());
    // visible to the driver's own hooks from probe on
    slot.publish(driver.clone());
    match binder::probe_slave(slave, driver.as_ref(), bus.config()) {
        Ok(()) => {
            slave.set_last_error(None);
            info!("{}: bound to driver '{}'.", slave.dev_name(), driver.name());
            Ok(())
        }
        Err(err) => {
            slot.clear();
            slave.set_last_error(Some(err));
            Err(err)
        }
    }
}

/// Drop the binding of a peripheral that is leaving the bus.
pub(crate) fn release_slave(slave: &Slave) -> Result<(), BusError> {
    let mut slot = slave.binding.lock();
    let Some(driver) = slot.driver() else {
        return Ok(());
    };
    let res = binder::remove_slave(slave, driver.as_ref());
    slot.clear();
    info!("{}: unbound from driver '{}'.", slave.dev_name(), driver.name());
    res
}

/// Unbind `driver` from every peripheral it is bound to. Hook failures are only logged.
pub(crate) fn driver_detach_slaves(driver: &Arc<dyn SlaveDriver>, slaves: &[Handle<Slave>]) {
    for slave in slaves {
        let mut slot = slave.binding.lock();
        if !slot.driver().is_some_and(|bound| same_object(&bound, driver)) {
            continue;
        }
        let _ = binder::remove_slave(slave, driver.as_ref());
        slot.clear();
        info!("{}: unbound from driver '{}'.", slave.dev_name(), driver.name());
    }
}

pub(crate) fn shutdown_slave(slave: &Slave) {
    let slot = slave.binding.lock();
    if let Some(driver) = slot.driver() {
        binder::shutdown_slave(slave, driver.as_ref());
    }
}

/// Device registration pass for a controller. Same contract as [attach_slave].
pub(crate) fn attach_master(bus: &Bus, master: &Handle<Master>) -> Result<bool, BusError> {
    let mut slot = master.binding.lock();
    slot.mark_attached();
    if slot.is_occupied() {
        return Ok(true);
    }
    if !bus.has_master(master) {
        return Ok(false);
    }
    for driver in &bus.master_drivers() {
        if !master_matches(master, driver.as_ref()) || !bus.has_master_driver(driver) {
            continue;
        }
        bind_master(master, &mut slot, driver)?;
        return Ok(true);
    }
    debug_ex!("{}: no matching driver.", master.dev_name());
    Ok(false)
}

pub(crate) fn driver_attach_masters(
    bus: &Bus,
    driver: &Arc<dyn MasterDriver>,
    masters: &[Handle<Master>],
) -> usize {
    let mut bound = 0;
    for master in masters {
        if !master_matches(master, driver.as_ref()) {
            continue;
        }
        let mut slot = master.binding.lock();
        if slot.is_occupied() || !bus.has_master(master) {
            continue;
        }
        if !bus.has_master_driver(driver) {
            break;
        }
        if !slot.attached() && bus.earlier_master_driver_matches(driver, master) {
            debug_ex!("{}: left to its own pass.", master.dev_name());
            continue;
        }
        if bind_master(master, &mut slot, driver).is_ok() {
            bound += 1;
        }
    }
    bound
}

fn bind_master(
    master: &Master,
    slot: &mut BindGuard<'_, dyn MasterDriver>,
    driver: &Arc<dyn MasterDriver>,
) -> Result<(), BusError> {
    debug_ex!("{}: matched driver '{}'.", master.dev_name(), driver.name());
    slot.publish(driver.clone());
    if let Err(err) = binder::probe_master(master, driver.as_ref()) {
        slot.clear();
        return Err(err);
    }
    info!("{}: bound to driver '{}'.", master.dev_name(), driver.name());
    Ok(())
}

pub(crate) fn release_master(master: &Master) -> Result<(), BusError> {
    let mut slot = master.binding.lock();
    let Some(driver) = slot.driver() else {
        return Ok(());
    };
    let res = binder::remove_master(master, driver.as_ref());
    slot.clear();
    info!("{}: unbound from driver '{}'.", master.dev_name(), driver.name());
    res
}

pub(crate) fn driver_detach_masters(driver: &Arc<dyn MasterDriver>, masters: &[Handle<Master>]) {
    for master in masters {
        let mut slot = master.binding.lock();
        if !slot.driver().is_some_and(|bound| same_object(&bound, driver)) {
            continue;
        }
        let _ = binder::remove_master(master, driver.as_ref());
        slot.clear();
        info!("{}: unbound from driver '{}'.", master.dev_name(), driver.name());
    }
}

pub(crate) fn shutdown_master(master: &Master) {
    let slot = master.binding.lock();
    if let Some(driver) = slot.driver() {
        binder::shutdown_master(master, driver.as_ref());
    }
}

/// Run `hook` on the controller's bound driver if it declares `required`.
pub(crate) fn with_master_driver(
    master: &Master,
    required: DriverHooks,
    hook: impl FnOnce(&dyn MasterDriver) -> Result<(), DriverError>,
) -> Result<(), BusError> {
    let slot = master.binding.lock();
    match slot.driver() {
        Some(driver) if driver.hooks().contains(required) => {
            hook(driver.as_ref()).map_err(BusError::HookFailed)
        }
        _ => Ok(()),
    }
}
