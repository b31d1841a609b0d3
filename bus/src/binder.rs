//! Probe, remove and shutdown sequencing for a matched (device, driver) pair.
//!
//! The binder runs with the device's binding slot locked by the dispatcher and keeps the
//! slot's [BindState] current. It never touches the bus collections.
use crate::{
    binding::BindState,
    bus::BusConfig,
    driver::{DriverHooks, MasterDriver, SlaveDriver},
    error::BusError,
    id::find_device_id,
    master::Master,
    power::PowerDomain,
    slave::Slave,
};
use log::{debug, error, warn};

fn power_attach(power: Option<&dyn PowerDomain>, dev_name: &str) -> Result<(), BusError> {
    match power {
        // attach to the domain but don't turn it on
        Some(pd) => pd.attach(dev_name, false).map_err(BusError::from),
        None => Ok(()),
    }
}

fn power_detach(power: Option<&dyn PowerDomain>, dev_name: &str) {
    if let Some(pd) = power {
        pd.detach(dev_name, false);
    }
}

/// Bind `driver` to `slave`.
///
/// On success the device is `Bound`, `probed` is set, the completion has fired and the
/// controller's clock-stop timeout covers this device. On failure the device is back to
/// `Unbound` with its power domain detached.
pub fn probe_slave(
    slave: &Slave,
    driver: &dyn SlaveDriver,
    config: &BusConfig,
) -> Result<(), BusError> {
    slave.binding.set_state(BindState::Probing);
    let res = probe_slave_inner(slave, driver, config);
    slave.binding.set_state(match res {
        Ok(()) => BindState::Bound,
        Err(_) => BindState::Unbound,
    });
    res
}

fn probe_slave_inner(
    slave: &Slave,
    driver: &dyn SlaveDriver,
    config: &BusConfig,
) -> Result<(), BusError> {
    let dev_name = slave.dev_name();
    let Some(id) = find_device_id(driver.id_table(), &slave.id()) else {
        error!(
            "Probe of {} on {}: id {:04x}:{:04x} not in driver id table.",
            driver.name(),
            dev_name,
            slave.id().mfg_id,
            slave.id().part_id
        );
        return Err(BusError::NoMatchingIdentity);
    };
    let master = slave.master().ok_or(BusError::InvalidArgument)?;

    power_attach(slave.power_domain(), dev_name)?;

    if let Err(err) = driver.probe(slave, id) {
        error!("Probe of {} failed on {}: {}", driver.name(), dev_name, err);
        power_detach(slave.power_domain(), dev_name);
        return Err(BusError::ProbeHookFailed(err));
    }

    // device is probed so read the properties now
    if driver.hooks().contains(DriverHooks::READ_PROP) {
        driver.read_prop(slave);
    }

    let mut timeout = 0;
    slave.update_properties(|prop| {
        if prop.clk_stop_timeout == 0 {
            prop.clk_stop_timeout = config.default_clk_stop_timeout_ms;
        }
        timeout = prop.clk_stop_timeout;
    });
    let bus_timeout = master.raise_clk_stop_timeout(timeout);
    debug!(
        "{}: clock-stop timeout {} ms, {} now {} ms.",
        dev_name,
        timeout,
        master.dev_name(),
        bus_timeout
    );

    slave.mark_probed();
    Ok(())
}

/// Unbind `driver` from `slave`.
///
/// The power domain is detached whatever the remove hook returns; the hook's error is only
/// passed back.
pub fn remove_slave(slave: &Slave, driver: &dyn SlaveDriver) -> Result<(), BusError> {
    let res = if driver.hooks().contains(DriverHooks::REMOVE) {
        driver.remove(slave).map_err(BusError::HookFailed)
    } else {
        Ok(())
    };
    if let Err(err) = &res {
        warn!("Remove of {} on {}: {}", driver.name(), slave.dev_name(), err);
    }
    power_detach(slave.power_domain(), slave.dev_name());
    slave.binding.set_state(BindState::Unbound);
    res
}

/// Notify `driver` that the system is going down. No state change.
pub fn shutdown_slave(slave: &Slave, driver: &dyn SlaveDriver) {
    if driver.hooks().contains(DriverHooks::SHUTDOWN) {
        driver.shutdown(slave);
    }
}

/// Bind `driver` to `master`, handing it the controller's payload.
pub fn probe_master(master: &Master, driver: &dyn MasterDriver) -> Result<(), BusError> {
    master.binding.set_state(BindState::Probing);
    let res = probe_master_inner(master, driver);
    master.binding.set_state(match res {
        Ok(()) => BindState::Bound,
        Err(_) => BindState::Unbound,
    });
    res
}

fn probe_master_inner(master: &Master, driver: &dyn MasterDriver) -> Result<(), BusError> {
    let dev_name = master.dev_name();
    power_attach(master.power_domain(), dev_name)?;
    if let Err(err) = driver.probe(master, master.payload()) {
        error!("Probe of {} failed on {}: {}", driver.name(), dev_name, err);
        power_detach(master.power_domain(), dev_name);
        return Err(BusError::ProbeHookFailed(err));
    }
    Ok(())
}

pub fn remove_master(master: &Master, driver: &dyn MasterDriver) -> Result<(), BusError> {
    let res = if driver.hooks().contains(DriverHooks::REMOVE) {
        driver.remove(master).map_err(BusError::HookFailed)
    } else {
        Ok(())
    };
    if let Err(err) = &res {
        warn!("Remove of {} on {}: {}", driver.name(), master.dev_name(), err);
    }
    power_detach(master.power_domain(), master.dev_name());
    master.binding.set_state(BindState::Unbound);
    res
}

pub fn shutdown_master(master: &Master, driver: &dyn MasterDriver) {
    if driver.hooks().contains(DriverHooks::SHUTDOWN) {
        driver.shutdown(master);
    }
}
