//! Device/driver compatibility predicates.
//!
//! Pure functions: no locks, no side effects. The dispatcher decides what to do with a match.
use crate::{
    driver::{MasterDriver, SlaveDriver},
    id::find_device_id,
    master::Master,
    slave::Slave,
};

/// A device of either kind.
#[derive(Debug, Clone, Copy)]
pub enum BusDevice<'a> {
    Master(&'a Master),
    Slave(&'a Slave),
}

/// A driver of either kind.
#[derive(Clone, Copy)]
pub enum BusDriver<'a> {
    Master(&'a dyn MasterDriver),
    Slave(&'a dyn SlaveDriver),
}

/// A peripheral matches iff the driver's table lists its exact (manufacturer, part) pair.
pub fn slave_matches(slave: &Slave, driver: &dyn SlaveDriver) -> bool {
    find_device_id(driver.id_table(), &slave.id()).is_some()
}

/// A controller matches iff its name starts with the driver's name.
///
/// Controllers carry no hardware id, so the driver name stands in for one. The direction is
/// fixed: driver "codec-master" binds controller "codec-master-0", never the other way round.
pub fn master_matches(master: &Master, driver: &dyn MasterDriver) -> bool {
    master.name().starts_with(driver.name())
}

/// Dispatch on device kind. A device never matches a driver of the other kind.
pub fn bus_match(dev: BusDevice<'_>, drv: BusDriver<'_>) -> bool {
    match (dev, drv) {
        (BusDevice::Slave(slave), BusDriver::Slave(driver)) => slave_matches(slave, driver),
        (BusDevice::Master(master), BusDriver::Master(driver)) => master_matches(master, driver),
        _ => false,
    }
}
