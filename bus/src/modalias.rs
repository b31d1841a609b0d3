//! Bus identity strings for driver auto-loading.
//!
//! The formats are a compatibility surface shared with userspace tooling:
//!
//! - peripheral: `<bus>:m<MFG>p<PART>`, both ids as 4-digit uppercase hex
//! - controller: `<bus>:<controller name>`
//!
//! Driver-side aliases use the same encoding, so the alias of a device equals one of the
//! aliases of every peripheral driver that would match it, and a controller alias starts
//! with the alias of every controller driver that would match it.
use crate::{
    driver::{MasterDriver, SlaveDriver},
    error::BusError,
    id::SlaveId,
    matcher::BusDevice,
    naming::try_format,
};
use alloc::{boxed::Box, vec::Vec};

pub fn slave_modalias(bus: &str, id: &SlaveId) -> Result<Box<str>, BusError> {
    id_alias(bus, id.mfg_id, id.part_id)
}

pub fn master_modalias(bus: &str, name: &str) -> Result<Box<str>, BusError> {
    try_format(format_args!("{}:{}", bus, name))
}

pub fn modalias(bus: &str, dev: BusDevice<'_>) -> Result<Box<str>, BusError> {
    match dev {
        BusDevice::Slave(slave) => slave_modalias(bus, &slave.id()),
        BusDevice::Master(master) => master_modalias(bus, master.name()),
    }
}

/// The `MODALIAS=` uevent variable for `dev`.
pub fn uevent(bus: &str, dev: BusDevice<'_>) -> Result<Box<str>, BusError> {
    let alias = modalias(bus, dev)?;
    try_format(format_args!("MODALIAS={}", alias))
}

/// Aliases a peripheral driver advertises, one per identity-table entry, in table order.
pub fn driver_aliases(bus: &str, driver: &dyn SlaveDriver) -> Result<Vec<Box<str>>, BusError> {
    let table = driver.id_table();
    let mut aliases = Vec::new();
    aliases.try_reserve_exact(table.len())?;
    for entry in table {
        aliases.push(id_alias(bus, entry.mfg_id, entry.part_id)?);
    }
    Ok(aliases)
}

/// Alias prefix a controller driver advertises.
pub fn master_driver_alias(bus: &str, driver: &dyn MasterDriver) -> Result<Box<str>, BusError> {
    master_modalias(bus, driver.name())
}

fn id_alias(bus: &str, mfg_id: u16, part_id: u16) -> Result<Box<str>, BusError> {
    try_format(format_args!("{}:m{:04X}p{:04X}", bus, mfg_id, part_id))
}
