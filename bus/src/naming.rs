//! Stable device names and fallible string allocation.
//!
//! Device names are bus-scoped: they identify a device for `DuplicateIdentity` checks and in
//! every log record. Building them is the only allocation a device needs besides its own
//! `Arc`, so it is done with `try_reserve` and reported as `AllocationFailed`.
use crate::{error::BusError, id::SlaveId};
use alloc::{boxed::Box, string::String};
use core::fmt::{self, Write};

/// `sdw-master-<link>`.
pub fn master_dev_name(link_id: u32) -> Result<Box<str>, BusError> {
    try_format(format_args!("{}-{}", config::MASTER_NAME_PREFIX, link_id))
}

/// `sdw:<link>:<mfg>:<part>:<unique>`, lowercase hex.
pub fn slave_dev_name(link_id: u32, id: &SlaveId) -> Result<Box<str>, BusError> {
    try_format(format_args!(
        "{}:{:x}:{:04x}:{:04x}:{:x}",
        config::BUS_NAME,
        link_id,
        id.mfg_id,
        id.part_id,
        id.unique_id
    ))
}

/// Copy `s` into a new allocation, failing instead of aborting when memory is short.
pub fn try_box_str(s: &str) -> Result<Box<str>, BusError> {
    let mut buf = String::new();
    buf.try_reserve_exact(s.len())?;
    buf.push_str(s);
    Ok(buf.into_boxed_str())
}

/// Format into a new allocation sized up front.
pub fn try_format(args: fmt::Arguments<'_>) -> Result<Box<str>, BusError> {
    let mut counter = Counter(0);
    counter
        .write_fmt(args)
        .map_err(|_| BusError::AllocationFailed)?;
    let mut buf = String::new();
    buf.try_reserve_exact(counter.0)?;
    buf.write_fmt(args).map_err(|_| BusError::AllocationFailed)?;
    Ok(buf.into_boxed_str())
}

struct Counter(usize);

impl Write for Counter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}
