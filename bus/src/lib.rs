//! SoundWire-style bus core.
//!
//! Binds controller ("master") and peripheral ("slave") devices to their drivers:
//!
//! - [id] and [matcher] decide which driver fits which device,
//! - `binder` sequences probe, remove and shutdown against the device's power domain,
//! - `dispatch` runs one matching pass per registration event,
//! - [bus] holds the registry and is the public registration API,
//! - [modalias] exports the identity strings userspace uses to pick drivers.
//!
//! Transport I/O, firmware parsing and power management stay outside; the bus only sees
//! them through [power::PowerDomain] and the driver traits in [driver].
#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
pub mod logging;

mod binder;
pub mod binding;
pub mod bus;
mod dispatch;
pub mod driver;
pub mod error;
pub mod handle;
pub mod id;
pub mod master;
pub mod matcher;
pub mod modalias;
pub mod naming;
pub mod power;
pub mod slave;

pub use binding::BindState;
pub use bus::{Bus, BusConfig};
pub use driver::{DriverHooks, MasterDriver, SlaveDriver};
pub use error::{BusError, DriverError, PowerError};
pub use handle::{Handle, HandleRef};
pub use id::{DeviceId, SlaveId};
pub use master::{Master, Payload};
pub use matcher::{BusDevice, BusDriver};
pub use power::PowerDomain;
pub use slave::{Slave, SlaveProperties};
