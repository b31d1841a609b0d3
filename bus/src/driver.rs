//! Driver traits for the two device kinds.
//!
//! A driver declares the hooks it implements through [DriverHooks]. The bus checks that set
//! before calling anything: a driver without [DriverHooks::PROBE] is refused at registration,
//! and optional hooks that are not declared are never invoked, even though the traits provide
//! default bodies for them.
//!
//! Drivers are shared by every device they bind to. Per-device state lives on the device
//! (see [Slave::properties]); a driver that keeps global state synchronizes it itself.
use crate::{
    error::DriverError,
    id::DeviceId,
    master::{Master, Payload},
    slave::Slave,
};
use bitflags::bitflags;

bitflags! {
    /// Hooks a driver implements.
    pub struct DriverHooks: u32 {
        /// Bind to a device. Mandatory.
        const PROBE         = 1 << 0;
        /// Unbind from a device.
        const REMOVE        = 1 << 1;
        /// System power-down notification.
        const SHUTDOWN      = 1 << 2;
        /// Peripheral only: read device properties after a successful probe.
        const READ_PROP     = 1 << 3;
        /// Controller only: start the link once all peripherals are registered.
        const STARTUP       = 1 << 4;
        /// Controller only: handle an in-band wake from a peripheral.
        const WAKE_EVENT    = 1 << 5;
    }
}

/// Driver for peripheral devices, matched by identity table.
pub trait SlaveDriver: Send + Sync {
    fn name(&self) -> &str;

    /// Identities this driver accepts, scanned in order.
    fn id_table(&self) -> &[DeviceId];

    fn hooks(&self) -> DriverHooks;

    /// Bind to `slave`; `id` is the identity-table entry that matched it.
    fn probe(&self, _slave: &Slave, _id: &DeviceId) -> Result<(), DriverError> {
        Err(DriverError::Unsupported)
    }

    fn remove(&self, _slave: &Slave) -> Result<(), DriverError> {
        Ok(())
    }

    fn shutdown(&self, _slave: &Slave) {}

    /// Report device properties, typically through [Slave::update_properties].
    fn read_prop(&self, _slave: &Slave) {}
}

/// Driver for controller devices, matched by name prefix.
pub trait MasterDriver: Send + Sync {
    /// Prefix of the controller names this driver binds to.
    fn name(&self) -> &str;

    fn hooks(&self) -> DriverHooks;

    /// Bind to `master`; `payload` is the opaque data the controller was created with.
    fn probe(&self, _master: &Master, _payload: Option<&Payload>) -> Result<(), DriverError> {
        Err(DriverError::Unsupported)
    }

    fn remove(&self, _master: &Master) -> Result<(), DriverError> {
        Ok(())
    }

    fn shutdown(&self, _master: &Master) {}

    fn startup(&self, _master: &Master) -> Result<(), DriverError> {
        Ok(())
    }

    fn process_wake_event(&self, _master: &Master) -> Result<(), DriverError> {
        Ok(())
    }
}
