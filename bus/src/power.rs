//! Power-dependency capability consumed by the binder.
//!
//! The bus only ever attaches a device to its power domain without powering it on, and
//! detaches it without powering it off. Actual power sequencing belongs to the domain
//! and to the driver.
use crate::error::PowerError;

/// A power domain a device can depend on.
pub trait PowerDomain: Send + Sync {
    /// Make `dev_name` a dependent of this domain, turning it on only if `power_on`.
    fn attach(&self, dev_name: &str, power_on: bool) -> Result<(), PowerError>;
    /// Drop `dev_name` from this domain, turning it off only if `power_off`.
    fn detach(&self, dev_name: &str, power_off: bool);
}
