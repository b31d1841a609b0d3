//! Error types for the bus core and its collaborators.

use core::fmt;

/// Errors returned by driver hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// The device did not respond the way the driver expected.
    DeviceNotFound,
    /// Driver initialization failed.
    InitFailed,
    /// A hardware operation timed out.
    Timeout,
    /// The driver does not implement the requested operation.
    Unsupported,
    /// A link transfer failed.
    IoError,
    /// Driver-specific error code.
    Code(i32),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceNotFound => f.write_str("device not found"),
            Self::InitFailed => f.write_str("driver initialization failed"),
            Self::Timeout => f.write_str("hardware operation timed out"),
            Self::Unsupported => f.write_str("operation not supported"),
            Self::IoError => f.write_str("I/O error"),
            Self::Code(code) => write!(f, "driver error {}", code),
        }
    }
}

impl core::error::Error for DriverError {}

/// Errors returned by a power domain on attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerError {
    /// The domain is transitioning and cannot take a new device now.
    Busy,
    /// The domain rejected the device.
    Rejected,
    /// Domain-specific error code.
    Code(i32),
}

impl fmt::Display for PowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => f.write_str("power domain busy"),
            Self::Rejected => f.write_str("power domain rejected device"),
            Self::Code(code) => write!(f, "power domain error {}", code),
        }
    }
}

impl core::error::Error for PowerError {}

/// Errors surfaced by the registration and lifecycle API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// The device or driver handle is not known to this bus.
    InvalidArgument,
    /// A driver was registered without a probe hook.
    MissingProbeHook,
    /// A device with the same stable name is already registered.
    DuplicateIdentity,
    /// Probe was invoked for a device the driver's identity table does not list.
    NoMatchingIdentity,
    /// The power domain refused the attach; carried through unchanged.
    PowerAttachFailed(PowerError),
    /// The driver's probe hook failed.
    ProbeHookFailed(DriverError),
    /// A remove, startup or wake hook failed. Cleanup already happened.
    HookFailed(DriverError),
    /// Not enough memory to construct the device.
    AllocationFailed,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => f.write_str("invalid device or driver handle"),
            Self::MissingProbeHook => f.write_str("driver provides no probe hook"),
            Self::DuplicateIdentity => f.write_str("device already registered"),
            Self::NoMatchingIdentity => f.write_str("device id not in driver id table"),
            Self::PowerAttachFailed(e) => write!(f, "power domain attach failed: {}", e),
            Self::ProbeHookFailed(e) => write!(f, "probe failed: {}", e),
            Self::HookFailed(e) => write!(f, "driver hook failed: {}", e),
            Self::AllocationFailed => f.write_str("out of memory"),
        }
    }
}

impl core::error::Error for BusError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::PowerAttachFailed(e) => Some(e),
            Self::ProbeHookFailed(e) | Self::HookFailed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PowerError> for BusError {
    fn from(value: PowerError) -> Self {
        BusError::PowerAttachFailed(value)
    }
}

impl From<alloc::collections::TryReserveError> for BusError {
    fn from(_: alloc::collections::TryReserveError) -> Self {
        BusError::AllocationFailed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::error::Error;

    #[test]
    fn display() {
        assert_eq!(format!("{}", DriverError::Code(-5)), "driver error -5");
        assert_eq!(
            format!("{}", BusError::ProbeHookFailed(DriverError::Timeout)),
            "probe failed: hardware operation timed out"
        );
        assert_eq!(
            format!("{}", BusError::PowerAttachFailed(PowerError::Busy)),
            "power domain attach failed: power domain busy"
        );
        assert_eq!(format!("{}", BusError::MissingProbeHook), "driver provides no probe hook");
    }

    #[test]
    fn power_error_converts_verbatim() {
        let e: BusError = PowerError::Code(-16).into();
        assert_eq!(e, BusError::PowerAttachFailed(PowerError::Code(-16)));
        assert!(e.source().is_some());
        assert!(BusError::DuplicateIdentity.source().is_none());
    }
}
