//! Build-time configuration for the bus.
//! The values are generated from `flags.json` so that tooling which builds
//! modalias strings can share the same constants as the kernel side.

#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]

/// Constants generated by `build.rs`.
#[allow(missing_docs)]
pub mod build_flags {
    include!(concat!(env!("OUT_DIR"), "/build_flags.rs"));
}

pub use build_flags::*;
