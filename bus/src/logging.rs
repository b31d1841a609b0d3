//! Logging helpers on top of the [log] facade.
//!
//! The bus never installs a logger itself; records go to whatever logger the embedding
//! kernel registered with [log::set_logger].

/// Target used for every record emitted by the bus core.
pub const LOG_TARGET: &str = "sdw";

/// Debug-level record that is only compiled in with `debug_assertions`.
///
/// Used for per-pass matching chatter that is too noisy for release builds.
#[macro_export]
macro_rules! debug_ex {
    // debug_ex!(target: "my_target", "a {} event", "log")
    (target: $target:expr, $($arg:tt)+) => {
        #[cfg(debug_assertions)]
        {
            ::log::log!(target: $target, ::log::Level::Debug, $($arg)+)
        }
    };

    // debug_ex!("a {} event", "log")
    ($($arg:tt)+) => {
        #[cfg(debug_assertions)]
        {
            ::log::log!(target: $crate::logging::LOG_TARGET, ::log::Level::Debug, $($arg)+)
        }
    };
}
