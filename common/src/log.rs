//! Logging macros shared by every crate in the workspace.
//!
//! Library code never installs a subscriber; these forward to [`tracing`] so the
//! binary decides how events are rendered.

/// Target used by [`success!`] so formatters can render it differently from plain info.
pub const SUCCESS_TARGET: &str = "netsweep::success";

/// Target used for raw, pre-formatted terminal lines.
pub const PRINT_TARGET: &str = "netsweep::print";

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: $crate::log::SUCCESS_TARGET, $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::tracing::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::tracing::debug!($($arg)*)
    };
}
