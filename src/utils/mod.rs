//! Utilities: logging (dynamic level, stderr only) and monotonic timing.
//!
//! Key items:
//!   init_logging / derive_level
//!   log_error! / log_info! / log_debug! / log_trace!
//!   monotonic_ms
//!
//! Standard output belongs to the host protocol (item payload or action text),
//! so every log line is written to standard error.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Logging helpers.
pub mod logging {
    use super::*;

    #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
    pub enum LogLevel {
        Error = 0,
        Info = 1,
        Debug = 2,
        Trace = 3,
    }

    impl LogLevel {
        pub fn as_str(&self) -> &'static str {
            match self {
                LogLevel::Error => "ERROR",
                LogLevel::Info => "INFO",
                LogLevel::Debug => "DEBUG",
                LogLevel::Trace => "TRACE",
            }
        }
    }

    static LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

    pub fn init_logging(level: LogLevel) {
        LEVEL.store(level as u8, Ordering::Relaxed);
    }

    fn level() -> LogLevel {
        match LEVEL.load(Ordering::Relaxed) {
            0 => LogLevel::Error,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Map CLI verbosity onto a level. `host_debug` is the host's debugger
    /// switch (`alfred_debug=1`) and lifts the floor to Debug unless quiet.
    pub fn derive_level(verbose: u8, quiet: bool, host_debug: bool) -> LogLevel {
        if quiet {
            return LogLevel::Error;
        }
        let level = match verbose {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        };
        if host_debug {
            level.max(LogLevel::Debug)
        } else {
            level
        }
    }

    fn timestamp() -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0)
    }

    pub fn log(lvl: LogLevel, msg: impl AsRef<str>) {
        if lvl <= level() {
            eprintln!("[{}][{}] {}", lvl.as_str(), timestamp(), msg.as_ref());
        }
    }

    pub fn error(msg: impl AsRef<str>) {
        log(LogLevel::Error, msg);
    }
    pub fn info(msg: impl AsRef<str>) {
        log(LogLevel::Info, msg);
    }
    pub fn debug(msg: impl AsRef<str>) {
        log(LogLevel::Debug, msg);
    }
    pub fn trace(msg: impl AsRef<str>) {
        log(LogLevel::Trace, msg);
    }


    #[macro_export]
    macro_rules! log_error {
        ($($t:tt)*) => { $crate::utils::logging::error(format!($($t)*)) };
    }
    #[macro_export]
    macro_rules! log_info {
        ($($t:tt)*) => { $crate::utils::logging::info(format!($($t)*)) };
    }
    #[macro_export]
    macro_rules! log_debug {
        ($($t:tt)*) => { $crate::utils::logging::debug(format!($($t)*)) };
    }
    #[macro_export]
    macro_rules! log_trace {
        ($($t:tt)*) => { $crate::utils::logging::trace(format!($($t)*)) };
    }
}

pub use logging::{derive_level, init_logging};

/// Simple time utility: monotonic milliseconds (NOT wall clock).
pub fn monotonic_ms() -> u128 {
    use std::time::Instant;
    static START: OnceLock<Instant> = OnceLock::new();
    let base = START.get_or_init(Instant::now);
    base.elapsed().as_millis()
}
