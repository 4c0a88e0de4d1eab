//! Logging macros for ergonomic log message formatting.
//!
//! These macros work like `println!` and `format!`, but also record the
//! module path and enclosing function of the call site, which the plain
//! [`Logger`](crate::Logger) methods cannot see. Arguments are not formatted
//! when the level is below the logger's threshold.
//!
//! # Examples
//!
//! ```
//! use rust_slot_logger::prelude::*;
//! use rust_slot_logger::info;
//!
//! let logger = Logger::new();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Name of the enclosing function, e.g. `my_crate::server::run`.
#[doc(hidden)]
#[macro_export]
macro_rules! __function_name {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __type_name_of(__here);
        name.strip_suffix("::__here").unwrap_or(name)
    }};
}

/// Capture the current [`CallSite`](crate::CallSite).
///
/// ```
/// let site = rust_slot_logger::call_site!();
/// assert_eq!(site.line, line!() - 1);
/// assert!(site.function.ends_with("main"));
/// ```
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::new(
            ::std::file!(),
            ::std::line!(),
            ::std::module_path!(),
            $crate::__function_name!(),
        )
    };
}

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use rust_slot_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_slot_logger::log;
/// log!(logger, Level::Info, "Simple message");
/// log!(logger, Level::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_at($crate::call_site!(), $level, ::std::format_args!($($arg)+))
    };
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// # use rust_slot_logger::prelude::*;
/// # let logger = Logger::new();
/// # logger.set_level(Level::Trace);
/// use rust_slot_logger::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_slot_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_slot_logger::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_slot_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_slot_logger::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "HTTP error: {} - {}", 404, "Not Found");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
///
/// Terminates the process if the logger's exit level admits `Fatal`.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Level::Fatal, $($arg)+)
    };
}

/// Log at the logger's panic level, then panic with the same message.
///
/// ```should_panic
/// # use rust_slot_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_slot_logger::log_panic;
/// log_panic!(logger, "invariant broken: {}", "queue underflow");
/// ```
#[macro_export]
macro_rules! log_panic {
    ($logger:expr, $($arg:tt)+) => {
        $logger.panic_at($crate::call_site!(), ::std::format_args!($($arg)+))
    };
}

/// Start timing; returns a closure that logs the message with the elapsed
/// time when called.
///
/// ```
/// # use rust_slot_logger::prelude::*;
/// # let logger = Logger::new();
/// use rust_slot_logger::timing;
/// let done = timing!(logger, "rebuild index {}", 7);
/// done();
/// ```
#[macro_export]
macro_rules! timing {
    ($logger:expr, $($arg:tt)+) => {
        $logger.timing_at($crate::call_site!(), ::std::format!($($arg)+))
    };
}
