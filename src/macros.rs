// SPDX-License-Identifier: Apache-2.0 OR MIT
// Logging macros: the user-facing front end
//
// Two gates run before any work happens: the compile-time ACTIVE_LEVEL
// comparison (constant-folded away for disabled levels) and the logger's
// runtime level. Only then is the record assembled and published.

/// Log at an explicit level.
///
/// # Examples
/// ```ignore
/// log_at!(Level::Info, "worker {} online", id);
/// ```
#[macro_export]
macro_rules! log_at {
    ($lvl:expr, $($arg:tt)+) => {{
        let level: $crate::Level = $lvl;
        if (level as u8) >= ($crate::config::ACTIVE_LEVEL as u8) {
            let logger = $crate::Logger::global();
            if level >= logger.level() {
                logger.log(level, $crate::source_location!(), ::core::format_args!($($arg)+));
            }
        }
    }};
}

/// Log a message with trace level
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Trace, $($arg)+) };
}

/// Log a message with debug level
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Debug, $($arg)+) };
}

/// Log a message with info level
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Info, $($arg)+) };
}

/// Log a message with warn level
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Warn, $($arg)+) };
}

/// Log a message with error level
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Error, $($arg)+) };
}

/// Log a message with fatal level
#[macro_export]
macro_rules! log_fatal {
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Fatal, $($arg)+) };
}

/// Log only when `cond` holds. The condition is evaluated before the level
/// gates; nothing else happens when it is false.
///
/// # Examples
/// ```ignore
/// log_if!(latency_us > 500, Level::Warn, "slow frame: {latency_us}us");
/// ```
#[macro_export]
macro_rules! log_if {
    ($cond:expr, $lvl:expr, $($arg:tt)+) => {{
        if $cond {
            $crate::log_at!($lvl, $($arg)+);
        }
    }};
}

/// Log on every n-th hit of this call site, counting across all threads.
/// The first hit always logs.
///
/// # Examples
/// ```ignore
/// log_every_n!(Level::Info, 1000, "processed {} frames", total);
/// ```
#[macro_export]
macro_rules! log_every_n {
    ($lvl:expr, $n:expr, $($arg:tt)+) => {{
        static HITS: ::std::sync::atomic::AtomicU64 = ::std::sync::atomic::AtomicU64::new(0);
        if HITS.fetch_add(1, ::std::sync::atomic::Ordering::Relaxed) % ($n) == 0 {
            $crate::log_at!($lvl, $($arg)+);
        }
    }};
}

/// Log exactly once for this call site, no matter how many threads race the
/// first hit.
///
/// # Examples
/// ```ignore
/// log_once!(Level::Warn, "legacy config key 'rate' is deprecated");
/// ```
#[macro_export]
macro_rules! log_once {
    ($lvl:expr, $($arg:tt)+) => {{
        static LOGGED: ::std::sync::atomic::AtomicBool =
            ::std::sync::atomic::AtomicBool::new(false);
        if !LOGGED.swap(true, ::std::sync::atomic::Ordering::Relaxed) {
            $crate::log_at!($lvl, $($arg)+);
        }
    }};
}

#[cfg(test)]
mod tests {
    use crate::{Level, Logger, Record};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_macro_family_reaches_global_logger() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let capture = Arc::clone(&captured);
        let logger = Logger::global();
        logger.add_sink(Box::new(crate::sinks::CallbackSink::new(
            move |record: &Record| {
                capture.lock().unwrap().push((record.level, record.message().to_string()));
            },
        )));
        logger.set_level(Level::Trace);

        log_trace!("trace message");
        log_debug!("debug message");
        log_info!("info {}", 1);
        log_warn!("warn message");
        log_error!("error message");
        log_fatal!("fatal message");
        log_if!(true, Level::Info, "conditional");
        log_every_n!(Level::Info, 2, "first of pair");
        log_once!(Level::Info, "only once");

        logger.drain(64);

        let captured = captured.lock().unwrap();
        let messages: Vec<&str> = captured.iter().map(|(_, m)| m.as_str()).collect();
        assert!(messages.contains(&"trace message"));
        assert!(messages.contains(&"info 1"));
        assert!(messages.contains(&"fatal message"));
        assert!(messages.contains(&"conditional"));
        assert!(messages.contains(&"first of pair"));
        assert_eq!(captured.iter().filter(|(l, _)| *l == Level::Fatal).count(), 1);
    }
}
