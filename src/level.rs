// Log levels, ordered from most to least verbose

use serde::{Deserialize, Serialize};

/// Log severity levels (0-6, higher is more severe; Off disables everything)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Verbose tracing (per-iteration state, hot-loop diagnostics)
    Trace = 0,
    /// Debug-level messages (internal state transitions)
    Debug = 1,
    /// Informational (lifecycle events, normal operation)
    Info = 2,
    /// Warning conditions (degraded but operational)
    Warn = 3,
    /// Error conditions (operation failed, service continues)
    Error = 4,
    /// Fatal conditions (service cannot continue)
    Fatal = 5,
    /// Sentinel that filters out every record
    Off = 6,
}

impl Level {
    /// Get level as u8 (0-6)
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get level name as static string
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Off => "OFF",
        }
    }

    /// Single-character level code used by the `%l` pattern token
    pub const fn short_char(self) -> char {
        match self {
            Level::Trace => 'T',
            Level::Debug => 'D',
            Level::Info => 'I',
            Level::Warn => 'W',
            Level::Error => 'E',
            Level::Fatal => 'F',
            Level::Off => 'O',
        }
    }

    /// Create from u8 value (returns None if invalid)
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Level::Trace),
            1 => Some(Level::Debug),
            2 => Some(Level::Info),
            3 => Some(Level::Warn),
            4 => Some(Level::Error),
            5 => Some(Level::Fatal),
            6 => Some(Level::Off),
            _ => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
