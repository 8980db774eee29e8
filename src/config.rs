// SPDX-License-Identifier: Apache-2.0 OR MIT
// Compile-time configuration constants

use crate::level::Level;

/// Slots in the MPSC ring. Must be a power of two; the ring enforces this
/// at compile time.
pub const RING_SIZE: usize = if cfg!(feature = "embedded") { 256 } else { 8192 };

/// Inline message bytes per record, including the trailing NUL.
pub const MAX_MSG_LEN: usize = if cfg!(feature = "embedded") { 128 } else { 384 };

/// Tags per record (global + scoped combined).
pub const MAX_TAGS: usize = 8;

/// Inline tag key bytes, including the trailing NUL.
pub const MAX_TAG_KEY_LEN: usize = 32;

/// Inline tag value bytes, including the trailing NUL.
pub const MAX_TAG_VAL_LEN: usize = 64;

/// Process-global tag set capacity.
pub const MAX_GLOBAL_TAGS: usize = 16;

/// Inline thread-name bytes, including the trailing NUL.
pub const THREAD_NAME_LEN: usize = 32;

/// Records popped per drain batch by the consumer loop.
pub const DRAIN_BATCH: usize = 64;

/// Scratch buffer capacity each sink reserves for formatted output.
pub const FORMAT_BUF_CAPACITY: usize = 2048;

/// Compile-time minimum level. Call sites below this level fold away after
/// constant propagation: the macros compare against this constant before
/// touching the logger.
pub const ACTIVE_LEVEL: Level = if cfg!(debug_assertions) {
    Level::Trace
} else {
    Level::Info
};

/// Git commit the library was built from, injected by the build script.
pub const GIT_HASH: &str = env!("HOTLOG_GIT_HASH");

/// Cargo profile the library was built with, injected by the build script.
pub const BUILD_TYPE: &str = env!("HOTLOG_BUILD_TYPE");
