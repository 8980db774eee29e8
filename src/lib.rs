// SPDX-License-Identifier: Apache-2.0 OR MIT
// High-throughput lockless logging for latency-sensitive services
//
// Producers assemble self-contained records and publish them to a bounded
// lock-free MPSC ring; a single consumer thread drains the ring and hands
// each record to the configured sinks. Producers never block on I/O and
// never synchronize with each other except through atomics.
//
// Quick start:
//
//   hotlog::setup::init("my-node", hotlog::setup::InitConfig::default())?;
//   log_info!("node online, {} sensors", sensor_count);
//   hotlog::setup::shutdown();
//
// Pattern formatter tokens: %D date, %T time, %e microseconds, %L/%l level,
// %f/%F file, %n/%N function, %# line, %t/%P/%k thread id / process id /
// thread name, %q sequence id, %g tags, %m message, %C/%R color start/reset,
// %% literal percent.

pub mod backend;
pub mod clock;
pub mod config;
pub mod context;
pub mod fmt;
mod level;
pub mod location;
mod logger;
#[macro_use]
mod macros;
mod record;
mod ring;
pub mod setup;
pub mod sinks;

pub use backend::Backend;
pub use context::ScopedTag;
pub use level::Level;
pub use location::SourceLocation;
pub use logger::Logger;
pub use record::{Record, Tag};
pub use ring::MpscRing;

use std::path::PathBuf;

/// Errors surfaced by sink constructors and crash-dump writes. Everything
/// else in the library is fail-silent: a full ring bumps the drop counter,
/// a failed sink goes dark after one stderr diagnostic.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
