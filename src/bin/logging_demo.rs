// SPDX-License-Identifier: Apache-2.0 OR MIT
// Walk-through of the hotlog public surface
//
// Run with: cargo run --bin logging_demo

use anyhow::Result;
use hotlog::sinks::{ConsoleSink, MemoryRingSink};
use hotlog::{
    context, log_error, log_every_n, log_if, log_info, log_once, log_warn, Level, Logger,
    ScopedTag,
};
use std::time::Duration;

fn main() -> Result<()> {
    let logger = Logger::global();

    // Console output plus an in-memory crash-dump ring.
    logger.add_sink(Box::new(ConsoleSink::new()));
    let ring_sink = MemoryRingSink::new(128);
    let dump = ring_sink.handle();
    logger.add_sink(Box::new(ring_sink));

    context::set_process_name("logging-demo");
    context::set_app_version("0.1.0");
    context::set_thread_name("main");
    context::set_global_tag("env", "demo");

    logger.set_level(Level::Debug);
    logger.start();

    log_info!("demo starting (build {} / {})", context::git_hash(), context::build_type());

    // Scoped tags attach to every record in their lifetime, this thread only.
    {
        let _request = ScopedTag::new("req", "42");
        log_info!("handling request");
        log_warn!("request is slow");
    }
    log_info!("request scope closed, tag gone");

    // Conditional and rate-limited variants.
    let queue_depth = 930;
    log_if!(queue_depth > 900, Level::Warn, "queue depth {queue_depth}");
    for i in 0..10 {
        log_every_n!(Level::Info, 5, "heartbeat (iteration {i})");
    }

    // log_once emits a single record no matter how many threads race it.
    let mut workers = Vec::new();
    for i in 0..4 {
        workers.push(std::thread::spawn(move || {
            context::set_thread_name(&format!("worker-{i}"));
            log_once!(Level::Warn, "first worker reached the barrier");
            log_info!("worker {i} done");
        }));
    }
    for worker in workers {
        let _ = worker.join();
    }

    log_error!("simulated failure, dumping recent records");
    std::thread::sleep(Duration::from_millis(20));

    let dump_path = std::env::temp_dir().join("logging_demo_dump.log");
    dump.dump_to_file(&dump_path)?;
    log_info!("crash dump written to {}", dump_path.display());

    logger.stop();
    println!("dropped records: {}", logger.drop_count());
    Ok(())
}
