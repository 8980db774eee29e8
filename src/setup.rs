// One-call wiring for applications that want the usual sink set without
// assembling it by hand

use crate::fmt::PatternFormatter;
use crate::sinks::{ConsoleSink, RotatingFileSink, Sink};
use crate::{context, Error, Logger};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Sink configuration consumed by [`init`].
pub struct InitConfig {
    /// Attach a console sink.
    pub enable_console: bool,
    /// Pattern for the console sink; color tokens are honored when either
    /// stream is a TTY.
    pub console_pattern: String,
    /// Attach a rotating file sink at `{file_dir}/{app_name}.log`.
    pub enable_file: bool,
    pub file_dir: PathBuf,
    pub max_file_size: u64,
    pub max_files: usize,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            enable_console: true,
            console_pattern: "[%D %T%e] [%C%L%R] [%g] [%f:%#::%n] %m".to_string(),
            enable_file: false,
            file_dir: PathBuf::from("/tmp/robot_logs"),
            max_file_size: 50 * 1024 * 1024,
            max_files: 5,
        }
    }
}

/// Register the configured sinks, record the process name, and start the
/// consumer. Call once at application startup.
pub fn init(app_name: &str, config: InitConfig) -> Result<(), Error> {
    context::set_process_name(app_name);
    let logger = Logger::global();

    if config.enable_console {
        let use_color = std::io::stdout().is_terminal() || std::io::stderr().is_terminal();
        let mut sink = ConsoleSink::new();
        sink.set_formatter(Box::new(PatternFormatter::new(
            &config.console_pattern,
            use_color,
        )));
        logger.add_sink(Box::new(sink));
    }

    if config.enable_file {
        std::fs::create_dir_all(&config.file_dir).map_err(|source| Error::CreateDir {
            path: config.file_dir.clone(),
            source,
        })?;
        let path = config.file_dir.join(format!("{app_name}.log"));
        let sink = RotatingFileSink::new(path, config.max_file_size, config.max_files)?;
        logger.add_sink(Box::new(sink));
    }

    logger.start();
    Ok(())
}

/// Stop the consumer, draining the ring and flushing every sink.
pub fn shutdown() {
    Logger::global().stop();
}
