use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use env_logger::{Builder, Target};
use log::{Level, LevelFilter};

use crate::cli::LogLevel;

// ---------------------------------------------------------------------------
// Log sink: file + console
// ---------------------------------------------------------------------------

/// Writes every formatted record to the log file and to stderr.
struct Tee {
    file: File,
    console: io::Stderr,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        self.console.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.console.flush()
    }
}

/// Level names as they appear in the log file.
pub fn level_name(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

/// `2025/04/03 14:02:11 INFO:\tmessage`
pub fn format_line(timestamp: &str, level: Level, message: &str) -> String {
    format!("{timestamp} {}:\t{message}", level_name(level))
}

/// Install the global logger.
///
/// The log file is truncated first. Records from this crate are kept from
/// `level` up; other crates only report warnings and errors.
pub fn init(path: &Path, level: LogLevel) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;
    let tee = Tee {
        file,
        console: io::stderr(),
    };

    Builder::new()
        .filter_level(LevelFilter::Warn.min(level.filter()))
        .filter_module(env!("CARGO_CRATE_NAME"), level.filter())
        .format(|buf, record| {
            let timestamp = Local::now().format("%Y/%m/%d %H:%M:%S").to_string();
            writeln!(
                buf,
                "{}",
                format_line(&timestamp, record.level(), &record.args().to_string())
            )
        })
        .target(Target::Pipe(Box::new(tee)))
        .try_init()
        .context("installing logger")?;
    Ok(())
}
