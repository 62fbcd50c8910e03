//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::Level;

/// dnsyncd: keep Cloudflare "A" records pointed at this host
#[derive(Debug, Parser)]
#[command(name = "dnsyncd")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log level
    #[arg(long = "log-level", value_enum, default_value = "warning")]
    pub log_level: LogLevel,

    /// Location of the config file
    #[arg(long, default_value = dnsync_core::config::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Look up records but only log the writes that would be made
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// Log severity, accepting the logrus-style names operators are used to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[value(alias = "warning")]
    Warn,
    #[value(alias = "fatal", alias = "panic")]
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}
