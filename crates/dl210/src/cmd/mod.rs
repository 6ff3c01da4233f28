use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use dl210_device::{DumpConfig, LoggerHandle, LoggerOptions, DEFAULT_DUMP_ATTEMPTS};
use dl210_frame::FrameConfig;
use dl210_transport::DeviceChannel;
use tracing::debug;

use crate::exit::{device_error, CliError, CliResult};
use crate::output::OutputFormat;

pub mod config;
pub mod dump;
pub mod info;
pub mod logger_config;
pub mod sensors;
pub mod set_time;
pub mod status;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the status record (model, clock, firmware, serial).
    Status,
    /// Show the basic configuration (stored count, interval, clock).
    Config,
    /// Show the full logger configuration.
    LoggerConfig,
    /// Read the live temperature and humidity.
    Sensors,
    /// Download every stored measurement.
    Dump(DumpArgs),
    /// Set the device clock.
    SetTime(SetTimeArgs),
    /// Show serial id, owner, location and text fields.
    Info,
    /// Show version information.
    Version(VersionArgs),
}

/// How to reach the device; shared by every device command.
#[derive(Debug, Clone)]
pub struct Connection {
    pub device: Option<PathBuf>,
    pub timeout: String,
}

pub fn run(command: Command, conn: &Connection, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Status => status::run(conn, format),
        Command::Config => config::run(conn, format),
        Command::LoggerConfig => logger_config::run(conn, format),
        Command::Sensors => sensors::run(conn, format),
        Command::Dump(args) => dump::run(args, conn, format),
        Command::SetTime(args) => set_time::run(args, conn, format),
        Command::Info => info::run(conn, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Whole-dump attempts while the logger is still recording.
    #[arg(long, default_value_t = DEFAULT_DUMP_ATTEMPTS)]
    pub attempts: usize,
}

#[derive(Args, Debug)]
pub struct SetTimeArgs {
    /// Time to set, as YYYY-MM-DDTHH:MM:SS. Default: local now.
    #[arg(long, value_name = "DATETIME")]
    pub at: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show build details.
    #[arg(long)]
    pub extended: bool,
}

/// Open and identify the logger named by `conn`.
#[cfg(unix)]
pub fn open_logger(
    conn: &Connection,
    dump: DumpConfig,
) -> CliResult<LoggerHandle<dl210_transport::HidrawDevice>> {
    let path = conn
        .device
        .as_ref()
        .ok_or_else(|| CliError::usage("no device given (use --device or DL210_DEVICE)"))?;
    let read_timeout = parse_timeout(&conn.timeout)?;

    let channel = dl210_transport::HidrawDevice::open(path)
        .map_err(|err| crate::exit::transport_error("open failed", err))?;
    debug!(path = %path.display(), ?read_timeout, "device opened");

    let options = LoggerOptions {
        frame: FrameConfig {
            read_timeout,
            ..FrameConfig::default()
        },
        dump,
        ..LoggerOptions::default()
    };
    LoggerHandle::open_with_options(channel, options).map_err(|err| device_error("open failed", err))
}

#[cfg(not(unix))]
pub fn open_logger(
    _conn: &Connection,
    _dump: DumpConfig,
) -> CliResult<LoggerHandle<dl210_transport::ReplayChannel>> {
    Err(CliError::new(
        crate::exit::TRANSPORT_ERROR,
        "hidraw devices are only available on Unix hosts",
    ))
}

/// Close the channel, reporting but not failing on errors.
pub fn finish<C: DeviceChannel>(mut logger: LoggerHandle<C>) {
    if let Err(err) = logger.close() {
        tracing::warn!(error = %err, "closing device failed");
    }
}

/// Parse `1500ms`, `2s` or a bare number of seconds.
pub fn parse_timeout(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::usage("timeout must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .trim()
        .parse()
        .map_err(|_| CliError::usage(format!("invalid timeout value: {input}")))?;
    if value == 0 {
        return Err(CliError::usage("timeout must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_timeout_seconds() {
        assert_eq!(parse_timeout("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_timeout("2").unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn parse_timeout_millis() {
        assert_eq!(parse_timeout("1000ms").unwrap(), Duration::from_millis(1000));
    }

    #[test]
    fn parse_timeout_invalid() {
        assert!(parse_timeout("0s").is_err());
        assert!(parse_timeout("").is_err());
        assert_eq!(parse_timeout("soon").unwrap_err().code, crate::exit::USAGE);
    }
}
