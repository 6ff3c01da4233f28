mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::{Command, Connection};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "dl210", version, about = "DL-210TH data logger tool")]
struct Cli {
    /// hidraw node of the logger (e.g. /dev/hidraw0).
    #[arg(long, short = 'd', env = "DL210_DEVICE", global = true)]
    device: Option<PathBuf>,

    /// Per-response read timeout (e.g. 1000ms, 2s).
    #[arg(long, env = "DL210_TIMEOUT", default_value = "1000ms", global = true)]
    timeout: String,

    /// Output format. Default: table on a terminal, json otherwise.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let conn = Connection {
        device: cli.device,
        timeout: cli.timeout,
    };

    match cmd::run(cli.command, &conn, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
