use dl210_device::DumpConfig;
use dl210_schema::DeviceRecord;
use tracing::info;

use crate::cmd::{finish, open_logger, Connection, DumpArgs};
use crate::exit::{device_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_dump, DumpSummary, OutputFormat};

pub fn run(args: DumpArgs, conn: &Connection, format: OutputFormat) -> CliResult<i32> {
    if args.attempts == 0 {
        return Err(CliError::usage("--attempts must be at least 1"));
    }
    let config = DumpConfig {
        max_attempts: args.attempts,
        ..DumpConfig::default()
    };

    let mut logger = open_logger(conn, config)?;
    let dump = logger
        .dump_measurements()
        .map_err(|err| device_error("dump failed", err))?;
    finish(logger);

    let samples = dump
        .timestamped()
        .map_err(|err| CliError::new(DATA_INVALID, format!("dump timestamps: {err}")))?;
    let summary = DumpSummary {
        data_count: dump
            .state
            .data_count()
            .map_err(|err| CliError::new(DATA_INVALID, err.to_string()))?,
        sample_rate: dump
            .state
            .sample_rate()
            .map_err(|err| CliError::new(DATA_INVALID, err.to_string()))?,
        blocks: dump.blocks.len(),
        state: dump.state.record(),
    };
    info!(samples = samples.len(), blocks = summary.blocks, "dump read");

    print_dump(&summary, &samples, format);
    Ok(SUCCESS)
}
