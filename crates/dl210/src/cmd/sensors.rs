use dl210_device::DumpConfig;

use crate::cmd::{finish, open_logger, Connection};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_sensors, OutputFormat};

pub fn run(conn: &Connection, format: OutputFormat) -> CliResult<i32> {
    let mut logger = open_logger(conn, DumpConfig::default())?;
    let reading = logger
        .read_sensors()
        .map_err(|err| device_error("reading sensors failed", err))?;
    finish(logger);

    print_sensors(&reading, format);
    Ok(SUCCESS)
}
