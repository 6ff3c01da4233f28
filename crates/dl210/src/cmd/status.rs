use dl210_device::DumpConfig;
use dl210_schema::DeviceRecord;

use crate::cmd::{finish, open_logger, Connection};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

pub fn run(conn: &Connection, format: OutputFormat) -> CliResult<i32> {
    let mut logger = open_logger(conn, DumpConfig::default())?;
    let status = logger
        .status()
        .map_err(|err| device_error("status failed", err))?;
    finish(logger);

    print_record("Status", status.record(), format);
    Ok(SUCCESS)
}
