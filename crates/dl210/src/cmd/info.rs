use dl210_device::{DeviceError, DumpConfig};
use dl210_schema::DateTime;
use serde::Serialize;

use crate::cmd::{finish, open_logger, Connection};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_json, OutputFormat};

const TEXT_SLOTS: u8 = 4;

#[derive(Serialize)]
struct InfoOutput {
    device_type: String,
    firmware_version: String,
    serial_number: String,
    serial_id: String,
    owner: String,
    start_time: DateTime,
    location: String,
    text: Vec<String>,
}

pub fn run(conn: &Connection, format: OutputFormat) -> CliResult<i32> {
    let mut logger = open_logger(conn, DumpConfig::default())?;
    let out = collect(&mut logger).map_err(|err| device_error("info failed", err))?;
    finish(logger);

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("Logger Info:");
            println!("  Device type:      {}", out.device_type);
            println!("  Firmware:         {}", out.firmware_version);
            println!("  Serial number:    {}", out.serial_number);
            println!("  Serial id:        {}", out.serial_id);
            println!("  Owner:            {}", out.owner);
            println!("  Start time:       {}", out.start_time);
            println!("  Location:         {}", out.location);
            for (i, text) in out.text.iter().enumerate() {
                println!("  Text {}:           {}", i + 1, text);
            }
        }
    }
    Ok(SUCCESS)
}

fn collect<C: dl210_transport::DeviceChannel>(
    logger: &mut dl210_device::LoggerHandle<C>,
) -> Result<InfoOutput, DeviceError> {
    let identity = logger.identity().clone();
    let owner = logger.owner()?;
    let mut text = Vec::with_capacity(usize::from(TEXT_SLOTS));
    for slot in 1..=TEXT_SLOTS {
        text.push(logger.text_field(slot)?.text()?);
    }

    Ok(InfoOutput {
        device_type: identity.device_type()?,
        firmware_version: identity.firmware_version()?,
        serial_number: identity.serial_number()?,
        serial_id: logger.serial_id()?.serial()?,
        owner: owner.owner()?,
        start_time: owner.start_time()?,
        location: logger.location()?.text()?,
        text,
    })
}
