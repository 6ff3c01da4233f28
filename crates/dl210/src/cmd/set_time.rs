use chrono::{Local, NaiveDateTime};
use dl210_device::DumpConfig;
use dl210_schema::DateTime;
use serde::Serialize;

use crate::cmd::{finish, open_logger, Connection, SetTimeArgs};
use crate::exit::{device_error, CliError, CliResult, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct SetTimeOutput {
    time: DateTime,
}

pub fn run(args: SetTimeArgs, conn: &Connection, format: OutputFormat) -> CliResult<i32> {
    let when = match args.at.as_deref() {
        Some(text) => parse_datetime(text)?,
        None => Local::now().naive_local(),
    };
    let time = DateTime::from_naive(&when)
        .map_err(|err| CliError::usage(format!("cannot store {when}: {err}")))?;

    let mut logger = open_logger(conn, DumpConfig::default())?;
    logger
        .set_clock(&time)
        .map_err(|err| device_error("setting clock failed", err))?;
    finish(logger);

    match format {
        OutputFormat::Json => print_json(&SetTimeOutput { time }),
        OutputFormat::Table | OutputFormat::Pretty => println!("device clock set to {time}"),
    }
    Ok(SUCCESS)
}

fn parse_datetime(text: &str) -> CliResult<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S"))
        .map_err(|_| CliError::usage(format!("invalid time {text:?} (want YYYY-MM-DDTHH:MM:SS)")))
}
