use std::io::IsTerminal;

use chrono::NaiveDateTime;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use dl210_schema::{DateTime, Measurement, Record, Value, DATETIME};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

/// Print a decoded record as JSON, a two-column table, or `name: value` lines.
pub fn print_record(title: &str, record: &Record, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(record),
        OutputFormat::Table => {
            let mut table = new_table(vec!["FIELD", "VALUE"]);
            for (name, value) in flatten(record) {
                table.add_row(vec![name, value]);
            }
            println!("{title}");
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{title}:");
            for (name, value) in flatten(record) {
                println!("  {name:<24} {value}");
            }
        }
    }
}

#[derive(Serialize)]
struct SensorOutput {
    temperature_c: f64,
    humidity_pct: f64,
    raw: Measurement,
}

pub fn print_sensors(m: &Measurement, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&SensorOutput {
            temperature_c: m.temperature_celsius(),
            humidity_pct: m.humidity_percent(),
            raw: *m,
        }),
        OutputFormat::Table => {
            let mut table = new_table(vec!["TEMPERATURE (°C)", "HUMIDITY (%RH)"]);
            table.add_row(vec![
                format!("{:.2}", m.temperature_celsius()),
                format!("{:.2}", m.humidity_percent()),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{:.2} °C  {:.2} %RH",
                m.temperature_celsius(),
                m.humidity_percent()
            );
        }
    }
}

#[derive(Serialize)]
struct SampleOutput {
    time: NaiveDateTime,
    temperature_c: f64,
    humidity_pct: f64,
}

#[derive(Serialize)]
struct DumpOutput<'a> {
    data_count: u16,
    sample_rate_s: u16,
    blocks: usize,
    state: &'a Record,
    samples: Vec<SampleOutput>,
}

/// Summary values that go with a dump listing.
pub struct DumpSummary<'a> {
    pub data_count: u16,
    pub sample_rate: u16,
    pub blocks: usize,
    pub state: &'a Record,
}

pub fn print_dump(
    summary: &DumpSummary<'_>,
    samples: &[(NaiveDateTime, Measurement)],
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => print_json(&DumpOutput {
            data_count: summary.data_count,
            sample_rate_s: summary.sample_rate,
            blocks: summary.blocks,
            state: summary.state,
            samples: samples
                .iter()
                .map(|(time, m)| SampleOutput {
                    time: *time,
                    temperature_c: m.temperature_celsius(),
                    humidity_pct: m.humidity_percent(),
                })
                .collect(),
        }),
        OutputFormat::Table => {
            let mut table = new_table(vec!["#", "TIME", "TEMPERATURE (°C)", "HUMIDITY (%RH)"]);
            for (i, (time, m)) in samples.iter().enumerate() {
                table.add_row(vec![
                    (i + 1).to_string(),
                    time.to_string(),
                    format!("{:.2}", m.temperature_celsius()),
                    format!("{:.2}", m.humidity_percent()),
                ]);
            }
            println!("{table}");
            println!(
                "{} samples in {} blocks, every {} s",
                samples.len(),
                summary.blocks,
                summary.sample_rate
            );
        }
        OutputFormat::Pretty => {
            for (time, m) in samples {
                println!(
                    "{time}\t{:.2}\t{:.2}",
                    m.temperature_celsius(),
                    m.humidity_percent()
                );
            }
        }
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// `(dotted name, display value)` for every leaf field. Date/time
/// sub-records collapse into one row.
fn flatten(record: &Record) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    flatten_into("", record, &mut rows);
    rows
}

fn flatten_into(prefix: &str, record: &Record, rows: &mut Vec<(String, String)>) {
    for (name, value) in record.fields() {
        let key = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        };
        match value {
            Value::Record(inner) if std::ptr::eq(inner.schema(), &DATETIME) => {
                let shown = DateTime::from_record(inner)
                    .map(|dt| dt.to_string())
                    .unwrap_or_default();
                rows.push((key, shown));
            }
            Value::Record(inner) => flatten_into(&key, inner, rows),
            other => rows.push((key, display_value(other))),
        }
    }
}

fn display_value(value: &Value) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use dl210_schema::{BasicConfig, DeviceRecord, Owner};

    use super::*;

    #[test]
    fn flatten_collapses_datetime() {
        let mut cfg = BasicConfig::zeroed();
        cfg.set_sample_rate(120).unwrap();
        cfg.set_time(&DateTime {
            year: 2024,
            month: 1,
            day: 2,
            hour: 3,
            minute: 4,
            second: 5,
        })
        .unwrap();

        let rows = flatten(cfg.record());
        assert!(rows.contains(&("sample_rate".to_string(), "120".to_string())));
        assert!(rows.contains(&("time".to_string(), "2024-01-02 03:04:05".to_string())));
        assert_eq!(rows.len(), cfg.record().fields().count());
    }

    #[test]
    fn text_fields_display_trimmed() {
        let mut owner = Owner::zeroed();
        owner.record_mut().set("owner", "Lab 3").unwrap();
        let rows = flatten(owner.record());
        assert_eq!(rows[0], ("owner".to_string(), "Lab 3".to_string()));
    }
}
