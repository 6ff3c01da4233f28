//! Measurement dump: stream, verify, fold, gap-fill.

use chrono::{Duration, NaiveDateTime};
use dl210_frame::{command, decode_response, FrameTransport};
use dl210_schema::{BasicConfig, Measurement};
use dl210_transport::DeviceChannel;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::block::{DataBlock, BLOCK_NUMBER_SIZE};
use crate::error::{DeviceError, Result};
use crate::logger::LoggerHandle;
use crate::retry::retry_bounded;

/// Payload that ends the dump stream.
pub const STREAM_DONE: [u8; 3] = [0, 0, 5];

/// One classified frame of the dump stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// A numbered block carrying at least one measurement.
    Data(DataBlock),
    /// A block number with no measurements.
    Empty(u16),
    /// The `{0,0,5}` completion marker.
    Done,
    /// A 3-byte payload other than the completion marker.
    Unexpected([u8; 3]),
}

/// Classify one dump-stream payload (envelope already removed).
pub fn classify_frame(payload: &[u8]) -> Result<StreamFrame> {
    match payload {
        p if p.len() < BLOCK_NUMBER_SIZE => Err(DeviceError::ShortBlock { len: p.len() }),
        [a, b, c] => {
            let marker = [*a, *b, *c];
            if marker == STREAM_DONE {
                Ok(StreamFrame::Done)
            } else {
                Ok(StreamFrame::Unexpected(marker))
            }
        }
        [hi, lo] => Ok(StreamFrame::Empty(u16::from_be_bytes([*hi, *lo]))),
        p => DataBlock::decode(p).map(StreamFrame::Data),
    }
}

/// Place streamed blocks into slots `1..=expected`, indexed by number - 1.
///
/// Blocks numbered outside that range are logged and dropped. A number seen
/// twice is [`DeviceError::DuplicateBlock`].
pub fn fold_blocks(blocks: Vec<DataBlock>, expected: usize) -> Result<Vec<Option<DataBlock>>> {
    let mut slots: Vec<Option<DataBlock>> = vec![None; expected];
    for block in blocks {
        let number = block.number;
        let index = usize::from(number);
        if index == 0 || index > expected {
            warn!(block = number, expected, "block number out of range, ignored");
            continue;
        }
        let slot = &mut slots[index - 1];
        if slot.is_some() {
            return Err(DeviceError::DuplicateBlock(number));
        }
        *slot = Some(block);
    }
    Ok(slots)
}

/// Every stored measurement, in order, with the device state it was read under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeasurementDump {
    /// Blocks `1..=n`, gap-free.
    pub blocks: Vec<DataBlock>,
    /// Basic configuration read after the stream ended.
    pub state: BasicConfig,
}

impl MeasurementDump {
    /// Measurements in block-then-position order.
    pub fn measurements(&self) -> impl Iterator<Item = &Measurement> {
        self.blocks.iter().flat_map(|b| b.measurements.iter())
    }

    pub fn len(&self) -> usize {
        self.blocks.iter().map(DataBlock::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pair each measurement with a timestamp.
    ///
    /// The first sample is stamped with the state's `time`; each following
    /// sample advances by `sample_rate` seconds, across block boundaries.
    pub fn timestamped(&self) -> Result<Vec<(NaiveDateTime, Measurement)>> {
        let start = self.state.time()?.to_naive()?;
        let step = Duration::seconds(i64::from(self.state.sample_rate()?));
        let mut at = start;
        let mut out = Vec::with_capacity(self.len());
        for m in self.measurements() {
            out.push((at, *m));
            at += step;
        }
        Ok(out)
    }
}

impl<C: DeviceChannel> LoggerHandle<C> {
    /// Read every stored measurement as one ordered, gap-free sequence.
    ///
    /// The whole read is repeated when the device's stored data changes
    /// while it runs, up to `DumpConfig::max_attempts` times; after that
    /// the last [`DeviceError::DataChangedDuringDump`] is returned. No
    /// other failure is retried.
    pub fn dump_measurements(&mut self) -> Result<MeasurementDump> {
        let max_attempts = self.options.dump.max_attempts;
        retry_bounded(
            max_attempts,
            |attempt| {
                debug!(attempt, max_attempts, "starting dump");
                self.dump_once()
            },
            DeviceError::is_retryable,
        )
    }

    fn dump_once(&mut self) -> Result<MeasurementDump> {
        let before = self.basic_config()?;
        let streamed = read_stream(&mut self.transport)?;
        let after = self.basic_config()?;

        let (before_count, after_count) = (before.data_count()?, after.data_count()?);
        let (before_time, after_time) = (before.time()?, after.time()?);
        if before_count != after_count || before_time != after_time {
            return Err(DeviceError::DataChangedDuringDump {
                before_count,
                after_count,
                before_time,
                after_time,
            });
        }

        let expected = self.options.dump.expected_blocks(after_count);
        let slots = fold_blocks(streamed, expected)?;

        let mut blocks = Vec::with_capacity(expected);
        for (index, slot) in slots.into_iter().enumerate() {
            let block = match slot {
                Some(block) => block,
                None => {
                    // at most u16::MAX slots
                    let number = u16::try_from(index + 1).unwrap_or(u16::MAX);
                    warn!(block = number, "block missing from stream, fetching");
                    self.fetch_block(number)?
                }
            };
            blocks.push(block);
        }

        let dump = MeasurementDump {
            blocks,
            state: after,
        };
        if dump.len() != usize::from(after_count) {
            warn!(
                measurements = dump.len(),
                data_count = after_count,
                "measurement total differs from stored count"
            );
        }
        info!(
            blocks = dump.blocks.len(),
            measurements = dump.len(),
            "dump complete"
        );
        Ok(dump)
    }
}

/// Send dump-start and collect data blocks until the stream ends.
fn read_stream<C: DeviceChannel>(transport: &mut FrameTransport<C>) -> Result<Vec<DataBlock>> {
    transport.send_command(command::DUMP_START, &[])?;

    let mut blocks = Vec::new();
    let mut next: u16 = 1;
    loop {
        let report = transport.read_response()?;
        if report.is_empty() {
            debug!(blocks = blocks.len(), "dump stream closed");
            break;
        }

        let payload = decode_response(&report)?;
        let number = match classify_frame(payload)? {
            StreamFrame::Done => {
                debug!(blocks = blocks.len(), "dump stream complete");
                break;
            }
            StreamFrame::Unexpected(marker) => {
                warn!(?marker, "unexpected 3-byte dump frame, ending stream");
                break;
            }
            StreamFrame::Empty(number) => {
                debug!(block = number, "empty dump frame");
                number
            }
            StreamFrame::Data(block) => {
                let number = block.number;
                debug!(block = number, samples = block.len(), "dump block");
                blocks.push(block);
                number
            }
        };

        if number != next {
            warn!(block = number, expected = next, "dump block out of order");
        }
        next = number.wrapping_add(1);
    }

    Ok(blocks)
}
