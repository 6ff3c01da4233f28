use dl210_frame::{command, FrameTransport};
use dl210_schema::{
    BasicConfig, DateTime, DeviceRecord, LoggerConfig, Measurement, Owner, SerialId, Status,
    TextField,
};
use dl210_transport::DeviceChannel;
use tracing::{debug, info};

use crate::block::{block_number, DataBlock};
use crate::config::LoggerOptions;
use crate::error::{DeviceError, Result};
use crate::shape::{ack, Expect};

/// Response length of the status query: echoed code + 59-byte record.
const STATUS_RESPONSE_LEN: usize = 60;
const BASIC_CONFIG_RESPONSE_LEN: usize = 31;
const SENSORS_RESPONSE_LEN: usize = 7;
const ACK_RESPONSE_LEN: usize = 3;
const SERIAL_ID_RESPONSE_LEN: usize = 17;
const LOGGER_CONFIG_RESPONSE_LEN: usize = 60;
const OWNER_RESPONSE_LEN: usize = 56;
const TEXT_RESPONSE_LEN: usize = 49;

/// An open, identified DL-210TH logger.
///
/// Construction issues the status command once and refuses any device whose
/// type string does not match [`LoggerOptions::expected_device_type`]. The
/// handle owns its channel exclusively; every operation is one blocking
/// request/response exchange (the dump is a bounded sequence of them).
pub struct LoggerHandle<C> {
    pub(crate) transport: FrameTransport<C>,
    pub(crate) options: LoggerOptions,
    identity: Status,
}

impl<C: DeviceChannel> LoggerHandle<C> {
    /// Open a logger over `channel` with default options.
    pub fn open(channel: C) -> Result<Self> {
        Self::open_with_options(channel, LoggerOptions::default())
    }

    /// Open a logger with explicit options.
    pub fn open_with_options(channel: C, options: LoggerOptions) -> Result<Self> {
        let mut transport = FrameTransport::with_config(channel, options.frame.clone());
        let identity = query_status(&mut transport)?;

        let found = identity.device_type()?;
        let expected = options.expected_device_type.trim();
        if found.trim() != expected {
            return Err(DeviceError::UnsupportedDevice {
                expected: expected.to_string(),
                found,
            });
        }

        info!(
            device_type = %found,
            firmware = %identity.firmware_version()?,
            serial = %identity.serial_number()?,
            transport = transport.get_ref().transport_name(),
            "logger identified"
        );

        Ok(Self {
            transport,
            options,
            identity,
        })
    }

    /// The status record read when the handle was opened.
    pub fn identity(&self) -> &Status {
        &self.identity
    }

    pub fn options(&self) -> &LoggerOptions {
        &self.options
    }

    /// Read the status record (device type, clock, firmware, serial).
    pub fn status(&mut self) -> Result<Status> {
        query_status(&mut self.transport)
    }

    /// Read the basic configuration: stored sample count, interval, clock.
    pub fn basic_config(&mut self) -> Result<BasicConfig> {
        let code = command::READ_BASIC_CONFIG;
        self.query(
            code,
            &[],
            Expect::exact(BASIC_CONFIG_RESPONSE_LEN, &ack(code)),
        )
    }

    /// Write a basic configuration record back to the device.
    pub fn record_basic(&mut self, config: &BasicConfig) -> Result<()> {
        self.write(command::WRITE_BASIC_CONFIG, config)
    }

    /// Write a full logger configuration record.
    pub fn record_full(&mut self, config: &LoggerConfig) -> Result<()> {
        self.write(command::WRITE_LOGGER_CONFIG, config)
    }

    /// Read the live temperature and humidity.
    pub fn read_sensors(&mut self) -> Result<Measurement> {
        let code = command::READ_SENSORS;
        let payload = self.transport.run_command(code, &[])?;
        let body = Expect::exact(SENSORS_RESPONSE_LEN, &ack(code)).check(code, &payload)?;
        Ok(Measurement::decode(body)?)
    }

    /// Read the full logger configuration.
    pub fn logger_config(&mut self) -> Result<LoggerConfig> {
        self.echoed_query(command::READ_LOGGER_CONFIG, LOGGER_CONFIG_RESPONSE_LEN)
    }

    pub fn serial_id(&mut self) -> Result<SerialId> {
        self.echoed_query(command::SERIAL_ID, SERIAL_ID_RESPONSE_LEN)
    }

    /// Read the owner name and logging start time.
    pub fn owner(&mut self) -> Result<Owner> {
        self.echoed_query(command::OWNER, OWNER_RESPONSE_LEN)
    }

    pub fn location(&mut self) -> Result<TextField> {
        self.echoed_query(command::LOCATION, TEXT_RESPONSE_LEN)
    }

    /// Read free-text field `slot` (1 through 4).
    pub fn text_field(&mut self, slot: u8) -> Result<TextField> {
        let count = command::TEXT_FIELD_LAST - command::TEXT_FIELD_FIRST + 1;
        if !(1..=count).contains(&slot) {
            return Err(DeviceError::TextSlotOutOfRange(slot));
        }
        self.echoed_query(command::TEXT_FIELD_FIRST + slot - 1, TEXT_RESPONSE_LEN)
    }

    /// Set the device clock, keeping every other basic setting as read.
    pub fn set_clock(&mut self, time: &DateTime) -> Result<()> {
        let mut config = self.basic_config()?;
        config.set_time(time)?;
        self.record_basic(&config)?;
        info!(time = %time, "device clock set");
        Ok(())
    }

    /// Fetch one stored data block by number.
    ///
    /// The response must echo the requested number and carry whole
    /// measurements; anything else is [`DeviceError::MalformedBlock`].
    pub fn fetch_block(&mut self, number: u16) -> Result<DataBlock> {
        let payload = self
            .transport
            .run_command(command::FETCH_BLOCK, &number.to_be_bytes())?;

        match block_number(&payload) {
            None => {
                return Err(DeviceError::MalformedBlock {
                    block: number,
                    reason: format!("{}-byte fetch response", payload.len()),
                })
            }
            Some(echoed) if echoed != number => {
                return Err(DeviceError::MalformedBlock {
                    block: number,
                    reason: format!("response echoes block {echoed}"),
                })
            }
            Some(_) => {}
        }

        let block = DataBlock::decode(&payload)?;
        debug!(block = number, samples = block.len(), "fetched block");
        Ok(block)
    }

    /// Close the underlying channel. Further commands fail.
    pub fn close(&mut self) -> Result<()> {
        self.transport.close()?;
        debug!("logger closed");
        Ok(())
    }

    /// Borrow the underlying channel.
    pub fn get_ref(&self) -> &C {
        self.transport.get_ref()
    }

    /// Consume the handle and return the channel.
    pub fn into_inner(self) -> C {
        self.transport.into_inner()
    }

    fn query<R: DeviceRecord>(&mut self, code: u8, payload: &[u8], expect: Expect<'_>) -> Result<R> {
        query(&mut self.transport, code, payload, expect)
    }

    fn echoed_query<R: DeviceRecord>(&mut self, code: u8, len: usize) -> Result<R> {
        self.query(code, &[], Expect::exact(len, &[code]))
    }

    fn write<R: DeviceRecord>(&mut self, code: u8, record: &R) -> Result<()> {
        let encoded = record.encode()?;
        let payload = self.transport.run_command(code, &encoded)?;
        Expect::exact(ACK_RESPONSE_LEN, &ack(code)).check(code, &payload)?;
        debug!(code, record = R::schema().name, "record written");
        Ok(())
    }
}

fn query<C: DeviceChannel, R: DeviceRecord>(
    transport: &mut FrameTransport<C>,
    code: u8,
    payload: &[u8],
    expect: Expect<'_>,
) -> Result<R> {
    let response = transport.run_command(code, payload)?;
    let body = expect.check(code, &response)?;
    Ok(R::decode(body)?)
}

fn query_status<C: DeviceChannel>(transport: &mut FrameTransport<C>) -> Result<Status> {
    let code = command::STATUS;
    query(transport, code, &[], Expect::exact(STATUS_RESPONSE_LEN, &[code]))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use dl210_frame::FrameError;
    use dl210_transport::ReplayChannel;

    use super::*;

    /// Wrap a payload in the response envelope.
    fn report(payload: &[u8]) -> Vec<u8> {
        let mut out = vec![0x3F, payload.len() as u8];
        out.extend_from_slice(payload);
        out
    }

    fn status_payload(device_type: &str) -> Vec<u8> {
        let mut status = Status::zeroed();
        status
            .record_mut()
            .set("device_type", device_type)
            .unwrap();
        status.record_mut().set("firmware_version", "1.07").unwrap();
        status.record_mut().set("serial_number", "A1234567").unwrap();
        let mut payload = vec![48];
        payload.extend_from_slice(&status.encode().unwrap());
        payload
    }

    fn open(replies: Vec<Vec<u8>>) -> LoggerHandle<ReplayChannel> {
        let mut chan = ReplayChannel::with_reads([report(&status_payload("DL-210TH"))]);
        for reply in replies {
            chan.push_read(reply);
        }
        LoggerHandle::open(chan).unwrap()
    }

    fn writes(handle: LoggerHandle<ReplayChannel>) -> Vec<Bytes> {
        handle.into_inner().written().to_vec()
    }

    #[test]
    fn open_checks_identity() {
        let handle = open(vec![]);
        assert_eq!(handle.identity().device_type().unwrap(), "DL-210TH");
        assert_eq!(writes(handle)[0].as_ref(), &[0x3F, 0x01, 48]);
    }

    #[test]
    fn open_rejects_other_models() {
        let chan = ReplayChannel::with_reads([report(&status_payload("DL-100T"))]);
        let err = LoggerHandle::open(chan).err().unwrap();
        assert!(matches!(
            err,
            DeviceError::UnsupportedDevice { ref found, .. } if found == "DL-100T"
        ));
    }

    #[test]
    fn open_trims_expected_type() {
        let chan = ReplayChannel::with_reads([report(&status_payload("DL-210TH"))]);
        let options = LoggerOptions {
            expected_device_type: " DL-210TH ".to_string(),
            ..LoggerOptions::default()
        };
        assert!(LoggerHandle::open_with_options(chan, options).is_ok());
    }

    #[test]
    fn open_on_silent_device_is_frame_error() {
        let err = LoggerHandle::open(ReplayChannel::new()).err().unwrap();
        assert!(matches!(
            err,
            DeviceError::Frame(FrameError::FrameTooShort { len: 0 })
        ));
    }

    #[test]
    fn status_rejects_wrong_echo() {
        let mut bad = status_payload("DL-210TH");
        bad[0] = 47;
        let mut handle = open(vec![report(&bad)]);
        let err = handle.status().unwrap_err();
        assert!(matches!(
            err,
            DeviceError::UnexpectedResponsePrefix { code: 48, .. }
        ));
    }

    #[test]
    fn basic_config_decodes_after_marker() {
        let mut payload = vec![0, 0, 4];
        let mut body = [0u8; 28];
        body[2..4].copy_from_slice(&32u16.to_le_bytes());
        body[6..8].copy_from_slice(&60u16.to_le_bytes());
        payload.extend_from_slice(&body);

        let mut handle = open(vec![report(&payload)]);
        let config = handle.basic_config().unwrap();
        assert_eq!(config.data_count().unwrap(), 32);
        assert_eq!(config.sample_rate().unwrap(), 60);
    }

    #[test]
    fn basic_config_wrong_length() {
        let mut handle = open(vec![report(&[0, 0, 4, 1, 2])]);
        let err = handle.basic_config().unwrap_err();
        assert!(matches!(
            err,
            DeviceError::UnexpectedResponseLength {
                code: 4,
                expected: 31,
                actual: 5,
                ..
            }
        ));
    }

    #[test]
    fn read_sensors_decodes_measurement() {
        let t = 2345i16.to_le_bytes();
        let h = 5012i16.to_le_bytes();
        let mut handle = open(vec![report(&[0, 0, 6, t[0], t[1], h[0], h[1]])]);
        let m = handle.read_sensors().unwrap();
        assert_eq!(m, Measurement::new(2345, 5012));
    }

    #[test]
    fn set_clock_writes_modified_config() {
        let mut read = vec![0, 0, 4];
        let mut body = [0u8; 28];
        body[2..4].copy_from_slice(&10u16.to_le_bytes());
        read.extend_from_slice(&body);

        let mut handle = open(vec![report(&read), report(&[0, 0, 3])]);
        let when = DateTime {
            year: 2024,
            month: 2,
            day: 29,
            hour: 23,
            minute: 59,
            second: 0,
        };
        handle.set_clock(&when).unwrap();

        let sent = writes(handle);
        let write = &sent[2];
        assert_eq!(&write[..3], &[0x3F, 29, 3]);
        assert_eq!(&write[3 + 2..3 + 4], &10u16.to_le_bytes());
        assert_eq!(&write[3 + 20..3 + 27], &[0xE8, 0x07, 2, 29, 23, 59, 0]);
    }

    #[test]
    fn record_full_requires_ack() {
        let mut handle = open(vec![report(&[0, 0, 4])]);
        let err = handle.record_full(&LoggerConfig::zeroed()).unwrap_err();
        assert!(matches!(
            err,
            DeviceError::UnexpectedResponsePrefix { code: 17, .. }
        ));
    }

    #[test]
    fn echoed_queries() {
        let mut serial = vec![12];
        serial.extend_from_slice(b"SN-0042\0\0\0\0\0\0\0\0\0");
        let mut text = vec![38];
        text.extend_from_slice(&[b' '; 48]);
        text[1..7].copy_from_slice(b"fridge");

        let mut handle = open(vec![report(&serial), report(&text)]);
        assert_eq!(handle.serial_id().unwrap().serial().unwrap(), "SN-0042");
        assert_eq!(handle.text_field(3).unwrap().text().unwrap(), "fridge");
    }

    #[test]
    fn text_field_slot_range() {
        let mut handle = open(vec![]);
        assert!(matches!(
            handle.text_field(0),
            Err(DeviceError::TextSlotOutOfRange(0))
        ));
        assert!(matches!(
            handle.text_field(5),
            Err(DeviceError::TextSlotOutOfRange(5))
        ));
    }

    #[test]
    fn fetch_block_sends_big_endian_number() {
        let mut reply = vec![0x01, 0x2C];
        reply.extend_from_slice(&Measurement::new(1, 2).encode().unwrap());
        let mut handle = open(vec![report(&reply)]);

        let block = handle.fetch_block(300).unwrap();
        assert_eq!(block.number, 300);
        assert_eq!(block.measurements, vec![Measurement::new(1, 2)]);
        assert_eq!(writes(handle)[1].as_ref(), &[0x3F, 0x03, 0x02, 0x01, 0x2C]);
    }

    #[test]
    fn fetch_block_rejects_wrong_echo() {
        let mut handle = open(vec![report(&[0, 3])]);
        assert!(matches!(
            handle.fetch_block(2),
            Err(DeviceError::MalformedBlock { block: 2, .. })
        ));
    }

    #[test]
    fn close_releases_channel() {
        let mut handle = open(vec![]);
        handle.close().unwrap();
        assert!(handle.get_ref().is_closed());
        assert!(handle.status().is_err());
    }
}
