use dl210_frame::FrameConfig;

/// Device type string reported by supported loggers.
pub const DEVICE_TYPE: &str = "DL-210TH";

/// Measurements per stored data block.
pub const BLOCK_SIZE: usize = 15;

/// Dump attempts before a changing data set is reported as an error.
pub const DEFAULT_DUMP_ATTEMPTS: usize = 5;

/// Controls the measurement dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpConfig {
    /// Whole-dump attempts while the device keeps changing its data. Default: 5.
    pub max_attempts: usize,
    /// Measurements per block. Default: 15.
    pub block_size: usize,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_DUMP_ATTEMPTS,
            block_size: BLOCK_SIZE,
        }
    }
}

impl DumpConfig {
    /// Number of blocks needed to hold `data_count` measurements.
    pub fn expected_blocks(&self, data_count: u16) -> usize {
        (data_count as usize).div_ceil(self.block_size.max(1))
    }
}

/// Configuration for opening a logger.
#[derive(Debug, Clone)]
pub struct LoggerOptions {
    /// Frame transport settings (read timeout, report size).
    pub frame: FrameConfig,
    /// Measurement dump settings.
    pub dump: DumpConfig,
    /// Device type the status record must report. Default: `DL-210TH`.
    pub expected_device_type: String,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            dump: DumpConfig::default(),
            expected_device_type: DEVICE_TYPE.to_string(),
        }
    }
}
