//! Initialization settings
//!
//! Everything [`Icm20948Driver::init`](crate::Icm20948Driver::init) needs beyond
//! the bus and a delay provider. The defaults reproduce the stock bring-up:
//! widest filters, maximum output rate, 1 s identity timeout.

use crate::sensors::{AccelDlpf, GyroDlpf, SensorBlock};

/// Largest value `ACCEL_SMPLRT_DIV` can hold (12 bits)
pub const MAX_ACCEL_SAMPLE_RATE_DIV: u16 = 0x0FFF;

/// Bounds for the `WHO_AM_I` poll at start-up
///
/// The device is read at most [`max_attempts`](Self::max_attempts) times, with
/// `poll_interval_ms` between consecutive reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IdentityPoll {
    /// Total time budget in milliseconds
    pub timeout_ms: u32,
    /// Pause between two reads in milliseconds
    pub poll_interval_ms: u32,
}

impl Default for IdentityPoll {
    fn default() -> Self {
        Self {
            timeout_ms: 1000,
            poll_interval_ms: 10,
        }
    }
}

impl IdentityPoll {
    /// Poll bound expressed as a number of reads
    #[must_use]
    pub const fn with_attempts(attempts: u32, poll_interval_ms: u32) -> Self {
        Self {
            timeout_ms: attempts.saturating_mul(poll_interval_ms),
            poll_interval_ms,
        }
    }

    /// Number of `WHO_AM_I` reads allowed, never less than one
    ///
    /// A zero `poll_interval_ms` allows a single read.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        if self.poll_interval_ms == 0 {
            return 1;
        }
        let attempts = self.timeout_ms / self.poll_interval_ms;
        if attempts == 0 { 1 } else { attempts }
    }
}

/// Device bring-up configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InitConfig {
    /// Identity poll bounds
    pub identity: IdentityPoll,
    /// Accelerometer low pass filter
    pub accel_dlpf: AccelDlpf,
    /// Gyroscope low pass filter
    pub gyro_dlpf: GyroDlpf,
    /// Accelerometer sample rate divider (0-4095)
    /// Actual sample rate = 1.125 kHz / (1 + `accel_sample_rate_div`)
    pub accel_sample_rate_div: u16,
    /// Gyroscope sample rate divider
    /// Actual sample rate = 1.1 kHz / (1 + `gyro_sample_rate_div`)
    pub gyro_sample_rate_div: u8,
    /// Output block averaged for the gyroscope bias
    ///
    /// Defaults to [`SensorBlock::Accelerometer`]: the stock firmware derives
    /// the gyroscope offsets from accelerometer samples, which looks like a
    /// slip but is what deployed units were calibrated with. Select
    /// [`SensorBlock::Gyroscope`] to average the gyroscope's own output.
    pub gyro_bias_source: SensorBlock,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            identity: IdentityPoll::default(),
            accel_dlpf: AccelDlpf::default(),
            gyro_dlpf: GyroDlpf::default(),
            accel_sample_rate_div: 0,
            gyro_sample_rate_div: 0,
            gyro_bias_source: SensorBlock::Accelerometer,
        }
    }
}

impl InitConfig {
    /// Check values that the closed enums cannot rule out
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.accel_sample_rate_div <= MAX_ACCEL_SAMPLE_RATE_DIV
    }

    /// Calculate the effective accelerometer sample rate in Hz
    #[must_use]
    pub fn accel_sample_rate_hz(&self) -> f32 {
        1125.0 / (1.0 + f32::from(self.accel_sample_rate_div))
    }

    /// Calculate the effective gyroscope sample rate in Hz
    #[must_use]
    pub fn gyro_sample_rate_hz(&self) -> f32 {
        1100.0 / (1.0 + f32::from(self.gyro_sample_rate_div))
    }
}
