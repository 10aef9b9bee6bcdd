//! Sensor modules for the ICM-20948
//!
//! This module provides types, enums, and configuration structures for the two
//! sensors this driver handles:
//! - Accelerometer (3-axis)
//! - Gyroscope (3-axis)
//!
//! All sensor operations are performed through methods on `Icm20948Driver`.

pub mod accelerometer;
pub mod gyroscope;

// Re-export main types
pub use accelerometer::{AccelBiasOffset, AccelDlpf, AccelFullScale};
pub use gyroscope::{GyroBiasOffset, GyroDlpf, GyroFullScale};

use crate::registers::{ACCEL_XOUT_H, GYRO_XOUT_H};

/// Three-axis sample, either raw counts widened to `f32` or physical units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Vector3 {
    /// X-axis component
    pub x: f32,
    /// Y-axis component
    pub y: f32,
    /// Z-axis component
    pub z: f32,
}

impl Vector3 {
    /// Create a vector from its components
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Decode a six byte output block (X, Y, Z as big-endian `i16`)
    #[must_use]
    pub fn from_be_bytes(buffer: [u8; 6]) -> Self {
        Self {
            x: f32::from(i16::from_be_bytes([buffer[0], buffer[1]])),
            y: f32::from(i16::from_be_bytes([buffer[2], buffer[3]])),
            z: f32::from(i16::from_be_bytes([buffer[4], buffer[5]])),
        }
    }

    /// Divide every component by `divisor`
    #[must_use]
    pub fn scaled(self, divisor: f32) -> Self {
        Self {
            x: self.x / divisor,
            y: self.y / divisor,
            z: self.z / divisor,
        }
    }

    /// Get the magnitude of the vector
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }
}

/// Which output block a raw read targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorBlock {
    /// `ACCEL_XOUT_H`..`ACCEL_ZOUT_L`
    Accelerometer,
    /// `GYRO_XOUT_H`..`GYRO_ZOUT_L`
    Gyroscope,
}

impl SensorBlock {
    /// Bank 0 address of the block's first (X high) byte
    #[must_use]
    pub const fn start_address(self) -> u8 {
        match self {
            Self::Accelerometer => ACCEL_XOUT_H,
            Self::Gyroscope => GYRO_XOUT_H,
        }
    }
}

/// Full-scale ranges currently programmed into the device
///
/// Returned by [`Icm20948Driver::init`](crate::Icm20948Driver::init) and passed
/// back into scaled reads, so the conversion divisor always travels with the
/// call instead of living in driver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Scales {
    /// Accelerometer range
    pub accel: AccelFullScale,
    /// Gyroscope range
    pub gyro: GyroFullScale,
}

impl Default for Scales {
    /// The ranges `init` leaves the device in: ±16g and ±2000dps
    fn default() -> Self {
        Self {
            accel: AccelFullScale::G16,
            gyro: GyroFullScale::Dps2000,
        }
    }
}

impl Scales {
    /// LSB-per-unit divisor for `block`
    #[must_use]
    pub const fn sensitivity(&self, block: SensorBlock) -> f32 {
        match block {
            SensorBlock::Accelerometer => self.accel.sensitivity(),
            SensorBlock::Gyroscope => self.gyro.sensitivity(),
        }
    }
}
