#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod calibration;
pub mod config;
pub mod device;
pub mod interface;
pub mod registers;
pub mod sensors;

// Re-export main types
pub use calibration::{AccelCalibration, CALIBRATION_SAMPLES, GyroCalibration};
pub use config::{IdentityPoll, InitConfig};
pub use device::Icm20948Driver;
pub use interface::SpiInterface;
pub use sensors::{
    AccelBiasOffset, AccelDlpf, AccelFullScale, GyroBiasOffset, GyroDlpf, GyroFullScale, Scales,
    SensorBlock, Vector3,
};

/// Expected value of `WHO_AM_I` register
pub const WHO_AM_I_VALUE: u8 = 0xEA;

/// Register bank identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bank {
    /// Bank 0 - Identity, power management and sensor data
    Bank0 = 0,
    /// Bank 1 - Self-test and accelerometer offsets
    Bank1 = 1,
    /// Bank 2 - Gyro and accelerometer configuration
    Bank2 = 2,
    /// Bank 3 - I2C master configuration
    Bank3 = 3,
}

impl Bank {
    /// Value written to `REG_BANK_SEL` (bank number in bits [5:4])
    #[must_use]
    pub const fn select_value(self) -> u8 {
        (self as u8) << 4
    }
}

/// Driver errors
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error with the device
    Bus(E),
    /// `WHO_AM_I` never matched within the identity poll bound
    /// (contains the last value read)
    DeviceNotFound {
        /// Last `WHO_AM_I` value read
        last_id: u8,
    },
    /// Invalid configuration parameter
    InvalidConfig,
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::Bus(error)
    }
}
