//! Hardware bias calibration
//!
//! Both sensors are calibrated by averaging [`CALIBRATION_SAMPLES`] raw
//! readings while the device is stationary and writing compensating values
//! into the on-chip offset registers, so later readings come out corrected
//! without any host-side arithmetic.
//!
//! | Sensor | Offset registers | New offset |
//! |--------|------------------|------------|
//! | Accelerometer | Bank 1, three `XA_OFFS_H`-style pairs, read-modify-write | `existing - average / 8` |
//! | Gyroscope | Bank 2, `XG_OFFS_USRH`..`ZG_OFFS_USRL`, one burst, write only | `-average / 4` |
//!
//! The accelerometer pairs keep their reserved bit 0, see
//! [`AccelBiasOffset`]. The gyroscope offsets are overwritten outright.

use device_driver::RegisterInterface;

use crate::registers::{ACCEL_OFFSET_STRIDE, XA_OFFS_H, XG_OFFS_USRH};
use crate::sensors::{AccelBiasOffset, GyroBiasOffset, SensorBlock};
use crate::{Bank, Error, Icm20948Driver};

/// Number of raw readings averaged per calibration
pub const CALIBRATION_SAMPLES: u16 = 100;

/// Bank 1 addresses of the X, Y and Z accelerometer offset pairs
const ACCEL_OFFSET_ADDRESSES: [u8; 3] = [
    XA_OFFS_H,
    XA_OFFS_H + ACCEL_OFFSET_STRIDE,
    XA_OFFS_H + 2 * ACCEL_OFFSET_STRIDE,
];

/// Outcome of an accelerometer calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelCalibration {
    /// Averaged raw reading per axis
    pub average_bias: [i32; 3],
    /// Offsets found in the device before calibration
    pub previous: [AccelBiasOffset; 3],
    /// Offsets written
    pub offsets: [AccelBiasOffset; 3],
}

/// Outcome of a gyroscope calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroCalibration {
    /// Output block that was averaged
    pub source: SensorBlock,
    /// Averaged raw reading per axis
    pub average_bias: [i32; 3],
    /// Offsets written
    pub offsets: GyroBiasOffset,
}

/// Per-axis average of accumulated readings, truncating toward zero
#[must_use]
pub fn average_bias(sums: [i32; 3], samples: u16) -> [i32; 3] {
    let samples = i32::from(samples.max(1));
    sums.map(|sum| sum / samples)
}

impl<I> Icm20948Driver<I>
where
    I: RegisterInterface<AddressType = u8>,
{
    /// Average [`CALIBRATION_SAMPLES`] raw readings of `block`
    ///
    /// Per-axis sums are kept in `i32`; the average truncates toward zero.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn average_counts(&mut self, block: SensorBlock) -> Result<[i32; 3], Error<I::Error>> {
        let mut sums = [0i32; 3];

        for _ in 0..CALIBRATION_SAMPLES {
            let counts = self.read_counts(block)?;
            for (sum, count) in sums.iter_mut().zip(counts) {
                *sum += i32::from(count);
            }
        }

        Ok(average_bias(sums, CALIBRATION_SAMPLES))
    }

    /// Calibrate the accelerometer offset registers
    ///
    /// The device should lie still. For each axis the current offset pair is
    /// read, corrected by `average / 8` and written back with its reserved bit
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails. Axes already
    /// written stay written.
    pub fn calibrate_accelerometer(&mut self) -> Result<AccelCalibration, Error<I::Error>> {
        let average_bias = self.average_counts(SensorBlock::Accelerometer)?;

        let mut calibration = AccelCalibration {
            average_bias,
            previous: [AccelBiasOffset::default(); 3],
            offsets: [AccelBiasOffset::default(); 3],
        };

        for (axis, address) in ACCEL_OFFSET_ADDRESSES.into_iter().enumerate() {
            let mut bytes = [0u8; 2];
            self.read_many(Bank::Bank1, address, &mut bytes)?;

            let previous = AccelBiasOffset::from_be_bytes(bytes);
            let offset = previous.corrected(average_bias[axis]);
            self.write_many(Bank::Bank1, address, &offset.to_be_bytes())?;

            calibration.previous[axis] = previous;
            calibration.offsets[axis] = offset;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("Accel offsets {} -> {}", calibration.previous, calibration.offsets);

        Ok(calibration)
    }

    /// Calibrate the gyroscope offset registers
    ///
    /// Averages `source` and writes `-average / 4` for each axis in a single
    /// six byte burst; the previous offsets are neither read nor kept.
    ///
    /// `source` should be [`SensorBlock::Gyroscope`]. The stock bring-up
    /// passes [`SensorBlock::Accelerometer`] (see
    /// [`InitConfig::gyro_bias_source`](crate::InitConfig::gyro_bias_source)),
    /// which derives the gyroscope offsets from acceleration readings.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn calibrate_gyroscope(
        &mut self,
        source: SensorBlock,
    ) -> Result<GyroCalibration, Error<I::Error>> {
        #[cfg(feature = "defmt")]
        if source == SensorBlock::Accelerometer {
            defmt::warn!("Gyroscope bias is being averaged from accelerometer samples");
        }

        let average_bias = self.average_counts(source)?;
        let offsets = GyroBiasOffset::from_average(average_bias);
        self.write_many(Bank::Bank2, XG_OFFS_USRH, &offsets.to_be_bytes())?;

        Ok(GyroCalibration {
            source,
            average_bias,
            offsets,
        })
    }

    /// Read the accelerometer offset pairs currently in the device
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_accel_bias_offsets(&mut self) -> Result<[AccelBiasOffset; 3], Error<I::Error>> {
        let mut offsets = [AccelBiasOffset::default(); 3];
        for (offset, address) in offsets.iter_mut().zip(ACCEL_OFFSET_ADDRESSES) {
            let mut bytes = [0u8; 2];
            self.read_many(Bank::Bank1, address, &mut bytes)?;
            *offset = AccelBiasOffset::from_be_bytes(bytes);
        }
        Ok(offsets)
    }

    /// Read the gyroscope user offsets currently in the device
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_gyro_bias_offsets(&mut self) -> Result<GyroBiasOffset, Error<I::Error>> {
        let mut bytes = [0u8; 6];
        self.read_many(Bank::Bank2, XG_OFFS_USRH, &mut bytes)?;
        Ok(GyroBiasOffset::from_be_bytes(bytes))
    }
}
