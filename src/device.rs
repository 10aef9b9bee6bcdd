//! High-level driver API for the ICM-20948
//!
//! This module provides the register access layer (bank selection plus
//! single and burst register transfers), the bring-up sequence, full-scale
//! management and sample reads.
//!
//! # Bank selection
//!
//! Every register access writes `REG_BANK_SEL` first, even when the wanted
//! bank is already active; no current bank is tracked. A read-modify-write is
//! two accesses and therefore selects twice.

use device_driver::RegisterInterface;
use embedded_hal::delay::DelayNs;

use crate::config::{IdentityPoll, InitConfig};
use crate::registers::RegisterDevice;
use crate::sensors::{
    AccelDlpf, AccelFullScale, GyroDlpf, GyroFullScale, Scales, SensorBlock, Vector3,
};
use crate::{Bank, Error, WHO_AM_I_VALUE};

/// Settling time after reset and after clearing sleep, in milliseconds
const POWER_SETTLE_MS: u32 = 100;

/// Read-modify-write of a typed register, re-selecting `$bank` before the
/// read and again before the write.
macro_rules! modify_in_bank {
    ($driver:expr, $bank:expr, $register:ident, |$reg:ident| $body:block) => {{
        $driver.select_bank($bank)?;
        #[allow(unused_mut)]
        let mut $reg = $driver.device.$register().read()?;
        $body
        $driver.select_bank($bank)?;
        $driver.device.$register().write(|w| *w = $reg)
    }};
}

#[allow(clippy::cast_possible_truncation)]
const fn size_bits(len: usize) -> u32 {
    (len * 8) as u32
}

/// Main driver for the ICM-20948
///
/// The driver owns its bus interface and is not reentrant: every method takes
/// `&mut self` and blocks until its transfers complete. Sharing the SPI bus
/// with other devices is up to the `SpiDevice` implementation handed in.
pub struct Icm20948Driver<I> {
    device: RegisterDevice<I>,
}

impl<I> Icm20948Driver<I>
where
    I: RegisterInterface<AddressType = u8>,
{
    /// Create a new ICM-20948 driver instance
    ///
    /// No bus traffic happens here. Call [`init`](Self::init) to bring the
    /// device up.
    pub fn new(interface: I) -> Self {
        Self {
            device: RegisterDevice::new(interface),
        }
    }

    /// Consume the driver and return the underlying interface
    pub fn release(self) -> I {
        self.device.interface
    }

    // ==================== REGISTER ACCESS ====================

    /// Select a register bank
    ///
    /// The ICM-20948 has 4 register banks that must be selected before
    /// accessing registers in that bank. The select is always written.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn select_bank(&mut self, bank: Bank) -> Result<(), Error<I::Error>> {
        self.device.reg_bank_sel().write(|w| {
            w.set_user_bank(bank as u8);
        })?;
        Ok(())
    }

    /// Read one register
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read(&mut self, bank: Bank, address: u8) -> Result<u8, Error<I::Error>> {
        let mut value = [0u8; 1];
        self.read_many(bank, address, &mut value)?;
        Ok(value[0])
    }

    /// Burst-read `buffer.len()` consecutive registers starting at `address`
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_many(
        &mut self,
        bank: Bank,
        address: u8,
        buffer: &mut [u8],
    ) -> Result<(), Error<I::Error>> {
        self.select_bank(bank)?;
        self.device
            .interface
            .read_register(address, size_bits(buffer.len()), buffer)?;
        Ok(())
    }

    /// Write one register
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn write(&mut self, bank: Bank, address: u8, value: u8) -> Result<(), Error<I::Error>> {
        self.write_many(bank, address, &[value])
    }

    /// Burst-write `data` to consecutive registers starting at `address`
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn write_many(
        &mut self,
        bank: Bank,
        address: u8,
        data: &[u8],
    ) -> Result<(), Error<I::Error>> {
        self.select_bank(bank)?;
        self.device
            .interface
            .write_register(address, size_bits(data.len()), data)?;
        Ok(())
    }

    // ==================== INITIALIZATION ====================

    /// Bring the device up
    ///
    /// Sequence: identity poll, reset, wake-up with automatic clock source,
    /// ODR alignment, SPI-only mode, low pass filters, sample-rate dividers,
    /// accelerometer and gyroscope bias calibration, then ±16g / ±2000dps.
    /// The device must be stationary during the calibration step.
    ///
    /// Returns the full-scale ranges now programmed, to be passed to scaled
    /// reads.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if `config` is out of range (nothing is sent)
    /// - [`Error::DeviceNotFound`] if `WHO_AM_I` never reads 0xEA
    /// - [`Error::Bus`] on any transfer failure
    ///
    /// Any error aborts the sequence where it occurred.
    pub fn init<D>(
        &mut self,
        delay: &mut D,
        config: &InitConfig,
    ) -> Result<Scales, Error<I::Error>>
    where
        D: DelayNs,
    {
        if !config.is_valid() {
            return Err(Error::InvalidConfig);
        }

        let _attempts = self.wait_for_device(delay, &config.identity)?;
        #[cfg(feature = "defmt")]
        defmt::debug!("ICM-20948 answered after {} WHO_AM_I reads", _attempts);

        self.reset(delay)?;
        self.enable_odr_alignment()?;
        self.enable_spi_mode()?;
        self.configure_filters(config.accel_dlpf, config.gyro_dlpf)?;
        self.configure_sample_rates(config.accel_sample_rate_div, config.gyro_sample_rate_div)?;

        let _accel = self.calibrate_accelerometer()?;
        let _gyro = self.calibrate_gyroscope(config.gyro_bias_source)?;
        #[cfg(feature = "defmt")]
        defmt::info!(
            "Bias calibration done: accel avg {}, gyro avg {}",
            _accel.average_bias,
            _gyro.average_bias
        );

        let scales = self.set_full_scales(Scales::default())?;
        #[cfg(feature = "defmt")]
        defmt::info!("ICM-20948 initialized ({})", scales);

        Ok(scales)
    }

    /// Poll `WHO_AM_I` until it reads 0xEA
    ///
    /// Returns the number of reads it took.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] with the last value read once the
    /// poll bound is exhausted, or [`Error::Bus`] as soon as a read fails.
    pub fn wait_for_device<D>(
        &mut self,
        delay: &mut D,
        poll: &IdentityPoll,
    ) -> Result<u32, Error<I::Error>>
    where
        D: DelayNs,
    {
        let attempts = poll.max_attempts();
        let mut last_id = 0;

        for attempt in 1..=attempts {
            last_id = self.read_who_am_i()?;
            if last_id == WHO_AM_I_VALUE {
                return Ok(attempt);
            }

            #[cfg(feature = "defmt")]
            defmt::trace!(
                "WHO_AM_I read {:#x}, attempt {}/{}",
                last_id,
                attempt,
                attempts
            );

            if attempt < attempts {
                delay.delay_ms(poll.poll_interval_ms);
            }
        }

        #[cfg(feature = "defmt")]
        defmt::warn!("No ICM-20948 found, last WHO_AM_I {:#x}", last_id);

        Err(Error::DeviceNotFound { last_id })
    }

    /// Read the `WHO_AM_I` register
    ///
    /// Should return 0xEA for a valid ICM-20948
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_who_am_i(&mut self) -> Result<u8, Error<I::Error>> {
        self.select_bank(Bank::Bank0)?;
        let reg = self.device.who_am_i().read()?;
        Ok(reg.who_am_i())
    }

    /// Soft reset, then wake up on the automatic clock source
    ///
    /// Writes `DEVICE_RESET | SLEEP | CLKSEL=1` (0xC1) to `PWR_MGMT_1`, waits,
    /// clears `SLEEP`, waits, then sets `CLKSEL` bit 0.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn reset<D>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        self.select_bank(Bank::Bank0)?;
        self.device.pwr_mgmt_1().write(|w| {
            w.set_device_reset(true);
            w.set_sleep(true);
            w.set_clksel(1);
        })?;
        delay.delay_ms(POWER_SETTLE_MS);

        modify_in_bank!(self, Bank::Bank0, pwr_mgmt_1, |pwr_mgmt| {
            pwr_mgmt.set_sleep(false);
        })?;
        delay.delay_ms(POWER_SETTLE_MS);

        modify_in_bank!(self, Bank::Bank0, pwr_mgmt_1, |pwr_mgmt| {
            pwr_mgmt.set_clksel(pwr_mgmt.clksel() | 0x01);
        })?;

        Ok(())
    }

    /// Align the accelerometer and gyroscope output data rates
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn enable_odr_alignment(&mut self) -> Result<(), Error<I::Error>> {
        self.select_bank(Bank::Bank2)?;
        self.device.bank_2_odr_align_en().write(|w| {
            w.set_odr_align_en(true);
        })?;
        Ok(())
    }

    /// Enable SPI mode by disabling the I2C slave interface
    ///
    /// Sets `I2C_IF_DIS` in `USER_CTRL`, leaving the other bits alone.
    /// Part of [`init`](Self::init).
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn enable_spi_mode(&mut self) -> Result<(), Error<I::Error>> {
        modify_in_bank!(self, Bank::Bank0, user_ctrl, |user_ctrl| {
            user_ctrl.set_i_2_c_if_dis(true);
        })?;
        Ok(())
    }

    /// Program the accelerometer and gyroscope DLPF bandwidths
    ///
    /// Only the `DLPFCFG` fields change; full scale and `FCHOICE` keep their
    /// current values.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn configure_filters(
        &mut self,
        accel: AccelDlpf,
        gyro: GyroDlpf,
    ) -> Result<(), Error<I::Error>> {
        modify_in_bank!(self, Bank::Bank2, bank_2_accel_config, |accel_config| {
            accel_config.set_accel_dlpfcfg(accel as u8);
        })?;
        modify_in_bank!(self, Bank::Bank2, bank_2_gyro_config_1, |gyro_config| {
            gyro_config.set_gyro_dlpfcfg(gyro as u8);
        })?;
        Ok(())
    }

    /// Program the sample-rate dividers
    ///
    /// The accelerometer divider is 12 bits wide, split over
    /// `ACCEL_SMPLRT_DIV_1` (bits [11:8]) and `ACCEL_SMPLRT_DIV_2` (bits [7:0]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `accel_div` exceeds 4095, or an
    /// error if communication with the device fails.
    pub fn configure_sample_rates(
        &mut self,
        accel_div: u16,
        gyro_div: u8,
    ) -> Result<(), Error<I::Error>> {
        if accel_div > crate::config::MAX_ACCEL_SAMPLE_RATE_DIV {
            return Err(Error::InvalidConfig);
        }
        let [div_high, div_low] = accel_div.to_be_bytes();

        self.select_bank(Bank::Bank2)?;
        self.device.bank_2_accel_smplrt_div_1().write(|w| {
            w.set_accel_smplrt_div_1(div_high);
        })?;

        self.select_bank(Bank::Bank2)?;
        self.device.bank_2_accel_smplrt_div_2().write(|w| {
            w.set_accel_smplrt_div_2(div_low);
        })?;

        self.select_bank(Bank::Bank2)?;
        self.device.bank_2_gyro_smplrt_div().write(|w| {
            w.set_gyro_smplrt_div(gyro_div);
        })?;

        Ok(())
    }

    // ==================== FULL SCALE ====================

    /// Set the accelerometer full-scale range
    ///
    /// Rewrites `ACCEL_FS_SEL` (bits [2:1] of `ACCEL_CONFIG`) and keeps the
    /// other bits. Returns the range to use for scaled reads.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_accel_full_scale(
        &mut self,
        full_scale: AccelFullScale,
    ) -> Result<AccelFullScale, Error<I::Error>> {
        modify_in_bank!(self, Bank::Bank2, bank_2_accel_config, |accel_config| {
            accel_config.set_accel_fs_sel(full_scale.config_bits());
        })?;
        Ok(full_scale)
    }

    /// Set the gyroscope full-scale range
    ///
    /// Rewrites `GYRO_FS_SEL` (bits [2:1] of `GYRO_CONFIG_1`) and keeps the
    /// other bits. Returns the range to use for scaled reads.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_gyro_full_scale(
        &mut self,
        full_scale: GyroFullScale,
    ) -> Result<GyroFullScale, Error<I::Error>> {
        modify_in_bank!(self, Bank::Bank2, bank_2_gyro_config_1, |gyro_config| {
            gyro_config.set_gyro_fs_sel(full_scale.config_bits());
        })?;
        Ok(full_scale)
    }

    /// Set both full-scale ranges, accelerometer first
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_full_scales(&mut self, scales: Scales) -> Result<Scales, Error<I::Error>> {
        Ok(Scales {
            accel: self.set_accel_full_scale(scales.accel)?,
            gyro: self.set_gyro_full_scale(scales.gyro)?,
        })
    }

    // ==================== SAMPLES ====================

    /// Read one output block as signed counts (X, Y, Z)
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_counts(&mut self, block: SensorBlock) -> Result<[i16; 3], Error<I::Error>> {
        let buffer = self.read_block(block)?;
        Ok([
            i16::from_be_bytes([buffer[0], buffer[1]]),
            i16::from_be_bytes([buffer[2], buffer[3]]),
            i16::from_be_bytes([buffer[4], buffer[5]]),
        ])
    }

    /// All six bytes of a block in one burst, so no axis is torn
    fn read_block(&mut self, block: SensorBlock) -> Result<[u8; 6], Error<I::Error>> {
        let mut buffer = [0u8; 6];
        self.read_many(Bank::Bank0, block.start_address(), &mut buffer)?;
        Ok(buffer)
    }

    /// Read one output block without any scaling
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_raw(&mut self, block: SensorBlock) -> Result<Vector3, Error<I::Error>> {
        Ok(Vector3::from_be_bytes(self.read_block(block)?))
    }

    /// Read one output block converted with the divisor from `scales`
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_scaled(
        &mut self,
        block: SensorBlock,
        scales: &Scales,
    ) -> Result<Vector3, Error<I::Error>> {
        Ok(self.read_raw(block)?.scaled(scales.sensitivity(block)))
    }

    /// Read raw accelerometer data
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_accelerometer_raw(&mut self) -> Result<Vector3, Error<I::Error>> {
        self.read_raw(SensorBlock::Accelerometer)
    }

    /// Read accelerometer data in g-force units
    ///
    /// `full_scale` must be the range last programmed into the device.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let scales = imu.init(&mut delay, &InitConfig::default())?;
    /// let accel = imu.read_accelerometer(scales.accel)?;
    /// println!("X: {}g, Y: {}g, Z: {}g", accel.x, accel.y, accel.z);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_accelerometer(
        &mut self,
        full_scale: AccelFullScale,
    ) -> Result<Vector3, Error<I::Error>> {
        Ok(self
            .read_accelerometer_raw()?
            .scaled(full_scale.sensitivity()))
    }

    /// Read raw gyroscope data
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_gyroscope_raw(&mut self) -> Result<Vector3, Error<I::Error>> {
        self.read_raw(SensorBlock::Gyroscope)
    }

    /// Read gyroscope data in degrees per second
    ///
    /// `full_scale` must be the range last programmed into the device.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_gyroscope(
        &mut self,
        full_scale: GyroFullScale,
    ) -> Result<Vector3, Error<I::Error>> {
        Ok(self.read_gyroscope_raw()?.scaled(full_scale.sensitivity()))
    }
}
