//! Register definitions for the ICM-20948
//!
//! The ICM-20948 multiplexes one 7-bit address space over four user banks,
//! selected through `REG_BANK_SEL` (0x7F). Only the registers this driver
//! touches are described here; they all share addresses with registers in
//! other banks, hence `ALLOW_ADDRESS_OVERLAP = true` everywhere.
//!
//! ## Bank usage
//! - **Bank 0**: identity, power management, user control, sensor output
//! - **Bank 1**: accelerometer bias offsets
//! - **Bank 2**: full-scale, filter, sample-rate and gyroscope offsets
//!
//! Multi-byte blocks (sensor output, bias offsets) are accessed as raw bursts,
//! their start addresses are exported as plain constants below.

device_driver::create_device!(
    device_name: Icm20948,
    dsl: {
        config {
            type RegisterAddressType = u8;
            type DefaultByteOrder = BE;
        }

        // ==================== BANK 0 REGISTERS ====================

        /// WHO_AM_I - Device ID Register (Bank 0, 0x00)
        /// Expected value: 0xEA
        register WhoAmI {
            const ADDRESS = 0x00;
            const SIZE_BITS = 8;
            const ALLOW_ADDRESS_OVERLAP = true;

            /// Device ID (should read 0xEA)
            who_am_i: uint = 0..8,
        },

        /// USER_CTRL - User Control (Bank 0, 0x03)
        register UserCtrl {
            const ADDRESS = 0x03;
            const SIZE_BITS = 8;
            const ALLOW_ADDRESS_OVERLAP = true;

            reserved_0: uint = 0..1,
            /// I2C master reset
            i2c_mst_rst: bool = 1,
            /// SRAM reset
            sram_rst: bool = 2,
            /// DMP reset
            dmp_rst: bool = 3,
            /// I2C slave interface disable (SPI only)
            i2c_if_dis: bool = 4,
            /// I2C master enable
            i2c_mst_en: bool = 5,
            /// FIFO enable
            fifo_en: bool = 6,
            /// DMP enable
            dmp_en: bool = 7,
        },

        /// PWR_MGMT_1 - Power Management 1 (Bank 0, 0x06)
        register PwrMgmt1 {
            const ADDRESS = 0x06;
            const SIZE_BITS = 8;
            const ALLOW_ADDRESS_OVERLAP = true;

            /// Clock source select (0=internal 20MHz, 1=auto select best, 2-7=stop clock)
            clksel: uint = 0..3,
            /// Temperature sensor disable
            temp_dis: bool = 3,
            reserved_4: uint = 4..5,
            /// Low power mode enable
            lp_en: bool = 5,
            /// Sleep mode enable
            sleep: bool = 6,
            /// Device reset
            device_reset: bool = 7,
        },

        /// REG_BANK_SEL - Register Bank Selection (All Banks, 0x7F)
        register RegBankSel {
            const ADDRESS = 0x7F;
            const SIZE_BITS = 8;
            const ALLOW_ADDRESS_OVERLAP = true;

            reserved_3_0: uint = 0..4,
            /// User bank selection (0-3, shifted left by 4 bits: 0x00, 0x10, 0x20, 0x30)
            user_bank: uint = 4..6,
            reserved_7_6: uint = 6..8,
        },

        // ==================== BANK 2 REGISTERS ====================

        /// GYRO_SMPLRT_DIV (Bank 2, 0x00)
        register Bank2GyroSmplrtDiv {
            const ADDRESS = 0x00;
            const SIZE_BITS = 8;
            const ALLOW_ADDRESS_OVERLAP = true;

            /// Gyroscope sample rate divider
            gyro_smplrt_div: uint = 0..8,
        },

        /// GYRO_CONFIG_1 (Bank 2, 0x01)
        register Bank2GyroConfig1 {
            const ADDRESS = 0x01;
            const SIZE_BITS = 8;
            const ALLOW_ADDRESS_OVERLAP = true;

            /// Gyroscope FCHOICE
            gyro_fchoice: bool = 0,
            /// Gyroscope full scale select (±250, ±500, ±1000, ±2000 dps)
            gyro_fs_sel: uint = 1..3,
            /// Gyroscope DLPF configuration
            gyro_dlpfcfg: uint = 3..6,
            reserved_7_6: uint = 6..8,
        },

        /// ODR_ALIGN_EN (Bank 2, 0x09)
        register Bank2OdrAlignEn {
            const ADDRESS = 0x09;
            const SIZE_BITS = 8;
            const ALLOW_ADDRESS_OVERLAP = true;

            /// ODR alignment enable
            odr_align_en: bool = 0,
            reserved_7_1: uint = 1..8,
        },

        /// ACCEL_SMPLRT_DIV_1 (Bank 2, 0x10)
        register Bank2AccelSmplrtDiv1 {
            const ADDRESS = 0x10;
            const SIZE_BITS = 8;
            const ALLOW_ADDRESS_OVERLAP = true;

            /// Accelerometer sample rate divider bits [11:8]
            accel_smplrt_div_1: uint = 0..4,
            reserved_7_4: uint = 4..8,
        },

        /// ACCEL_SMPLRT_DIV_2 (Bank 2, 0x11)
        register Bank2AccelSmplrtDiv2 {
            const ADDRESS = 0x11;
            const SIZE_BITS = 8;
            const ALLOW_ADDRESS_OVERLAP = true;

            /// Accelerometer sample rate divider bits [7:0]
            accel_smplrt_div_2: uint = 0..8,
        },

        /// ACCEL_CONFIG (Bank 2, 0x14)
        register Bank2AccelConfig {
            const ADDRESS = 0x14;
            const SIZE_BITS = 8;
            const ALLOW_ADDRESS_OVERLAP = true;

            /// Accelerometer FCHOICE
            accel_fchoice: bool = 0,
            /// Accelerometer full scale select (±2g, ±4g, ±8g, ±16g)
            accel_fs_sel: uint = 1..3,
            /// Accelerometer DLPF configuration
            accel_dlpfcfg: uint = 3..6,
            reserved_7_6: uint = 6..8,
        }
    }
);

/// Typed register block driven by [`Icm20948Driver`](crate::Icm20948Driver)
pub use Icm20948 as RegisterDevice;

/// `WHO_AM_I` address (Bank 0)
pub const WHO_AM_I: u8 = 0x00;

/// `PWR_MGMT_1` address (Bank 0)
pub const PWR_MGMT_1: u8 = 0x06;

/// First byte of the accelerometer output block, `ACCEL_XOUT_H` (Bank 0)
///
/// Six bytes: X high, X low, Y high, Y low, Z high, Z low.
pub const ACCEL_XOUT_H: u8 = 0x2D;

/// First byte of the gyroscope output block, `GYRO_XOUT_H` (Bank 0)
pub const GYRO_XOUT_H: u8 = 0x33;

/// `REG_BANK_SEL` address, present in every bank
pub const REG_BANK_SEL: u8 = 0x7F;

/// X-axis accelerometer offset high byte, `XA_OFFS_H` (Bank 1)
///
/// Each axis occupies a high/low pair; the Y and Z pairs start
/// [`ACCEL_OFFSET_STRIDE`] and twice that further on.
pub const XA_OFFS_H: u8 = 0x14;

/// Distance between the X, Y and Z accelerometer offset pairs (0x14, 0x17, 0x1A)
///
/// These are the datasheet addresses. Firmware that steps the pairs by 2
/// writes Y and Z to 0x16 and 0x18 instead, so offsets left behind by such
/// firmware are not where this driver reads them.
pub const ACCEL_OFFSET_STRIDE: u8 = 3;

/// X-axis gyroscope offset high byte, `XG_OFFS_USRH` (Bank 2)
///
/// Followed by XL, YH, YL, ZH, ZL: all six bytes are written in one burst.
pub const XG_OFFS_USRH: u8 = 0x03;
