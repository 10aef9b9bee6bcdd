//! Gyroscope sensor types and configuration
//!
//! Provides the full-scale table, the low-pass filter settings and the user
//! offset registers for the ICM-20948's 3-axis gyroscope.

/// Gyroscope full-scale range
///
/// Each variant carries the 2-bit `GYRO_FS_SEL` value (its discriminant) and
/// the matching LSB/(°/s) divisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroFullScale {
    /// ±250 degrees per second (most sensitive)
    Dps250 = 0,
    /// ±500 degrees per second
    Dps500 = 1,
    /// ±1000 degrees per second
    Dps1000 = 2,
    /// ±2000 degrees per second (least sensitive)
    Dps2000 = 3,
}

impl GyroFullScale {
    /// Get the sensitivity in LSB/(°/s)
    #[must_use]
    pub const fn sensitivity(self) -> f32 {
        match self {
            Self::Dps250 => 131.0,
            Self::Dps500 => 65.5,
            Self::Dps1000 => 32.8,
            Self::Dps2000 => 16.4,
        }
    }

    /// `GYRO_FS_SEL` field value (bits [2:1] of `GYRO_CONFIG_1`)
    #[must_use]
    pub const fn config_bits(self) -> u8 {
        self as u8
    }

    /// The field already shifted into place within `GYRO_CONFIG_1`
    #[must_use]
    pub const fn register_bits(self) -> u8 {
        self.config_bits() << 1
    }
}

/// Gyroscope Digital Low Pass Filter (`GYRO_DLPFCFG`) with `FCHOICE` = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroDlpf {
    /// 197 Hz bandwidth (register reset value)
    #[default]
    Hz197 = 0,
    /// 152 Hz bandwidth
    Hz152 = 1,
    /// 120 Hz bandwidth
    Hz120 = 2,
    /// 51 Hz bandwidth
    Hz51 = 3,
    /// 24 Hz bandwidth
    Hz24 = 4,
    /// 12 Hz bandwidth
    Hz12 = 5,
    /// 6 Hz bandwidth
    Hz6 = 6,
    /// 361 Hz bandwidth
    Hz361 = 7,
}

impl GyroDlpf {
    /// Get the 3dB bandwidth in Hz
    #[must_use]
    pub const fn bandwidth_hz(self) -> u16 {
        match self {
            Self::Hz197 => 197,
            Self::Hz152 => 152,
            Self::Hz120 => 120,
            Self::Hz51 => 51,
            Self::Hz24 => 24,
            Self::Hz12 => 12,
            Self::Hz6 => 6,
            Self::Hz361 => 361,
        }
    }
}

/// Gyroscope user offsets (`XG_OFFS_USRH`..`ZG_OFFS_USRL`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroBiasOffset {
    /// X-axis offset
    pub x: i16,
    /// Y-axis offset
    pub y: i16,
    /// Z-axis offset
    pub z: i16,
}

impl GyroBiasOffset {
    /// Ratio between an averaged raw reading and one offset register count
    pub const RAW_PER_OFFSET_LSB: i32 = 4;

    /// Offsets cancelling the averaged per-axis bias: `-average / 4`
    ///
    /// The previous register content plays no part.
    #[must_use]
    pub const fn from_average(average_bias: [i32; 3]) -> Self {
        Self {
            x: Self::cancel(average_bias[0]),
            y: Self::cancel(average_bias[1]),
            z: Self::cancel(average_bias[2]),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    const fn cancel(average: i32) -> i16 {
        (-average / Self::RAW_PER_OFFSET_LSB) as i16
    }

    /// Decode the six register bytes
    #[must_use]
    pub const fn from_be_bytes(bytes: [u8; 6]) -> Self {
        Self {
            x: i16::from_be_bytes([bytes[0], bytes[1]]),
            y: i16::from_be_bytes([bytes[2], bytes[3]]),
            z: i16::from_be_bytes([bytes[4], bytes[5]]),
        }
    }

    /// Encode as XH, XL, YH, YL, ZH, ZL
    #[must_use]
    pub const fn to_be_bytes(self) -> [u8; 6] {
        let [xh, xl] = self.x.to_be_bytes();
        let [yh, yl] = self.y.to_be_bytes();
        let [zh, zl] = self.z.to_be_bytes();
        [xh, xl, yh, yl, zh, zl]
    }
}
