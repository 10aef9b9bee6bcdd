//! Accelerometer sensor types and configuration
//!
//! Provides the full-scale table, the low-pass filter settings and the typed
//! hardware bias offset for the ICM-20948's 3-axis accelerometer.

/// Accelerometer full-scale range
///
/// Each variant carries the 2-bit `ACCEL_FS_SEL` value (its discriminant) and
/// the matching LSB/g divisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelFullScale {
    /// ±2g range (most sensitive, least range)
    G2 = 0,
    /// ±4g range
    G4 = 1,
    /// ±8g range
    G8 = 2,
    /// ±16g range (least sensitive, most range)
    G16 = 3,
}

impl AccelFullScale {
    /// Get the sensitivity in LSB/g (Least Significant Bit per g)
    ///
    /// This is used to convert raw sensor values to physical units.
    #[must_use]
    pub const fn sensitivity(self) -> f32 {
        match self {
            Self::G2 => 16384.0, // LSB/g
            Self::G4 => 8192.0,  // LSB/g
            Self::G8 => 4096.0,  // LSB/g
            Self::G16 => 2048.0, // LSB/g
        }
    }

    /// `ACCEL_FS_SEL` field value (bits [2:1] of `ACCEL_CONFIG`)
    #[must_use]
    pub const fn config_bits(self) -> u8 {
        self as u8
    }

    /// The field already shifted into place within `ACCEL_CONFIG`
    #[must_use]
    pub const fn register_bits(self) -> u8 {
        self.config_bits() << 1
    }
}

/// Accelerometer Digital Low Pass Filter (`ACCEL_DLPFCFG`) with `FCHOICE` = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelDlpf {
    /// 246 Hz bandwidth (register reset value)
    #[default]
    Hz246 = 0,
    /// 111 Hz bandwidth
    Hz111 = 2,
    /// 50 Hz bandwidth
    Hz50 = 3,
    /// 24 Hz bandwidth
    Hz24 = 4,
    /// 12 Hz bandwidth
    Hz12 = 5,
    /// 6 Hz bandwidth
    Hz6 = 6,
    /// 473 Hz bandwidth
    Hz473 = 7,
}

impl AccelDlpf {
    /// Get the 3dB bandwidth in Hz
    #[must_use]
    pub const fn bandwidth_hz(self) -> u16 {
        match self {
            Self::Hz246 => 246,
            Self::Hz111 => 111,
            Self::Hz50 => 50,
            Self::Hz24 => 24,
            Self::Hz12 => 12,
            Self::Hz6 => 6,
            Self::Hz473 => 473,
        }
    }
}

/// Accelerometer hardware offset register pair (`XA_OFFS_H`/`XA_OFFS_L` and friends)
///
/// Bit 0 of the low byte is reserved and must be written back as it was read.
/// `value` is the whole 16-bit register content as the chip returned it; when
/// encoding, its bit 0 is replaced by `reserved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelBiasOffset {
    /// Offset in register units (bit 0 ignored on encode)
    pub value: i16,
    /// Reserved bit 0 of the low byte
    pub reserved: bool,
}

impl AccelBiasOffset {
    /// Ratio between an averaged raw reading and one offset register count
    pub const RAW_PER_OFFSET_LSB: i32 = 8;

    /// Decode the high/low register pair
    #[must_use]
    pub const fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self {
            value: i16::from_be_bytes(bytes),
            reserved: bytes[1] & 0x01 != 0,
        }
    }

    /// Encode for writing, with the reserved bit re-inserted
    #[must_use]
    pub const fn to_be_bytes(self) -> [u8; 2] {
        let [high, low] = self.value.to_be_bytes();
        [high, (low & 0xFE) | self.reserved as u8]
    }

    /// Offset after compensating an averaged raw bias
    ///
    /// `new = existing - average / 8`, computed in 32 bits and truncated back
    /// to the 16-bit register; the reserved bit is carried over untouched.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn corrected(self, average_bias: i32) -> Self {
        let value = self.value as i32 - average_bias / Self::RAW_PER_OFFSET_LSB;
        Self {
            value: value as i16,
            reserved: self.reserved,
        }
    }
}
