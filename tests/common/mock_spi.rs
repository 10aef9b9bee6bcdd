//! Simulated ICM-20948 behind an `embedded-hal` SPI device
//!
//! Decodes every chip-select frame the way the chip does (command byte, then
//! payload), keeps a register file per bank and logs each transfer.

use embedded_hal::spi::{self, ErrorKind, ErrorType, SpiDevice};
use icm20948_spi::Bank;
use icm20948_spi::registers::{ACCEL_XOUT_H, GYRO_XOUT_H, PWR_MGMT_1, REG_BANK_SEL, WHO_AM_I};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// Value `PWR_MGMT_1` holds once a soft reset completes
const PWR_MGMT_1_RESET: u8 = 0x41;

/// One decoded SPI frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// `REG_BANK_SEL` written
    BankSelect {
        /// Bank selected
        bank: Bank,
    },
    /// Burst read
    Read {
        /// Bank active during the read
        bank: Bank,
        /// First register address
        address: u8,
        /// Number of bytes clocked out
        len: usize,
    },
    /// Burst write
    Write {
        /// Bank active during the write
        bank: Bank,
        /// First register address
        address: u8,
        /// Payload after the command byte
        data: Vec<u8>,
    },
}

/// Mock bus error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    /// Simulated transfer failure
    Communication,
    /// Frame the chip would not understand
    Malformed,
}

impl spi::Error for MockError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Debug)]
struct MockState {
    registers: HashMap<(Bank, u8), u8>,
    current_bank: Bank,
    operations: Vec<Operation>,

    who_am_i_sequence: VecDeque<u8>,
    accel_sequence: Vec<[i16; 3]>,
    accel_sequence_idx: usize,
    gyro_sequence: Vec<[i16; 3]>,
    gyro_sequence_idx: usize,

    fail_next_read: bool,
    fail_next_write: bool,
    fail_bank_select: bool,
}

impl MockState {
    fn new() -> Self {
        let mut registers = HashMap::new();
        registers.insert((Bank::Bank0, WHO_AM_I), 0xEA);

        Self {
            registers,
            current_bank: Bank::Bank0,
            operations: Vec::new(),
            who_am_i_sequence: VecDeque::new(),
            accel_sequence: Vec::new(),
            accel_sequence_idx: 0,
            gyro_sequence: Vec::new(),
            gyro_sequence_idx: 0,
            fail_next_read: false,
            fail_next_write: false,
            fail_bank_select: false,
        }
    }

    fn store_block(&mut self, start: u8, [x, y, z]: [i16; 3]) {
        let bytes = [x.to_be_bytes(), y.to_be_bytes(), z.to_be_bytes()].concat();
        for (offset, byte) in bytes.into_iter().enumerate() {
            self.registers
                .insert((Bank::Bank0, start + offset as u8), byte);
        }
    }

    fn advance_sequences(&mut self, address: u8) {
        if self.current_bank != Bank::Bank0 {
            return;
        }
        match address {
            WHO_AM_I => {
                if let Some(id) = self.who_am_i_sequence.pop_front() {
                    self.registers.insert((Bank::Bank0, WHO_AM_I), id);
                }
            }
            ACCEL_XOUT_H if !self.accel_sequence.is_empty() => {
                let sample = self.accel_sequence[self.accel_sequence_idx];
                self.store_block(ACCEL_XOUT_H, sample);
                self.accel_sequence_idx = (self.accel_sequence_idx + 1) % self.accel_sequence.len();
            }
            GYRO_XOUT_H if !self.gyro_sequence.is_empty() => {
                let sample = self.gyro_sequence[self.gyro_sequence_idx];
                self.store_block(GYRO_XOUT_H, sample);
                self.gyro_sequence_idx = (self.gyro_sequence_idx + 1) % self.gyro_sequence.len();
            }
            _ => {}
        }
    }

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), MockError> {
        if self.fail_next_read {
            self.fail_next_read = false;
            return Err(MockError::Communication);
        }

        self.advance_sequences(address);
        for (i, byte) in buffer.iter_mut().enumerate() {
            let reg_addr = address.wrapping_add(i as u8);
            *byte = self
                .registers
                .get(&(self.current_bank, reg_addr))
                .copied()
                .unwrap_or(0);
        }

        self.operations.push(Operation::Read {
            bank: self.current_bank,
            address,
            len: buffer.len(),
        });
        Ok(())
    }

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), MockError> {
        if address == REG_BANK_SEL {
            if self.fail_bank_select {
                return Err(MockError::Communication);
            }
            let bank = match data.first().map(|value| (value >> 4) & 0x03) {
                Some(0) => Bank::Bank0,
                Some(1) => Bank::Bank1,
                Some(2) => Bank::Bank2,
                Some(3) => Bank::Bank3,
                _ => return Err(MockError::Malformed),
            };
            self.current_bank = bank;
            self.operations.push(Operation::BankSelect { bank });
            return Ok(());
        }

        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(MockError::Communication);
        }

        for (i, &byte) in data.iter().enumerate() {
            let reg_addr = address.wrapping_add(i as u8);
            let stored = if self.current_bank == Bank::Bank0
                && reg_addr == PWR_MGMT_1
                && byte & 0x80 != 0
            {
                PWR_MGMT_1_RESET
            } else {
                byte
            };
            self.registers.insert((self.current_bank, reg_addr), stored);
        }

        self.operations.push(Operation::Write {
            bank: self.current_bank,
            address,
            data: data.to_vec(),
        });
        Ok(())
    }
}

/// Mock SPI device; clones share the same simulated chip
#[derive(Clone)]
pub struct MockSpi {
    state: Rc<RefCell<MockState>>,
}

impl MockSpi {
    /// Create a chip that answers 0xEA and has every other register at zero
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState::new())),
        }
    }

    /// Set a register value
    pub fn set_register(&self, bank: Bank, address: u8, value: u8) {
        self.state
            .borrow_mut()
            .registers
            .insert((bank, address), value);
    }

    /// Get a register value
    pub fn get_register(&self, bank: Bank, address: u8) -> u8 {
        self.state
            .borrow()
            .registers
            .get(&(bank, address))
            .copied()
            .unwrap_or(0)
    }

    /// Values returned by successive `WHO_AM_I` reads; the last one sticks
    pub fn set_who_am_i_sequence(&self, ids: &[u8]) {
        self.state.borrow_mut().who_am_i_sequence = ids.iter().copied().collect();
    }

    /// Set accelerometer output (returned until changed)
    pub fn set_accel_data(&self, x: i16, y: i16, z: i16) {
        self.state.borrow_mut().store_block(ACCEL_XOUT_H, [x, y, z]);
    }

    /// Set a cycling sequence of accelerometer outputs, one per block read
    pub fn set_accel_sequence(&self, sequence: Vec<[i16; 3]>) {
        let mut state = self.state.borrow_mut();
        state.accel_sequence = sequence;
        state.accel_sequence_idx = 0;
    }

    /// Set gyroscope output (returned until changed)
    pub fn set_gyro_data(&self, x: i16, y: i16, z: i16) {
        self.state.borrow_mut().store_block(GYRO_XOUT_H, [x, y, z]);
    }

    /// Set a cycling sequence of gyroscope outputs, one per block read
    pub fn set_gyro_sequence(&self, sequence: Vec<[i16; 3]>) {
        let mut state = self.state.borrow_mut();
        state.gyro_sequence = sequence;
        state.gyro_sequence_idx = 0;
    }

    /// Inject a failure on the next register read
    pub fn fail_next_read(&self) {
        self.state.borrow_mut().fail_next_read = true;
    }

    /// Inject a failure on the next register write (bank selects excluded)
    pub fn fail_next_write(&self) {
        self.state.borrow_mut().fail_next_write = true;
    }

    /// Make every bank select fail
    pub fn fail_bank_select(&self, enable: bool) {
        self.state.borrow_mut().fail_bank_select = enable;
    }

    /// Get the operations log
    pub fn operations(&self) -> Vec<Operation> {
        self.state.borrow().operations.clone()
    }

    /// Operations log without bank selects
    pub fn transfers(&self) -> Vec<Operation> {
        self.operations()
            .into_iter()
            .filter(|op| !matches!(op, Operation::BankSelect { .. }))
            .collect()
    }

    /// Only the register writes, as (bank, address, payload)
    pub fn writes(&self) -> Vec<(Bank, u8, Vec<u8>)> {
        self.operations()
            .into_iter()
            .filter_map(|op| match op {
                Operation::Write {
                    bank,
                    address,
                    data,
                } => Some((bank, address, data)),
                _ => None,
            })
            .collect()
    }

    /// Count bank select frames
    pub fn bank_select_count(&self) -> usize {
        self.operations()
            .iter()
            .filter(|op| matches!(op, Operation::BankSelect { .. }))
            .count()
    }
}

impl Default for MockSpi {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorType for MockSpi {
    type Error = MockError;
}

impl SpiDevice for MockSpi {
    fn transaction(&mut self, operations: &mut [spi::Operation<'_, u8>]) -> Result<(), MockError> {
        let [spi::Operation::Write(command), payload] = operations else {
            return Err(MockError::Malformed);
        };
        let &[command] = *command else {
            return Err(MockError::Malformed);
        };

        let mut state = self.state.borrow_mut();
        let address = command & 0x7F;
        match payload {
            spi::Operation::Read(buffer) if command & 0x80 != 0 => state.read(address, buffer),
            spi::Operation::Write(data) if command & 0x80 == 0 => state.write(address, data),
            _ => Err(MockError::Malformed),
        }
    }
}
