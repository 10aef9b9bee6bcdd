//! Test utilities and helper functions

use crate::common::mock_spi::MockSpi;
use icm20948_spi::{Icm20948Driver, SpiInterface};

/// Driver type used throughout the tests
pub type TestDriver = Icm20948Driver<SpiInterface<MockSpi>>;

/// Delay provider that records requested delays instead of sleeping
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Every `delay_ms` argument, in call order
    pub delays_ms: Vec<u32>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.delays_ms.push(ms);
    }
}

/// Create a mock driver for testing
///
/// Returns (driver, spi) where `spi` shares the simulated chip with the driver.
pub fn create_mock_driver() -> (TestDriver, MockSpi) {
    let spi = MockSpi::new();
    let driver = Icm20948Driver::new(SpiInterface::new(spi.clone()));
    (driver, spi)
}

/// Assert that two floating point values are approximately equal
pub fn assert_float_eq(a: f32, b: f32, epsilon: f32) {
    let diff = (a - b).abs();
    assert!(
        diff < epsilon,
        "Values not equal within epsilon: {} vs {} (diff: {}, epsilon: {})",
        a,
        b,
        diff,
        epsilon
    );
}
