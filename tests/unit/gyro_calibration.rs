//! Unit tests for gyroscope bias calibration

use crate::common::{Operation, create_mock_driver};
use icm20948_spi::{Bank, GyroBiasOffset, SensorBlock};

#[test]
fn test_gyro_offsets_from_gyro_block() {
    let (mut driver, spi) = create_mock_driver();
    spi.set_gyro_sequence(vec![[400, -41, 3]; 100]);

    let calibration = driver.calibrate_gyroscope(SensorBlock::Gyroscope).unwrap();

    assert_eq!(calibration.source, SensorBlock::Gyroscope);
    assert_eq!(calibration.average_bias, [400, -41, 3]);
    assert_eq!(
        calibration.offsets,
        GyroBiasOffset {
            x: -100,
            y: 10,
            z: 0
        }
    );
    assert_eq!(
        spi.writes(),
        vec![(Bank::Bank2, 0x03, vec![0xFF, 0x9C, 0x00, 0x0A, 0x00, 0x00])]
    );
}

#[test]
fn test_gyro_offsets_never_read_back() {
    let (mut driver, spi) = create_mock_driver();
    spi.set_register(Bank::Bank2, 0x03, 0x55);

    driver.calibrate_gyroscope(SensorBlock::Gyroscope).unwrap();

    assert!(
        !spi.transfers()
            .iter()
            .any(|op| matches!(op, Operation::Read { bank: Bank::Bank2, .. }))
    );
    // Overwritten outright
    assert_eq!(spi.get_register(Bank::Bank2, 0x03), 0x00);
}

#[test]
fn test_accelerometer_source_ignores_gyro_output() {
    let (mut driver, spi) = create_mock_driver();
    spi.set_accel_data(8, -8, 2048);
    spi.set_gyro_data(1000, 1000, 1000);

    let calibration = driver
        .calibrate_gyroscope(SensorBlock::Accelerometer)
        .unwrap();

    assert_eq!(calibration.average_bias, [8, -8, 2048]);
    assert_eq!(
        calibration.offsets,
        GyroBiasOffset {
            x: -2,
            y: 2,
            z: -512
        }
    );
    assert!(
        !spi.transfers()
            .iter()
            .any(|op| matches!(op, Operation::Read { address: 0x33, .. }))
    );
}

#[test]
fn test_read_gyro_bias_offsets() {
    let (mut driver, spi) = create_mock_driver();
    spi.set_gyro_sequence(vec![[-400, 0, 4]; 100]);
    driver.calibrate_gyroscope(SensorBlock::Gyroscope).unwrap();

    let offsets = driver.read_gyro_bias_offsets().unwrap();

    assert_eq!(offsets, GyroBiasOffset { x: 100, y: 0, z: -1 });
}
