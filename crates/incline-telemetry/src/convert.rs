//! Raw-count to physical-unit conversion and profile correction.

use crate::calibration::CalibrationProfile;
use crate::frames::RawMeasurement;
use crate::sample::{channel, PhysicalSample};

/// ADXL345 sensitivity, g per count.
const ADXL_G_PER_COUNT: f64 = 0.0043;
/// MPU6050 accelerometer counts per g (±2 g range).
const MPU_COUNTS_PER_G: f64 = 16384.0;
/// MPU6050 gyroscope counts per °/s (±250 °/s range).
const MPU_COUNTS_PER_DEG_S: f64 = 131.0;

/// Convert one raw frame into physical units, preserving channel order.
/// Temperature follows the MPU6050 datasheet law `(raw + 521) / 340 + 35`.
pub fn to_physical(raw: &RawMeasurement) -> PhysicalSample {
    let mut ch = [0.0; channel::COUNT];
    ch[channel::TIMESTAMP] = f64::from(raw.timestamp_ms) / 1000.0;
    for axis in 0..3 {
        ch[channel::ADXL_AX + axis] = f64::from(raw.readings[axis]) * ADXL_G_PER_COUNT;
        ch[channel::MPU_AX + axis] = f64::from(raw.readings[3 + axis]) / MPU_COUNTS_PER_G;
        ch[channel::MPU_GX + axis] = f64::from(raw.readings[6 + axis]) / MPU_COUNTS_PER_DEG_S;
    }
    ch[channel::MPU_TEMP] = (f64::from(raw.readings[9]) + 521.0) / 340.0 + 35.0;
    PhysicalSample::new(ch)
}

/// Apply the stored per-channel correction: `(x - offset) / scale`.
///
/// [`CalibrationProfile`] construction rejects zero scales, so the assert
/// only trips on a violated invariant, never on operator input.
pub fn apply_correction(sample: &PhysicalSample, profile: &CalibrationProfile) -> PhysicalSample {
    let mut ch = *sample.channels();
    for (i, value) in ch.iter_mut().enumerate() {
        let scale = profile.scale(i);
        assert!(scale != 0.0, "zero calibration scale for channel {i}");
        *value = (*value - profile.offset(i)) / scale;
    }
    PhysicalSample::new(ch)
}
