//! Physical-unit view of one measurement frame.

use glam::DVec3;

/// Channel indices within a [`PhysicalSample`] and its calibration profile.
pub mod channel {
    pub const TIMESTAMP: usize = 0;
    pub const ADXL_AX: usize = 1;
    pub const ADXL_AY: usize = 2;
    pub const ADXL_AZ: usize = 3;
    pub const MPU_AX: usize = 4;
    pub const MPU_AY: usize = 5;
    pub const MPU_AZ: usize = 6;
    pub const MPU_GX: usize = 7;
    pub const MPU_GY: usize = 8;
    pub const MPU_GZ: usize = 9;
    pub const MPU_TEMP: usize = 10;
    pub const COUNT: usize = 11;
}

/// One measurement frame in physical units: timestamp (s), ADXL345
/// acceleration (g), MPU6050 acceleration (g), MPU6050 angular rate (°/s),
/// MPU6050 temperature (°C). Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalSample {
    channels: [f64; channel::COUNT],
}

impl PhysicalSample {
    pub fn new(channels: [f64; channel::COUNT]) -> Self {
        Self { channels }
    }

    pub fn channel(&self, index: usize) -> f64 {
        self.channels[index]
    }

    pub fn channels(&self) -> &[f64; channel::COUNT] {
        &self.channels
    }

    /// Seconds since the board booted.
    pub fn timestamp_s(&self) -> f64 {
        self.channels[channel::TIMESTAMP]
    }

    /// ADXL345 acceleration in g.
    pub fn adxl_accel(&self) -> DVec3 {
        self.triple(channel::ADXL_AX)
    }

    /// MPU6050 acceleration in g.
    pub fn mpu_accel(&self) -> DVec3 {
        self.triple(channel::MPU_AX)
    }

    /// MPU6050 angular rate in °/s.
    pub fn mpu_gyro(&self) -> DVec3 {
        self.triple(channel::MPU_GX)
    }

    /// MPU6050 die temperature in °C.
    pub fn mpu_temp_c(&self) -> f64 {
        self.channels[channel::MPU_TEMP]
    }

    fn triple(&self, start: usize) -> DVec3 {
        DVec3::new(
            self.channels[start],
            self.channels[start + 1],
            self.channels[start + 2],
        )
    }
}
