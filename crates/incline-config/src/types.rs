use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Serial device of the measurement board.
    pub port_name: String,
    /// Baud rate of the link.
    pub baud_rate: u32,
    /// Interval between measurement frames, sent to the board (milliseconds).
    pub sample_interval_ms: u32,
    /// Complementary-filter time constant (seconds). Higher = smoother, more
    /// gyro trust; lower = faster accelerometer tracking.
    pub time_constant_s: f64,
    /// Calibration behavior.
    pub calibration: CalibrationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port_name: "/dev/ttyUSB0".to_string(),
            baud_rate: 38_400,
            sample_interval_ms: 1000,
            time_constant_s: 2.0,
            calibration: CalibrationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Run the interactive measure path instead of loading the stored
    /// profile.
    pub run: bool,
    /// Stationary frames averaged per calibration phase. `u8` because that
    /// is the wire width of the count sent to the board.
    pub sample_count: u8,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            run: false,
            sample_count: 10,
        }
    }
}
