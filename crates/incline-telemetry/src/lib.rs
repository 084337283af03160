//! Telemetry core for the inclination experiment board.
//!
//! Everything between the frame-level link and the console: typed views of
//! the board's wire messages, raw-count-to-physical-unit conversion, the
//! operator-guided two-point calibration procedure with its persisted
//! offset/scale profile, and the complementary filter that fuses the two
//! inertial sensors into a running inclination estimate.

pub mod calibration;
pub mod convert;
pub mod frames;
pub mod fusion;
pub mod sample;
pub mod sink;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use calibration::{
    obtain_profile, Axis, CalibrationError, CalibrationProfile, CalibrationStep, Calibrator,
    Facing, OperatorPrompt,
};
pub use frames::{RawMeasurement, SensorStatus, TelemetryLink};
pub use fusion::{Inclination, InclinationFilter};
pub use sample::PhysicalSample;
pub use sink::TelemetrySink;
pub use store::{MemoryStore, ProfileStore, TomlProfileStore};
