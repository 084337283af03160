//! Presentation seam for processed telemetry.

use crate::calibration::CalibrationProfile;
use crate::frames::SensorStatus;
use crate::fusion::Inclination;
use crate::sample::PhysicalSample;

/// Receives processed telemetry for presentation. The core has no opinion on
/// formatting; the binary supplies a console implementation.
pub trait TelemetrySink {
    /// Called once, after the session's calibration profile is established.
    fn on_profile(&mut self, profile: &CalibrationProfile);

    /// Called for every corrected measurement frame.
    fn on_sample(
        &mut self,
        status: SensorStatus,
        sample: &PhysicalSample,
        inclination: Inclination,
    );
}
