//! Complementary-filter fusion of the two inertial sensors.

use crate::sample::PhysicalSample;

/// Fused inclination estimate, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Inclination {
    pub theta: f64,
    pub phi: f64,
}

/// First-order complementary filter over the averaged accelerometer tilt and
/// the gyroscope rates.
///
/// The blend coefficient `alpha = tc / (tc + dt)` weights the integrated
/// gyro rate (fast, drifting) against the accelerometer-derived tilt (slow,
/// drift-free): the gyro term dominates over horizons shorter than the time
/// constant, the accelerometer term in the steady state.
///
/// The acceleration average always includes both sensors' channels. The
/// wire keeps an offline sensor's channels in the frame, so its stale counts
/// flow into the estimate; the output is only meaningful with both sensors
/// online.
pub struct InclinationFilter {
    alpha: f64,
    interval_s: f64,
    state: Inclination,
}

impl InclinationFilter {
    /// `time_constant_s` is the filter's time constant, `interval_s` the
    /// known interval between measurement frames.
    pub fn new(time_constant_s: f64, interval_s: f64) -> Self {
        Self {
            alpha: time_constant_s / (time_constant_s + interval_s),
            interval_s,
            state: Inclination::default(),
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn inclination(&self) -> Inclination {
        self.state
    }

    /// Blend one corrected sample into the running estimate.
    pub fn update(&mut self, sample: &PhysicalSample) -> Inclination {
        let accel = (sample.adxl_accel() + sample.mpu_accel()) / 2.0;
        let theta_a = accel.z.atan2(accel.x).to_degrees();
        let phi_a = accel.z.atan2(accel.y).to_degrees();

        let gyro = sample.mpu_gyro();
        let theta_g = gyro.y;
        let phi_g = gyro.x;

        let a = self.alpha;
        self.state.theta =
            a * self.state.theta + (1.0 - a) * theta_a + a * self.interval_s * theta_g;
        self.state.phi = a * self.state.phi + (1.0 - a) * phi_a + a * self.interval_s * phi_g;
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::channel;

    fn sample(adxl: [f64; 3], mpu: [f64; 3], gyro: [f64; 3]) -> PhysicalSample {
        let mut ch = [0.0; channel::COUNT];
        ch[channel::ADXL_AX..=channel::ADXL_AZ].copy_from_slice(&adxl);
        ch[channel::MPU_AX..=channel::MPU_AZ].copy_from_slice(&mpu);
        ch[channel::MPU_GX..=channel::MPU_GZ].copy_from_slice(&gyro);
        PhysicalSample::new(ch)
    }

    fn filter_with_alpha(alpha: f64, interval_s: f64) -> InclinationFilter {
        InclinationFilter {
            alpha,
            interval_s,
            state: Inclination::default(),
        }
    }

    #[test]
    fn alpha_follows_the_time_constant_law() {
        let filter = InclinationFilter::new(1.0, 1.0);
        assert_eq!(filter.alpha(), 0.5);

        let filter = InclinationFilter::new(0.5, 0.1);
        assert!((filter.alpha() - 0.5 / 0.6).abs() < 1e-12);
    }

    #[test]
    fn pure_gyro_filter_integrates_the_rate() {
        // With alpha forced to 1 the accelerometer term vanishes and theta
        // is the integral of the y rate.
        let mut filter = filter_with_alpha(1.0, 0.5);
        let s = sample([0.0; 3], [0.0; 3], [0.0, 4.0, 0.0]);

        for step in 1..=4 {
            let inclination = filter.update(&s);
            assert!((inclination.theta - 2.0 * step as f64).abs() < 1e-12);
            assert_eq!(inclination.phi, 0.0);
        }
    }

    #[test]
    fn pure_accel_filter_tracks_tilt_with_no_memory() {
        // With alpha forced to 0 the output is the accelerometer tilt alone,
        // independent of prior state.
        let mut filter = filter_with_alpha(0.0, 0.5);
        filter.state = Inclination {
            theta: 123.0,
            phi: -45.0,
        };

        // Both sensors read 1 g straight along +z; average z = 1, x = y = 0.
        let s = sample([0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [9.0, 9.0, 9.0]);
        let inclination = filter.update(&s);
        assert_eq!(inclination.theta, 90.0);
        assert_eq!(inclination.phi, 90.0);
    }

    #[test]
    fn blended_update_mixes_both_estimates() {
        let mut filter = filter_with_alpha(0.5, 1.0);
        let s = sample([0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 10.0, 0.0]);

        // theta = 0.5*0 + 0.5*90 + 0.5*1*10 = 50.
        let inclination = filter.update(&s);
        assert!((inclination.theta - 50.0).abs() < 1e-12);

        // Next step folds the previous state back in: 0.5*50 + 45 + 5 = 75.
        let inclination = filter.update(&s);
        assert!((inclination.theta - 75.0).abs() < 1e-12);
    }

    #[test]
    fn accelerometer_tilt_averages_the_two_sensors() {
        // ADXL says +x, MPU says +z; the averaged vector points 45° between.
        let mut filter = filter_with_alpha(0.0, 1.0);
        let s = sample([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0; 3]);
        let inclination = filter.update(&s);
        assert!((inclination.theta - 45.0).abs() < 1e-12);
    }
}
