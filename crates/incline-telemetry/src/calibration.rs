//! Operator-guided calibration of the two inertial sensors.
//!
//! One session either runs the interactive measure path below or loads the
//! profile a previous session persisted. The measure path is a strict phase
//! sequence: a stationary burst for gyroscope bias, then one burst per
//! spatial axis and facing for the two-point accelerometer calibration. The
//! original procedure embedded console prompts in the algorithm; here every
//! phase yields to a caller-supplied [`OperatorPrompt`] instead, so the
//! sequencing is independent of any particular prompt mechanism.

use crate::convert::to_physical;
use crate::frames::TelemetryLink;
use crate::sample::channel;
use crate::store::ProfileStore;
use incline_link::{ByteChannel, LinkError};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("No calibration profile has been saved yet")]
    Missing,
    #[error("Degenerate calibration: zero scale for channel {channel}")]
    DegenerateScale { channel: usize },
    #[error("Link failure during calibration")]
    Link(#[from] LinkError),
    #[error("Operator prompt failed")]
    Prompt(#[source] io::Error),
    #[error("Calibration storage I/O failure")]
    Io(#[from] io::Error),
    #[error("Stored calibration profile is not valid TOML")]
    Malformed(#[from] toml::de::Error),
    #[error("Stored profile has {got} channels per table, expected {expected}")]
    ChannelCount { expected: usize, got: usize },
}

/// Per-channel offset/scale correction table.
///
/// The constructor enforces the one invariant correction depends on: no
/// scale is ever zero. Both entry paths (measure and load) go through it.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationProfile {
    offsets: [f64; channel::COUNT],
    scales: [f64; channel::COUNT],
}

impl CalibrationProfile {
    /// The uncalibrated profile: offsets all zero, scales all one.
    pub fn identity() -> Self {
        Self {
            offsets: [0.0; channel::COUNT],
            scales: [1.0; channel::COUNT],
        }
    }

    pub fn new(
        offsets: [f64; channel::COUNT],
        scales: [f64; channel::COUNT],
    ) -> Result<Self, CalibrationError> {
        if let Some(ch) = scales.iter().position(|&s| s == 0.0) {
            return Err(CalibrationError::DegenerateScale { channel: ch });
        }
        Ok(Self { offsets, scales })
    }

    pub fn offset(&self, ch: usize) -> f64 {
        self.offsets[ch]
    }

    pub fn scale(&self, ch: usize) -> f64 {
        self.scales[ch]
    }

    pub fn offsets(&self) -> &[f64; channel::COUNT] {
        &self.offsets
    }

    pub fn scales(&self) -> &[f64; channel::COUNT] {
        &self.scales
    }
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self::identity()
    }
}

/// One spatial axis of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }

    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Which way the calibrated axis points during a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Up,
    Down,
}

impl Facing {
    pub fn label(self) -> &'static str {
        match self {
            Facing::Up => "up",
            Facing::Down => "down",
        }
    }
}

/// A point in the calibration sequence where the operator must position the
/// board before the remote streams its burst of frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationStep {
    /// Board stationary, any orientation: gyroscope bias.
    HoldStill,
    /// Named axis pointing up or down: accelerometer two-point reference.
    Orient { axis: Axis, facing: Facing },
}

/// Blocking confirmation that the operator has positioned the board.
pub trait OperatorPrompt {
    fn confirm(&mut self, step: CalibrationStep) -> io::Result<()>;
}

/// Two-point linear calibration from readings at the ±1 g extremes of a
/// 180° flip.
pub fn offset_scale(up: f64, down: f64) -> (f64, f64) {
    ((up + down) / 2.0, (up - down) / 2.0)
}

/// The interactive measure path.
pub struct Calibrator {
    sample_count: u8,
}

impl Calibrator {
    pub fn new(sample_count: u8) -> Self {
        Self { sample_count }
    }

    /// Run the full phase sequence, persist the derived profile, and return
    /// it. Owns the link until complete.
    pub fn run<C, P, S>(
        &self,
        link: &mut TelemetryLink<C>,
        prompt: &mut P,
        store: &S,
    ) -> Result<CalibrationProfile, CalibrationError>
    where
        C: ByteChannel,
        P: OperatorPrompt,
        S: ProfileStore + ?Sized,
    {
        link.send_calibrate_flag(true)?;
        link.send_sample_count(self.sample_count)?;

        let mut offsets = [0.0; channel::COUNT];
        let mut scales = [1.0; channel::COUNT];
        let n = f64::from(self.sample_count);

        // Gyroscope bias: average a stationary burst directly into the
        // offsets; the gyro channels keep scale 1.
        prompt
            .confirm(CalibrationStep::HoldStill)
            .map_err(CalibrationError::Prompt)?;
        link.send_phase_trigger()?;
        for _ in 0..self.sample_count {
            let sample = to_physical(&link.read_measurement()?);
            for ch in channel::MPU_GX..=channel::MPU_GZ {
                offsets[ch] += sample.channel(ch) / n;
            }
        }
        tracing::info!(
            bias_x = offsets[channel::MPU_GX],
            bias_y = offsets[channel::MPU_GY],
            bias_z = offsets[channel::MPU_GZ],
            "Gyro bias phase complete"
        );

        // Accelerometers: for each axis, average a burst with the axis up
        // and one with it down, then derive offset and scale per sensor.
        for axis in Axis::ALL {
            let adxl_ch = channel::ADXL_AX + axis.index();
            let mpu_ch = channel::MPU_AX + axis.index();
            let mut adxl = [0.0; 2];
            let mut mpu = [0.0; 2];

            for (slot, facing) in [Facing::Up, Facing::Down].into_iter().enumerate() {
                prompt
                    .confirm(CalibrationStep::Orient { axis, facing })
                    .map_err(CalibrationError::Prompt)?;
                link.send_phase_trigger()?;
                for _ in 0..self.sample_count {
                    let sample = to_physical(&link.read_measurement()?);
                    adxl[slot] += sample.channel(adxl_ch) / n;
                    mpu[slot] += sample.channel(mpu_ch) / n;
                }
            }

            (offsets[adxl_ch], scales[adxl_ch]) = offset_scale(adxl[0], adxl[1]);
            (offsets[mpu_ch], scales[mpu_ch]) = offset_scale(mpu[0], mpu[1]);
            tracing::info!(
                axis = axis.label(),
                adxl_offset = offsets[adxl_ch],
                adxl_scale = scales[adxl_ch],
                mpu_offset = offsets[mpu_ch],
                mpu_scale = scales[mpu_ch],
                "Axis phase complete"
            );
        }

        // A zero scale means the up/down bursts read identically: a
        // calibration failure, refused rather than stored.
        let profile = CalibrationProfile::new(offsets, scales)?;
        store.save(&profile)?;
        Ok(profile)
    }
}

/// Entry point covering both calibration paths.
///
/// The board is told up front whether calibration will run; when it will
/// not, the stored profile is loaded instead.
pub fn obtain_profile<C, P, S>(
    run: bool,
    sample_count: u8,
    link: &mut TelemetryLink<C>,
    prompt: &mut P,
    store: &S,
) -> Result<CalibrationProfile, CalibrationError>
where
    C: ByteChannel,
    P: OperatorPrompt,
    S: ProfileStore + ?Sized,
{
    if run {
        Calibrator::new(sample_count).run(link, prompt, store)
    } else {
        link.send_calibrate_flag(false)?;
        let profile = store.load()?;
        tracing::info!("Loaded stored calibration profile");
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, ProfileStore};
    use crate::testutil::ScriptedChannel;
    use incline_link::Session;

    struct RecordingPrompt {
        steps: Vec<CalibrationStep>,
    }

    impl OperatorPrompt for RecordingPrompt {
        fn confirm(&mut self, step: CalibrationStep) -> io::Result<()> {
            self.steps.push(step);
            Ok(())
        }
    }

    fn frame(readings: [i16; 10]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(24);
        bytes.extend_from_slice(&1000u32.to_ne_bytes());
        for v in readings {
            bytes.extend_from_slice(&v.to_ne_bytes());
        }
        bytes
    }

    #[test]
    fn two_point_derivation_matches_the_reference_values() {
        let (offset, scale) = offset_scale(0.98, -1.02);
        assert!((offset - (-0.02)).abs() < 1e-12);
        assert!((scale - 1.0).abs() < 1e-12);
    }

    #[test]
    fn correction_is_exact_at_the_calibrated_extremes_and_midpoint() {
        let (offset, scale) = offset_scale(0.98, -1.02);
        assert!(((0.98 - offset) / scale - 1.0).abs() < 1e-12);
        assert!(((-1.02 - offset) / scale + 1.0).abs() < 1e-12);

        let midpoint = (0.98 + -1.02) / 2.0;
        assert_eq!((midpoint - offset) / scale, 0.0);
    }

    #[test]
    fn zero_scale_is_rejected_at_construction() {
        let mut scales = [1.0; channel::COUNT];
        scales[channel::MPU_AZ] = 0.0;
        let err = CalibrationProfile::new([0.0; channel::COUNT], scales).unwrap_err();
        assert!(matches!(
            err,
            CalibrationError::DegenerateScale {
                channel: channel::MPU_AZ
            }
        ));
    }

    #[test]
    fn measure_path_walks_the_phase_sequence_and_persists() {
        // One sample per phase: a gyro burst, then up/down bursts per axis.
        // ADXL reads ±200 counts (±0.86 g) and the MPU exactly ±1 g on the
        // active axis.
        let mut input = Vec::new();
        input.extend(frame([0, 0, 0, 0, 0, 0, 131, 262, -131, 0]));
        for axis in 0..3 {
            for sign in [1i16, -1] {
                let mut readings = [0i16; 10];
                readings[axis] = sign * 200;
                readings[3 + axis] = sign * 16384;
                input.extend(frame(readings));
            }
        }

        let mut link = TelemetryLink::new(Session::new(ScriptedChannel::with_input(&input)));
        let mut prompt = RecordingPrompt { steps: Vec::new() };
        let store = MemoryStore::default();

        let profile = Calibrator::new(1).run(&mut link, &mut prompt, &store).unwrap();

        // Phase order: stationary first, then x/y/z each up-then-down.
        assert_eq!(prompt.steps.len(), 7);
        assert_eq!(prompt.steps[0], CalibrationStep::HoldStill);
        assert_eq!(
            prompt.steps[1],
            CalibrationStep::Orient {
                axis: Axis::X,
                facing: Facing::Up
            }
        );
        assert_eq!(
            prompt.steps[6],
            CalibrationStep::Orient {
                axis: Axis::Z,
                facing: Facing::Down
            }
        );

        // Gyro bias lands in the rate channels, scales untouched.
        assert!((profile.offset(channel::MPU_GX) - 1.0).abs() < 1e-12);
        assert!((profile.offset(channel::MPU_GY) - 2.0).abs() < 1e-12);
        assert!((profile.offset(channel::MPU_GZ) + 1.0).abs() < 1e-12);
        assert_eq!(profile.scale(channel::MPU_GX), 1.0);

        // Accelerometer channels get symmetric two-point results.
        for axis in [channel::ADXL_AX, channel::ADXL_AY, channel::ADXL_AZ] {
            assert!(profile.offset(axis).abs() < 1e-12);
            assert!((profile.scale(axis) - 0.86).abs() < 1e-12);
        }
        for axis in [channel::MPU_AX, channel::MPU_AY, channel::MPU_AZ] {
            assert!(profile.offset(axis).abs() < 1e-12);
            assert!((profile.scale(axis) - 1.0).abs() < 1e-12);
        }

        // Timestamp and temperature are never touched by calibration.
        assert_eq!(profile.offset(channel::TIMESTAMP), 0.0);
        assert_eq!(profile.scale(channel::MPU_TEMP), 1.0);

        // Persisted for the next session's load path.
        assert_eq!(store.load().unwrap(), profile);

        // Wire traffic: calibrate flag, sample count, then one trigger per
        // phase.
        let output = &link.session().channel().output;
        assert_eq!(output[0], 0x01);
        assert_eq!(output[1], 1);
        assert_eq!(&output[2..], &[0x01; 7]);
    }

    #[test]
    fn identical_up_down_bursts_fail_as_degenerate() {
        let mut input = Vec::new();
        input.extend(frame([0; 10]));
        for _ in 0..6 {
            input.extend(frame([0; 10]));
        }

        let mut link = TelemetryLink::new(Session::new(ScriptedChannel::with_input(&input)));
        let mut prompt = RecordingPrompt { steps: Vec::new() };
        let store = MemoryStore::default();

        let err = Calibrator::new(1)
            .run(&mut link, &mut prompt, &store)
            .unwrap_err();
        assert!(matches!(err, CalibrationError::DegenerateScale { .. }));
        // Nothing was persisted.
        assert!(matches!(store.load(), Err(CalibrationError::Missing)));
    }

    #[test]
    fn load_path_reads_the_stored_profile_and_declines_calibration() {
        let store = MemoryStore::default();
        let mut offsets = [0.0; channel::COUNT];
        offsets[channel::MPU_GX] = 0.25;
        let saved = CalibrationProfile::new(offsets, [1.0; channel::COUNT]).unwrap();
        store.save(&saved).unwrap();

        let mut link = TelemetryLink::new(Session::new(ScriptedChannel::default()));
        let mut prompt = RecordingPrompt { steps: Vec::new() };

        let profile = obtain_profile(false, 10, &mut link, &mut prompt, &store).unwrap();
        assert_eq!(profile, saved);
        assert!(prompt.steps.is_empty());
        assert_eq!(link.session().channel().output, vec![0x00]);
    }

    #[test]
    fn load_path_without_a_stored_profile_is_fatal() {
        let store = MemoryStore::default();
        let mut link = TelemetryLink::new(Session::new(ScriptedChannel::default()));
        let mut prompt = RecordingPrompt { steps: Vec::new() };

        let err = obtain_profile(false, 10, &mut link, &mut prompt, &store).unwrap_err();
        assert!(matches!(err, CalibrationError::Missing));
    }
}
