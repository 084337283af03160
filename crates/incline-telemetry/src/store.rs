//! Durable storage for calibration profiles.

use crate::calibration::{CalibrationError, CalibrationProfile};
use crate::sample::channel;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::PathBuf;
use tracing::info;

/// Where a session persists its freshly measured profile and where the load
/// path finds the previous one.
pub trait ProfileStore {
    fn save(&self, profile: &CalibrationProfile) -> Result<(), CalibrationError>;

    /// Fails with [`CalibrationError::Missing`] if nothing was ever saved.
    fn load(&self) -> Result<CalibrationProfile, CalibrationError>;
}

/// On-disk form of a profile.
#[derive(Serialize, Deserialize)]
struct StoredProfile {
    offsets: Vec<f64>,
    scales: Vec<f64>,
}

fn to_array(values: Vec<f64>) -> Result<[f64; channel::COUNT], CalibrationError> {
    let got = values.len();
    values
        .try_into()
        .map_err(|_| CalibrationError::ChannelCount {
            expected: channel::COUNT,
            got,
        })
}

/// TOML-file-backed store.
pub struct TomlProfileStore {
    path: PathBuf,
}

impl TomlProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ProfileStore for TomlProfileStore {
    fn save(&self, profile: &CalibrationProfile) -> Result<(), CalibrationError> {
        let stored = StoredProfile {
            offsets: profile.offsets().to_vec(),
            scales: profile.scales().to_vec(),
        };
        let contents = toml::to_string_pretty(&stored)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&self.path, contents)?;
        info!(path = ?self.path, "Saved calibration profile");
        Ok(())
    }

    fn load(&self) -> Result<CalibrationProfile, CalibrationError> {
        if !self.path.exists() {
            return Err(CalibrationError::Missing);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let stored: StoredProfile = toml::from_str(&contents)?;
        // Re-validated here so a hand-edited zero scale is caught before the
        // measurement loop starts.
        let profile =
            CalibrationProfile::new(to_array(stored.offsets)?, to_array(stored.scales)?)?;
        info!(path = ?self.path, "Loaded calibration profile");
        Ok(profile)
    }
}

/// In-memory store for tests and scripted runs.
#[derive(Default)]
pub struct MemoryStore {
    slot: RefCell<Option<CalibrationProfile>>,
}

impl ProfileStore for MemoryStore {
    fn save(&self, profile: &CalibrationProfile) -> Result<(), CalibrationError> {
        *self.slot.borrow_mut() = Some(profile.clone());
        Ok(())
    }

    fn load(&self) -> Result<CalibrationProfile, CalibrationError> {
        self.slot
            .borrow()
            .clone()
            .ok_or(CalibrationError::Missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> CalibrationProfile {
        let mut offsets = [0.0; channel::COUNT];
        let mut scales = [1.0; channel::COUNT];
        offsets[channel::ADXL_AX] = -0.02;
        scales[channel::MPU_AZ] = 1.0287841796875;
        CalibrationProfile::new(offsets, scales).unwrap()
    }

    #[test]
    fn file_store_roundtrips_a_profile() {
        let dir = std::env::temp_dir().join("incline-store-roundtrip");
        std::fs::create_dir_all(&dir).unwrap();
        let store = TomlProfileStore::new(dir.join("calibration.toml"));

        let profile = sample_profile();
        store.save(&profile).unwrap();
        assert_eq!(store.load().unwrap(), profile);
    }

    #[test]
    fn file_store_reports_a_missing_profile() {
        let store = TomlProfileStore::new("/nonexistent/incline/calibration.toml");
        assert!(matches!(store.load(), Err(CalibrationError::Missing)));
    }

    #[test]
    fn load_rejects_a_stored_zero_scale() {
        let dir = std::env::temp_dir().join("incline-store-zero-scale");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("calibration.toml");

        let mut zeros = vec![1.0; channel::COUNT];
        zeros[3] = 0.0;
        let stored = StoredProfile {
            offsets: vec![0.0; channel::COUNT],
            scales: zeros,
        };
        std::fs::write(&path, toml::to_string_pretty(&stored).unwrap()).unwrap();

        let err = TomlProfileStore::new(path).load().unwrap_err();
        assert!(matches!(
            err,
            CalibrationError::DegenerateScale { channel: 3 }
        ));
    }

    #[test]
    fn load_rejects_the_wrong_channel_count() {
        let dir = std::env::temp_dir().join("incline-store-shape");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("calibration.toml");

        let stored = StoredProfile {
            offsets: vec![0.0; 3],
            scales: vec![1.0; 3],
        };
        std::fs::write(&path, toml::to_string_pretty(&stored).unwrap()).unwrap();

        let err = TomlProfileStore::new(path).load().unwrap_err();
        assert!(matches!(err, CalibrationError::ChannelCount { got: 3, .. }));
    }
}
