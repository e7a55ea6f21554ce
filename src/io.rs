use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::codec::{CalibrationPayload, MATRIX_LEN};
use crate::error::{Error, Result};

/// Directory under `$HOME` holding the calibration.
pub const CALIBRATION_DIR: &str = ".dotbot";
pub const CALIBRATION_FILE: &str = "calibration.json";
/// Layout version of the stored document.
pub const FORMAT_VERSION: u32 = 1;

/// Serializes an object to a JSON file.
pub fn object_to_json<T: Serialize>(output_path: &Path, object: &T) -> Result<()> {
    let j = serde_json::to_string_pretty(object)?;
    std::fs::write(output_path, j)?;
    Ok(())
}

/// Deserializes an object from a JSON file.
pub fn object_from_json<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let contents = std::fs::read(file_path)?;
    Ok(serde_json::from_slice(&contents)?)
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredCalibration {
    version: u32,
    created: String,
    index: u8,
    matrix: Vec<u8>,
}

/// Persists the calibration payload at a fixed per-user location.
#[derive(Debug, Clone)]
pub struct CalibrationStore {
    path: PathBuf,
}

impl CalibrationStore {
    /// Store at `~/.dotbot/calibration.json`.
    pub fn new() -> Result<Self> {
        let home = std::env::var("HOME")
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::NotFound, "HOME not set"))?;
        Ok(Self::with_path(
            PathBuf::from(home).join(CALIBRATION_DIR).join(CALIBRATION_FILE),
        ))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        CalibrationStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `payload`, replacing any previous calibration.
    pub fn save(&self, payload: &CalibrationPayload) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let stored = StoredCalibration {
            version: FORMAT_VERSION,
            created: OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
            index: payload.index,
            matrix: payload.matrix.to_vec(),
        };
        object_to_json(&self.path, &stored)?;
        info!("calibration saved to {}", self.path.display());
        Ok(())
    }

    /// Returns `None` when nothing was saved yet.
    pub fn load(&self) -> Result<Option<CalibrationPayload>> {
        if !self.path.exists() {
            info!("no calibration file found at {}", self.path.display());
            return Ok(None);
        }
        let stored: StoredCalibration = match object_from_json(&self.path) {
            Ok(stored) => stored,
            Err(Error::Serialization(e)) => return Err(Error::CorruptCalibration(e.to_string())),
            Err(e) => return Err(e),
        };
        if stored.version != FORMAT_VERSION {
            return Err(Error::CorruptCalibration(format!(
                "unsupported version {}",
                stored.version
            )));
        }
        let matrix: [u8; MATRIX_LEN] = stored.matrix.as_slice().try_into().map_err(|_| {
            Error::CorruptCalibration(format!(
                "matrix has {} bytes, expected {}",
                stored.matrix.len(),
                MATRIX_LEN
            ))
        })?;
        Ok(Some(CalibrationPayload {
            index: stored.index,
            matrix,
        }))
    }
}
