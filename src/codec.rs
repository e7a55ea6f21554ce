//! Fixed-point encoding of the calibration homography sent to the robot.

use nalgebra as na;

use crate::error::{Error, Result};
use crate::solver::CalibrationResult;

pub const FIXED_POINT_SCALE: f64 = 1_000_000.0;
/// Nine i32 entries.
pub const MATRIX_LEN: usize = 36;
/// Index byte followed by the matrix.
pub const PAYLOAD_LEN: usize = 1 + MATRIX_LEN;
/// Basestation index written by the calibration tool.
pub const DEFAULT_INDEX: u8 = 0;

/// LH2 calibration homography for the basestation `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationPayload {
    pub index: u8,
    /// Row-major, 9 x i32 little-endian at [`FIXED_POINT_SCALE`].
    pub matrix: [u8; MATRIX_LEN],
}

fn to_fixed_point(value: f64) -> Result<i32> {
    let scaled = (value * FIXED_POINT_SCALE).round();
    if !scaled.is_finite() || scaled < i32::MIN as f64 || scaled > i32::MAX as f64 {
        return Err(Error::FixedPointOverflow { value });
    }
    Ok(scaled as i32)
}

impl CalibrationPayload {
    pub fn from_homography(h: &na::Matrix3<f64>) -> Result<Self> {
        let mut matrix = [0u8; MATRIX_LEN];
        // nalgebra iterates column-major, the transpose walks h row by row
        for (chunk, value) in matrix.chunks_exact_mut(4).zip(h.transpose().iter()) {
            chunk.copy_from_slice(&to_fixed_point(*value)?.to_le_bytes());
        }
        Ok(CalibrationPayload {
            index: DEFAULT_INDEX,
            matrix,
        })
    }

    /// Fixed-point entries in row-major order.
    pub fn entries(&self) -> [i32; 9] {
        let mut out = [0i32; 9];
        for (v, chunk) in out.iter_mut().zip(self.matrix.chunks_exact(4)) {
            *v = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        out
    }

    pub fn homography(&self) -> na::Matrix3<f64> {
        let values = self.entries().map(|v| v as f64 / FIXED_POINT_SCALE);
        na::Matrix3::from_row_slice(&values)
    }

    /// Wire form: index byte then the matrix.
    pub fn to_bytes(&self) -> [u8; PAYLOAD_LEN] {
        let mut bytes = [0u8; PAYLOAD_LEN];
        bytes[0] = self.index;
        bytes[1..].copy_from_slice(&self.matrix);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (&index, rest) = bytes
            .split_first()
            .ok_or(Error::InvalidPayload { len: bytes.len() })?;
        let matrix: [u8; MATRIX_LEN] = rest
            .try_into()
            .map_err(|_| Error::InvalidPayload { len: bytes.len() })?;
        Ok(CalibrationPayload { index, matrix })
    }
}

/// Encodes the result's homography, failing loudly on out of range entries.
pub fn encode(result: &CalibrationResult) -> Result<CalibrationPayload> {
    CalibrationPayload::from_homography(result.homography())
}

pub fn decode(payload: &CalibrationPayload) -> na::Matrix3<f64> {
    payload.homography()
}
