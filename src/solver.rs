//! Two-stage homography solver recovering the beacon geometry and the
//! camera-plane to reference-square mapping.

use glam::DVec2;
use log::{debug, info, trace};
use nalgebra as na;

use crate::collector::CalibrationPointSet;
use crate::error::{Error, Result};
use crate::optimization::homography::{RansacConfig, find_homography_ransac};
use crate::types::ReferenceCorner;

/// Offset moving the reference square into the unit square `[0, 1]^2`.
pub const REFERENCE_OFFSET: f64 = 0.5;

/// Output of one calibration run.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationResult {
    zeta: f64,
    rotation: na::Matrix3<f64>,
    normal: na::Vector3<f64>,
    homography: na::Matrix3<f64>,
}

impl CalibrationResult {
    pub fn zeta(&self) -> f64 {
        self.zeta
    }

    /// Orientation of the beacon relative to the calibration plane.
    pub fn rotation(&self) -> &na::Matrix3<f64> {
        &self.rotation
    }

    /// Plane normal in beacon coordinates, third component non-negative.
    pub fn normal(&self) -> &na::Vector3<f64> {
        &self.normal
    }

    /// Camera plane to unit reference square.
    pub fn homography(&self) -> &na::Matrix3<f64> {
        &self.homography
    }
}

/// Singular values sorted descending with the matching right singular vectors.
fn sorted_svd(h: &na::Matrix3<f64>) -> Result<([f64; 3], [na::Vector3<f64>; 3])> {
    let svd = h.svd(false, true);
    let v_t = svd
        .v_t
        .ok_or_else(|| Error::DegenerateGeometry("svd of homography failed".to_string()))?;
    let mut order = [0usize, 1, 2];
    order.sort_by(|&i, &j| svd.singular_values[j].total_cmp(&svd.singular_values[i]));
    let s = order.map(|i| svd.singular_values[i]);
    let v = order.map(|i| v_t.row(i).transpose());
    Ok((s, v))
}

/// Plane normal and zeta from the inter-sweep homography.
///
/// When `h` is an exact similarity the normal is undetermined and taken along
/// the beacon axis.
pub fn beacon_normal(h: &na::Matrix3<f64>) -> Result<(f64, na::Vector3<f64>)> {
    let (s, v) = sorted_svd(h)?;
    if !(s[1] > f64::EPSILON) {
        return Err(Error::DegenerateGeometry(format!(
            "homography is rank deficient, singular values {:?}",
            s
        )));
    }
    let s1 = s[0] / s[1];
    let s3 = s[2] / s[1];
    let zeta = s1 - s3;

    let a1 = (1.0 - s3 * s3).max(0.0).sqrt();
    let b1 = (s1 * s1 - 1.0).max(0.0).sqrt();
    let magnitude = a1.hypot(b1);
    if magnitude == 0.0 || !magnitude.is_finite() {
        debug!("inter-sweep homography is a similarity, normal along the beacon axis");
        return Ok((zeta, na::Vector3::z()));
    }
    let (a, b) = (a1 / magnitude, b1 / magnitude);
    let mut n = v[0] * b + v[2] * a;
    if n[2] < 0.0 {
        n = -n;
    }
    Ok((zeta, n))
}

/// Orientation matrix whose last row is `-n`.
pub fn orientation_from_normal(n: &na::Vector3<f64>) -> na::Matrix3<f64> {
    let h = n[0].hypot(n[1]);
    if h <= f64::EPSILON {
        return na::Matrix3::new(0.0, 1.0, 0.0, 1.0, 0.0, 0.0, -n[0], -n[1], -n[2]);
    }
    na::Matrix3::new(
        -n[1] / h,
        n[0] / h,
        0.0,
        n[0] * n[2] / h,
        n[1] * n[2] / h,
        -h,
        -n[0],
        -n[1],
        -n[2],
    )
}

/// Homogeneous points rescaled onto the plane at distance `1 / zeta` along `n`.
pub fn rescale_points(
    points: &[DVec2],
    normal: &na::Vector3<f64>,
    zeta: f64,
) -> Vec<na::Vector3<f64>> {
    points
        .iter()
        .map(|p| {
            let p = na::Vector3::new(p.x, p.y, 1.0);
            p * ((1.0 / zeta) / normal.dot(&p))
        })
        .collect()
}

/// Reference corners shifted into the unit square, in corner order.
pub fn shifted_reference_points() -> [DVec2; 4] {
    ReferenceCorner::ALL.map(|c| c.reference_point() + DVec2::splat(REFERENCE_OFFSET))
}

#[derive(Debug, Clone, Default)]
pub struct HomographySolver {
    config: RansacConfig,
}

impl HomographySolver {
    pub fn new(config: RansacConfig) -> Self {
        HomographySolver { config }
    }

    /// Runs the full calibration over a complete point set.
    ///
    /// Any estimation failure is terminal for this attempt, the caller has to
    /// collect new points.
    pub fn solve(&self, points: &CalibrationPointSet) -> Result<CalibrationResult> {
        let (Some(seq_a), Some(seq_b)) = (points.sequence_a(), points.sequence_b()) else {
            return Err(Error::IncompleteCalibration {
                missing: 4 - points.num_set(),
            });
        };

        let h = find_homography_ransac(&seq_a, &seq_b, &self.config)
            .ok_or_else(|| {
                Error::DegenerateGeometry(
                    "homography between sweep planes could not be computed".to_string(),
                )
            })?
            .h;
        debug!("inter-sweep homography {}", h);

        let (zeta, normal) = beacon_normal(&h)?;
        let rotation = orientation_from_normal(&normal);

        if zeta > 0.0 {
            let rescaled = rescale_points(&seq_b, &normal, zeta);
            trace!("rescaled camera points {:?}", rescaled);
        }

        let fit = find_homography_ransac(&seq_a, &shifted_reference_points(), &self.config)
            .ok_or_else(|| {
                Error::DegenerateGeometry(
                    "homography to the reference square could not be computed".to_string(),
                )
            })?;
        info!(
            "calibration solved: zeta {:.6}, normal {:?}, {}/4 inliers",
            zeta,
            normal.as_slice(),
            fit.num_inliers
        );

        Ok(CalibrationResult {
            zeta,
            rotation,
            normal,
            homography: fit.h,
        })
    }
}
