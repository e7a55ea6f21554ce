use glam::DVec2;
use log::{debug, trace};
use nalgebra as na;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Minimal number of correspondences defining a homography.
pub const MIN_CORRESPONDENCES: usize = 4;

/// Settings of the robust homography estimator.
#[derive(Debug, Clone)]
pub struct RansacConfig {
    pub max_iters: usize,
    /// Reprojection distance below which a correspondence is an inlier,
    /// in the units of the destination points.
    pub inlier_threshold: f64,
    pub min_inliers: usize,
    pub seed: u64,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            max_iters: 2000,
            inlier_threshold: 0.001,
            min_inliers: MIN_CORRESPONDENCES,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HomographyFit {
    /// dst ~ h * src, scaled so that h[(2, 2)] == 1 when possible.
    pub h: na::Matrix3<f64>,
    pub inlier_mask: Vec<bool>,
    pub num_inliers: usize,
}

/// Maps `p` through `h`, `None` for points sent to infinity.
pub fn project_point(h: &na::Matrix3<f64>, p: DVec2) -> Option<DVec2> {
    let q = h * na::Vector3::new(p.x, p.y, 1.0);
    if q[2].abs() < 1e-15 {
        return None;
    }
    Some(DVec2::new(q[0] / q[2], q[1] / q[2]))
}

pub fn reprojection_error(h: &na::Matrix3<f64>, src: DVec2, dst: DVec2) -> f64 {
    project_point(h, src).map_or(f64::INFINITY, |p| p.distance(dst))
}

/// True when any three of the points are collinear (coincident included).
pub fn is_degenerate_subset(pts: &[DVec2]) -> bool {
    let n = pts.len();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let ab = pts[j] - pts[i];
                let ac = pts[k] - pts[i];
                if ab.perp_dot(ac).abs() <= 1e-12 * ab.length() * ac.length() {
                    return true;
                }
            }
        }
    }
    false
}

/// Translates the centroid to the origin and scales the mean distance to sqrt(2).
fn normalize_points(pts: &[DVec2]) -> Option<(na::Matrix3<f64>, Vec<DVec2>)> {
    let n = pts.len() as f64;
    let c = pts.iter().copied().sum::<DVec2>() / n;
    let mean_dist = pts.iter().map(|p| p.distance(c)).sum::<f64>() / n;
    if mean_dist < 1e-15 {
        return None;
    }
    let s = std::f64::consts::SQRT_2 / mean_dist;
    let t = na::Matrix3::new(s, 0.0, -s * c.x, 0.0, s, -s * c.y, 0.0, 0.0, 1.0);
    Some((t, pts.iter().map(|p| (*p - c) * s).collect()))
}

/// Direct linear transform over all correspondences.
pub fn dlt_homography(src: &[DVec2], dst: &[DVec2]) -> Option<na::Matrix3<f64>> {
    let n = src.len();
    if n < MIN_CORRESPONDENCES || dst.len() != n {
        return None;
    }
    let (t_src, src_n) = normalize_points(src)?;
    let (t_dst, dst_n) = normalize_points(dst)?;

    let mut a = na::DMatrix::<f64>::zeros(2 * n, 9);
    for (i, (p, q)) in src_n.iter().zip(&dst_n).enumerate() {
        let r0 = 2 * i;
        let r1 = r0 + 1;
        a[(r0, 3)] = -p.x;
        a[(r0, 4)] = -p.y;
        a[(r0, 5)] = -1.0;
        a[(r0, 6)] = q.y * p.x;
        a[(r0, 7)] = q.y * p.y;
        a[(r0, 8)] = q.y;

        a[(r1, 0)] = p.x;
        a[(r1, 1)] = p.y;
        a[(r1, 2)] = 1.0;
        a[(r1, 6)] = -q.x * p.x;
        a[(r1, 7)] = -q.x * p.y;
        a[(r1, 8)] = -q.x;
    }

    // null vector of A from the 9x9 normal matrix, a thin SVD of A drops it when n == 4
    let eig = na::SymmetricEigen::new(a.transpose() * &a);
    let min_idx = eig
        .eigenvalues
        .iter()
        .enumerate()
        .min_by(|x, y| x.1.abs().total_cmp(&y.1.abs()))
        .map(|(i, _)| i)?;
    let v = eig.eigenvectors.column(min_idx);
    let h_norm = na::Matrix3::new(v[0], v[1], v[2], v[3], v[4], v[5], v[6], v[7], v[8]);

    let t_dst_inv = t_dst.try_inverse()?;
    let mut h = t_dst_inv * h_norm * t_src;
    let scale = h[(2, 2)];
    if scale.abs() > 1e-15 {
        h /= scale;
    }
    if !h.iter().all(|v| v.is_finite()) {
        debug!("dlt produced a non finite homography");
        return None;
    }
    if h.determinant().abs() <= 1e-12 * h.norm().powi(3) {
        debug!("dlt produced a singular homography");
        return None;
    }
    Some(h)
}

fn count_inliers(h: &na::Matrix3<f64>, src: &[DVec2], dst: &[DVec2], threshold: f64) -> usize {
    src.iter()
        .zip(dst)
        .filter(|(p, q)| reprojection_error(h, **p, **q) < threshold)
        .count()
}

/// Robust homography `dst ~ H * src`.
///
/// With exactly four correspondences the model is solved directly; otherwise
/// random minimal subsets are scored by inlier count and the best model is
/// refit on its inliers. Returns `None` when no non-degenerate model exists.
pub fn find_homography_ransac(
    src: &[DVec2],
    dst: &[DVec2],
    config: &RansacConfig,
) -> Option<HomographyFit> {
    let n = src.len();
    if n != dst.len() || n < MIN_CORRESPONDENCES {
        debug!("need {} matched points, got {} / {}", MIN_CORRESPONDENCES, n, dst.len());
        return None;
    }

    let h = if n == MIN_CORRESPONDENCES {
        if is_degenerate_subset(src) || is_degenerate_subset(dst) {
            debug!("minimal point set is degenerate");
            return None;
        }
        dlt_homography(src, dst)?
    } else {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut nums: Vec<usize> = (0..n).collect();
        let mut best: Option<(usize, na::Matrix3<f64>)> = None;
        for _ in 0..config.max_iters {
            nums.shuffle(&mut rng);
            let sample_src: Vec<_> = nums[..MIN_CORRESPONDENCES].iter().map(|&i| src[i]).collect();
            let sample_dst: Vec<_> = nums[..MIN_CORRESPONDENCES].iter().map(|&i| dst[i]).collect();
            if is_degenerate_subset(&sample_src) || is_degenerate_subset(&sample_dst) {
                continue;
            }
            let Some(h) = dlt_homography(&sample_src, &sample_dst) else {
                continue;
            };
            let count = count_inliers(&h, src, dst, config.inlier_threshold);
            if best.is_none_or(|(c, _)| count > c) {
                best = Some((count, h));
                if count == n {
                    break;
                }
            }
        }
        let (count, best_h) = best?;
        trace!("best sample has {} / {} inliers", count, n);
        if count < config.min_inliers {
            debug!("not enough inliers: {} < {}", count, config.min_inliers);
            return None;
        }
        let (inlier_src, inlier_dst): (Vec<_>, Vec<_>) = src
            .iter()
            .zip(dst)
            .filter(|(p, q)| reprojection_error(&best_h, **p, **q) < config.inlier_threshold)
            .map(|(p, q)| (*p, *q))
            .unzip();
        dlt_homography(&inlier_src, &inlier_dst).unwrap_or(best_h)
    };

    let inlier_mask: Vec<bool> = src
        .iter()
        .zip(dst)
        .map(|(p, q)| reprojection_error(&h, *p, *q) < config.inlier_threshold)
        .collect();
    let num_inliers = inlier_mask.iter().filter(|m| **m).count();
    Some(HomographyFit {
        h,
        inlier_mask,
        num_inliers,
    })
}
