//! Per-corner collection of camera-plane points.

use glam::DVec2;
use log::{debug, info};

use crate::error::{Error, Result};
use crate::frame::RawSweepSample;
use crate::projection::project;
use crate::types::ReferenceCorner;

/// Progress of the point collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    Empty,
    Partial,
    Complete,
}

/// Camera-plane points recorded for one corner, one per sweep-plane pairing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerPoints {
    /// Projected with `polynomial_index1`.
    pub a: DVec2,
    /// Projected with `polynomial_index2`.
    pub b: DVec2,
}

impl CornerPoints {
    pub fn from_sample(sample: &RawSweepSample) -> Self {
        CornerPoints {
            a: project(sample.count1, sample.count2, sample.polynomial_index1),
            b: project(sample.count1, sample.count2, sample.polynomial_index2),
        }
    }
}

/// Two parallel point sequences indexed by [`ReferenceCorner`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationPointSet {
    corners: [Option<CornerPoints>; 4],
}

impl CalibrationPointSet {
    pub fn get(&self, corner: ReferenceCorner) -> Option<&CornerPoints> {
        self.corners[corner.index()].as_ref()
    }

    pub fn num_set(&self) -> usize {
        self.corners.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.num_set() == self.corners.len()
    }

    /// Sequence A, available once every corner is set.
    pub fn sequence_a(&self) -> Option<[DVec2; 4]> {
        self.sequence(|p| p.a)
    }

    /// Sequence B, available once every corner is set.
    pub fn sequence_b(&self) -> Option<[DVec2; 4]> {
        self.sequence(|p| p.b)
    }

    fn sequence(&self, pick: impl Fn(&CornerPoints) -> DVec2) -> Option<[DVec2; 4]> {
        let mut out = [DVec2::ZERO; 4];
        for (dst, corner) in out.iter_mut().zip(&self.corners) {
            *dst = pick(corner.as_ref()?);
        }
        Some(out)
    }

    fn set(&mut self, corner: ReferenceCorner, points: CornerPoints) {
        self.corners[corner.index()] = Some(points);
    }

    fn clear(&mut self) {
        self.corners = [None; 4];
    }
}

/// Holds the pending sweep sample and the points committed so far.
#[derive(Debug, Clone, Default)]
pub struct PointCollector {
    pending: Option<RawSweepSample>,
    points: CalibrationPointSet,
}

impl PointCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the pending sample; an uncommitted one is dropped.
    pub fn set_pending(&mut self, sample: RawSweepSample) {
        self.pending = Some(sample);
    }

    pub fn pending(&self) -> Option<&RawSweepSample> {
        self.pending.as_ref()
    }

    pub fn points(&self) -> &CalibrationPointSet {
        &self.points
    }

    pub fn state(&self) -> CollectorState {
        match self.points.num_set() {
            0 => CollectorState::Empty,
            4 => CollectorState::Complete,
            _ => CollectorState::Partial,
        }
    }

    /// Records the pending sample as the camera-plane points of `corner`.
    ///
    /// Fails with [`Error::NoPendingSample`] without touching the point set
    /// when no sample arrived since the last commit.
    pub fn commit_point(&mut self, corner: ReferenceCorner) -> Result<()> {
        let sample = self.pending.take().ok_or(Error::NoPendingSample)?;
        let points = CornerPoints::from_sample(&sample);
        debug!("{} <- a: {:?}, b: {:?}", corner, points.a, points.b);
        self.points.set(corner, points);
        info!(
            "calibration point {} ({}) added, {}/4 set",
            corner.index(),
            corner,
            self.points.num_set()
        );
        Ok(())
    }

    pub fn reset(&mut self) {
        self.pending = None;
        self.points.clear();
        info!("calibration data reset");
    }
}
