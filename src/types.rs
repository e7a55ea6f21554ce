use std::fmt;
use std::str::FromStr;

use glam::DVec2;

use crate::error::Error;

/// Half side of the physical reference square, in meters.
pub const REFERENCE_HALF_SIDE: f64 = 0.1;

/// Corner of the reference square the robot is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceCorner {
    TopLeft = 0,
    TopRight = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

impl ReferenceCorner {
    pub const ALL: [ReferenceCorner; 4] = [
        ReferenceCorner::TopLeft,
        ReferenceCorner::TopRight,
        ReferenceCorner::BottomLeft,
        ReferenceCorner::BottomRight,
    ];

    /// Slot of this corner in the calibration point sequences.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Physical coordinate of the corner in robot space.
    pub fn reference_point(self) -> DVec2 {
        let s = REFERENCE_HALF_SIDE;
        match self {
            ReferenceCorner::TopLeft => DVec2::new(-s, s),
            ReferenceCorner::TopRight => DVec2::new(s, s),
            ReferenceCorner::BottomLeft => DVec2::new(-s, -s),
            ReferenceCorner::BottomRight => DVec2::new(s, -s),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ReferenceCorner::TopLeft => "top_left",
            ReferenceCorner::TopRight => "top_right",
            ReferenceCorner::BottomLeft => "bottom_left",
            ReferenceCorner::BottomRight => "bottom_right",
        }
    }
}

impl fmt::Display for ReferenceCorner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReferenceCorner {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        ReferenceCorner::ALL
            .into_iter()
            .find(|c| c.name() == key)
            .ok_or_else(|| Error::UnknownCorner(s.to_string()))
    }
}
