//! Conversion of LH2 sweep counts into camera-plane coordinates.

use std::f64::consts::{FRAC_PI_3, FRAC_PI_6, PI};

use glam::DVec2;

/// Beam period of the sweep planes decoded with polynomials 0 and 1.
pub const PERIOD_LOW_POLYNOMIALS: f64 = 959_000.0;
/// Beam period of the sweep planes decoded with polynomials 2 and above.
pub const PERIOD_HIGH_POLYNOMIALS: f64 = 957_000.0;

pub fn sweep_period(polynomial_index: u32) -> f64 {
    if polynomial_index >= 2 {
        PERIOD_HIGH_POLYNOMIALS
    } else {
        PERIOD_LOW_POLYNOMIALS
    }
}

fn count_to_angle(count: u32, period: f64) -> f64 {
    (count as f64 * 8.0 / period) * 2.0 * PI
}

/// Projects a pair of sweep counts onto the beacon's camera plane.
///
/// Both counts use the period selected by `polynomial_index`. The `y` branch
/// resolves which of the two sweeps came first.
pub fn project(count1: u32, count2: u32, polynomial_index: u32) -> DVec2 {
    let period = sweep_period(polynomial_index);
    let a1 = count_to_angle(count1, period);
    let a2 = count_to_angle(count2, period);

    let x = -(0.5 * (a1 + a2)).tan();
    let y = if count1 < count2 {
        -(a2 / 2.0 - a1 / 2.0 - FRAC_PI_3).sin() / FRAC_PI_6.tan()
    } else {
        -(a1 / 2.0 - a2 / 2.0 - FRAC_PI_3).sin() / FRAC_PI_6.tan()
    };
    DVec2::new(x, y)
}
