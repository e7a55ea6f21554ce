use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rerun::RecordingStream;

use crate::collector::CalibrationPointSet;
use crate::types::ReferenceCorner;

pub fn id_to_color(id: usize) -> (u8, u8, u8, u8) {
    let mut rng = ChaCha8Rng::seed_from_u64(id as u64);
    let color_num = rng.random_range(0..2u32.pow(24));
    (
        ((color_num >> 16) % 256) as u8,
        ((color_num >> 8) % 256) as u8,
        (color_num % 256) as u8,
        255,
    )
}

/// Logs both camera-plane sequences, one color per corner.
pub fn log_calibration_points(
    recording: &RecordingStream,
    topic: &str,
    points: &CalibrationPointSet,
) -> rerun::RecordingStreamResult<()> {
    for (sequence, pick_b) in [("a", false), ("b", true)] {
        let (pts, colors_labels): (Vec<_>, Vec<_>) = ReferenceCorner::ALL
            .iter()
            .filter_map(|corner| {
                points.get(*corner).map(|p| {
                    let p = if pick_b { p.b } else { p.a };
                    (
                        (p.x as f32, p.y as f32),
                        (id_to_color(corner.index()), corner.name().to_string()),
                    )
                })
            })
            .unzip();
        let (colors, labels): (Vec<_>, Vec<_>) = colors_labels.into_iter().unzip();
        recording.log(
            format!("{}/{}", topic, sequence),
            &rerun::Points2D::new(pts)
                .with_colors(colors)
                .with_labels(labels)
                .with_radii([rerun::Radius::new_ui_points(5.0)]),
        )?;
    }
    Ok(())
}
