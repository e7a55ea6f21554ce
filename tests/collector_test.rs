use lh2_calibration::Error;
use lh2_calibration::collector::{CollectorState, PointCollector};
use lh2_calibration::frame::RawSweepSample;
use lh2_calibration::projection::project;
use lh2_calibration::types::ReferenceCorner;

fn sample(offset: u32) -> RawSweepSample {
    RawSweepSample::new(100_000 + offset, 0, 110_000 + 2 * offset, 2)
}

#[test]
fn test_state_transitions() {
    let mut collector = PointCollector::new();
    assert_eq!(collector.state(), CollectorState::Empty);

    for (i, corner) in ReferenceCorner::ALL.iter().enumerate() {
        collector.set_pending(sample(i as u32 * 1000));
        collector.commit_point(*corner).unwrap();
        assert!(collector.pending().is_none());
        let expected = if i == 3 {
            CollectorState::Complete
        } else {
            CollectorState::Partial
        };
        assert_eq!(collector.state(), expected);
    }
    assert!(collector.points().is_complete());

    collector.set_pending(sample(5));
    collector.reset();
    assert_eq!(collector.state(), CollectorState::Empty);
    assert!(collector.pending().is_none());
    for corner in ReferenceCorner::ALL {
        assert!(collector.points().get(corner).is_none());
    }
    assert!(collector.points().sequence_a().is_none());
}

#[test]
fn test_commit_projects_both_sequences() {
    let mut collector = PointCollector::new();
    let s = RawSweepSample::new(100_000, 0, 110_000, 2);
    collector.set_pending(s);
    collector.commit_point(ReferenceCorner::TopRight).unwrap();
    let points = collector.points().get(ReferenceCorner::TopRight).unwrap();
    assert_eq!(points.a, project(100_000, 110_000, 0));
    assert_eq!(points.b, project(100_000, 110_000, 2));
}

#[test]
fn test_commit_without_pending_sample() {
    let mut collector = PointCollector::new();
    collector.set_pending(sample(0));
    collector.commit_point(ReferenceCorner::TopLeft).unwrap();
    let before = collector.points().clone();

    // the pending sample is consumed by the first commit
    for _ in 0..2 {
        let result = collector.commit_point(ReferenceCorner::BottomLeft);
        assert!(matches!(result, Err(Error::NoPendingSample)));
        assert_eq!(collector.points(), &before);
        assert_eq!(collector.state(), CollectorState::Partial);
    }
}

#[test]
fn test_recommit_overwrites_corner() {
    let mut collector = PointCollector::new();
    collector.set_pending(sample(0));
    collector.commit_point(ReferenceCorner::TopLeft).unwrap();
    collector.set_pending(sample(4000));
    collector.commit_point(ReferenceCorner::TopLeft).unwrap();
    assert_eq!(collector.points().num_set(), 1);
    assert_eq!(collector.state(), CollectorState::Partial);
    let points = collector.points().get(ReferenceCorner::TopLeft).unwrap();
    assert_eq!(points.a, project(104_000, 118_000, 0));
}

#[test]
fn test_newer_frame_replaces_pending() {
    let mut collector = PointCollector::new();
    collector.set_pending(sample(0));
    collector.set_pending(sample(1000));
    assert_eq!(collector.pending(), Some(&sample(1000)));
}
