use lh2_calibration::Error;
use lh2_calibration::codec::{
    CalibrationPayload, DEFAULT_INDEX, MATRIX_LEN, PAYLOAD_LEN, decode,
};
use nalgebra as na;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn payload_from_entries(entries: [i32; 9]) -> CalibrationPayload {
    let mut matrix = [0u8; MATRIX_LEN];
    for (chunk, v) in matrix.chunks_exact_mut(4).zip(entries) {
        chunk.copy_from_slice(&v.to_le_bytes());
    }
    CalibrationPayload { index: 0, matrix }
}

#[test]
fn test_encode_row_major_fixed_point() {
    let h = na::Matrix3::new(1.0, -2.5, 0.000001, 3.0, 0.0, -0.0000004, 7.25, 8.0, 1.0);
    let payload = CalibrationPayload::from_homography(&h).unwrap();
    assert_eq!(payload.index, DEFAULT_INDEX);
    assert_eq!(
        payload.entries(),
        [1_000_000, -2_500_000, 1, 3_000_000, 0, 0, 7_250_000, 8_000_000, 1_000_000]
    );
    assert_eq!(&payload.matrix[0..4], &1_000_000i32.to_le_bytes());
    assert_eq!(&payload.matrix[4..8], &(-2_500_000i32).to_le_bytes());
}

#[test]
fn test_encode_rounds_to_nearest() {
    let h = na::Matrix3::from_row_slice(&[
        0.0000006, -0.0000006, 1.2345675, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0,
    ]);
    let payload = CalibrationPayload::from_homography(&h).unwrap();
    let entries = payload.entries();
    assert_eq!(entries[0], 1);
    assert_eq!(entries[1], -1);
    assert!(entries[2] == 1_234_567 || entries[2] == 1_234_568);
}

#[test]
fn test_decode_encode_roundtrip() {
    let entries = [
        1_294_258, -2_999_533, 1_493_336, 0, -7_892_493, 8_313_920, i32::MIN, i32::MAX, 1_000_000,
    ];
    let payload = payload_from_entries(entries);
    let decoded = decode(&payload);
    assert!((decoded[(0, 1)] + 2.999533).abs() < 1e-12);
    assert!((decoded[(1, 2)] - 8.31392).abs() < 1e-12);
    let reencoded = CalibrationPayload::from_homography(&decoded).unwrap();
    assert_eq!(reencoded, payload);
}

#[test]
fn test_decode_encode_random_payloads() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..500 {
        let mut matrix = [0u8; MATRIX_LEN];
        rng.fill(&mut matrix[..]);
        let payload = CalibrationPayload {
            index: rng.random(),
            matrix,
        };
        let mut reencoded = CalibrationPayload::from_homography(&decode(&payload)).unwrap();
        reencoded.index = payload.index;
        assert_eq!(reencoded, payload);
    }
}

#[test]
fn test_encode_overflow() {
    let mut h = na::Matrix3::identity();
    h[(1, 2)] = 2148.0;
    match CalibrationPayload::from_homography(&h) {
        Err(Error::FixedPointOverflow { value }) => assert_eq!(value, 2148.0),
        other => panic!("expected overflow, got {:?}", other),
    }
    h[(1, 2)] = -2148.0;
    assert!(CalibrationPayload::from_homography(&h).is_err());
    h[(1, 2)] = f64::NAN;
    assert!(CalibrationPayload::from_homography(&h).is_err());
    h[(1, 2)] = 2147.0;
    assert!(CalibrationPayload::from_homography(&h).is_ok());
}

#[test]
fn test_wire_bytes() {
    let mut payload = payload_from_entries([1, 2, 3, 4, 5, 6, 7, 8, 9]);
    payload.index = 3;
    let bytes = payload.to_bytes();
    assert_eq!(bytes.len(), PAYLOAD_LEN);
    assert_eq!(bytes[0], 3);
    assert_eq!(&bytes[1..5], &[1, 0, 0, 0]);
    assert_eq!(CalibrationPayload::from_bytes(&bytes).unwrap(), payload);

    for len in [0, 1, PAYLOAD_LEN - 1, PAYLOAD_LEN + 1] {
        let result = CalibrationPayload::from_bytes(&vec![0u8; len]);
        assert!(matches!(result, Err(Error::InvalidPayload { len: l }) if l == len));
    }
}
