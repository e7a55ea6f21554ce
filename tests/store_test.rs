use lh2_calibration::Error;
use lh2_calibration::codec::{CalibrationPayload, MATRIX_LEN};
use lh2_calibration::io::{CalibrationStore, FORMAT_VERSION};
use serde_json::json;
use tempfile::TempDir;

fn test_payload() -> CalibrationPayload {
    let mut matrix = [0u8; MATRIX_LEN];
    for (i, b) in matrix.iter_mut().enumerate() {
        *b = (i * 7) as u8;
    }
    CalibrationPayload { index: 0, matrix }
}

#[test]
fn test_save_then_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("calibration.json");
    let store = CalibrationStore::with_path(&path);

    assert!(store.load().unwrap().is_none());
    store.save(&test_payload()).unwrap();
    assert!(path.exists());
    assert_eq!(store.load().unwrap(), Some(test_payload()));

    let content = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["version"], FORMAT_VERSION);
    assert_eq!(json["index"], 0);
    assert_eq!(json["matrix"].as_array().unwrap().len(), MATRIX_LEN);
    assert!(json["created"].is_string());
}

#[test]
fn test_save_overwrites() {
    let temp_dir = TempDir::new().unwrap();
    let store = CalibrationStore::with_path(temp_dir.path().join("calibration.json"));
    store.save(&test_payload()).unwrap();

    let mut other = test_payload();
    other.matrix[5] = 0xff;
    store.save(&other).unwrap();
    assert_eq!(store.load().unwrap(), Some(other));
}

#[test]
fn test_load_corrupt_files() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("calibration.json");
    let store = CalibrationStore::with_path(&path);

    let cases = [
        "not json at all".to_string(),
        json!({"version": 2, "created": "", "index": 0, "matrix": vec![0u8; MATRIX_LEN]})
            .to_string(),
        json!({"version": 1, "created": "", "index": 0, "matrix": vec![0u8; 35]}).to_string(),
        json!({"version": 1, "index": 0}).to_string(),
    ];
    for content in cases {
        std::fs::write(&path, &content).unwrap();
        let result = store.load();
        assert!(
            matches!(result, Err(Error::CorruptCalibration(_))),
            "{} -> {:?}",
            content,
            result
        );
    }
}

#[test]
fn test_load_non_utf8_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("calibration.json");
    std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
    let result = CalibrationStore::with_path(&path).load();
    assert!(matches!(result, Err(Error::CorruptCalibration(_))), "{:?}", result);
}
