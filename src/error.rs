//! Error types for the calibration pipeline.

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Frame handed over by the framing layer has the wrong size
    #[error("invalid frame: expected 16 bytes, got {len}")]
    InvalidFrame { len: usize },

    /// Corner commit requested before a fresh sweep sample arrived
    #[error("no LH2 counts available, cannot add calibration point")]
    NoPendingSample,

    /// Compute requested before all four corners were collected
    #[error("calibration incomplete: {missing} corner(s) missing")]
    IncompleteCalibration { missing: usize },

    /// Homography could not be estimated from the collected points
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Stored calibration does not match the expected layout
    #[error("corrupt calibration: {0}")]
    CorruptCalibration(String),

    /// Matrix entry does not fit a 4-byte signed fixed-point value
    #[error("fixed-point overflow: {value} does not fit in i32 at scale 1e6")]
    FixedPointOverflow { value: f64 },

    /// Wire payload has the wrong size
    #[error("invalid payload: expected 37 bytes, got {len}")]
    InvalidPayload { len: usize },

    #[error("unknown reference corner '{0}'")]
    UnknownCorner(String),

    /// Replay script line could not be parsed
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// Transport disconnected or failed; terminal for the reader loop
    #[error("transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
