use crate::error::{Error, Result};

/// Size of one LH2 location frame: four little-endian u32 words.
pub const FRAME_LEN: usize = 16;

/// Raw sweep counts of one LH2 location frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSweepSample {
    pub count1: u32,
    pub polynomial_index1: u32,
    pub count2: u32,
    pub polynomial_index2: u32,
}

impl RawSweepSample {
    pub fn new(count1: u32, polynomial_index1: u32, count2: u32, polynomial_index2: u32) -> Self {
        RawSweepSample {
            count1,
            polynomial_index1,
            count2,
            polynomial_index2,
        }
    }

    /// Encodes the sample back into its wire frame.
    pub fn to_bytes(&self) -> [u8; FRAME_LEN] {
        let mut bytes = [0u8; FRAME_LEN];
        let words = [
            self.count1,
            self.polynomial_index1,
            self.count2,
            self.polynomial_index2,
        ];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }
}

fn read_u32_le(bytes: &[u8; FRAME_LEN], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Parses one frame emitted by the framing layer.
///
/// Anything but exactly [`FRAME_LEN`] bytes is rejected with
/// [`Error::InvalidFrame`].
pub fn decode_frame(bytes: &[u8]) -> Result<RawSweepSample> {
    let frame: &[u8; FRAME_LEN] = bytes
        .try_into()
        .map_err(|_| Error::InvalidFrame { len: bytes.len() })?;
    Ok(RawSweepSample {
        count1: read_u32_le(frame, 0),
        polynomial_index1: read_u32_le(frame, 4),
        count2: read_u32_le(frame, 8),
        polynomial_index2: read_u32_le(frame, 12),
    })
}
