//! Persisted embedding format.
//!
//! A stored embedding is one version byte followed by exactly `dimension`
//! little-endian IEEE-754 `f32` values. Decoding never trusts the buffer
//! length implicitly: a blob of any other size is rejected.

pub const CODEC_VERSION: u8 = 1;

const HEADER_LEN: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("unsupported embedding encoding version {0}")]
    UnsupportedVersion(u8),
    #[error("invalid embedding byte length: expected {expected}, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("embedding contains non-finite values")]
    NonFinite,
}

pub fn encode(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + std::mem::size_of_val(vector));
    bytes.push(CODEC_VERSION);
    for &value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

pub fn decode(blob: &[u8], dimension: usize) -> Result<Vec<f32>, CodecError> {
    let expected = HEADER_LEN + dimension * std::mem::size_of::<f32>();
    let Some((&version, body)) = blob.split_first() else {
        return Err(CodecError::Length {
            expected,
            actual: 0,
        });
    };
    if version != CODEC_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }
    if blob.len() != expected {
        return Err(CodecError::Length {
            expected,
            actual: blob.len(),
        });
    }

    let mut out = Vec::with_capacity(dimension);
    for chunk in body.chunks_exact(4) {
        let value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        if !value.is_finite() {
            return Err(CodecError::NonFinite);
        }
        out.push(value);
    }
    Ok(out)
}
