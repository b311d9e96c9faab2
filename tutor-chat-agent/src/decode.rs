//! Binary payload decoding for `bdata`/`dtype` typed arrays.
//!
//! Plotly serializes numpy arrays as `{"bdata": "<base64>", "dtype": "f8"}`.
//! [`decode`] turns such a payload back into a flat numeric series.

use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use thiserror::Error;

/// A decoded numeric series.
pub type DecodedSeries = Vec<f64>;

/// Errors produced while decoding a binary payload.
///
/// Callers treat every variant the same way (keep the encoded form); the
/// variants exist for diagnostics.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload is not valid standard base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The `dtype` tag is not one of `f4`, `f8`, `i4`, `i8`.
    #[error("unsupported dtype: {0:?}")]
    UnsupportedElementType(String),

    /// The decoded byte length is not a multiple of the element width.
    #[error("byte length {len} is not a multiple of element width {width}")]
    MisalignedLength { len: usize, width: usize },

    /// Decoded circuit image bytes are not UTF-8 text.
    #[error("decoded image is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::string::FromUtf8Error),
}

/// Element type of an encoded array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// IEEE-754 single precision.
    F4,
    /// IEEE-754 double precision.
    F8,
    /// Two's-complement signed 32-bit.
    I4,
    /// Two's-complement signed 64-bit.
    I8,
}

impl ElementType {
    /// Size of one element in bytes.
    pub fn byte_width(self) -> usize {
        match self {
            Self::F4 | Self::I4 => 4,
            Self::F8 | Self::I8 => 8,
        }
    }

    /// The wire tag for this element type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::F4 => "f4",
            Self::F8 => "f8",
            Self::I4 => "i4",
            Self::I8 => "i8",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "f4" => Ok(Self::F4),
            "f8" => Ok(Self::F8),
            "i4" => Ok(Self::I4),
            "i8" => Ok(Self::I8),
            other => Err(DecodeError::UnsupportedElementType(other.to_string())),
        }
    }
}

/// Decode a base64 payload into a flat series of numbers.
///
/// Elements are read little-endian. `i8` values are converted to the nearest
/// representable `f64`, so magnitudes above 2^53 lose precision.
///
/// Failures are logged at `warn` and returned; nothing panics.
pub fn decode(encoded: &str, dtype: &str) -> Result<DecodedSeries, DecodeError> {
    let result = decode_inner(encoded, dtype);
    if let Err(e) = &result {
        log::warn!("Failed to decode binary payload (dtype={dtype}): {e}");
    }
    result
}

fn decode_inner(encoded: &str, dtype: &str) -> Result<DecodedSeries, DecodeError> {
    let element_type: ElementType = dtype.parse()?;
    let bytes = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;

    let width = element_type.byte_width();
    if !bytes.len().is_multiple_of(width) {
        return Err(DecodeError::MisalignedLength {
            len: bytes.len(),
            width,
        });
    }

    let values = match element_type {
        ElementType::F4 => bytes
            .chunks_exact(4)
            .map(|c| f64::from(f32::from_le_bytes(array4(c))))
            .collect(),
        ElementType::F8 => bytes
            .chunks_exact(8)
            .map(|c| f64::from_le_bytes(array8(c)))
            .collect(),
        ElementType::I4 => bytes
            .chunks_exact(4)
            .map(|c| f64::from(i32::from_le_bytes(array4(c))))
            .collect(),
        ElementType::I8 => bytes
            .chunks_exact(8)
            .map(|c| i64::from_le_bytes(array8(c)) as f64)
            .collect(),
    };

    Ok(values)
}

/// Decode a base64 payload that holds UTF-8 text (circuit SVG markup).
pub fn decode_text(encoded: &str) -> Result<String, DecodeError> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
    Ok(String::from_utf8(bytes)?)
}

fn array4(chunk: &[u8]) -> [u8; 4] {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(chunk);
    buf
}

fn array8(chunk: &[u8]) -> [u8; 8] {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(chunk);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn test_decode_f8_values() {
        let source = [1.0f64, -2.5, 3.25e10, f64::MIN_POSITIVE];
        let bytes: Vec<u8> = source.iter().flat_map(|v| v.to_le_bytes()).collect();
        let decoded = decode(&encode(&bytes), "f8").unwrap();
        assert_eq!(decoded.len(), bytes.len() / 8);
        assert_eq!(decoded, source.to_vec());
    }

    #[test]
    fn test_decode_f8_one() {
        // 1.0f64 little-endian
        assert_eq!(decode("AAAAAAAA8D8=", "f8").unwrap(), vec![1.0]);
    }

    #[test]
    fn test_decode_f4_values() {
        let source = [0.5f32, -1.0, 100.0];
        let bytes: Vec<u8> = source.iter().flat_map(|v| v.to_le_bytes()).collect();
        let decoded = decode(&encode(&bytes), "f4").unwrap();
        assert_eq!(decoded, vec![0.5, -1.0, 100.0]);
    }

    #[test]
    fn test_decode_i4_values() {
        let source = [0i32, -7, i32::MAX];
        let bytes: Vec<u8> = source.iter().flat_map(|v| v.to_le_bytes()).collect();
        let decoded = decode(&encode(&bytes), "i4").unwrap();
        assert_eq!(decoded, vec![0.0, -7.0, f64::from(i32::MAX)]);
    }

    #[test]
    fn test_decode_i8_values() {
        let source = [42i64, -1, 1 << 40];
        let bytes: Vec<u8> = source.iter().flat_map(|v| v.to_le_bytes()).collect();
        let decoded = decode(&encode(&bytes), "i8").unwrap();
        assert_eq!(decoded, vec![42.0, -1.0, (1i64 << 40) as f64]);
    }

    #[test]
    fn test_decode_i8_precision_loss_above_2_pow_53() {
        let big = (1i64 << 53) + 1;
        let decoded = decode(&encode(&big.to_le_bytes()), "i8").unwrap();
        assert_eq!(decoded, vec![(1i64 << 53) as f64]);
    }

    #[test]
    fn test_decode_empty_payload() {
        assert!(decode("", "f8").unwrap().is_empty());
    }

    #[test]
    fn test_decode_unsupported_dtype() {
        let err = decode("AAAAAAAA8D8=", "u1").unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedElementType(ref t) if t == "u1"));
    }

    #[test]
    fn test_decode_misaligned_length() {
        let err = decode(&encode(&[0u8; 6]), "f8").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MisalignedLength { len: 6, width: 8 }
        ));
    }

    #[test]
    fn test_decode_malformed_base64() {
        let err = decode("not base64!!", "f8").unwrap_err();
        assert!(matches!(err, DecodeError::Base64(_)));
    }

    #[test]
    fn test_decode_text() {
        let svg = "<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>";
        assert_eq!(decode_text(&encode(svg.as_bytes())).unwrap(), svg);
        assert!(matches!(
            decode_text(&encode(&[0xff, 0xfe])).unwrap_err(),
            DecodeError::NotUtf8(_)
        ));
    }

    #[test]
    fn test_element_type_roundtrip() {
        for t in [ElementType::F4, ElementType::F8, ElementType::I4, ElementType::I8] {
            assert_eq!(t.as_str().parse::<ElementType>().unwrap(), t);
        }
        assert_eq!(ElementType::F4.byte_width(), 4);
        assert_eq!(ElementType::I8.byte_width(), 8);
    }
}
