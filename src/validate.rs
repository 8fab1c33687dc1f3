use thiserror::Error;

use crate::header::{self, BmpHeaderRecord};

/// DIB header lengths for BITMAPINFOHEADER and its documented successors.
/// The legacy 12-byte core header is deliberately absent.
pub const SUPPORTED_DIB_HEADER_SIZES: [u32; 5] = [40, 52, 56, 124, 128];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unsupported DIB header size {0}")]
    UnsupportedDibHeader(u32),
    #[error("non-positive image dimensions {width}x{height}")]
    NonPositiveDimensions { width: i32, height: i32 },
    #[error("pixel array size {stored} inconsistent with row layout")]
    PixelArrayMismatch { stored: i64 },
    #[error("region end {end} exceeds evidence length {evidence_len}")]
    OutOfBoundsRegion { end: u64, evidence_len: u64 },
}

/// A candidate whose header passed every structural check, reduced to the
/// byte range it claims. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedRegion {
    pub start: u64,
    /// Exclusive end offset.
    pub end: u64,
}

/// Classify a parsed header as a genuine BMP region or a false positive.
///
/// Pure function of the decoded fields and the evidence length; nothing is
/// retried. The bounds check on `end_offset` rejects regions whose declared
/// size would slice past the buffer, so every `ValidatedRegion` is carvable
/// as-is.
pub fn validate(
    record: &BmpHeaderRecord,
    evidence_len: u64,
) -> Result<ValidatedRegion, ValidationError> {
    if !SUPPORTED_DIB_HEADER_SIZES.contains(&record.dib_header_size) {
        return Err(ValidationError::UnsupportedDibHeader(record.dib_header_size));
    }
    if record.image_width <= 0 || record.image_height <= 0 {
        return Err(ValidationError::NonPositiveDimensions {
            width: record.image_width,
            height: record.image_height,
        });
    }
    match header::row_size(record.bits_per_pixel, record.image_width)
        .checked_mul(i64::from(record.image_height))
    {
        Some(computed) if computed == record.pixel_array_size => {}
        _ => {
            return Err(ValidationError::PixelArrayMismatch {
                stored: record.pixel_array_size,
            });
        }
    }
    let end = record.end_offset();
    if end > evidence_len {
        return Err(ValidationError::OutOfBoundsRegion { end, evidence_len });
    }
    Ok(ValidatedRegion {
        start: record.start_offset,
        end,
    })
}

pub fn is_valid(record: &BmpHeaderRecord, evidence_len: u64) -> bool {
    validate(record, evidence_len).is_ok()
}
