use alloc::string::String;
use enough::StopReason;

use crate::dib::HeaderVariant;

/// Errors from BMP/DIB decoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DibError {
    #[error("unrecognized bitmap signature")]
    UnrecognizedFormat,

    #[error("unrecognized info header size: {header_size}")]
    UnrecognizedVariant { header_size: u32 },

    #[error(
        "unsupported compression {compression} for {bits_per_pixel}-bit {variant:?} bitmap"
    )]
    UnsupportedCompression {
        bits_per_pixel: u16,
        compression: u32,
        variant: HeaderVariant,
    },

    #[error("unsupported bit depth: {0}")]
    UnsupportedBitDepth(u16),

    #[error("palette index {index} out of range (palette has {palette_len} entries)")]
    PaletteIndexOutOfRange { index: usize, palette_len: usize },

    #[error("truncated stream at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedStream {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("invalid row geometry: {width}x{height}")]
    InvalidRowGeometry { width: i64, height: i64 },

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("invalid pixel data: {0}")]
    InvalidData(String),

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("pixel layout mismatch: expected {expected:?}, got {actual:?}")]
    LayoutMismatch {
        expected: crate::PixelLayout,
        actual: crate::PixelLayout,
    },

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for DibError {
    fn from(r: StopReason) -> Self {
        DibError::Cancelled(r)
    }
}
