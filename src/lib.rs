//! # zendib
//!
//! Windows and OS/2 bitmap (BMP/DIB) decoder producing 8-bit RGBA.
//!
//! ## Supported Input
//!
//! ### Headers
//! - OS/2 1.x `BITMAPCOREHEADER` (12 bytes)
//! - OS/2 2.x, full (64 bytes) and truncated (16 bytes)
//! - Windows `BITMAPINFOHEADER` (40, 52 and 56 bytes), V4 and V5
//! - OS/2 bitmap arrays (`BA`), first image only
//!
//! ### Pixel formats
//! - 1, 2, 4 and 8-bit indexed
//! - 16-bit RGB555 and 32-bit BGRA, with alpha used only when present
//! - 24-bit BGR
//! - 16 and 32-bit bitfields with arbitrary masks
//! - RLE8, RLE4, OS/2 RLE24 and OS/2 1-bit modified Huffman
//!
//! Rows may be stored bottom-up or top-down; output always has a top-left
//! origin.
//!
//! ## Non-Goals
//!
//! - Embedded JPEG/PNG payloads (reported as [`DibError::UnsupportedCompression`])
//! - Encoding
//! - Color management
//!
//! ## Usage
//!
//! ```no_run
//! use zendib::{DecodeRequest, Permissiveness, probe};
//! use enough::Unstoppable;
//!
//! let data: &[u8] = &[]; // your BMP bytes
//!
//! // Read headers without decoding
//! let info = probe(data)?;
//! println!("{}x{} {} bpp {:?}", info.width, info.height, info.bits_per_pixel, info.variant);
//!
//! let decoded = DecodeRequest::new(data)
//!     .with_permissiveness(Permissiveness::Permissive)
//!     .decode(Unstoppable)?;
//! assert_eq!(decoded.pixels().len(), decoded.width as usize * decoded.height as usize * 4);
//! # Ok::<(), zendib::DibError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod decode;
pub mod dib;
mod error;
mod limits;
mod pixel;

// Re-exports
pub use decode::{DecodeOutput, DecodeRequest};
pub use dib::{Compression, DibInfo, HeaderVariant, Permissiveness, probe};
pub use enough::{Stop, Unstoppable};
pub use error::DibError;
pub use limits::Limits;
#[cfg(feature = "rgb")]
pub use pixel::DecodePixel;
pub use pixel::PixelLayout;

/// Decode a BMP/DIB file to RGBA8 with default settings.
///
/// Equivalent to `DecodeRequest::new(data).decode(stop)`.
pub fn decode(data: &[u8], stop: impl Stop) -> Result<DecodeOutput, DibError> {
    DecodeRequest::new(data).decode(stop)
}
