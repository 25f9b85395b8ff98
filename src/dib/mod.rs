//! BMP/DIB decode pipeline.
//!
//! Headers are read front to back through one [`Cursor`]: file header (with
//! OS/2 bitmap-array unwrapping), info header, optional bitfield masks, then
//! the color table. The decoder is chosen from bit depth, compression and
//! header variant; it repositions the cursor at the pixel-data offset and
//! writes into a [`PixelSink`] that handles row orientation.
//!
//! Use the top-level [`crate::decode`], [`crate::probe`] or
//! [`crate::DecodeRequest`].

mod bitfields;
mod cursor;
mod header;
mod huffman;
mod palette;
mod raw;
mod rle;
mod sink;

pub use bitfields::{BitfieldSpec, ChannelMask};
pub use header::{Compression, FileHeader, HeaderVariant, InfoHeader};

use enough::Stop;

use crate::decode::DecodeOutput;
use crate::error::DibError;
use crate::limits::Limits;
use crate::pixel::PixelLayout;

use cursor::Cursor;
use palette::Palette;
use raw::RawFormat;
use rle::RleKind;
use sink::PixelSink;

/// How strictly malformed input is rejected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Permissiveness {
    /// Also reject `planes != 1`, a declared file size that disagrees with
    /// the data, oversized palette counts and top-down RLE.
    Strict,
    #[default]
    Standard,
    /// Accept any signature, zero-fill truncated rows and map out-of-range
    /// palette indices to opaque black.
    Permissive,
}

/// Header summary returned by [`probe`].
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct DibInfo {
    pub width: u32,
    pub height: u32,
    /// Rows are stored top row first (negative height in the header).
    pub top_down: bool,
    pub bits_per_pixel: u16,
    pub compression: Compression,
    pub variant: HeaderVariant,
    /// Entries in the color table, 0 when there is none.
    pub palette_len: usize,
    pub file_tag: [u8; 2],
    /// Channel masks for 16/32-bit bitfield images.
    pub bitfields: Option<BitfieldSpec>,
}

/// The routine chosen to decode the pixel data.
#[derive(Clone, Copy, Debug, PartialEq)]
enum PixelDecoder {
    Raw(RawFormat),
    Rle(RleKind),
    Huffman,
}

struct Headers {
    file: FileHeader,
    info: InfoHeader,
    bitfields: Option<BitfieldSpec>,
    palette: Palette,
    decoder: PixelDecoder,
}

impl Headers {
    fn info(&self) -> DibInfo {
        DibInfo {
            width: self.info.abs_width(),
            height: self.info.abs_height(),
            top_down: self.info.is_top_down(),
            bits_per_pixel: self.info.bits_per_pixel,
            compression: self.info.compression,
            variant: self.info.variant,
            palette_len: self.palette.len(),
            file_tag: self.file.tag,
            bitfields: self.bitfields,
        }
    }
}

fn read_headers(
    cursor: &mut Cursor<'_>,
    permissiveness: Permissiveness,
) -> Result<Headers, DibError> {
    let file = header::read_file_header(cursor, permissiveness)?;
    let info_start = cursor.position();
    let info = header::read_info_header(cursor)?;
    log::debug!(
        "{:?} header: {}x{} {} bpp, compression {} ({:?})",
        info.variant,
        info.width,
        info.height,
        info.bits_per_pixel,
        info.compression_code,
        info.compression
    );
    header::validate(&info, permissiveness)?;
    if !matches!(info.bits_per_pixel, 1 | 2 | 4 | 8 | 16 | 24 | 32) {
        return Err(DibError::UnsupportedBitDepth(info.bits_per_pixel));
    }

    let bitfields = if bitfields::has_masks(&info) {
        let spec = bitfields::read_masks(cursor, &info, file.data_offset)?;
        Some(if spec.has_color_masks() {
            spec
        } else {
            log::debug!("empty color masks, using default {}-bit layout", info.bits_per_pixel);
            BitfieldSpec::default_for_depth(info.bits_per_pixel)
        })
    } else {
        None
    };

    // Skip whatever the variant carries past the fields already read.
    let header_end = info_start.saturating_add(info.size as usize);
    cursor.set_position(cursor.position().max(header_end))?;

    let palette = read_palette(cursor, &info)?;
    let decoder = select_decoder(&info, bitfields)?;
    log::debug!("selected {decoder:?}, {} palette entries", palette.len());

    Ok(Headers {
        file,
        info,
        bitfields,
        palette,
        decoder,
    })
}

fn read_palette(cursor: &mut Cursor<'_>, info: &InfoHeader) -> Result<Palette, DibError> {
    let Some(count) = Palette::declared_len(info) else {
        return Ok(Palette::default());
    };
    if info.bits_per_pixel <= 8 {
        return Palette::read(cursor, count, info.variant);
    }
    // Deep-color images never index their color table.
    match Palette::read(cursor, count, info.variant) {
        Ok(palette) => Ok(palette),
        Err(err) => {
            log::warn!("ignoring unreadable {count}-entry color table: {err}");
            Ok(Palette::default())
        }
    }
}

fn select_decoder(
    info: &InfoHeader,
    bitfields: Option<BitfieldSpec>,
) -> Result<PixelDecoder, DibError> {
    let bpp = info.bits_per_pixel;
    let decoder = match (info.compression, bpp) {
        (Compression::None, 1 | 2 | 4 | 8) => PixelDecoder::Raw(RawFormat::Indexed(bpp)),
        (Compression::None, 16) => PixelDecoder::Raw(RawFormat::Rgb555),
        (Compression::None, 24) => PixelDecoder::Raw(RawFormat::Bgr24),
        (Compression::None, 32) => PixelDecoder::Raw(RawFormat::Bgra32),
        (Compression::Bitfields | Compression::AlphaBitfields, 16 | 32) => {
            let spec = bitfields.unwrap_or_else(|| BitfieldSpec::default_for_depth(bpp));
            PixelDecoder::Raw(if bpp == 16 {
                RawFormat::Bitfields16(spec)
            } else {
                RawFormat::Bitfields32(spec)
            })
        }
        (Compression::Rle8, 8) => PixelDecoder::Rle(RleKind::Rle8),
        (Compression::Rle4, 4) => PixelDecoder::Rle(RleKind::Rle4),
        (Compression::Rle24, 24) => PixelDecoder::Rle(RleKind::Rle24),
        (Compression::Huffman1D, 1) => PixelDecoder::Huffman,
        _ => {
            return Err(DibError::UnsupportedCompression {
                bits_per_pixel: bpp,
                compression: info.compression_code,
                variant: info.variant,
            });
        }
    };
    if matches!(decoder, PixelDecoder::Huffman) && info.variant != HeaderVariant::Os2V2 {
        return Err(DibError::UnsupportedCompression {
            bits_per_pixel: bpp,
            compression: info.compression_code,
            variant: info.variant,
        });
    }
    Ok(decoder)
}

/// Parse the headers and color table without decoding pixels.
pub fn probe(data: &[u8]) -> Result<DibInfo, DibError> {
    let mut cursor = Cursor::new(data);
    Ok(read_headers(&mut cursor, Permissiveness::Standard)?.info())
}

pub(crate) fn decode(
    data: &[u8],
    limits: Option<&Limits>,
    permissiveness: Permissiveness,
    layout: PixelLayout,
    stop: &dyn Stop,
) -> Result<DecodeOutput, DibError> {
    let mut cursor = Cursor::new(data);
    let headers = read_headers(&mut cursor, permissiveness)?;
    let (width, height) = (headers.info.abs_width(), headers.info.abs_height());

    let unlimited = Limits::default();
    let len = limits
        .unwrap_or(&unlimited)
        .check_output(width, height, layout.bytes_per_pixel())?;
    stop.check()?;

    let permissive = permissiveness == Permissiveness::Permissive;
    let data_offset = headers.file.data_offset as usize;
    if permissive && data_offset > data.len() {
        log::warn!(
            "pixel data offset {data_offset} is past the end of {} bytes",
            data.len()
        );
        cursor.set_position(data.len())?;
    } else {
        cursor.set_position(data_offset)?;
    }

    // Raw rows have a fixed size; reject short input before allocating.
    if let PixelDecoder::Raw(format) = headers.decoder
        && !permissive
    {
        let needed = format
            .min_data_len(width as usize, height as usize)
            .ok_or(DibError::DimensionsTooLarge { width, height })?;
        if cursor.remaining() < needed {
            return Err(DibError::TruncatedStream {
                offset: cursor.position(),
                needed,
                available: cursor.remaining(),
            });
        }
    }

    let mut sink = PixelSink::new(
        width as usize,
        height as usize,
        headers.info.is_top_down(),
        len,
    );

    match headers.decoder {
        PixelDecoder::Raw(format) => {
            raw::decode_uncompressed(
                &mut cursor,
                &mut sink,
                format,
                &headers.palette,
                permissive,
                stop,
            )?;
        }
        PixelDecoder::Rle(kind) => {
            if headers.info.image_size != 0 {
                cursor.limit_to(headers.info.image_size as usize);
            }
            rle::decode_rle(
                &mut cursor,
                &mut sink,
                kind,
                &headers.palette,
                permissive,
                stop,
            )?;
        }
        PixelDecoder::Huffman => {
            if headers.info.image_size != 0 {
                cursor.limit_to(headers.info.image_size as usize);
            }
            huffman::decode_huffman(
                &mut cursor,
                &mut sink,
                &headers.palette,
                permissive,
                stop,
            )?;
        }
    }

    let mut pixels = sink.into_vec();
    if layout == PixelLayout::Bgra8 {
        for px in pixels.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
    }
    Ok(DecodeOutput::new(pixels, width, height, layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    /// 40-byte-header file with the given depth, compression and trailing bytes.
    fn v3_file(bpp: u16, compression: u32, colors_used: u32, tail: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"BM");
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&54u32.to_le_bytes());
        out.extend_from_slice(&40u32.to_le_bytes());
        out.extend_from_slice(&1i32.to_le_bytes());
        out.extend_from_slice(&1i32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&bpp.to_le_bytes());
        out.extend_from_slice(&compression.to_le_bytes());
        out.extend_from_slice(&[0u8; 12]);
        out.extend_from_slice(&colors_used.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(tail);
        out
    }

    #[test]
    fn jpeg_and_png_payloads_are_unsupported() {
        for code in [4, 5] {
            let data = v3_file(24, code, 0, &[0; 4]);
            assert!(matches!(
                probe(&data),
                Err(DibError::UnsupportedCompression {
                    bits_per_pixel: 24,
                    variant: HeaderVariant::V3,
                    ..
                })
            ));
        }
    }

    #[test]
    fn rle_requires_matching_depth() {
        let data = v3_file(24, 1, 0, &[0; 4]);
        assert!(matches!(
            probe(&data),
            Err(DibError::UnsupportedCompression { compression: 1, .. })
        ));
    }

    #[test]
    fn odd_bit_depth_is_rejected() {
        let data = v3_file(3, 0, 0, &[0; 4]);
        assert!(matches!(probe(&data), Err(DibError::UnsupportedBitDepth(3))));
    }

    #[test]
    fn deep_color_palette_is_read_only_when_declared() {
        let data = v3_file(24, 0, 0, &[0; 4]);
        assert_eq!(probe(&data).unwrap().palette_len, 0);

        let mut data = v3_file(24, 0, 2, &[0; 8]);
        data.extend_from_slice(&[0; 4]);
        assert_eq!(probe(&data).unwrap().palette_len, 2);
    }

    #[test]
    fn indexed_palette_defaults_to_full_depth() {
        let data = v3_file(1, 0, 0, &[0; 12]);
        let info = probe(&data).unwrap();
        assert_eq!(info.palette_len, 2);
        assert_eq!(info.compression, Compression::None);
        assert_eq!(info.file_tag, *b"BM");
    }
}
