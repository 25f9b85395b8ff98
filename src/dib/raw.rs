//! Uncompressed and bitfield decoders.
//!
//! One driver walks the file rows (reading the pixel bytes, then skipping the
//! 4-byte row padding); each format only supplies a row converter.

use alloc::vec;

use enough::Stop;

use super::bitfields::BitfieldSpec;
use super::cursor::Cursor;
use super::palette::Palette;
use super::sink::PixelSink;
use crate::error::DibError;

/// Layouts stored as plain padded rows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum RawFormat {
    /// 1, 2, 4 or 8 bit palette indices.
    Indexed(u16),
    /// Fixed 5-5-5 layout with a probed alpha bit.
    Rgb555,
    Bgr24,
    /// B, G, R, A with a probed alpha channel.
    Bgra32,
    Bitfields16(BitfieldSpec),
    Bitfields32(BitfieldSpec),
}

impl RawFormat {
    fn bits_per_pixel(&self) -> usize {
        match self {
            Self::Indexed(depth) => usize::from(*depth),
            Self::Rgb555 | Self::Bitfields16(_) => 16,
            Self::Bgr24 => 24,
            Self::Bgra32 | Self::Bitfields32(_) => 32,
        }
    }

    /// Packed bytes in one row, before padding to four bytes.
    pub(crate) fn row_bytes(&self, width: usize) -> Option<usize> {
        width
            .checked_mul(self.bits_per_pixel())
            .map(|bits| bits.div_ceil(8))
    }

    /// Fewest bytes that hold every row. The last row may omit its padding.
    pub(crate) fn min_data_len(&self, width: usize, height: usize) -> Option<usize> {
        let row_bytes = self.row_bytes(width)?;
        let stride = row_bytes.div_ceil(4).checked_mul(4)?;
        height
            .saturating_sub(1)
            .checked_mul(stride)?
            .checked_add(row_bytes)
    }
}

/// Unpack MSB-first palette indices of `depth` bits (1, 2 or 4) to one byte each.
pub(crate) fn unpack_indices(depth: u16, input: &[u8], out: &mut [u8]) {
    let depth = usize::from(depth);
    let per_byte = 8 / depth;
    let mask = (1u8 << depth) - 1;
    for (chunk, byte) in out.chunks_mut(per_byte).zip(input) {
        for (i, idx) in chunk.iter_mut().enumerate() {
            *idx = (byte >> (8 - depth * (i + 1))) & mask;
        }
    }
}

pub(crate) fn decode_uncompressed(
    cursor: &mut Cursor<'_>,
    sink: &mut PixelSink,
    format: RawFormat,
    palette: &Palette,
    permissive: bool,
    stop: &dyn Stop,
) -> Result<(), DibError> {
    let width = sink.width();
    let row_bytes = format.row_bytes(width).ok_or(DibError::DimensionsTooLarge {
            width: width as u32,
            height: sink.height() as u32,
        })?;
    let rows = RowDriver {
        row_bytes,
        stride: row_bytes.div_ceil(4) * 4,
        permissive,
    };

    match format {
        RawFormat::Indexed(depth) => {
            let mut indices = vec![0u8; width];
            let mut remapped = 0usize;
            rows.run(cursor, sink, stop, |src, out| {
                let indices: &[u8] = if depth == 8 {
                    src
                } else {
                    unpack_indices(depth, src, &mut indices);
                    &indices
                };
                for (&idx, px) in indices.iter().zip(out.chunks_exact_mut(4)) {
                    let color = palette.lookup(usize::from(idx), permissive, &mut remapped)?;
                    px.copy_from_slice(&color);
                }
                Ok(())
            })?;
            if remapped > 0 {
                log::warn!(
                    "{remapped} pixels used indices past the {}-entry palette",
                    palette.len()
                );
            }
        }
        RawFormat::Rgb555 => {
            let spec = BitfieldSpec::rgb555_with_alpha();
            let mut alpha_seen = false;
            rows.run(cursor, sink, stop, |src, out| {
                for (raw, px) in src.chunks_exact(2).zip(out.chunks_exact_mut(4)) {
                    let rgba = spec.unpack(u32::from(u16::from_le_bytes([raw[0], raw[1]])));
                    alpha_seen |= rgba[3] != 0;
                    px.copy_from_slice(&rgba);
                }
                Ok(())
            })?;
            if !alpha_seen {
                sink.make_opaque();
            }
        }
        RawFormat::Bgr24 => {
            rows.run(cursor, sink, stop, |src, out| {
                for (bgr, px) in src.chunks_exact(3).zip(out.chunks_exact_mut(4)) {
                    px.copy_from_slice(&[bgr[2], bgr[1], bgr[0], 255]);
                }
                Ok(())
            })?;
        }
        RawFormat::Bgra32 => {
            let mut alpha_seen = false;
            rows.run(cursor, sink, stop, |src, out| {
                for (bgra, px) in src.chunks_exact(4).zip(out.chunks_exact_mut(4)) {
                    alpha_seen |= bgra[3] != 0;
                    px.copy_from_slice(&[bgra[2], bgra[1], bgra[0], bgra[3]]);
                }
                Ok(())
            })?;
            if !alpha_seen {
                sink.make_opaque();
            }
        }
        RawFormat::Bitfields16(spec) => {
            rows.run(cursor, sink, stop, |src, out| {
                for (raw, px) in src.chunks_exact(2).zip(out.chunks_exact_mut(4)) {
                    let v = u16::from_le_bytes([raw[0], raw[1]]);
                    px.copy_from_slice(&spec.unpack(u32::from(v)));
                }
                Ok(())
            })?;
        }
        RawFormat::Bitfields32(spec) => {
            rows.run(cursor, sink, stop, |src, out| {
                for (raw, px) in src.chunks_exact(4).zip(out.chunks_exact_mut(4)) {
                    let v = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
                    px.copy_from_slice(&spec.unpack(v));
                }
                Ok(())
            })?;
        }
    }
    Ok(())
}

struct RowDriver {
    /// Bytes holding pixels in one row.
    row_bytes: usize,
    /// `row_bytes` rounded up to a multiple of 4.
    stride: usize,
    /// Zero-fill rows cut short by the end of the data.
    permissive: bool,
}

impl RowDriver {
    fn run<F>(
        &self,
        cursor: &mut Cursor<'_>,
        sink: &mut PixelSink,
        stop: &dyn Stop,
        mut convert: F,
    ) -> Result<(), DibError>
    where
        F: FnMut(&[u8], &mut [u8]) -> Result<(), DibError>,
    {
        let mut scratch = vec![0u8; self.row_bytes];
        let mut short_rows = 0usize;

        for y in 0..sink.height() {
            if y % 16 == 0 {
                stop.check()?;
            }
            let src: &[u8] = if self.permissive && cursor.remaining() < self.row_bytes {
                cursor.read_zero_padded(&mut scratch);
                short_rows += 1;
                &scratch
            } else {
                cursor.take(self.row_bytes)?
            };
            convert(src, sink.row_mut(y))?;
            // The final row's padding is often missing.
            let pad = (self.stride - self.row_bytes).min(cursor.remaining());
            cursor.skip(pad)?;
        }

        if short_rows > 0 {
            log::warn!("pixel data truncated, zero-filled {short_rows} rows");
        }
        Ok(())
    }
}
