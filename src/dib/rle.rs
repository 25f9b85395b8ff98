//! Run-length decoders: RLE8, RLE4 and the OS/2 RLE24 variant.
//!
//! All three share one two-byte control grammar:
//!
//! | bytes            | meaning                                   |
//! |------------------|-------------------------------------------|
//! | `n>0, payload`   | repeat the payload color(s) `n` times     |
//! | `0, 0`           | end of row                                |
//! | `0, 1`           | end of bitmap                             |
//! | `0, 2, dx, dy`   | move the write position                   |
//! | `0, n>=3, ...`   | `n` literal pixels, padded to a word      |
//!
//! Running out of data between instructions ends the bitmap; running out in
//! the middle of one is a [`DibError::TruncatedStream`].

use enough::Stop;

use super::cursor::Cursor;
use super::palette::Palette;
use super::sink::PixelSink;
use crate::error::DibError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RleKind {
    /// One palette index per byte.
    Rle8,
    /// Two palette indices per byte, high nibble first.
    Rle4,
    /// A literal B, G, R triple per pixel.
    Rle24,
}

impl RleKind {
    /// Whether an absolute run of `n` pixels is followed by a pad byte.
    fn absolute_run_padded(self, n: usize) -> bool {
        match self {
            // Byte count is n, or 3n: odd exactly when n is odd.
            Self::Rle8 | Self::Rle24 => n % 2 == 1,
            // Byte count is ceil(n/2).
            Self::Rle4 => (n - 1) % 4 < 2,
        }
    }

    fn absolute_run_bytes(self, n: usize) -> usize {
        match self {
            Self::Rle8 => n,
            Self::Rle4 => n.div_ceil(2),
            Self::Rle24 => n * 3,
        }
    }
}

struct RleState<'p> {
    kind: RleKind,
    palette: &'p Palette,
    remap: bool,
    remapped: usize,
    x: usize,
    y: usize,
}

impl RleState<'_> {
    #[inline]
    fn index(&mut self, index: u8) -> Result<[u8; 4], DibError> {
        self.palette
            .lookup(usize::from(index), self.remap, &mut self.remapped)
    }

    fn repeat(
        &mut self,
        sink: &mut PixelSink,
        count: usize,
        cursor: &mut Cursor<'_>,
    ) -> Result<(), DibError> {
        match self.kind {
            RleKind::Rle8 => {
                let color = self.index(cursor.read_u8()?)?;
                for i in 0..count {
                    sink.put(self.x + i, self.y, color);
                }
            }
            RleKind::Rle4 => {
                let byte = cursor.read_u8()?;
                let high = self.index(byte >> 4)?;
                // A single-pixel run never draws the low nibble.
                let low = if count > 1 {
                    self.index(byte & 0x0f)?
                } else {
                    high
                };
                let colors = [high, low];
                for i in 0..count {
                    sink.put(self.x + i, self.y, colors[i & 1]);
                }
            }
            RleKind::Rle24 => {
                let [b, g, r] = cursor.read_fixed_bytes::<3>()?;
                for i in 0..count {
                    sink.put(self.x + i, self.y, [r, g, b, 255]);
                }
            }
        }
        self.x += count;
        Ok(())
    }

    fn absolute(
        &mut self,
        sink: &mut PixelSink,
        count: usize,
        cursor: &mut Cursor<'_>,
    ) -> Result<(), DibError> {
        let bytes = cursor.take(self.kind.absolute_run_bytes(count))?;
        match self.kind {
            RleKind::Rle8 => {
                for (i, &idx) in bytes.iter().enumerate() {
                    let color = self.index(idx)?;
                    sink.put(self.x + i, self.y, color);
                }
            }
            RleKind::Rle4 => {
                for i in 0..count {
                    let byte = bytes[i / 2];
                    let idx = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
                    let color = self.index(idx)?;
                    sink.put(self.x + i, self.y, color);
                }
            }
            RleKind::Rle24 => {
                for (i, bgr) in bytes.chunks_exact(3).enumerate() {
                    sink.put(self.x + i, self.y, [bgr[2], bgr[1], bgr[0], 255]);
                }
            }
        }
        self.x += count;
        if self.kind.absolute_run_padded(count) && !cursor.eof() {
            cursor.skip(1)?;
        }
        Ok(())
    }
}

/// Decode a run-length stream starting at the cursor into `sink`.
///
/// Pixels the stream never writes stay transparent black.
pub(crate) fn decode_rle(
    cursor: &mut Cursor<'_>,
    sink: &mut PixelSink,
    kind: RleKind,
    palette: &Palette,
    permissive: bool,
    stop: &dyn Stop,
) -> Result<(), DibError> {
    let mut state = RleState {
        kind,
        palette,
        remap: permissive,
        remapped: 0,
        x: 0,
        y: 0,
    };
    let height = sink.height();
    let mut instructions = 0u32;

    while !cursor.eof() && state.y < height {
        instructions = instructions.wrapping_add(1);
        if instructions % 1024 == 0 {
            stop.check()?;
        }

        let count = cursor.read_u8()?;
        if count > 0 {
            state.repeat(sink, usize::from(count), cursor)?;
            continue;
        }
        match cursor.read_u8()? {
            0 => {
                state.x = 0;
                state.y += 1;
            }
            1 => {
                log::trace!("{kind:?} end of bitmap at offset {}", cursor.position());
                break;
            }
            2 => {
                let dx = cursor.read_u8()?;
                let dy = cursor.read_u8()?;
                state.x += usize::from(dx);
                state.y += usize::from(dy);
            }
            n => state.absolute(sink, usize::from(n), cursor)?,
        }
    }

    if state.remapped > 0 {
        log::warn!(
            "{} {kind:?} pixels used indices past the {}-entry palette",
            state.remapped,
            palette.len()
        );
    }
    if sink.dropped() > 0 {
        log::warn!("{kind:?} stream wrote {} pixels outside the image", sink.dropped());
    }
    Ok(())
}
