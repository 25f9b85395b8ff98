//! Color table loading and index lookup.

use alloc::vec::Vec;

use crate::error::DibError;

use super::cursor::Cursor;
use super::header::{HeaderVariant, InfoHeader};

/// Substitute for out-of-range indices when decoding permissively.
const OUT_OF_RANGE_COLOR: [u8; 4] = [0, 0, 0, 255];

/// Color table with entries pre-converted to RGBA.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Palette {
    colors: Vec<[u8; 4]>,
}

impl Palette {
    /// Number of entries to read for this header, or `None` when the header
    /// declares no color table.
    pub(crate) fn declared_len(info: &InfoHeader) -> Option<usize> {
        let bpp = info.bits_per_pixel;
        if bpp > 8 {
            return (info.colors_used != 0).then_some(info.colors_used as usize);
        }
        let max = 1usize << bpp;
        Some(match info.colors_used as usize {
            0 => max,
            // Indices can't address entries past 2^bpp.
            n => n.min(max),
        })
    }

    /// Read `count` entries: 3 bytes each for OS/2 1.x headers, 4 otherwise.
    pub(crate) fn read(
        cursor: &mut Cursor<'_>,
        count: usize,
        variant: HeaderVariant,
    ) -> Result<Self, DibError> {
        let entry_size = if variant == HeaderVariant::Core { 3 } else { 4 };
        let bytes = count
            .checked_mul(entry_size)
            .ok_or_else(|| DibError::InvalidHeader(alloc::format!("palette of {count} entries")))?;
        let raw = cursor.take(bytes)?;
        let colors = raw
            .chunks_exact(entry_size)
            .map(|bgr| [bgr[2], bgr[1], bgr[0], 255])
            .collect();
        Ok(Self { colors })
    }

    pub(crate) fn len(&self) -> usize {
        self.colors.len()
    }

    /// Look up an index. When `remap` is set, out-of-range indices become
    /// opaque black and `remapped` is incremented instead of failing.
    #[inline]
    pub(crate) fn lookup(
        &self,
        index: usize,
        remap: bool,
        remapped: &mut usize,
    ) -> Result<[u8; 4], DibError> {
        match self.colors.get(index) {
            Some(color) => Ok(*color),
            None if remap => {
                *remapped += 1;
                Ok(OUT_OF_RANGE_COLOR)
            }
            None => Err(DibError::PaletteIndexOutOfRange {
                index,
                palette_len: self.colors.len(),
            }),
        }
    }
}
