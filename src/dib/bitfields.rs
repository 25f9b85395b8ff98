//! RGB(A) bitmask extraction for 16- and 32-bit bitmaps.
//!
//! Each mask is reduced to a shift (lowest set bit) and a multiplier that
//! rescales a field of any width to 0..=255: `255.9 / (2^popcount - 1)`.

use crate::error::DibError;

use super::cursor::Cursor;
use super::header::{Compression, HeaderVariant, InfoHeader};

/// Offset of pixel data in a 40-byte-header file carrying exactly three masks.
const THREE_MASK_DATA_OFFSET: u32 = 14 + 40 + 12;

/// One channel's mask with its derived shift and multiplier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelMask {
    pub mask: u32,
    pub shift: u32,
    pub multiplier: f64,
}

impl ChannelMask {
    pub fn new(mask: u32) -> Self {
        if mask == 0 {
            return Self {
                mask,
                shift: 0,
                multiplier: 0.0,
            };
        }
        let max = (1u64 << mask.count_ones()) - 1;
        Self {
            mask,
            shift: mask.trailing_zeros(),
            multiplier: 255.9 / max as f64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    /// Extract this channel from a raw pixel and scale it to 8 bits.
    #[inline]
    pub fn extract(&self, raw: u32) -> u8 {
        let field = (raw & self.mask) >> self.shift;
        (f64::from(field) * self.multiplier).min(255.0) as u8
    }
}

/// Masks and derived scaling for all four channels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BitfieldSpec {
    pub red: ChannelMask,
    pub green: ChannelMask,
    pub blue: ChannelMask,
    /// An empty alpha mask means every pixel is opaque.
    pub alpha: ChannelMask,
}

impl BitfieldSpec {
    pub fn from_masks([r, g, b, a]: [u32; 4]) -> Self {
        Self {
            red: ChannelMask::new(r),
            green: ChannelMask::new(g),
            blue: ChannelMask::new(b),
            alpha: ChannelMask::new(a),
        }
    }

    /// The fixed 16-bit layout: `xRRRRRGG GGGBBBBB`, with the top bit as a
    /// candidate alpha bit.
    pub(crate) fn rgb555_with_alpha() -> Self {
        Self::from_masks([0x7c00, 0x03e0, 0x001f, 0x8000])
    }

    /// Layout used when a bitfield header declares no color masks at all.
    pub(crate) fn default_for_depth(bits_per_pixel: u16) -> Self {
        if bits_per_pixel == 16 {
            Self::from_masks([0x7c00, 0x03e0, 0x001f, 0])
        } else {
            Self::from_masks([0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0])
        }
    }

    pub fn masks(&self) -> [u32; 4] {
        [
            self.red.mask,
            self.green.mask,
            self.blue.mask,
            self.alpha.mask,
        ]
    }

    pub(crate) fn has_color_masks(&self) -> bool {
        !(self.red.is_empty() && self.green.is_empty() && self.blue.is_empty())
    }

    /// Convert one raw pixel to RGBA.
    #[inline]
    pub fn unpack(&self, raw: u32) -> [u8; 4] {
        let alpha = if self.alpha.is_empty() {
            255
        } else {
            self.alpha.extract(raw)
        };
        [
            self.red.extract(raw),
            self.green.extract(raw),
            self.blue.extract(raw),
            alpha,
        ]
    }
}

/// Whether the masks must be read for this header.
pub(crate) fn has_masks(info: &InfoHeader) -> bool {
    match info.variant {
        HeaderVariant::V4 | HeaderVariant::V5 => true,
        HeaderVariant::V3 => matches!(
            info.compression,
            Compression::Bitfields | Compression::AlphaBitfields
        ),
        HeaderVariant::Core | HeaderVariant::Os2V2Lite | HeaderVariant::Os2V2 => false,
    }
}

/// Read the masks that follow the 40 common info-header bytes.
///
/// Red, green and blue are always present. Alpha is present for V4/V5, for
/// BI_ALPHABITFIELDS, and whenever the pixel data does not start right after
/// a three-mask layout.
pub(crate) fn read_masks(
    cursor: &mut Cursor<'_>,
    info: &InfoHeader,
    data_offset: u32,
) -> Result<BitfieldSpec, DibError> {
    let red = cursor.read_u32_le()?;
    let green = cursor.read_u32_le()?;
    let blue = cursor.read_u32_le()?;
    let alpha = if info.compression == Compression::AlphaBitfields
        || data_offset != THREE_MASK_DATA_OFFSET
        || matches!(info.variant, HeaderVariant::V4 | HeaderVariant::V5)
    {
        cursor.read_u32_le()?
    } else {
        0
    };
    log::debug!(
        "bitfield masks r={red:#010x} g={green:#010x} b={blue:#010x} a={alpha:#010x}"
    );
    Ok(BitfieldSpec::from_masks([red, green, blue, alpha]))
}
