//! File header, OS/2 bitmap-array unwrapping and info-header variants.

use crate::error::DibError;

use super::Permissiveness;
use super::cursor::Cursor;

/// Signatures accepted in the first two bytes of a bitmap file.
const KNOWN_TAGS: [[u8; 2]; 6] = [*b"BM", *b"BA", *b"CI", *b"CP", *b"IC", *b"PT"];

/// Info-header layout, classified from the header's declared size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeaderVariant {
    /// OS/2 1.x `BITMAPCOREHEADER` (12 bytes, 16-bit dimensions).
    Core,
    /// OS/2 2.x header truncated to its first 16 bytes.
    Os2V2Lite,
    /// Full 64-byte OS/2 2.x header.
    Os2V2,
    /// `BITMAPINFOHEADER` and its 52/56-byte extensions.
    V3,
    /// `BITMAPV4HEADER`.
    V4,
    /// `BITMAPV5HEADER`.
    V5,
}

impl HeaderVariant {
    pub fn classify(header_size: u32) -> Result<Self, DibError> {
        Ok(match header_size {
            12 => Self::Core,
            16 => Self::Os2V2Lite,
            64 => Self::Os2V2,
            40 | 52 | 56 => Self::V3,
            108 => Self::V4,
            124 => Self::V5,
            _ => return Err(DibError::UnrecognizedVariant { header_size }),
        })
    }

    fn is_os2(self) -> bool {
        matches!(self, Self::Core | Self::Os2V2Lite | Self::Os2V2)
    }
}

/// Compression code, interpreted in the context of the header variant.
///
/// Codes 3 and 4 mean different things in OS/2 2.x and Windows headers.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Compression {
    None,
    Rle8,
    Rle4,
    Bitfields,
    /// OS/2 modified Huffman (CCITT G3 1D), 1 bpp only.
    Huffman1D,
    /// OS/2 24-bit run-length encoding.
    Rle24,
    Jpeg,
    Png,
    AlphaBitfields,
    Unknown(u32),
}

impl Compression {
    pub fn from_code(code: u32, variant: HeaderVariant) -> Self {
        let os2 = variant.is_os2();
        match code {
            0 => Self::None,
            1 => Self::Rle8,
            2 => Self::Rle4,
            3 if os2 => Self::Huffman1D,
            3 => Self::Bitfields,
            4 if os2 => Self::Rle24,
            4 => Self::Jpeg,
            5 => Self::Png,
            6 => Self::AlphaBitfields,
            other => Self::Unknown(other),
        }
    }

    pub fn is_rle(self) -> bool {
        matches!(self, Self::Rle8 | Self::Rle4 | Self::Rle24)
    }
}

/// The 14-byte `BITMAPFILEHEADER`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileHeader {
    pub tag: [u8; 2],
    pub file_size: u32,
    pub reserved: [u16; 2],
    /// Byte offset of the pixel data from the start of the file.
    pub data_offset: u32,
    /// Set when the file was an OS/2 bitmap array and the first entry was used.
    pub from_bitmap_array: bool,
}

pub(crate) fn read_file_header(
    cursor: &mut Cursor<'_>,
    permissiveness: Permissiveness,
) -> Result<FileHeader, DibError> {
    let mut header = read_file_header_fields(cursor, permissiveness)?;
    if header.tag == *b"BA" {
        // OS/2 bitmap array: the 14 bytes just read were the array header
        // (size, next-entry offset, display size). The first entry's own
        // file header follows; only its pixel offset matters.
        let inner = read_file_header_fields(cursor, permissiveness)?;
        log::debug!(
            "OS/2 bitmap array, first entry tag {:?}",
            core::str::from_utf8(&inner.tag).unwrap_or("??")
        );
        header.data_offset = inner.data_offset;
        header.from_bitmap_array = true;
    }
    if permissiveness == Permissiveness::Strict
        && header.file_size != 0
        && !header.from_bitmap_array
        && header.file_size as usize != cursor.len()
    {
        return Err(DibError::InvalidHeader(alloc::format!(
            "file size field ({}) doesn't match actual size ({})",
            header.file_size,
            cursor.len()
        )));
    }
    Ok(header)
}

fn read_file_header_fields(
    cursor: &mut Cursor<'_>,
    permissiveness: Permissiveness,
) -> Result<FileHeader, DibError> {
    let tag = cursor.read_fixed_bytes::<2>()?;
    if !KNOWN_TAGS.contains(&tag) {
        if permissiveness != Permissiveness::Permissive {
            return Err(DibError::UnrecognizedFormat);
        }
        log::warn!("accepting unknown bitmap signature {tag:02x?}");
    }
    let file_size = cursor.read_u32_le()?;
    let reserved = [cursor.read_u16_le()?, cursor.read_u16_le()?];
    let data_offset = cursor.read_u32_le()?;
    Ok(FileHeader {
        tag,
        file_size,
        reserved,
        data_offset,
        from_bitmap_array: false,
    })
}

/// Fields common to every info-header variant. Fields a variant lacks are zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InfoHeader {
    pub size: u32,
    pub variant: HeaderVariant,
    pub width: i32,
    /// Negative height means rows are stored top-down.
    pub height: i32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: Compression,
    pub compression_code: u32,
    pub image_size: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

impl InfoHeader {
    pub fn is_top_down(&self) -> bool {
        self.height < 0
    }

    pub fn abs_width(&self) -> u32 {
        self.width.unsigned_abs()
    }

    pub fn abs_height(&self) -> u32 {
        self.height.unsigned_abs()
    }
}

/// Read the info header's common fields. The cursor is left just past them;
/// trailing variant-specific bytes (masks, color space) are not consumed.
pub(crate) fn read_info_header(cursor: &mut Cursor<'_>) -> Result<InfoHeader, DibError> {
    let size = cursor.read_u32_le()?;
    let variant = HeaderVariant::classify(size)?;

    let mut info = InfoHeader {
        size,
        variant,
        width: 0,
        height: 0,
        planes: 0,
        bits_per_pixel: 0,
        compression: Compression::None,
        compression_code: 0,
        image_size: 0,
        x_pixels_per_meter: 0,
        y_pixels_per_meter: 0,
        colors_used: 0,
        colors_important: 0,
    };

    if variant == HeaderVariant::Core {
        info.width = i32::from(cursor.read_u16_le()?);
        info.height = i32::from(cursor.read_u16_le()?);
    } else {
        info.width = cursor.read_i32_le()?;
        info.height = cursor.read_i32_le()?;
    }
    info.planes = cursor.read_u16_le()?;
    info.bits_per_pixel = cursor.read_u16_le()?;

    if matches!(variant, HeaderVariant::Core | HeaderVariant::Os2V2Lite) {
        return Ok(info);
    }

    info.compression_code = cursor.read_u32_le()?;
    info.compression = Compression::from_code(info.compression_code, variant);
    info.image_size = cursor.read_u32_le()?;
    info.x_pixels_per_meter = cursor.read_i32_le()?;
    info.y_pixels_per_meter = cursor.read_i32_le()?;
    info.colors_used = cursor.read_u32_le()?;
    info.colors_important = cursor.read_u32_le()?;
    Ok(info)
}

/// Reject geometry and fields that no decoder can work with.
pub(crate) fn validate(info: &InfoHeader, permissiveness: Permissiveness) -> Result<(), DibError> {
    if info.width <= 0 || info.height == 0 {
        return Err(DibError::InvalidRowGeometry {
            width: i64::from(info.width),
            height: i64::from(info.height),
        });
    }
    if permissiveness == Permissiveness::Strict {
        if info.planes != 1 {
            return Err(DibError::InvalidHeader(alloc::format!(
                "planes field is {}, expected 1",
                info.planes
            )));
        }
        if info.bits_per_pixel <= 8 && info.colors_used > 1u32 << info.bits_per_pixel {
            return Err(DibError::InvalidHeader(alloc::format!(
                "palette count ({}) exceeds max for {}-bit depth",
                info.colors_used,
                info.bits_per_pixel
            )));
        }
        if info.is_top_down() && info.compression.is_rle() {
            return Err(DibError::InvalidHeader(
                "run-length compression with top-down row order".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_sizes() {
        assert_eq!(HeaderVariant::classify(12).unwrap(), HeaderVariant::Core);
        assert_eq!(HeaderVariant::classify(16).unwrap(), HeaderVariant::Os2V2Lite);
        assert_eq!(HeaderVariant::classify(64).unwrap(), HeaderVariant::Os2V2);
        for size in [40, 52, 56] {
            assert_eq!(HeaderVariant::classify(size).unwrap(), HeaderVariant::V3);
        }
        assert_eq!(HeaderVariant::classify(108).unwrap(), HeaderVariant::V4);
        assert_eq!(HeaderVariant::classify(124).unwrap(), HeaderVariant::V5);
        assert!(matches!(
            HeaderVariant::classify(41),
            Err(DibError::UnrecognizedVariant { header_size: 41 })
        ));
    }

    #[test]
    fn compression_depends_on_variant() {
        assert_eq!(
            Compression::from_code(3, HeaderVariant::Os2V2),
            Compression::Huffman1D
        );
        assert_eq!(
            Compression::from_code(3, HeaderVariant::V3),
            Compression::Bitfields
        );
        assert_eq!(
            Compression::from_code(4, HeaderVariant::Os2V2),
            Compression::Rle24
        );
        assert_eq!(Compression::from_code(4, HeaderVariant::V5), Compression::Jpeg);
        assert_eq!(
            Compression::from_code(9, HeaderVariant::V3),
            Compression::Unknown(9)
        );
    }

    #[test]
    fn lite_header_stops_after_common_fields() {
        let mut bytes = alloc::vec::Vec::new();
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&3i32.to_le_bytes());
        bytes.extend_from_slice(&(-2i32).to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&8u16.to_le_bytes());
        bytes.extend_from_slice(&[0xde, 0xad]);

        let mut cursor = Cursor::new(&bytes);
        let info = read_info_header(&mut cursor).unwrap();
        assert_eq!(info.variant, HeaderVariant::Os2V2Lite);
        assert_eq!((info.width, info.height), (3, -2));
        assert!(info.is_top_down());
        assert_eq!(info.compression, Compression::None);
        assert_eq!(cursor.position(), 16);
    }

    #[test]
    fn core_header_uses_16_bit_dimensions() {
        let mut bytes = alloc::vec::Vec::new();
        bytes.extend_from_slice(&12u32.to_le_bytes());
        bytes.extend_from_slice(&0xffffu16.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&24u16.to_le_bytes());

        let info = read_info_header(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(info.variant, HeaderVariant::Core);
        assert_eq!((info.width, info.height), (65535, 2));
        assert!(!info.is_top_down());
    }

    #[test]
    fn bitmap_array_adopts_inner_offset() {
        let mut bytes = alloc::vec::Vec::new();
        bytes.extend_from_slice(b"BA");
        bytes.extend_from_slice(&40u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(b"BM");
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0x1234u32.to_le_bytes());

        let mut cursor = Cursor::new(&bytes);
        let header = read_file_header(&mut cursor, Permissiveness::Standard).unwrap();
        assert!(header.from_bitmap_array);
        assert_eq!(header.data_offset, 0x1234);
        assert_eq!(cursor.position(), 28);
    }

    #[test]
    fn unknown_tag_only_accepted_when_permissive() {
        let mut bytes = alloc::vec::Vec::new();
        bytes.extend_from_slice(b"XY");
        bytes.extend_from_slice(&[0u8; 12]);

        assert!(matches!(
            read_file_header(&mut Cursor::new(&bytes), Permissiveness::Standard),
            Err(DibError::UnrecognizedFormat)
        ));
        let header =
            read_file_header(&mut Cursor::new(&bytes), Permissiveness::Permissive).unwrap();
        assert_eq!(header.tag, *b"XY");
    }
}
