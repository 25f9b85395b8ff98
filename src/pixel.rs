/// Pixel memory layout of a decoded bitmap.
///
/// Every BMP variant decodes to four 8-bit channels. Formats without alpha
/// report 255 in the alpha channel.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PixelLayout {
    /// 4 channels, 8-bit RGBA.
    #[default]
    Rgba8,
    /// 4 channels, 8-bit BGRA (the byte order BMP stores and most GPUs accept).
    Bgra8,
}

impl PixelLayout {
    /// Bytes per pixel for this layout.
    pub fn bytes_per_pixel(&self) -> usize {
        4
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        4
    }
}

/// Pixel types that a [`crate::DecodeOutput`] can be viewed as.
#[cfg(feature = "rgb")]
pub trait DecodePixel: Copy + 'static {
    /// The layout this pixel type corresponds to.
    fn layout() -> PixelLayout;
}

#[cfg(feature = "rgb")]
impl DecodePixel for rgb::RGBA8 {
    fn layout() -> PixelLayout {
        PixelLayout::Rgba8
    }
}

#[cfg(feature = "rgb")]
impl DecodePixel for rgb::alt::BGRA8 {
    fn layout() -> PixelLayout {
        PixelLayout::Bgra8
    }
}
