//! RGBA output buffer that maps file rows to visual rows at write time.

use alloc::vec;
use alloc::vec::Vec;

/// Output buffer with a top-left origin.
///
/// Decoders address rows in file order. File row `y` of a bottom-up bitmap
/// lands in output row `height - 1 - y`; top-down bitmaps keep their order.
pub(crate) struct PixelSink {
    buf: Vec<u8>,
    width: usize,
    height: usize,
    top_down: bool,
    /// Pixels addressed outside the image and dropped.
    dropped: usize,
}

impl PixelSink {
    /// `len` must equal `width * height * 4`; it was validated against limits.
    pub(crate) fn new(width: usize, height: usize, top_down: bool, len: usize) -> Self {
        debug_assert_eq!(len, width * height * 4);
        Self {
            buf: vec![0u8; len],
            width,
            height,
            top_down,
            dropped: 0,
        }
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn height(&self) -> usize {
        self.height
    }

    pub(crate) fn dropped(&self) -> usize {
        self.dropped
    }

    fn output_row(&self, file_row: usize) -> usize {
        if self.top_down {
            file_row
        } else {
            self.height - 1 - file_row
        }
    }

    /// The output row for file row `y` (`y < height`).
    pub(crate) fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let stride = self.width * 4;
        let start = self.output_row(y) * stride;
        &mut self.buf[start..start + stride]
    }

    /// Write one pixel at file coordinates, dropping it if it falls outside.
    #[inline]
    pub(crate) fn put(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            self.dropped += 1;
            return;
        }
        let off = (self.output_row(y) * self.width + x) * 4;
        self.buf[off..off + 4].copy_from_slice(&rgba);
    }

    /// Force every alpha byte to 255.
    pub(crate) fn make_opaque(&mut self) {
        for px in self.buf.chunks_exact_mut(4) {
            px[3] = 255;
        }
    }

    pub(crate) fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}
