use crate::DibError;

/// Resource limits for decode operations.
///
/// All fields default to `None` (no limit). Limits are checked after the
/// headers are parsed and before the output buffer is allocated.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum bytes for the decoded pixel buffer.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// Validate the output geometry and return the output buffer size in bytes.
    pub(crate) fn check_output(
        &self,
        width: u32,
        height: u32,
        bytes_per_pixel: usize,
    ) -> Result<usize, DibError> {
        let pixels = u64::from(width) * u64::from(height);
        let checks = [
            ("width", u64::from(width), self.max_width),
            ("height", u64::from(height), self.max_height),
            ("pixel count", pixels, self.max_pixels),
        ];
        for (what, value, limit) in checks {
            if let Some(limit) = limit {
                if value > limit {
                    return Err(DibError::LimitExceeded(alloc::format!(
                        "{what} {value} exceeds limit {limit}"
                    )));
                }
            }
        }

        let bytes = usize::try_from(pixels)
            .ok()
            .and_then(|p| p.checked_mul(bytes_per_pixel))
            .ok_or(DibError::DimensionsTooLarge { width, height })?;
        if let Some(max_mem) = self.max_memory_bytes {
            if bytes as u64 > max_mem {
                return Err(DibError::LimitExceeded(alloc::format!(
                    "allocation {bytes} bytes exceeds memory limit {max_mem}"
                )));
            }
        }
        Ok(bytes)
    }
}
