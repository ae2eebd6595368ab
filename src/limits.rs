//! Resource limits for render jobs and filter construction.
//!
//! [`Limits`] caps what a [`RenderJob`](crate::RenderJob) will scan or
//! allocate and how large a filter patch may be. [`LimitExceeded`] is
//! returned when a check fails, before any pixel work.

/// Caps on render extent and patch size.
///
/// All fields are optional; `None` means no limit for that resource.
///
/// # Example
///
/// ```
/// use zenadapt::Limits;
///
/// let limits = Limits::none()
///     .with_max_pixels(16_000_000)
///     .with_max_patch_area(31 * 31);
/// assert!(limits.check_dimensions(4000, 4000).is_ok());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct Limits {
    /// Maximum render width in pixels.
    pub max_width: Option<u32>,
    /// Maximum render height in pixels.
    pub max_height: Option<u32>,
    /// Maximum total pixels (width × height).
    pub max_pixels: Option<u64>,
    /// Maximum filter patch area (patch width × patch height).
    pub max_patch_area: Option<u64>,
}

impl Limits {
    /// No limits (all fields `None`).
    pub fn none() -> Self {
        Self::default()
    }

    /// Set maximum render width in pixels.
    pub fn with_max_width(mut self, width: u32) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Set maximum render height in pixels.
    pub fn with_max_height(mut self, height: u32) -> Self {
        self.max_height = Some(height);
        self
    }

    /// Set maximum total pixels.
    pub fn with_max_pixels(mut self, max: u64) -> Self {
        self.max_pixels = Some(max);
        self
    }

    /// Set maximum filter patch area.
    pub fn with_max_patch_area(mut self, max: u64) -> Self {
        self.max_patch_area = Some(max);
        self
    }

    /// Whether any limits are set.
    pub fn has_any(&self) -> bool {
        self.max_width.is_some()
            || self.max_height.is_some()
            || self.max_pixels.is_some()
            || self.max_patch_area.is_some()
    }

    // --- Validation methods ---

    /// Check render dimensions against `max_width`, `max_height`, and `max_pixels`.
    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_width
            && width > max
        {
            return Err(LimitExceeded::Width { actual: width, max });
        }
        if let Some(max) = self.max_height
            && height > max
        {
            return Err(LimitExceeded::Height {
                actual: height,
                max,
            });
        }
        if let Some(max) = self.max_pixels {
            let pixels = width as u64 * height as u64;
            if pixels > max {
                return Err(LimitExceeded::Pixels {
                    actual: pixels,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Check a filter patch against `max_patch_area`.
    pub fn check_patch(&self, width: u32, height: u32) -> Result<(), LimitExceeded> {
        if let Some(max) = self.max_patch_area {
            let area = width as u64 * height as u64;
            if area > max {
                return Err(LimitExceeded::PatchArea { actual: area, max });
            }
        }
        Ok(())
    }
}

/// A resource limit was exceeded.
///
/// Each variant carries the actual value and the limit that was exceeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum LimitExceeded {
    /// Render width exceeded `max_width`.
    Width {
        /// Actual width.
        actual: u32,
        /// Maximum allowed.
        max: u32,
    },
    /// Render height exceeded `max_height`.
    Height {
        /// Actual height.
        actual: u32,
        /// Maximum allowed.
        max: u32,
    },
    /// Pixel count exceeded `max_pixels`.
    Pixels {
        /// Actual pixel count.
        actual: u64,
        /// Maximum allowed.
        max: u64,
    },
    /// Patch area exceeded `max_patch_area`.
    PatchArea {
        /// Actual patch area.
        actual: u64,
        /// Maximum allowed.
        max: u64,
    },
}

impl core::fmt::Display for LimitExceeded {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Width { actual, max } => write!(f, "width {actual} exceeds limit {max}"),
            Self::Height { actual, max } => write!(f, "height {actual} exceeds limit {max}"),
            Self::Pixels { actual, max } => {
                write!(f, "pixel count {actual} exceeds limit {max}")
            }
            Self::PatchArea { actual, max } => {
                write!(f, "patch area {actual} exceeds limit {max}")
            }
        }
    }
}

impl core::error::Error for LimitExceeded {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn default_has_no_limits() {
        let limits = Limits::none();
        assert!(!limits.has_any());
        assert!(limits.check_dimensions(100_000, 100_000).is_ok());
        assert!(limits.check_patch(1000, 1000).is_ok());
    }

    #[test]
    fn builder_sets_limits() {
        let limits = Limits::none().with_max_pixels(1_000_000).with_max_patch_area(49);
        assert!(limits.has_any());
        assert_eq!(limits.max_pixels, Some(1_000_000));
        assert_eq!(limits.max_patch_area, Some(49));
        assert!(limits.max_width.is_none());
    }

    #[test]
    fn check_dimensions_pass() {
        let limits = Limits::none()
            .with_max_width(1920)
            .with_max_height(1080)
            .with_max_pixels(2_073_600);
        assert!(limits.check_dimensions(1920, 1080).is_ok());
        assert!(limits.check_dimensions(100, 100).is_ok());
    }

    #[test]
    fn check_dimensions_width_exceeded() {
        let limits = Limits::none().with_max_width(1920);
        let err = limits.check_dimensions(1921, 1080).unwrap_err();
        assert_eq!(
            err,
            LimitExceeded::Width {
                actual: 1921,
                max: 1920
            }
        );
    }

    #[test]
    fn check_dimensions_height_exceeded() {
        let limits = Limits::none().with_max_height(1080);
        let err = limits.check_dimensions(1920, 1081).unwrap_err();
        assert_eq!(
            err,
            LimitExceeded::Height {
                actual: 1081,
                max: 1080
            }
        );
    }

    #[test]
    fn check_dimensions_pixels_exceeded() {
        let limits = Limits::none().with_max_pixels(1_000_000);
        // 1001×1000 = 1,001,000 > 1,000,000
        let err = limits.check_dimensions(1001, 1000).unwrap_err();
        assert_eq!(
            err,
            LimitExceeded::Pixels {
                actual: 1_001_000,
                max: 1_000_000
            }
        );
    }

    #[test]
    fn check_patch_area() {
        let limits = Limits::none().with_max_patch_area(25);
        assert!(limits.check_patch(5, 5).is_ok());
        let err = limits.check_patch(7, 5).unwrap_err();
        assert_eq!(err, LimitExceeded::PatchArea { actual: 35, max: 25 });
        assert_eq!(format!("{err}"), "patch area 35 exceeds limit 25");
    }
}
