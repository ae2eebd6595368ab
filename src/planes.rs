//! Caller-owned planar destinations.
//!
//! [`ChannelPlanes`] borrows one byte slice per channel, all sharing the same
//! row stride. Geometry is validated once here so the per-pixel plane writes
//! in [`PixelAdapter`] stay unchecked beyond slice indexing.

use core::fmt;

use crate::adapter::PixelAdapter;
use crate::format::PixelFormat;

// ---------------------------------------------------------------------------
// BufferError
// ---------------------------------------------------------------------------

/// Errors from channel plane validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum BufferError {
    /// A plane is too small for the given dimensions and stride.
    InsufficientData,
    /// Stride is smaller than the plane width.
    StrideTooSmall,
    /// Width or height is zero or causes overflow.
    InvalidDimensions,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData => {
                write!(f, "plane is too small for the given dimensions")
            }
            Self::StrideTooSmall => write!(f, "stride is smaller than the plane width"),
            Self::InvalidDimensions => write!(f, "width or height is zero or causes overflow"),
        }
    }
}

impl core::error::Error for BufferError {}

// ---------------------------------------------------------------------------
// ChannelPlanes
// ---------------------------------------------------------------------------

/// Separate R, G, B (and optionally A) destination planes, one byte per pixel.
pub struct ChannelPlanes<'a> {
    r: &'a mut [u8],
    g: &'a mut [u8],
    b: &'a mut [u8],
    a: Option<&'a mut [u8]>,
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a> ChannelPlanes<'a> {
    /// Borrow three color planes of `width × height` with a shared `stride`.
    ///
    /// # Errors
    ///
    /// Returns an error if a dimension is zero, the stride is narrower than
    /// `width`, or any plane is too short.
    pub fn new(
        r: &'a mut [u8],
        g: &'a mut [u8],
        b: &'a mut [u8],
        width: u32,
        height: u32,
        stride: usize,
    ) -> Result<Self, BufferError> {
        let required = required_bytes(width, height, stride)?;
        if [r.len(), g.len(), b.len()].iter().any(|&len| len < required) {
            return Err(BufferError::InsufficientData);
        }
        Ok(Self {
            r,
            g,
            b,
            a: None,
            width,
            height,
            stride,
        })
    }

    /// Add an alpha plane with the same geometry.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InsufficientData`] if `a` is too short.
    pub fn with_alpha(mut self, a: &'a mut [u8]) -> Result<Self, BufferError> {
        let required = required_bytes(self.width, self.height, self.stride)?;
        if a.len() < required {
            return Err(BufferError::InsufficientData);
        }
        self.a = Some(a);
        Ok(self)
    }

    /// Plane width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Plane height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Byte stride between row starts.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Whether an alpha plane is attached.
    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.a.is_some()
    }

    /// Write the adapter's current pixel into the slots at `(x, y)`.
    #[inline]
    pub(crate) fn write_from<P: PixelFormat, A: PixelAdapter<P>>(
        &mut self,
        adapter: &mut A,
        x: usize,
        y: usize,
        overlay: bool,
    ) {
        let i = y * self.stride + x;
        let (r, g, b) = (&mut self.r[i], &mut self.g[i], &mut self.b[i]);
        match (self.a.as_deref_mut(), overlay) {
            (Some(a), false) => adapter.override_to_planes_alpha(&mut a[i], r, g, b),
            (Some(a), true) => adapter.overlay_to_planes_alpha(&mut a[i], r, g, b),
            (None, false) => adapter.override_to_planes(r, g, b),
            (None, true) => adapter.overlay_to_planes(r, g, b),
        }
    }
}

fn required_bytes(width: u32, height: u32, stride: usize) -> Result<usize, BufferError> {
    if width == 0 || height == 0 {
        return Err(BufferError::InvalidDimensions);
    }
    if stride < width as usize {
        return Err(BufferError::StrideTooSmall);
    }
    (height as usize - 1)
        .checked_mul(stride)
        .and_then(|preceding| preceding.checked_add(width as usize))
        .ok_or(BufferError::InvalidDimensions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Raster;
    use alloc::vec;
    use imgref::ImgVec;
    use rgb::Rgba;

    #[test]
    fn validates_geometry() {
        let (mut r, mut g, mut b) = (vec![0u8; 10], vec![0u8; 10], vec![0u8; 9]);
        assert_eq!(
            ChannelPlanes::new(&mut r, &mut g, &mut b, 3, 3, 2).err(),
            Some(BufferError::StrideTooSmall)
        );
        assert_eq!(
            ChannelPlanes::new(&mut r, &mut g, &mut b, 0, 3, 4).err(),
            Some(BufferError::InvalidDimensions)
        );
        // Last row needs only `width` bytes: 2 * 4 + 3 = 11 > 9.
        assert_eq!(
            ChannelPlanes::new(&mut r, &mut g, &mut b, 3, 3, 4).err(),
            Some(BufferError::InsufficientData)
        );
        let planes = ChannelPlanes::new(&mut r, &mut g, &mut b, 3, 3, 3).unwrap();
        assert_eq!((planes.width(), planes.height(), planes.stride()), (3, 3, 3));
        assert!(!planes.has_alpha());
    }

    #[test]
    fn alpha_plane_must_fit() {
        let (mut r, mut g, mut b, mut a) = (vec![0u8; 4], vec![0u8; 4], vec![0u8; 4], vec![0u8; 3]);
        let planes = ChannelPlanes::new(&mut r, &mut g, &mut b, 2, 2, 2).unwrap();
        assert_eq!(planes.with_alpha(&mut a).err(), Some(BufferError::InsufficientData));
    }

    #[test]
    fn writes_split_channels() {
        let img = ImgVec::new(vec![Rgba { r: 1u8, g: 2, b: 3, a: 4 }], 1, 1);
        let mut src = img.as_ref().adapter(0, 0);
        let (mut r, mut g, mut b, mut a) = ([0u8], [0u8], [0u8], [0u8]);
        {
            let mut planes = ChannelPlanes::new(&mut r, &mut g, &mut b, 1, 1, 1)
                .unwrap()
                .with_alpha(&mut a)
                .unwrap();
            planes.write_from(&mut src, 0, 0, false);
        }
        assert_eq!((r[0], g[0], b[0], a[0]), (1, 2, 3, 4));
    }
}
