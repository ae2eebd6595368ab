use core::marker::PhantomData;

use imgref::ImgRef;
use rgb::Rgba;

use crate::adapter::PixelAdapter;
use crate::error::AdapterError;
use crate::format::{PixelFormat, gray_channels};
use crate::source::{Raster, Source};

/// White where the gray value falls inside any of a set of inclusive
/// ranges, black elsewhere. Read-only.
#[derive(Clone, Debug)]
pub struct RangesThreshold<P, A> {
    source: A,
    white: [bool; 256],
    cache: Option<u8>,
    _format: PhantomData<fn() -> P>,
}

impl<P: PixelFormat, A: PixelAdapter<P>> RangesThreshold<P, A> {
    /// Threshold `source` against `ranges`, a flattened list of
    /// `[start, end]` pairs (both ends inclusive).
    ///
    /// # Errors
    ///
    /// [`AdapterError::InvalidArgument`] if `ranges` has odd length or a
    /// pair starts after it ends.
    pub fn new(source: A, ranges: &[u8]) -> Result<Self, AdapterError> {
        if ranges.len() % 2 != 0 {
            return Err(AdapterError::InvalidArgument(
                "ranges must hold start/end pairs",
            ));
        }
        let mut white = [false; 256];
        for pair in ranges.chunks_exact(2) {
            let (start, end) = (pair[0], pair[1]);
            if start > end {
                return Err(AdapterError::InvalidArgument("range start exceeds its end"));
            }
            white[start as usize..=end as usize].fill(true);
        }
        Ok(Self {
            source,
            white,
            cache: None,
            _format: PhantomData,
        })
    }

    /// Release the wrapped adapter.
    pub fn into_inner(self) -> A {
        self.source
    }

    #[inline]
    fn current(&mut self) -> u8 {
        if let Some(v) = self.cache {
            return v;
        }
        let v = if self.white[self.source.gray() as usize] {
            255
        } else {
            0
        };
        self.cache = Some(v);
        v
    }
}

impl<'a, P: PixelFormat> RangesThreshold<P, Source<ImgRef<'a, P>>> {
    /// Threshold an image directly, owning a fresh source view over it.
    ///
    /// # Errors
    ///
    /// Same as [`new`](RangesThreshold::new).
    pub fn from_image(image: ImgRef<'a, P>, ranges: &[u8]) -> Result<Self, AdapterError> {
        Self::new(image.adapter(0, 0), ranges)
    }
}

impl<P: PixelFormat, A: PixelAdapter<P>> PixelAdapter<P> for RangesThreshold<P, A> {
    #[inline]
    fn x(&self) -> i32 {
        self.source.x()
    }

    #[inline]
    fn y(&self) -> i32 {
        self.source.y()
    }

    #[inline]
    fn x_len(&self) -> u32 {
        self.source.x_len()
    }

    #[inline]
    fn y_len(&self) -> u32 {
        self.source.y_len()
    }

    #[inline]
    fn bits_per_pixel(&self) -> u32 {
        self.source.bits_per_pixel()
    }

    #[inline]
    fn move_to(&mut self, x: i32, y: i32) {
        self.cache = None;
        self.source.move_to(x, y);
    }

    #[inline]
    fn move_next_x(&mut self) {
        self.cache = None;
        self.source.move_next_x();
    }

    #[inline]
    fn move_previous_x(&mut self) {
        self.cache = None;
        self.source.move_previous_x();
    }

    #[inline]
    fn move_next_y(&mut self) {
        self.cache = None;
        self.source.move_next_y();
    }

    #[inline]
    fn move_previous_y(&mut self) {
        self.cache = None;
        self.source.move_previous_y();
    }

    #[inline]
    fn offset_x(&mut self, dx: i32) {
        self.cache = None;
        self.source.offset_x(dx);
    }

    #[inline]
    fn offset_y(&mut self, dy: i32) {
        self.cache = None;
        self.source.offset_y(dy);
    }

    #[inline]
    fn a(&mut self) -> u8 {
        255
    }

    #[inline]
    fn r(&mut self) -> u8 {
        self.current()
    }

    #[inline]
    fn g(&mut self) -> u8 {
        self.current()
    }

    #[inline]
    fn b(&mut self) -> u8 {
        self.current()
    }

    #[inline]
    fn channels(&mut self) -> Rgba<u8> {
        gray_channels(self.current())
    }

    #[inline]
    fn gray(&mut self) -> u8 {
        self.current()
    }

    fn override_with(&mut self, _c: Rgba<u8>) -> Result<(), AdapterError> {
        Err(AdapterError::unsupported("RangesThreshold", "override"))
    }

    fn overlay_with(&mut self, _c: Rgba<u8>) -> Result<(), AdapterError> {
        Err(AdapterError::unsupported("RangesThreshold", "overlay"))
    }
}
