//! Rectangular sub-view of another adapter.

use core::marker::PhantomData;

use imgref::ImgRef;
use rgb::Rgba;

use crate::adapter::PixelAdapter;
use crate::error::AdapterError;
use crate::format::PixelFormat;
use crate::source::{Raster, Source};

/// Pass-through view of the region starting at `(offset_x, offset_y)`.
///
/// The cursor is shifted into the wrapped adapter; reads and writes go
/// straight to it. The extent is clamped so the view never reaches past
/// the wrapped adapter's edge.
#[derive(Clone, Debug)]
pub struct Crop<P, A> {
    source: A,
    offset_x: i32,
    offset_y: i32,
    x_len: u32,
    y_len: u32,
    _format: PhantomData<fn() -> P>,
}

impl<P: PixelFormat, A: PixelAdapter<P>> Crop<P, A> {
    /// Crop `source` to a `width × height` region at `(x, y)`.
    ///
    /// The cursor starts at the region's top-left corner.
    pub fn new(mut source: A, x: u32, y: u32, width: u32, height: u32) -> Self {
        let x_len = width.min(source.x_len().saturating_sub(x));
        let y_len = height.min(source.y_len().saturating_sub(y));
        let offset_x = x as i32;
        let offset_y = y as i32;
        source.move_to(offset_x, offset_y);
        Self {
            source,
            offset_x,
            offset_y,
            x_len,
            y_len,
            _format: PhantomData,
        }
    }

    /// Top-left corner of the region in the wrapped adapter.
    pub fn offset(&self) -> (i32, i32) {
        (self.offset_x, self.offset_y)
    }

    /// Release the wrapped adapter.
    pub fn into_inner(self) -> A {
        self.source
    }
}

impl<'a, P: PixelFormat> Crop<P, Source<ImgRef<'a, P>>> {
    /// Crop an image directly, owning a fresh source view over it.
    pub fn from_image(image: ImgRef<'a, P>, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::new(image.adapter(0, 0), x, y, width, height)
    }
}

impl<P: PixelFormat, A: PixelAdapter<P>> PixelAdapter<P> for Crop<P, A> {
    #[inline]
    fn x(&self) -> i32 {
        self.source.x() - self.offset_x
    }

    #[inline]
    fn y(&self) -> i32 {
        self.source.y() - self.offset_y
    }

    #[inline]
    fn x_len(&self) -> u32 {
        self.x_len
    }

    #[inline]
    fn y_len(&self) -> u32 {
        self.y_len
    }

    #[inline]
    fn bits_per_pixel(&self) -> u32 {
        self.source.bits_per_pixel()
    }

    #[inline]
    fn move_to(&mut self, x: i32, y: i32) {
        self.source.move_to(x + self.offset_x, y + self.offset_y);
    }

    #[inline]
    fn move_next_x(&mut self) {
        self.source.move_next_x();
    }

    #[inline]
    fn move_previous_x(&mut self) {
        self.source.move_previous_x();
    }

    #[inline]
    fn move_next_y(&mut self) {
        self.source.move_next_y();
    }

    #[inline]
    fn move_previous_y(&mut self) {
        self.source.move_previous_y();
    }

    #[inline]
    fn offset_x(&mut self, dx: i32) {
        self.source.offset_x(dx);
    }

    #[inline]
    fn offset_y(&mut self, dy: i32) {
        self.source.offset_y(dy);
    }

    #[inline]
    fn a(&mut self) -> u8 {
        self.source.a()
    }

    #[inline]
    fn r(&mut self) -> u8 {
        self.source.r()
    }

    #[inline]
    fn g(&mut self) -> u8 {
        self.source.g()
    }

    #[inline]
    fn b(&mut self) -> u8 {
        self.source.b()
    }

    #[inline]
    fn channels(&mut self) -> Rgba<u8> {
        self.source.channels()
    }

    #[inline]
    fn gray(&mut self) -> u8 {
        self.source.gray()
    }

    #[inline]
    fn override_with(&mut self, c: Rgba<u8>) -> Result<(), AdapterError> {
        self.source.override_with(c)
    }

    #[inline]
    fn overlay_with(&mut self, c: Rgba<u8>) -> Result<(), AdapterError> {
        self.source.overlay_with(c)
    }
}
