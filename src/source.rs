//! Leaf adapters bound to raster storage.
//!
//! [`Raster`] is the whole contract the pipeline needs from pixel storage:
//! extent, per-pixel read, and optional per-pixel write. It is implemented
//! for [`ImgRef`] (shared, read-only, cheap to copy) and [`ImgRefMut`]
//! (exclusive, writable). Every adapter chain bottoms out in a [`Source`].

use imgref::{Img, ImgRef, ImgRefMut};
use rgb::Rgba;

use crate::adapter::PixelAdapter;
use crate::error::AdapterError;
use crate::format::PixelFormat;

/// Pixel storage an adapter chain can be bound to.
pub trait Raster<P: PixelFormat> {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Storage size of one pixel.
    #[inline]
    fn bits_per_pixel(&self) -> u32 {
        P::BITS_PER_PIXEL
    }

    /// Pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the position lies outside the backing buffer.
    fn get(&self, x: usize, y: usize) -> P;

    /// Mutable pixel at `(x, y)`, or `None` for read-only storage.
    fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut P>;

    /// Bind a fresh source adapter positioned at `(x, y)`.
    fn adapter(self, x: i32, y: i32) -> Source<Self>
    where
        Self: Sized,
    {
        Source::new(self, x, y)
    }
}

impl<P: PixelFormat> Raster<P> for ImgRef<'_, P> {
    #[inline]
    fn width(&self) -> u32 {
        Img::width(self) as u32
    }

    #[inline]
    fn height(&self) -> u32 {
        Img::height(self) as u32
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> P {
        debug_assert!(x < Img::width(self), "column {x} outside image");
        self.buf()[y * self.stride() + x]
    }

    #[inline]
    fn get_mut(&mut self, _x: usize, _y: usize) -> Option<&mut P> {
        None
    }
}

impl<P: PixelFormat> Raster<P> for ImgRefMut<'_, P> {
    #[inline]
    fn width(&self) -> u32 {
        Img::width(self) as u32
    }

    #[inline]
    fn height(&self) -> u32 {
        Img::height(self) as u32
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> P {
        debug_assert!(x < Img::width(self), "column {x} outside image");
        self.buf()[y * self.stride() + x]
    }

    #[inline]
    fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut P> {
        debug_assert!(x < Img::width(self), "column {x} outside image");
        let stride = self.stride();
        Some(&mut self.buf_mut()[y * stride + x])
    }
}

/// Leaf adapter reading and writing a [`Raster`] directly.
///
/// Holds no cache: every channel read goes to storage. `Source<ImgRef<_>>`
/// is `Clone` and shares the borrowed pixels; `Source<ImgRefMut<_>>` is
/// exclusive.
#[derive(Clone, Debug)]
pub struct Source<R> {
    image: R,
    x: i32,
    y: i32,
}

impl<R> Source<R> {
    /// Bind `image` with the cursor at `(x, y)`.
    pub fn new(image: R, x: i32, y: i32) -> Self {
        Self { image, x, y }
    }

    /// Borrow the underlying storage.
    pub fn image(&self) -> &R {
        &self.image
    }

    /// Release the underlying storage.
    pub fn into_inner(self) -> R {
        self.image
    }

    #[inline]
    fn read<P: PixelFormat>(&self) -> P
    where
        R: Raster<P>,
    {
        self.image.get(self.x as usize, self.y as usize)
    }
}

impl<P: PixelFormat, R: Raster<P>> PixelAdapter<P> for Source<R> {
    #[inline]
    fn x(&self) -> i32 {
        self.x
    }

    #[inline]
    fn y(&self) -> i32 {
        self.y
    }

    #[inline]
    fn x_len(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    fn y_len(&self) -> u32 {
        self.image.height()
    }

    #[inline]
    fn bits_per_pixel(&self) -> u32 {
        self.image.bits_per_pixel()
    }

    #[inline]
    fn move_to(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    #[inline]
    fn move_next_x(&mut self) {
        self.x += 1;
    }

    #[inline]
    fn move_previous_x(&mut self) {
        self.x -= 1;
    }

    #[inline]
    fn move_next_y(&mut self) {
        self.y += 1;
    }

    #[inline]
    fn move_previous_y(&mut self) {
        self.y -= 1;
    }

    #[inline]
    fn offset_x(&mut self, dx: i32) {
        self.x += dx;
    }

    #[inline]
    fn offset_y(&mut self, dy: i32) {
        self.y += dy;
    }

    #[inline]
    fn a(&mut self) -> u8 {
        self.read::<P>().channels().a
    }

    #[inline]
    fn r(&mut self) -> u8 {
        self.read::<P>().channels().r
    }

    #[inline]
    fn g(&mut self) -> u8 {
        self.read::<P>().channels().g
    }

    #[inline]
    fn b(&mut self) -> u8 {
        self.read::<P>().channels().b
    }

    #[inline]
    fn channels(&mut self) -> Rgba<u8> {
        self.read::<P>().channels()
    }

    #[inline]
    fn pixel(&mut self) -> P {
        self.read()
    }

    #[inline]
    fn gray(&mut self) -> u8 {
        self.read::<P>().to_gray()
    }

    fn override_with(&mut self, c: Rgba<u8>) -> Result<(), AdapterError> {
        let px = self
            .image
            .get_mut(self.x as usize, self.y as usize)
            .ok_or(AdapterError::ReadOnlyImage)?;
        px.override_with(c);
        Ok(())
    }

    fn overlay_with(&mut self, c: Rgba<u8>) -> Result<(), AdapterError> {
        let px = self
            .image
            .get_mut(self.x as usize, self.y as usize)
            .ok_or(AdapterError::ReadOnlyImage)?;
        px.overlay_with(c);
        Ok(())
    }
}
