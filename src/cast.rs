//! Pixel format conversion view.

use core::marker::PhantomData;

use imgref::ImgRef;
use rgb::Rgba;

use crate::adapter::PixelAdapter;
use crate::error::AdapterError;
use crate::format::{PixelFormat, blend_over};
use crate::source::{Raster, Source};

/// View of a `P` adapter as format `Q`.
///
/// Reads round-trip the source channels through `Q`, so a cast to
/// [`Gray`](rgb::Gray) reads luminance and a cast to an alpha-less format
/// reads opaque. Writes are normalized by `Q`'s rules before they reach the
/// source.
#[derive(Clone, Debug)]
pub struct Cast<P, Q, A> {
    source: A,
    cache: Option<Rgba<u8>>,
    _formats: PhantomData<fn() -> (P, Q)>,
}

impl<P: PixelFormat, Q: PixelFormat, A: PixelAdapter<P>> Cast<P, Q, A> {
    /// Reinterpret `source` as format `Q`.
    pub fn new(source: A) -> Self {
        Self {
            source,
            cache: None,
            _formats: PhantomData,
        }
    }

    /// Release the wrapped adapter.
    pub fn into_inner(self) -> A {
        self.source
    }

    #[inline]
    fn current(&mut self) -> Rgba<u8> {
        if let Some(c) = self.cache {
            return c;
        }
        let c = Q::from_channels(self.source.channels()).channels();
        self.cache = Some(c);
        c
    }
}

impl<'a, P: PixelFormat, Q: PixelFormat> Cast<P, Q, Source<ImgRef<'a, P>>> {
    /// Cast an image directly, owning a fresh source view over it.
    pub fn from_image(image: ImgRef<'a, P>) -> Self {
        Self::new(image.adapter(0, 0))
    }
}

impl<P: PixelFormat, Q: PixelFormat, A: PixelAdapter<P>> PixelAdapter<Q> for Cast<P, Q, A> {
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
        self.current().a
    }

    #[inline]
    fn r(&mut self) -> u8 {
        self.current().r
    }

    #[inline]
    fn g(&mut self) -> u8 {
        self.current().g
    }

    #[inline]
    fn b(&mut self) -> u8 {
        self.current().b
    }

    #[inline]
    fn channels(&mut self) -> Rgba<u8> {
        self.current()
    }

    fn override_with(&mut self, c: Rgba<u8>) -> Result<(), AdapterError> {
        self.cache = None;
        self.source.override_with(Q::from_channels(c).channels())
    }

    fn overlay_with(&mut self, c: Rgba<u8>) -> Result<(), AdapterError> {
        let blended = Q::from_channels(blend_over(self.current(), c)).channels();
        self.cache = None;
        self.source.override_with(blended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use imgref::ImgVec;
    use rgb::{Gray, Rgb};

    #[test]
    fn color_to_gray_reads_luma() {
        let img = ImgVec::new(vec![Rgb { r: 255u8, g: 0, b: 0 }, Rgb { r: 0, g: 255, b: 0 }], 2, 1);
        let mut cast: Cast<Rgb<u8>, Gray<u8>, _> = Cast::from_image(img.as_ref());
        assert_eq!(cast.channels(), Rgba { r: 77, g: 77, b: 77, a: 255 });
        cast.move_next_x();
        assert_eq!(cast.pixel(), Gray::new(150));
        assert_eq!(cast.gray(), 150);
    }

    #[test]
    fn rgba_to_rgb_drops_alpha() {
        let img = ImgVec::new(vec![Rgba { r: 1u8, g: 2, b: 3, a: 4 }], 1, 1);
        let mut cast: Cast<Rgba<u8>, Rgb<u8>, _> = Cast::from_image(img.as_ref());
        assert_eq!(cast.channels(), Rgba { r: 1, g: 2, b: 3, a: 255 });
    }

    #[test]
    fn writes_go_through_target_rules() {
        let mut img = ImgVec::new(vec![Rgb { r: 0u8, g: 0, b: 0 }; 2], 2, 1);
        {
            let mut cast: Cast<Rgb<u8>, Gray<u8>, _> = Cast::new(img.as_mut().adapter(0, 0));
            cast.override_with(Rgba { r: 255, g: 0, b: 0, a: 255 }).unwrap();
            cast.move_next_x();
            cast.overlay_with(Rgba { r: 255, g: 255, b: 255, a: 51 }).unwrap();
            assert_eq!(cast.r(), 51);
        }
        assert_eq!(img.buf()[0], Rgb { r: 77, g: 77, b: 77 });
        assert_eq!(img.buf()[1], Rgb { r: 51, g: 51, b: 51 });
    }

    #[test]
    fn read_only_source_still_rejects() {
        let img = ImgVec::new(vec![Gray::new(1u8)], 1, 1);
        let mut cast: Cast<Gray<u8>, Rgb<u8>, _> = Cast::from_image(img.as_ref());
        assert_eq!(
            cast.override_with(Rgba { r: 0, g: 0, b: 0, a: 255 }),
            Err(AdapterError::ReadOnlyImage)
        );
    }
}
