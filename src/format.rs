//! Pixel format capabilities.
//!
//! Adapters never look at the memory layout of a pixel. They talk to it
//! through [`PixelFormat`], which exposes the A/R/G/B channels as a
//! [`Rgba<u8>`] carrier plus the gray conversion and write rules of the
//! format. Implementations are provided for the 8-bit pixel types of the
//! `rgb` crate.

use rgb::alt::{BGR, BGRA, GrayAlpha};
use rgb::{Gray, Rgb, Rgba};

/// Channel-level view of an 8-bit pixel type.
///
/// Formats without an alpha channel report `a == 255` and drop alpha on
/// write. Gray formats report `r == g == b`.
pub trait PixelFormat: Copy + 'static {
    /// Storage size of one pixel in bits.
    const BITS_PER_PIXEL: u32;
    /// Whether the format stores an alpha channel.
    const HAS_ALPHA: bool;
    /// Whether the format stores a single luminance channel.
    const IS_GRAY: bool;

    /// All four channels of this pixel.
    fn channels(self) -> Rgba<u8>;

    /// Build a pixel of this format from channel values.
    fn from_channels(c: Rgba<u8>) -> Self;

    /// Luminance of this pixel.
    #[inline]
    fn to_gray(self) -> u8 {
        let c = self.channels();
        to_gray(c.r, c.g, c.b)
    }

    /// Replace this pixel with the given channels.
    #[inline]
    fn override_with(&mut self, c: Rgba<u8>) {
        *self = Self::from_channels(c);
    }

    /// Source-over blend the given channels onto this pixel.
    #[inline]
    fn overlay_with(&mut self, c: Rgba<u8>) {
        *self = Self::from_channels(blend_over(self.channels(), c));
    }
}

/// Integer luma: `(30 R + 59 G + 11 B) / 100`, rounded.
#[inline]
pub const fn to_gray(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 30 + g as u32 * 59 + b as u32 * 11 + 50) / 100) as u8
}

/// Source-over composite of `src` onto `dst`, both straight alpha.
///
/// Opaque sources replace `dst`; fully transparent sources leave it as is.
#[inline]
pub fn blend_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    match src.a {
        0 => dst,
        255 => src,
        a => {
            let a = a as u32;
            let rev = 255 - a;
            let da = dst.a as u32;
            // Output alpha scaled by 255; never zero because a > 0.
            let alpha = 65025 - rev * (255 - da);
            let mix = |s: u8, d: u8| ((s as u32 * a * 255 + d as u32 * da * rev) / alpha) as u8;
            Rgba {
                r: mix(src.r, dst.r),
                g: mix(src.g, dst.g),
                b: mix(src.b, dst.b),
                a: (alpha / 255) as u8,
            }
        }
    }
}

/// Channels of an opaque gray level.
#[inline]
pub(crate) const fn gray_channels(v: u8) -> Rgba<u8> {
    Rgba {
        r: v,
        g: v,
        b: v,
        a: 255,
    }
}

/// Channels of the empty pixel: everything zero, including alpha.
pub(crate) const EMPTY: Rgba<u8> = Rgba {
    r: 0,
    g: 0,
    b: 0,
    a: 0,
};

impl PixelFormat for Gray<u8> {
    const BITS_PER_PIXEL: u32 = 8;
    const HAS_ALPHA: bool = false;
    const IS_GRAY: bool = true;

    #[inline]
    fn channels(self) -> Rgba<u8> {
        gray_channels(self.value())
    }

    #[inline]
    fn from_channels(c: Rgba<u8>) -> Self {
        Gray::new(to_gray(c.r, c.g, c.b))
    }

    #[inline]
    fn to_gray(self) -> u8 {
        self.value()
    }
}

impl PixelFormat for GrayAlpha<u8> {
    const BITS_PER_PIXEL: u32 = 16;
    const HAS_ALPHA: bool = true;
    const IS_GRAY: bool = true;

    #[inline]
    fn channels(self) -> Rgba<u8> {
        Rgba {
            r: self.v,
            g: self.v,
            b: self.v,
            a: self.a,
        }
    }

    #[inline]
    fn from_channels(c: Rgba<u8>) -> Self {
        GrayAlpha::new(to_gray(c.r, c.g, c.b), c.a)
    }

    #[inline]
    fn to_gray(self) -> u8 {
        self.v
    }
}

impl PixelFormat for Rgb<u8> {
    const BITS_PER_PIXEL: u32 = 24;
    const HAS_ALPHA: bool = false;
    const IS_GRAY: bool = false;

    #[inline]
    fn channels(self) -> Rgba<u8> {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a: 255,
        }
    }

    #[inline]
    fn from_channels(c: Rgba<u8>) -> Self {
        Rgb {
            r: c.r,
            g: c.g,
            b: c.b,
        }
    }
}

impl PixelFormat for BGR<u8> {
    const BITS_PER_PIXEL: u32 = 24;
    const HAS_ALPHA: bool = false;
    const IS_GRAY: bool = false;

    #[inline]
    fn channels(self) -> Rgba<u8> {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a: 255,
        }
    }

    #[inline]
    fn from_channels(c: Rgba<u8>) -> Self {
        BGR {
            b: c.b,
            g: c.g,
            r: c.r,
        }
    }
}

impl PixelFormat for Rgba<u8> {
    const BITS_PER_PIXEL: u32 = 32;
    const HAS_ALPHA: bool = true;
    const IS_GRAY: bool = false;

    #[inline]
    fn channels(self) -> Rgba<u8> {
        self
    }

    #[inline]
    fn from_channels(c: Rgba<u8>) -> Self {
        c
    }
}

impl PixelFormat for BGRA<u8> {
    const BITS_PER_PIXEL: u32 = 32;
    const HAS_ALPHA: bool = true;
    const IS_GRAY: bool = false;

    #[inline]
    fn channels(self) -> Rgba<u8> {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a: self.a,
        }
    }

    #[inline]
    fn from_channels(c: Rgba<u8>) -> Self {
        BGRA {
            b: c.b,
            g: c.g,
            r: c.r,
            a: c.a,
        }
    }
}
