//! The cursor-bearing adapter contract.
//!
//! A [`PixelAdapter`] is a movable read/write cursor over a logical image
//! plane of fixed extent. Composite adapters wrap another adapter and remap
//! the cursor into it, recomputing channel values only when the cursor has
//! moved since the last read.
//!
//! ```text
//!   caller scan loop
//!        │ move_to / move_next_x / a() r() g() b() / override_to
//!        ▼
//!   Threshold ──▶ Crop ──▶ Flip ──▶ Source ──▶ ImgRef<P>
//! ```
//!
//! Adapters are single-owner objects: every move takes `&mut self`, and so
//! does every channel read because reads fill the lazy cache. Parallel scans
//! clone one chain per worker.

use alloc::boxed::Box;
use rgb::Rgba;

use crate::error::AdapterError;
use crate::format::{PixelFormat, to_gray};

/// A 2-D cursor over a lazily evaluated image view in pixel format `P`.
///
/// Channel reads always reflect the current cursor position. Moving to a
/// position and reading must give the same values as constructing the
/// adapter fresh and positioning it there directly, whichever sequence of
/// moves got the cursor there.
///
/// Positions outside `[0, x_len) × [0, y_len)` may be held transiently.
/// Reading there is only defined for the rotate adapters (which yield the
/// empty pixel); elsewhere it panics.
pub trait PixelAdapter<P: PixelFormat> {
    /// Current cursor column.
    fn x(&self) -> i32;

    /// Current cursor row.
    fn y(&self) -> i32;

    /// Logical width of this view.
    fn x_len(&self) -> u32;

    /// Logical height of this view.
    fn y_len(&self) -> u32;

    /// Storage size of one pixel of the innermost format.
    #[inline]
    fn bits_per_pixel(&self) -> u32 {
        P::BITS_PER_PIXEL
    }

    /// Absolute repositioning.
    fn move_to(&mut self, x: i32, y: i32);

    /// Step one column right.
    fn move_next_x(&mut self);

    /// Step one column left.
    fn move_previous_x(&mut self);

    /// Step one row down.
    fn move_next_y(&mut self);

    /// Step one row up.
    fn move_previous_y(&mut self);

    /// Relative horizontal jump; same result as `move_to(x + dx, y)`.
    fn offset_x(&mut self, dx: i32);

    /// Relative vertical jump; same result as `move_to(x, y + dy)`.
    fn offset_y(&mut self, dy: i32);

    /// Alpha of the current pixel.
    fn a(&mut self) -> u8;

    /// Red of the current pixel.
    fn r(&mut self) -> u8;

    /// Green of the current pixel.
    fn g(&mut self) -> u8;

    /// Blue of the current pixel.
    fn b(&mut self) -> u8;

    /// All four channels of the current pixel.
    #[inline]
    fn channels(&mut self) -> Rgba<u8> {
        Rgba {
            r: self.r(),
            g: self.g(),
            b: self.b(),
            a: self.a(),
        }
    }

    /// Current pixel in the adapter's format.
    #[inline]
    fn pixel(&mut self) -> P {
        P::from_channels(self.channels())
    }

    /// Luminance of the current pixel; gray formats pass through.
    #[inline]
    fn gray(&mut self) -> u8 {
        if P::IS_GRAY {
            self.r()
        } else {
            to_gray(self.r(), self.g(), self.b())
        }
    }

    /// Replace the pixel under the cursor.
    ///
    /// # Errors
    ///
    /// [`AdapterError::Unsupported`] on read-only adapters,
    /// [`AdapterError::ReadOnlyImage`] if the chain bottoms out in an
    /// immutable image. The image is left untouched in both cases.
    fn override_with(&mut self, c: Rgba<u8>) -> Result<(), AdapterError>;

    /// Source-over blend onto the pixel under the cursor.
    ///
    /// # Errors
    ///
    /// Same as [`override_with`](PixelAdapter::override_with).
    fn overlay_with(&mut self, c: Rgba<u8>) -> Result<(), AdapterError>;

    /// Write the current pixel into a caller-owned pixel slot.
    #[inline]
    fn override_to<Q: PixelFormat>(&mut self, dst: &mut Q)
    where
        Self: Sized,
    {
        dst.override_with(self.channels());
    }

    /// Blend the current pixel onto a caller-owned pixel slot.
    #[inline]
    fn overlay_to<Q: PixelFormat>(&mut self, dst: &mut Q)
    where
        Self: Sized,
    {
        dst.overlay_with(self.channels());
    }

    /// Write the current color channels into three separate plane slots.
    #[inline]
    fn override_to_planes(&mut self, r: &mut u8, g: &mut u8, b: &mut u8) {
        *r = self.r();
        *g = self.g();
        *b = self.b();
    }

    /// Write all four channels into separate plane slots.
    #[inline]
    fn override_to_planes_alpha(&mut self, a: &mut u8, r: &mut u8, g: &mut u8, b: &mut u8) {
        *a = self.a();
        self.override_to_planes(r, g, b);
    }

    /// Blend the current pixel onto opaque plane slots.
    #[inline]
    fn overlay_to_planes(&mut self, r: &mut u8, g: &mut u8, b: &mut u8) {
        let dst = Rgba {
            r: *r,
            g: *g,
            b: *b,
            a: 255,
        };
        let out = crate::format::blend_over(dst, self.channels());
        *r = out.r;
        *g = out.g;
        *b = out.b;
    }

    /// Blend the current pixel onto plane slots that carry alpha.
    #[inline]
    fn overlay_to_planes_alpha(&mut self, a: &mut u8, r: &mut u8, g: &mut u8, b: &mut u8) {
        let dst = Rgba {
            r: *r,
            g: *g,
            b: *b,
            a: *a,
        };
        let out = crate::format::blend_over(dst, self.channels());
        *a = out.a;
        *r = out.r;
        *g = out.g;
        *b = out.b;
    }
}

macro_rules! forward_adapter {
    () => {
        #[inline]
        fn x(&self) -> i32 {
            (**self).x()
        }
        #[inline]
        fn y(&self) -> i32 {
            (**self).y()
        }
        #[inline]
        fn x_len(&self) -> u32 {
            (**self).x_len()
        }
        #[inline]
        fn y_len(&self) -> u32 {
            (**self).y_len()
        }
        #[inline]
        fn bits_per_pixel(&self) -> u32 {
            (**self).bits_per_pixel()
        }
        #[inline]
        fn move_to(&mut self, x: i32, y: i32) {
            (**self).move_to(x, y)
        }
        #[inline]
        fn move_next_x(&mut self) {
            (**self).move_next_x()
        }
        #[inline]
        fn move_previous_x(&mut self) {
            (**self).move_previous_x()
        }
        #[inline]
        fn move_next_y(&mut self) {
            (**self).move_next_y()
        }
        #[inline]
        fn move_previous_y(&mut self) {
            (**self).move_previous_y()
        }
        #[inline]
        fn offset_x(&mut self, dx: i32) {
            (**self).offset_x(dx)
        }
        #[inline]
        fn offset_y(&mut self, dy: i32) {
            (**self).offset_y(dy)
        }
        #[inline]
        fn a(&mut self) -> u8 {
            (**self).a()
        }
        #[inline]
        fn r(&mut self) -> u8 {
            (**self).r()
        }
        #[inline]
        fn g(&mut self) -> u8 {
            (**self).g()
        }
        #[inline]
        fn b(&mut self) -> u8 {
            (**self).b()
        }
        #[inline]
        fn channels(&mut self) -> Rgba<u8> {
            (**self).channels()
        }
        #[inline]
        fn gray(&mut self) -> u8 {
            (**self).gray()
        }
        #[inline]
        fn override_with(&mut self, c: Rgba<u8>) -> Result<(), AdapterError> {
            (**self).override_with(c)
        }
        #[inline]
        fn overlay_with(&mut self, c: Rgba<u8>) -> Result<(), AdapterError> {
            (**self).overlay_with(c)
        }
    };
}

/// Borrowing constructor shape: a composite built over `&mut inner` drives
/// the caller's adapter without taking ownership of it.
impl<P: PixelFormat, A: PixelAdapter<P> + ?Sized> PixelAdapter<P> for &mut A {
    forward_adapter!();
}

/// Dynamically composed chains.
impl<P: PixelFormat, A: PixelAdapter<P> + ?Sized> PixelAdapter<P> for Box<A> {
    forward_adapter!();
}
