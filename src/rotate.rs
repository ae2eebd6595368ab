//! Rotated views over another adapter.
//!
//! The output plane is the axis-aligned bounding box of the rotated source,
//! so nothing is clipped. Output pixel centers map to source coordinates
//! through the inverse rotation about both centers; the mapped coordinate is
//! tracked incrementally, one rotation-matrix column per step. Coordinates
//! that land outside the source read as the empty pixel (all channels zero).

use core::marker::PhantomData;

use imgref::ImgRef;
use rgb::Rgba;

use crate::adapter::PixelAdapter;
use crate::error::AdapterError;
use crate::format::{EMPTY, PixelFormat};
use crate::sample::{bilinear, shift_x, shift_y};
use crate::source::{Raster, Source};

/// Tolerance for snapping accumulated coordinates onto the half-pixel grid.
const SNAP: f64 = 1e-9;

/// Pull `v` onto the nearest multiple of 0.5 when it is within [`SNAP`], so
/// floor and round agree between stepped and freshly positioned cursors.
#[inline]
fn snap(v: f64) -> f64 {
    let r = libm::round(v * 2.0) / 2.0;
    if libm::fabs(v - r) < SNAP { r } else { v }
}

/// `(sin, cos)` of `degrees`, exact at multiples of 90.
fn sin_cos(degrees: f64) -> (f64, f64) {
    let mut turn = degrees % 360.0;
    if turn < 0.0 {
        turn += 360.0;
    }
    if turn == 0.0 {
        (0.0, 1.0)
    } else if turn == 90.0 {
        (1.0, 0.0)
    } else if turn == 180.0 {
        (0.0, -1.0)
    } else if turn == 270.0 {
        (-1.0, 0.0)
    } else {
        let rad = turn.to_radians();
        (libm::sin(rad), libm::cos(rad))
    }
}

/// Cursor and coordinate state shared by both rotate adapters.
#[derive(Clone, Debug)]
struct Rotation<A> {
    source: A,
    x: i32,
    y: i32,
    x_len: u32,
    y_len: u32,
    src_w: i32,
    src_h: i32,
    sin: f64,
    cos: f64,
    // Mapped source coordinate of the cursor.
    sx: f64,
    sy: f64,
}

impl<A> Rotation<A> {
    fn new<P: PixelFormat>(source: A, degrees: f64) -> Result<Self, AdapterError>
    where
        A: PixelAdapter<P>,
    {
        if !degrees.is_finite() {
            return Err(AdapterError::InvalidArgument("rotation angle must be finite"));
        }
        let (sin, cos) = sin_cos(degrees);
        let w = source.x_len() as f64;
        let h = source.y_len() as f64;
        let (abs_sin, abs_cos) = (libm::fabs(sin), libm::fabs(cos));
        let x_len = libm::ceil(w * abs_cos + h * abs_sin - SNAP) as u32;
        let y_len = libm::ceil(w * abs_sin + h * abs_cos - SNAP) as u32;
        let mut rotation = Self {
            src_w: source.x_len() as i32,
            src_h: source.y_len() as i32,
            source,
            x: 0,
            y: 0,
            x_len,
            y_len,
            sin,
            cos,
            sx: 0.0,
            sy: 0.0,
        };
        rotation.move_to(0, 0);
        Ok(rotation)
    }

    fn move_to(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
        let ox = x as f64 - (self.x_len as f64 - 1.0) / 2.0;
        let oy = y as f64 - (self.y_len as f64 - 1.0) / 2.0;
        self.sx = ox * self.cos + oy * self.sin + (self.src_w as f64 - 1.0) / 2.0;
        self.sy = -ox * self.sin + oy * self.cos + (self.src_h as f64 - 1.0) / 2.0;
    }

    #[inline]
    fn offset_x(&mut self, dx: i32) {
        self.x += dx;
        let d = dx as f64;
        self.sx += d * self.cos;
        self.sy -= d * self.sin;
    }

    #[inline]
    fn offset_y(&mut self, dy: i32) {
        self.y += dy;
        let d = dy as f64;
        self.sx += d * self.sin;
        self.sy += d * self.cos;
    }

    #[inline]
    fn inside(&self, ix: i32, iy: i32) -> bool {
        ix >= 0 && iy >= 0 && ix < self.src_w && iy < self.src_h
    }

    /// Point the wrapped adapter at `(ix, iy)` by relative steps.
    #[inline]
    fn seek_source<P: PixelFormat>(&mut self, ix: i32, iy: i32)
    where
        A: PixelAdapter<P>,
    {
        let dx = ix - self.source.x();
        let dy = iy - self.source.y();
        shift_x::<P, A>(&mut self.source, dx);
        shift_y::<P, A>(&mut self.source, dy);
    }
}

macro_rules! rotation_cursor {
    () => {
        #[inline]
        fn x(&self) -> i32 {
            self.rotation.x
        }

        #[inline]
        fn y(&self) -> i32 {
            self.rotation.y
        }

        #[inline]
        fn x_len(&self) -> u32 {
            self.rotation.x_len
        }

        #[inline]
        fn y_len(&self) -> u32 {
            self.rotation.y_len
        }

        #[inline]
        fn bits_per_pixel(&self) -> u32 {
            self.rotation.source.bits_per_pixel()
        }

        #[inline]
        fn move_to(&mut self, x: i32, y: i32) {
            self.cache = None;
            self.rotation.move_to(x, y);
        }

        #[inline]
        fn move_next_x(&mut self) {
            self.cache = None;
            self.rotation.offset_x(1);
        }

        #[inline]
        fn move_previous_x(&mut self) {
            self.cache = None;
            self.rotation.offset_x(-1);
        }

        #[inline]
        fn move_next_y(&mut self) {
            self.cache = None;
            self.rotation.offset_y(1);
        }

        #[inline]
        fn move_previous_y(&mut self) {
            self.cache = None;
            self.rotation.offset_y(-1);
        }

        #[inline]
        fn offset_x(&mut self, dx: i32) {
            self.cache = None;
            self.rotation.offset_x(dx);
        }

        #[inline]
        fn offset_y(&mut self, dy: i32) {
            self.cache = None;
            self.rotation.offset_y(dy);
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
    };
}

/// Rotation sampling the source pixel nearest to the mapped coordinate.
/// Read-only.
#[derive(Clone, Debug)]
pub struct NearestRotate<P, A> {
    rotation: Rotation<A>,
    cache: Option<Rgba<u8>>,
    _format: PhantomData<fn() -> P>,
}

impl<P: PixelFormat, A: PixelAdapter<P>> NearestRotate<P, A> {
    /// Rotate `source` clockwise by `degrees`.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InvalidArgument`] if `degrees` is not finite.
    pub fn new(source: A, degrees: f64) -> Result<Self, AdapterError> {
        let rotation = Rotation::new::<P>(source, degrees)?;
        log::debug!(
            "nearest rotate {degrees} deg: {}x{} -> {}x{}",
            rotation.src_w,
            rotation.src_h,
            rotation.x_len,
            rotation.y_len
        );
        Ok(Self {
            rotation,
            cache: None,
            _format: PhantomData,
        })
    }

    /// Release the wrapped adapter.
    pub fn into_inner(self) -> A {
        self.rotation.source
    }

    fn current(&mut self) -> Rgba<u8> {
        if let Some(c) = self.cache {
            return c;
        }
        let rot = &mut self.rotation;
        let ix = libm::round(snap(rot.sx)) as i32;
        let iy = libm::round(snap(rot.sy)) as i32;
        let c = if rot.inside(ix, iy) {
            rot.seek_source::<P>(ix, iy);
            rot.source.channels()
        } else {
            EMPTY
        };
        self.cache = Some(c);
        c
    }
}

impl<'a, P: PixelFormat> NearestRotate<P, Source<ImgRef<'a, P>>> {
    /// Rotate an image directly, owning a fresh source view over it.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InvalidArgument`] if `degrees` is not finite.
    pub fn from_image(image: ImgRef<'a, P>, degrees: f64) -> Result<Self, AdapterError> {
        Self::new(image.adapter(0, 0), degrees)
    }
}

impl<P: PixelFormat, A: PixelAdapter<P>> PixelAdapter<P> for NearestRotate<P, A> {
    rotation_cursor!();

    fn override_with(&mut self, _c: Rgba<u8>) -> Result<(), AdapterError> {
        Err(AdapterError::unsupported("NearestRotate", "override"))
    }

    fn overlay_with(&mut self, _c: Rgba<u8>) -> Result<(), AdapterError> {
        Err(AdapterError::unsupported("NearestRotate", "overlay"))
    }
}

/// Rotation blending the 2×2 source block under the mapped coordinate.
/// Read-only.
#[derive(Clone, Debug)]
pub struct BilinearRotate<P, A> {
    rotation: Rotation<A>,
    cache: Option<Rgba<u8>>,
    _format: PhantomData<fn() -> P>,
}

impl<P: PixelFormat, A: PixelAdapter<P>> BilinearRotate<P, A> {
    /// Rotate `source` clockwise by `degrees`.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InvalidArgument`] if `degrees` is not finite.
    pub fn new(source: A, degrees: f64) -> Result<Self, AdapterError> {
        let rotation = Rotation::new::<P>(source, degrees)?;
        log::debug!(
            "bilinear rotate {degrees} deg: {}x{} -> {}x{}, alpha: {}",
            rotation.src_w,
            rotation.src_h,
            rotation.x_len,
            rotation.y_len,
            P::HAS_ALPHA
        );
        Ok(Self {
            rotation,
            cache: None,
            _format: PhantomData,
        })
    }

    /// Release the wrapped adapter.
    pub fn into_inner(self) -> A {
        self.rotation.source
    }

    fn current(&mut self) -> Rgba<u8> {
        if let Some(c) = self.cache {
            return c;
        }
        let rot = &mut self.rotation;
        let sx = snap(rot.sx);
        let sy = snap(rot.sy);
        let fx0 = libm::floor(sx);
        let fy0 = libm::floor(sy);
        let (ix, iy) = (fx0 as i32, fy0 as i32);
        // Emptiness is decided by the floor sample alone.
        let c = if rot.inside(ix, iy) {
            rot.seek_source::<P>(ix, iy);
            let right = ix + 1 < rot.src_w;
            let below = iy + 1 < rot.src_h;
            bilinear::<P, A>(
                &mut rot.source,
                right,
                below,
                (sx - fx0) as f32,
                (sy - fy0) as f32,
                P::HAS_ALPHA,
            )
        } else {
            EMPTY
        };
        self.cache = Some(c);
        c
    }
}

impl<'a, P: PixelFormat> BilinearRotate<P, Source<ImgRef<'a, P>>> {
    /// Rotate an image directly, owning a fresh source view over it.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InvalidArgument`] if `degrees` is not finite.
    pub fn from_image(image: ImgRef<'a, P>, degrees: f64) -> Result<Self, AdapterError> {
        Self::new(image.adapter(0, 0), degrees)
    }
}

impl<P: PixelFormat, A: PixelAdapter<P>> PixelAdapter<P> for BilinearRotate<P, A> {
    rotation_cursor!();

    fn override_with(&mut self, _c: Rgba<u8>) -> Result<(), AdapterError> {
        Err(AdapterError::unsupported("BilinearRotate", "override"))
    }

    fn overlay_with(&mut self, _c: Rgba<u8>) -> Result<(), AdapterError> {
        Err(AdapterError::unsupported("BilinearRotate", "overlay"))
    }
}
