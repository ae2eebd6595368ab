//! Nearest-neighbor and bilinear resampling views.
//!
//! Output coordinate `o` maps to source coordinate `o * src_len / dst_len`
//! (top-left aligned). The integer part picks the sample, the remainder is
//! the bilinear weight. Stepping tracks the mapping exactly with an integer
//! remainder and only touches the wrapped adapter when the integer part
//! changes.

use core::marker::PhantomData;

use imgref::ImgRef;
use rgb::Rgba;

use crate::adapter::PixelAdapter;
use crate::error::AdapterError;
use crate::format::PixelFormat;
use crate::sample::{Stepper, bilinear, shift_x, shift_y};
use crate::source::{Raster, Source};

fn check_target(width: u32, height: u32) -> Result<(), AdapterError> {
    if width == 0 || height == 0 {
        return Err(AdapterError::InvalidArgument("resize target must not be empty"));
    }
    Ok(())
}

/// Shared cursor state of both resize adapters.
#[derive(Clone, Debug)]
struct Grid<A> {
    source: A,
    x: i32,
    y: i32,
    x_len: u32,
    y_len: u32,
    step_x: Stepper,
    step_y: Stepper,
}

impl<A> Grid<A> {
    fn new<P: PixelFormat>(mut source: A, width: u32, height: u32) -> Self
    where
        A: PixelAdapter<P>,
    {
        let step_x = Stepper::new(source.x_len(), width);
        let step_y = Stepper::new(source.y_len(), height);
        source.move_to(0, 0);
        Self {
            source,
            x: 0,
            y: 0,
            x_len: width,
            y_len: height,
            step_x,
            step_y,
        }
    }

    #[inline]
    fn move_to<P: PixelFormat>(&mut self, x: i32, y: i32)
    where
        A: PixelAdapter<P>,
    {
        self.x = x;
        self.y = y;
        let sx = self.step_x.seek(x);
        let sy = self.step_y.seek(y);
        self.source.move_to(sx, sy);
    }

    #[inline]
    fn offset_x<P: PixelFormat>(&mut self, dx: i32)
    where
        A: PixelAdapter<P>,
    {
        self.x += dx;
        let d = self.step_x.advance(dx);
        shift_x::<P, A>(&mut self.source, d);
    }

    #[inline]
    fn offset_y<P: PixelFormat>(&mut self, dy: i32)
    where
        A: PixelAdapter<P>,
    {
        self.y += dy;
        let d = self.step_y.advance(dy);
        shift_y::<P, A>(&mut self.source, d);
    }
}

macro_rules! grid_cursor {
    () => {
        #[inline]
        fn x(&self) -> i32 {
            self.grid.x
        }

        #[inline]
        fn y(&self) -> i32 {
            self.grid.y
        }

        #[inline]
        fn x_len(&self) -> u32 {
            self.grid.x_len
        }

        #[inline]
        fn y_len(&self) -> u32 {
            self.grid.y_len
        }

        #[inline]
        fn bits_per_pixel(&self) -> u32 {
            self.grid.source.bits_per_pixel()
        }

        #[inline]
        fn move_to(&mut self, x: i32, y: i32) {
            self.invalidate();
            self.grid.move_to::<P>(x, y);
        }

        #[inline]
        fn move_next_x(&mut self) {
            self.invalidate();
            self.grid.offset_x::<P>(1);
        }

        #[inline]
        fn move_previous_x(&mut self) {
            self.invalidate();
            self.grid.offset_x::<P>(-1);
        }

        #[inline]
        fn move_next_y(&mut self) {
            self.invalidate();
            self.grid.offset_y::<P>(1);
        }

        #[inline]
        fn move_previous_y(&mut self) {
            self.invalidate();
            self.grid.offset_y::<P>(-1);
        }

        #[inline]
        fn offset_x(&mut self, dx: i32) {
            self.invalidate();
            self.grid.offset_x::<P>(dx);
        }

        #[inline]
        fn offset_y(&mut self, dy: i32) {
            self.invalidate();
            self.grid.offset_y::<P>(dy);
        }
    };
}

/// Nearest-neighbor resize: each output pixel reads the source pixel at
/// the floor of its mapped coordinate. Read-only.
#[derive(Clone, Debug)]
pub struct NearestResize<P, A> {
    grid: Grid<A>,
    _format: PhantomData<fn() -> P>,
}

impl<P: PixelFormat, A: PixelAdapter<P>> NearestResize<P, A> {
    /// Resize `source` to `width × height`.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InvalidArgument`] if either target dimension is zero.
    pub fn new(source: A, width: u32, height: u32) -> Result<Self, AdapterError> {
        check_target(width, height)?;
        log::debug!(
            "nearest resize {}x{} -> {width}x{height}",
            source.x_len(),
            source.y_len()
        );
        Ok(Self {
            grid: Grid::new::<P>(source, width, height),
            _format: PhantomData,
        })
    }

    /// Release the wrapped adapter.
    pub fn into_inner(self) -> A {
        self.grid.source
    }

    #[inline]
    fn invalidate(&mut self) {}
}

impl<'a, P: PixelFormat> NearestResize<P, Source<ImgRef<'a, P>>> {
    /// Resize an image directly, owning a fresh source view over it.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InvalidArgument`] if either target dimension is zero.
    pub fn from_image(image: ImgRef<'a, P>, width: u32, height: u32) -> Result<Self, AdapterError> {
        Self::new(image.adapter(0, 0), width, height)
    }
}

impl<P: PixelFormat, A: PixelAdapter<P>> PixelAdapter<P> for NearestResize<P, A> {
    grid_cursor!();

    #[inline]
    fn a(&mut self) -> u8 {
        self.grid.source.a()
    }

    #[inline]
    fn r(&mut self) -> u8 {
        self.grid.source.r()
    }

    #[inline]
    fn g(&mut self) -> u8 {
        self.grid.source.g()
    }

    #[inline]
    fn b(&mut self) -> u8 {
        self.grid.source.b()
    }

    #[inline]
    fn channels(&mut self) -> Rgba<u8> {
        self.grid.source.channels()
    }

    fn override_with(&mut self, _c: Rgba<u8>) -> Result<(), AdapterError> {
        Err(AdapterError::unsupported("NearestResize", "override"))
    }

    fn overlay_with(&mut self, _c: Rgba<u8>) -> Result<(), AdapterError> {
        Err(AdapterError::unsupported("NearestResize", "overlay"))
    }
}

/// Bilinear resize: each output pixel blends the 2×2 source block at its
/// mapped coordinate. The blend is cached until the cursor moves. Read-only.
#[derive(Clone, Debug)]
pub struct BilinearResize<P, A> {
    grid: Grid<A>,
    cache: Option<Rgba<u8>>,
    _format: PhantomData<fn() -> P>,
}

impl<P: PixelFormat, A: PixelAdapter<P>> BilinearResize<P, A> {
    /// Resize `source` to `width × height`.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InvalidArgument`] if either target dimension is zero.
    pub fn new(source: A, width: u32, height: u32) -> Result<Self, AdapterError> {
        check_target(width, height)?;
        log::debug!(
            "bilinear resize {}x{} -> {width}x{height}, alpha: {}",
            source.x_len(),
            source.y_len(),
            P::HAS_ALPHA
        );
        Ok(Self {
            grid: Grid::new::<P>(source, width, height),
            cache: None,
            _format: PhantomData,
        })
    }

    /// Release the wrapped adapter.
    pub fn into_inner(self) -> A {
        self.grid.source
    }

    #[inline]
    fn invalidate(&mut self) {
        self.cache = None;
    }

    #[inline]
    fn current(&mut self) -> Rgba<u8> {
        if let Some(c) = self.cache {
            return c;
        }
        let g = &mut self.grid;
        let right = g.step_x.pos() + 1 < g.source.x_len() as i32;
        let below = g.step_y.pos() + 1 < g.source.y_len() as i32;
        let c = bilinear::<P, A>(
            &mut g.source,
            right,
            below,
            g.step_x.fraction(),
            g.step_y.fraction(),
            P::HAS_ALPHA,
        );
        self.cache = Some(c);
        c
    }
}

impl<'a, P: PixelFormat> BilinearResize<P, Source<ImgRef<'a, P>>> {
    /// Resize an image directly, owning a fresh source view over it.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InvalidArgument`] if either target dimension is zero.
    pub fn from_image(image: ImgRef<'a, P>, width: u32, height: u32) -> Result<Self, AdapterError> {
        Self::new(image.adapter(0, 0), width, height)
    }
}

impl<P: PixelFormat, A: PixelAdapter<P>> PixelAdapter<P> for BilinearResize<P, A> {
    grid_cursor!();

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

    fn override_with(&mut self, _c: Rgba<u8>) -> Result<(), AdapterError> {
        Err(AdapterError::unsupported("BilinearResize", "override"))
    }

    fn overlay_with(&mut self, _c: Rgba<u8>) -> Result<(), AdapterError> {
        Err(AdapterError::unsupported("BilinearResize", "overlay"))
    }
}
