//! Contrast adjustment around mid-gray.

use core::marker::PhantomData;

use imgref::ImgRef;
use rgb::Rgba;

use crate::adapter::PixelAdapter;
use crate::error::AdapterError;
use crate::format::PixelFormat;
use crate::source::{Raster, Source};

/// Lazily filled `u8 → u8` table for one contrast factor.
///
/// Each entry is computed on first lookup as
/// `clamp((v - 127.5) * contrast + 127.5, 0, 255)`, truncated toward zero,
/// and served from the table afterwards.
#[derive(Clone, Debug)]
pub struct ContrastTable {
    contrast: f32,
    values: [u8; 256],
    filled: [bool; 256],
}

impl ContrastTable {
    /// Empty table for `contrast`.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InvalidArgument`] if `contrast` is not finite.
    pub fn new(contrast: f32) -> Result<Self, AdapterError> {
        if !contrast.is_finite() {
            return Err(AdapterError::InvalidArgument("contrast must be finite"));
        }
        Ok(Self {
            contrast,
            values: [0; 256],
            filled: [false; 256],
        })
    }

    /// The contrast factor.
    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    /// Adjusted value for `v`.
    #[inline]
    pub fn get(&mut self, v: u8) -> u8 {
        let i = v as usize;
        if !self.filled[i] {
            self.values[i] = adjust(v, self.contrast);
            self.filled[i] = true;
        }
        self.values[i]
    }
}

#[inline]
fn adjust(v: u8, contrast: f32) -> u8 {
    ((v as f32 - 127.5) * contrast + 127.5).clamp(0.0, 255.0) as u8
}

/// Per-channel contrast adjustment. Alpha is passed through. Read-only.
#[derive(Clone, Debug)]
pub struct AdjustContrast<P, A> {
    source: A,
    table: ContrastTable,
    cache: Option<Rgba<u8>>,
    _format: PhantomData<fn() -> P>,
}

impl<P: PixelFormat, A: PixelAdapter<P>> AdjustContrast<P, A> {
    /// Scale `source`'s distance from mid-gray by `contrast`.
    ///
    /// `1.0` is the identity, values below `1.0` flatten, negative values
    /// invert.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InvalidArgument`] if `contrast` is not finite.
    pub fn new(source: A, contrast: f32) -> Result<Self, AdapterError> {
        Ok(Self {
            source,
            table: ContrastTable::new(contrast)?,
            cache: None,
            _format: PhantomData,
        })
    }

    /// The contrast factor.
    pub fn contrast(&self) -> f32 {
        self.table.contrast()
    }

    /// Release the wrapped adapter.
    pub fn into_inner(self) -> A {
        self.source
    }

    fn current(&mut self) -> Rgba<u8> {
        if let Some(c) = self.cache {
            return c;
        }
        let src = self.source.channels();
        let c = if P::IS_GRAY {
            let v = self.table.get(src.r);
            Rgba {
                r: v,
                g: v,
                b: v,
                a: src.a,
            }
        } else {
            Rgba {
                r: self.table.get(src.r),
                g: self.table.get(src.g),
                b: self.table.get(src.b),
                a: src.a,
            }
        };
        self.cache = Some(c);
        c
    }
}

impl<'a, P: PixelFormat> AdjustContrast<P, Source<ImgRef<'a, P>>> {
    /// Adjust an image directly, owning a fresh source view over it.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InvalidArgument`] if `contrast` is not finite.
    pub fn from_image(image: ImgRef<'a, P>, contrast: f32) -> Result<Self, AdapterError> {
        Self::new(image.adapter(0, 0), contrast)
    }
}

impl<P: PixelFormat, A: PixelAdapter<P>> PixelAdapter<P> for AdjustContrast<P, A> {
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

    fn override_with(&mut self, _c: Rgba<u8>) -> Result<(), AdapterError> {
        Err(AdapterError::unsupported("AdjustContrast", "override"))
    }

    fn overlay_with(&mut self, _c: Rgba<u8>) -> Result<(), AdapterError> {
        Err(AdapterError::unsupported("AdjustContrast", "overlay"))
    }
}
