//! Generic neighborhood filtering.
//!
//! A [`Filter`] adapter keeps a [`Patch`] around its cursor and asks an
//! [`ImageFilter`] strategy for the output pixel. The strategy also receives
//! an [`ImageFilterArgs`] that persists between evaluations: it says how the
//! patch moved since the previous call and carries scratch space the
//! strategy may use for running state.

use core::marker::PhantomData;

use alloc::vec::Vec;

use imgref::ImgRef;
use rgb::Rgba;

use crate::adapter::PixelAdapter;
use crate::error::AdapterError;
use crate::format::PixelFormat;
use crate::limits::Limits;
use crate::patch::Patch;
use crate::source::{Raster, Source};

/// How the patch got to its current position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatchMotion {
    /// The patch was read from scratch; any running state is stale.
    Fresh,
    /// The patch moved one column right of the previous evaluation.
    Right,
    /// The patch moved one column left of the previous evaluation.
    Left,
}

/// Per-adapter state handed to every [`ImageFilter::filter`] call.
#[derive(Clone, Debug)]
pub struct ImageFilterArgs {
    x: i32,
    y: i32,
    motion: PatchMotion,
    /// Strategy-owned running state. Emptied whenever the patch is refilled.
    pub scratch: Vec<i64>,
}

impl ImageFilterArgs {
    fn new() -> Self {
        Self {
            x: 0,
            y: 0,
            motion: PatchMotion::Fresh,
            scratch: Vec::new(),
        }
    }

    /// Cursor column of the evaluation.
    #[inline]
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Cursor row of the evaluation.
    #[inline]
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Movement since the previous evaluation.
    #[inline]
    pub fn motion(&self) -> PatchMotion {
        self.motion
    }
}

/// Filter strategy evaluated over a neighborhood patch.
pub trait ImageFilter {
    /// Width of the patch the filter needs.
    fn patch_width(&self) -> u32;

    /// Height of the patch the filter needs.
    fn patch_height(&self) -> u32;

    /// Output pixel for the patch centered on the cursor.
    fn filter(&self, patch: &Patch, args: &mut ImageFilterArgs) -> Rgba<u8>;
}

/// Read-only view applying an [`ImageFilter`] at every position.
#[derive(Clone, Debug)]
pub struct Filter<P, A, F> {
    source: A,
    filter: F,
    patch: Patch,
    args: ImageFilterArgs,
    // Center of the patch contents, if still usable.
    patch_at: Option<(i32, i32)>,
    cache: Option<Rgba<u8>>,
    _format: PhantomData<fn() -> P>,
}

impl<P: PixelFormat, A: PixelAdapter<P>, F: ImageFilter> Filter<P, A, F> {
    /// Apply `filter` over `source`.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InvalidArgument`] if the filter asks for an empty patch.
    pub fn new(source: A, filter: F) -> Result<Self, AdapterError> {
        Self::with_limits(source, filter, &Limits::none())
    }

    /// Apply `filter` over `source`, rejecting patches larger than `limits`
    /// allow.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InvalidArgument`] for an empty patch,
    /// [`AdapterError::Limit`] for an oversized one.
    pub fn with_limits(source: A, filter: F, limits: &Limits) -> Result<Self, AdapterError> {
        let (w, h) = (filter.patch_width(), filter.patch_height());
        if w == 0 || h == 0 {
            return Err(AdapterError::InvalidArgument("filter patch must not be empty"));
        }
        limits.check_patch(w, h)?;
        log::debug!(
            "filter with {w}x{h} patch over {}x{}",
            source.x_len(),
            source.y_len()
        );
        Ok(Self {
            source,
            filter,
            patch: Patch::new(w, h),
            args: ImageFilterArgs::new(),
            patch_at: None,
            cache: None,
            _format: PhantomData,
        })
    }

    /// The filter strategy.
    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Release the wrapped adapter.
    pub fn into_inner(self) -> A {
        self.source
    }

    #[inline]
    fn invalidate_all(&mut self) {
        self.cache = None;
        self.patch_at = None;
    }

    fn current(&mut self) -> Rgba<u8> {
        if let Some(c) = self.cache {
            return c;
        }
        let (x, y) = (self.source.x(), self.source.y());
        let motion = match self.patch_at {
            Some((px, py)) if py == y && px + 1 == x => {
                self.patch.slide_right::<P, A>(&mut self.source, x, y);
                PatchMotion::Right
            }
            Some((px, py)) if py == y && px - 1 == x => {
                self.patch.slide_left::<P, A>(&mut self.source, x, y);
                PatchMotion::Left
            }
            _ => {
                self.patch.fill::<P, A>(&mut self.source, x, y);
                self.args.scratch.clear();
                PatchMotion::Fresh
            }
        };
        self.source.move_to(x, y);
        self.patch_at = Some((x, y));
        self.args.x = x;
        self.args.y = y;
        self.args.motion = motion;
        let c = self.filter.filter(&self.patch, &mut self.args);
        self.cache = Some(c);
        c
    }
}

impl<'a, P: PixelFormat, F: ImageFilter> Filter<P, Source<ImgRef<'a, P>>, F> {
    /// Filter an image directly, owning a fresh source view over it.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Filter::new).
    pub fn from_image(image: ImgRef<'a, P>, filter: F) -> Result<Self, AdapterError> {
        Self::new(image.adapter(0, 0), filter)
    }
}

impl<P: PixelFormat, A: PixelAdapter<P>, F: ImageFilter> PixelAdapter<P> for Filter<P, A, F> {
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
        self.invalidate_all();
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
        self.invalidate_all();
        self.source.move_next_y();
    }

    #[inline]
    fn move_previous_y(&mut self) {
        self.invalidate_all();
        self.source.move_previous_y();
    }

    #[inline]
    fn offset_x(&mut self, dx: i32) {
        self.invalidate_all();
        self.source.offset_x(dx);
    }

    #[inline]
    fn offset_y(&mut self, dy: i32) {
        self.invalidate_all();
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
        Err(AdapterError::unsupported("Filter", "override"))
    }

    fn overlay_with(&mut self, _c: Rgba<u8>) -> Result<(), AdapterError> {
        Err(AdapterError::unsupported("Filter", "overlay"))
    }
}

// ---------------------------------------------------------------------------
// Stock filters
// ---------------------------------------------------------------------------

/// Mean of a `(2·radius+1)²` patch, per channel.
///
/// Keeps per-column channel sums in [`ImageFilterArgs::scratch`] so a
/// one-column step only sums the column that entered the patch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxFilter {
    radius: u32,
}

impl BoxFilter {
    /// Box blur of the given radius; radius 0 is the identity.
    pub fn new(radius: u32) -> Self {
        Self { radius }
    }

    fn side(&self) -> u32 {
        2 * self.radius + 1
    }
}

fn column_sum(column: &[Rgba<u8>]) -> [i64; 4] {
    column.iter().fold([0; 4], |mut acc, px| {
        acc[0] += px.r as i64;
        acc[1] += px.g as i64;
        acc[2] += px.b as i64;
        acc[3] += px.a as i64;
        acc
    })
}

impl ImageFilter for BoxFilter {
    fn patch_width(&self) -> u32 {
        self.side()
    }

    fn patch_height(&self) -> u32 {
        self.side()
    }

    fn filter(&self, patch: &Patch, args: &mut ImageFilterArgs) -> Rgba<u8> {
        let w = patch.width() as usize;
        // Layout: w column sums in patch order, 4 channels each.
        let sums = &mut args.scratch;
        match args.motion {
            PatchMotion::Right if sums.len() == 4 * w => {
                sums.rotate_left(4);
                sums[4 * (w - 1)..].copy_from_slice(&column_sum(patch.column(w - 1)));
            }
            PatchMotion::Left if sums.len() == 4 * w => {
                sums.rotate_right(4);
                sums[..4].copy_from_slice(&column_sum(patch.column(0)));
            }
            _ => {
                sums.clear();
                for dx in 0..w {
                    sums.extend_from_slice(&column_sum(patch.column(dx)));
                }
            }
        }
        let mut total = [0i64; 4];
        for col in sums.chunks_exact(4) {
            for (t, s) in total.iter_mut().zip(col) {
                *t += s;
            }
        }
        let n = (w * patch.height() as usize) as i64;
        let avg = |t: i64| ((t + n / 2) / n) as u8;
        Rgba {
            r: avg(total[0]),
            g: avg(total[1]),
            b: avg(total[2]),
            a: avg(total[3]),
        }
    }
}

/// Integer convolution over a rectangular kernel.
///
/// Each color channel becomes `clamp(Σ kᵢ·pᵢ / divisor + bias, 0, 255)`;
/// alpha is taken from the patch center.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelFilter {
    width: u32,
    height: u32,
    kernel: Vec<i32>,
    divisor: i32,
    bias: i32,
}

impl KernelFilter {
    /// Kernel of `width × height` coefficients in row-major order.
    ///
    /// # Errors
    ///
    /// [`AdapterError::InvalidArgument`] if the kernel is empty, its length
    /// does not match the dimensions, or `divisor` is zero.
    pub fn new(
        width: u32,
        height: u32,
        kernel: Vec<i32>,
        divisor: i32,
        bias: i32,
    ) -> Result<Self, AdapterError> {
        if width == 0 || height == 0 || kernel.len() != width as usize * height as usize {
            return Err(AdapterError::InvalidArgument(
                "kernel length must equal width * height",
            ));
        }
        if divisor == 0 {
            return Err(AdapterError::InvalidArgument("kernel divisor must not be zero"));
        }
        Ok(Self {
            width,
            height,
            kernel,
            divisor,
            bias,
        })
    }

    /// 3×3 sharpen kernel.
    pub fn sharpen() -> Self {
        Self {
            width: 3,
            height: 3,
            kernel: alloc::vec![0, -1, 0, -1, 5, -1, 0, -1, 0],
            divisor: 1,
            bias: 0,
        }
    }
}

impl ImageFilter for KernelFilter {
    fn patch_width(&self) -> u32 {
        self.width
    }

    fn patch_height(&self) -> u32 {
        self.height
    }

    fn filter(&self, patch: &Patch, _args: &mut ImageFilterArgs) -> Rgba<u8> {
        let mut acc = [0i64; 3];
        let w = self.width as usize;
        for dx in 0..w {
            let column = patch.column(dx);
            for (dy, px) in column.iter().enumerate() {
                let k = self.kernel[dy * w + dx] as i64;
                acc[0] += k * px.r as i64;
                acc[1] += k * px.g as i64;
                acc[2] += k * px.b as i64;
            }
        }
        let out = |v: i64| (v / self.divisor as i64 + self.bias as i64).clamp(0, 255) as u8;
        Rgba {
            r: out(acc[0]),
            g: out(acc[1]),
            b: out(acc[2]),
            a: patch.center().a,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::LimitExceeded;
    use alloc::vec;
    use imgref::ImgVec;
    use rgb::{Gray, Rgb};

    fn noise(w: usize, h: usize) -> ImgVec<Rgb<u8>> {
        let buf = (0..w * h)
            .map(|i| Rgb {
                r: (i * 53 % 256) as u8,
                g: (i * 101 % 256) as u8,
                b: (i * i % 256) as u8,
            })
            .collect();
        ImgVec::new(buf, w, h)
    }

    /// Records how it was called, outputs the patch center.
    #[derive(Clone)]
    struct Probe;

    impl ImageFilter for Probe {
        fn patch_width(&self) -> u32 {
            3
        }

        fn patch_height(&self) -> u32 {
            1
        }

        fn filter(&self, patch: &Patch, args: &mut ImageFilterArgs) -> Rgba<u8> {
            args.scratch.push(args.motion() as i64);
            let mut c = patch.center();
            c.a = args.scratch.len() as u8;
            c
        }
    }

    #[test]
    fn args_report_motion() {
        let img = noise(5, 2);
        let mut f = Filter::from_image(img.as_ref(), Probe).unwrap();
        assert_eq!(f.a(), 1);
        f.move_next_x();
        assert_eq!(f.a(), 2);
        f.move_previous_x();
        assert_eq!(f.a(), 3);
        let seen = [PatchMotion::Fresh, PatchMotion::Right, PatchMotion::Left];
        assert_eq!(f.args.scratch, seen.map(|m| m as i64));
        f.move_next_y();
        assert_eq!(f.a(), 1);
        assert_eq!((f.args.x(), f.args.y()), (0, 1));
    }

    #[test]
    fn box_radius_zero_is_identity() {
        let img = noise(4, 3);
        let mut src = img.as_ref().adapter(0, 0);
        let mut f = Filter::from_image(img.as_ref(), BoxFilter::new(0)).unwrap();
        for y in 0..3 {
            for x in 0..4 {
                src.move_to(x, y);
                f.move_to(x, y);
                assert_eq!(f.channels(), src.channels());
            }
        }
    }

    #[test]
    fn box_average_of_flat_neighborhood() {
        let mut buf = vec![Gray::new(90u8); 9];
        buf[4] = Gray::new(0);
        let img = ImgVec::new(buf, 3, 3);
        let mut f = Filter::from_image(img.as_ref(), BoxFilter::new(1)).unwrap();
        f.move_to(1, 1);
        // (8 * 90) / 9 = 80
        assert_eq!(f.r(), 80);
        assert_eq!(f.a(), 255);
    }

    #[test]
    fn box_sliding_matches_fresh() {
        let img = noise(9, 6);
        for radius in [1, 2] {
            let boxed = || Filter::from_image(img.as_ref(), BoxFilter::new(radius)).unwrap();
            let mut stepped = boxed();
            for y in 0..6 {
                stepped.move_to(0, y);
                for x in 0..9 {
                    let mut fresh = boxed();
                    fresh.move_to(x, y);
                    assert_eq!(stepped.channels(), fresh.channels(), "r{radius} ({x}, {y})");
                    stepped.move_next_x();
                }
                for x in (0..9).rev() {
                    stepped.move_previous_x();
                    let mut fresh = boxed();
                    fresh.move_to(x, y);
                    assert_eq!(stepped.channels(), fresh.channels(), "r{radius} back ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn kernel_identity_and_sharpen() {
        let img = noise(5, 5);
        let identity = KernelFilter::new(3, 3, vec![0, 0, 0, 0, 1, 0, 0, 0, 0], 1, 0).unwrap();
        let mut f = Filter::from_image(img.as_ref(), identity).unwrap();
        let mut src = img.as_ref().adapter(2, 3);
        f.move_to(2, 3);
        assert_eq!(f.channels(), src.channels());

        let flat = ImgVec::new(vec![Gray::new(100u8); 9], 3, 3);
        let mut sharp = Filter::from_image(flat.as_ref(), KernelFilter::sharpen()).unwrap();
        sharp.move_to(1, 1);
        assert_eq!(sharp.r(), 100);
    }

    #[test]
    fn kernel_rejects_bad_shapes() {
        assert!(KernelFilter::new(3, 3, vec![1; 8], 1, 0).is_err());
        assert!(KernelFilter::new(1, 1, vec![1], 0, 0).is_err());
        assert!(KernelFilter::new(0, 0, vec![], 1, 0).is_err());
    }

    #[test]
    fn patch_limits_apply() {
        let img = noise(3, 3);
        let limits = Limits::none().with_max_patch_area(9);
        let small = Filter::with_limits(img.as_ref().adapter(0, 0), BoxFilter::new(1), &limits);
        assert!(small.is_ok());
        let err = Filter::with_limits(img.as_ref().adapter(0, 0), BoxFilter::new(2), &limits)
            .err()
            .unwrap();
        assert_eq!(
            err,
            AdapterError::Limit(LimitExceeded::PatchArea { actual: 25, max: 9 })
        );
    }

    #[test]
    fn writes_are_rejected() {
        let mut img = ImgVec::new(vec![Gray::new(5u8); 4], 2, 2);
        {
            let mut f = Filter::new(img.as_mut().adapter(0, 0), BoxFilter::new(1)).unwrap();
            assert!(matches!(
                f.override_with(Rgba { r: 0, g: 0, b: 0, a: 255 }),
                Err(AdapterError::Unsupported { .. })
            ));
            assert!(f.overlay_with(Rgba { r: 0, g: 0, b: 0, a: 1 }).is_err());
        }
        assert!(img.buf().iter().all(|p| *p == Gray::new(5)));
    }
}
