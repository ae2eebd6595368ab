//! Binarizing adapters.
//!
//! Every adapter here converts to gray and outputs pure black (0) or white
//! (255) with full alpha. [`RangesThreshold`] compares each pixel against
//! fixed gray ranges; [`WindowThreshold`] compares it against a statistic of
//! its `(2·level+1)²` neighborhood.
//!
//! Windowed adapters keep the neighborhood statistic across single-column
//! steps: moving one column left or right retires the column that left the
//! window and adds the one that entered it. Any other move drops the
//! statistic and the next read re-scans the whole window. Windows clip at the
//! image border.

mod ranges;
mod window;

use core::marker::PhantomData;

use imgref::ImgRef;
use rgb::Rgba;

use crate::adapter::PixelAdapter;
use crate::error::AdapterError;
use crate::format::{PixelFormat, gray_channels};
use crate::source::{Raster, Source};

pub use ranges::RangesThreshold;
pub use window::GrayWindow;

/// Local threshold statistic for a [`WindowThreshold`].
pub trait ThresholdMethod {
    /// Adapter name reported in errors.
    const NAME: &'static str;

    /// Threshold for the samples in `window`.
    fn threshold(window: &GrayWindow) -> u8;
}

/// Bernsen: midpoint of the window's darkest and brightest sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bernsen;

impl ThresholdMethod for Bernsen {
    const NAME: &'static str = "BernsenThreshold";

    #[inline]
    fn threshold(window: &GrayWindow) -> u8 {
        ((window.min() as u16 + window.max() as u16) / 2) as u8
    }
}

/// Mean of the window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Mean;

impl ThresholdMethod for Mean {
    const NAME: &'static str = "MeanThreshold";

    #[inline]
    fn threshold(window: &GrayWindow) -> u8 {
        window.mean()
    }
}

/// Median of the window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Median;

impl ThresholdMethod for Median {
    const NAME: &'static str = "MedianThreshold";

    #[inline]
    fn threshold(window: &GrayWindow) -> u8 {
        window.median()
    }
}

/// Bernsen local-contrast thresholding.
pub type BernsenThreshold<P, A> = WindowThreshold<P, A, Bernsen>;
/// Mean-neighborhood thresholding.
pub type MeanThreshold<P, A> = WindowThreshold<P, A, Mean>;
/// Median-neighborhood thresholding.
pub type MedianThreshold<P, A> = WindowThreshold<P, A, Median>;

/// Neighborhood thresholding with statistic `M`. Read-only.
#[derive(Clone, Debug)]
pub struct WindowThreshold<P, A, M> {
    source: A,
    requested: u32,
    // Radius actually scanned; clipped windows make anything past the
    // larger image side equivalent.
    level: i32,
    window: GrayWindow,
    // Center of the neighborhood `window` currently holds.
    window_at: Option<(i32, i32)>,
    cache: Option<u8>,
    _marker: PhantomData<fn() -> (P, M)>,
}

impl<P: PixelFormat, A: PixelAdapter<P>, M: ThresholdMethod> WindowThreshold<P, A, M> {
    /// Threshold `source` against a `(2·level+1)²` neighborhood.
    pub fn new(source: A, level: u32) -> Self {
        log::debug!(
            "{} level {level} over {}x{}",
            M::NAME,
            source.x_len(),
            source.y_len()
        );
        let extent = source.x_len().max(source.y_len());
        Self {
            source,
            requested: level,
            level: level.min(extent).min(i32::MAX as u32 / 2) as i32,
            window: GrayWindow::new(),
            window_at: None,
            cache: None,
            _marker: PhantomData,
        }
    }

    /// Neighborhood radius.
    pub fn level(&self) -> u32 {
        self.requested
    }

    /// Release the wrapped adapter.
    pub fn into_inner(self) -> A {
        self.source
    }

    #[inline]
    fn invalidate_all(&mut self) {
        self.cache = None;
        self.window_at = None;
    }

    /// Add or retire one window column at `col`, clipped to the image.
    fn visit_column(&mut self, col: i32, y: i32, add: bool) {
        if col < 0 || col >= self.source.x_len() as i32 {
            return;
        }
        let top = (y - self.level).max(0);
        let bottom = (y + self.level).min(self.source.y_len() as i32 - 1);
        if top > bottom {
            return;
        }
        self.source.move_to(col, top);
        for row in top..=bottom {
            let v = self.source.gray();
            if add {
                self.window.insert(v);
            } else {
                self.window.remove(v);
            }
            if row < bottom {
                self.source.move_next_y();
            }
        }
    }

    fn update_window(&mut self, x: i32, y: i32) {
        let l = self.level;
        match self.window_at {
            Some(at) if at == (x, y) => return,
            Some((wx, wy)) if wy == y && wx + 1 == x => {
                self.visit_column(wx - l, y, false);
                self.visit_column(x + l, y, true);
            }
            Some((wx, wy)) if wy == y && wx - 1 == x => {
                self.visit_column(wx + l, y, false);
                self.visit_column(x - l, y, true);
            }
            _ => {
                log::trace!("{} re-seeding window at ({x}, {y})", M::NAME);
                self.window.clear();
                let first = (x - l).max(0);
                let last = (x + l).min(self.source.x_len() as i32 - 1);
                for col in first..=last {
                    self.visit_column(col, y, true);
                }
            }
        }
        self.window_at = Some((x, y));
        self.source.move_to(x, y);
    }

    fn current(&mut self) -> u8 {
        if let Some(v) = self.cache {
            return v;
        }
        let (x, y) = (self.source.x(), self.source.y());
        self.update_window(x, y);
        let threshold = M::threshold(&self.window);
        let v = if self.source.gray() >= threshold { 255 } else { 0 };
        self.cache = Some(v);
        v
    }
}

impl<'a, P: PixelFormat, M: ThresholdMethod> WindowThreshold<P, Source<ImgRef<'a, P>>, M> {
    /// Threshold an image directly, owning a fresh source view over it.
    pub fn from_image(image: ImgRef<'a, P>, level: u32) -> Self {
        Self::new(image.adapter(0, 0), level)
    }
}

impl<P: PixelFormat, A: PixelAdapter<P>, M: ThresholdMethod> PixelAdapter<P>
    for WindowThreshold<P, A, M>
{
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
        Err(AdapterError::unsupported(M::NAME, "override"))
    }

    fn overlay_with(&mut self, _c: Rgba<u8>) -> Result<(), AdapterError> {
        Err(AdapterError::unsupported(M::NAME, "overlay"))
    }
}
