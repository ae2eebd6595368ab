//! Mirrored view of another adapter.

use core::marker::PhantomData;

use imgref::ImgRef;
use rgb::Rgba;

use crate::adapter::PixelAdapter;
use crate::error::AdapterError;
use crate::format::PixelFormat;
use crate::source::{Raster, Source};

/// Which axes a [`Flip`] mirrors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FlipMode {
    /// Identity.
    #[default]
    None = 0,
    /// Mirror left-right.
    Horizontal = 1,
    /// Mirror top-bottom.
    Vertical = 2,
    /// Mirror both axes (a 180 degree rotation).
    Both = 3,
}

impl FlipMode {
    /// Whether columns are mirrored.
    #[inline]
    pub const fn flips_x(self) -> bool {
        matches!(self, Self::Horizontal | Self::Both)
    }

    /// Whether rows are mirrored.
    #[inline]
    pub const fn flips_y(self) -> bool {
        matches!(self, Self::Vertical | Self::Both)
    }

    /// Mode equivalent to applying `self` and then `other`.
    pub const fn then(self, other: FlipMode) -> FlipMode {
        Self::from_axes(
            self.flips_x() != other.flips_x(),
            self.flips_y() != other.flips_y(),
        )
    }

    const fn from_axes(x: bool, y: bool) -> FlipMode {
        match (x, y) {
            (false, false) => Self::None,
            (true, false) => Self::Horizontal,
            (false, true) => Self::Vertical,
            (true, true) => Self::Both,
        }
    }
}

type Step<A> = fn(&mut A);
type Offset<A> = fn(&mut A, i32);

/// Pass-through mirrored view.
///
/// The direction bindings are chosen once at construction: a horizontal
/// flip's `move_next_x` is the wrapped adapter's `move_previous_x`, and so
/// on. Reads and writes go straight to the wrapped adapter.
pub struct Flip<P, A> {
    source: A,
    mode: FlipMode,
    x_len: u32,
    y_len: u32,
    next_x: Step<A>,
    previous_x: Step<A>,
    next_y: Step<A>,
    previous_y: Step<A>,
    offset_x: Offset<A>,
    offset_y: Offset<A>,
    _format: PhantomData<fn() -> P>,
}

impl<P, A: Clone> Clone for Flip<P, A> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            mode: self.mode,
            x_len: self.x_len,
            y_len: self.y_len,
            next_x: self.next_x,
            previous_x: self.previous_x,
            next_y: self.next_y,
            previous_y: self.previous_y,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            _format: PhantomData,
        }
    }
}

fn negated_x<P: PixelFormat, A: PixelAdapter<P>>(source: &mut A, dx: i32) {
    source.offset_x(-dx);
}

fn negated_y<P: PixelFormat, A: PixelAdapter<P>>(source: &mut A, dy: i32) {
    source.offset_y(-dy);
}

impl<P: PixelFormat, A: PixelAdapter<P>> Flip<P, A> {
    /// Mirror `source` along the axes selected by `mode`.
    ///
    /// The cursor starts at `(0, 0)` of the mirrored view.
    pub fn new(source: A, mode: FlipMode) -> Self {
        let (next_x, previous_x, offset_x): (Step<A>, Step<A>, Offset<A>) = if mode.flips_x() {
            (A::move_previous_x, A::move_next_x, negated_x::<P, A>)
        } else {
            (A::move_next_x, A::move_previous_x, A::offset_x)
        };
        let (next_y, previous_y, offset_y): (Step<A>, Step<A>, Offset<A>) = if mode.flips_y() {
            (A::move_previous_y, A::move_next_y, negated_y::<P, A>)
        } else {
            (A::move_next_y, A::move_previous_y, A::offset_y)
        };
        let x_len = source.x_len();
        let y_len = source.y_len();
        let mut flip = Self {
            source,
            mode,
            x_len,
            y_len,
            next_x,
            previous_x,
            next_y,
            previous_y,
            offset_x,
            offset_y,
            _format: PhantomData,
        };
        flip.move_to(0, 0);
        flip
    }

    /// Axes mirrored by this view.
    pub fn mode(&self) -> FlipMode {
        self.mode
    }

    /// Release the wrapped adapter.
    pub fn into_inner(self) -> A {
        self.source
    }

    #[inline]
    fn mirror_x(&self, x: i32) -> i32 {
        if self.mode.flips_x() {
            self.x_len as i32 - 1 - x
        } else {
            x
        }
    }

    #[inline]
    fn mirror_y(&self, y: i32) -> i32 {
        if self.mode.flips_y() {
            self.y_len as i32 - 1 - y
        } else {
            y
        }
    }
}

impl<'a, P: PixelFormat> Flip<P, Source<ImgRef<'a, P>>> {
    /// Mirror an image directly, owning a fresh source view over it.
    pub fn from_image(image: ImgRef<'a, P>, mode: FlipMode) -> Self {
        Self::new(image.adapter(0, 0), mode)
    }
}

impl<P: PixelFormat, A: PixelAdapter<P>> PixelAdapter<P> for Flip<P, A> {
    #[inline]
    fn x(&self) -> i32 {
        self.mirror_x(self.source.x())
    }

    #[inline]
    fn y(&self) -> i32 {
        self.mirror_y(self.source.y())
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
        let (sx, sy) = (self.mirror_x(x), self.mirror_y(y));
        self.source.move_to(sx, sy);
    }

    #[inline]
    fn move_next_x(&mut self) {
        (self.next_x)(&mut self.source);
    }

    #[inline]
    fn move_previous_x(&mut self) {
        (self.previous_x)(&mut self.source);
    }

    #[inline]
    fn move_next_y(&mut self) {
        (self.next_y)(&mut self.source);
    }

    #[inline]
    fn move_previous_y(&mut self) {
        (self.previous_y)(&mut self.source);
    }

    #[inline]
    fn offset_x(&mut self, dx: i32) {
        (self.offset_x)(&mut self.source, dx);
    }

    #[inline]
    fn offset_y(&mut self, dy: i32) {
        (self.offset_y)(&mut self.source, dy);
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

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use imgref::ImgVec;
    use rgb::Gray;

    fn ramp(w: usize, h: usize) -> ImgVec<Gray<u8>> {
        let buf = (0..w * h).map(|i| Gray::new(i as u8)).collect();
        ImgVec::new(buf, w, h)
    }

    const MODES: [FlipMode; 4] = [
        FlipMode::None,
        FlipMode::Horizontal,
        FlipMode::Vertical,
        FlipMode::Both,
    ];

    #[test]
    fn matches_source_at_mirrored_position() {
        let img = ramp(4, 3);
        for mode in MODES {
            let mut flip = Flip::from_image(img.as_ref(), mode);
            let mut src = img.as_ref().adapter(0, 0);
            for y in 0..3 {
                for x in 0..4 {
                    flip.move_to(x, y);
                    let sx = if mode.flips_x() { 3 - x } else { x };
                    let sy = if mode.flips_y() { 2 - y } else { y };
                    src.move_to(sx, sy);
                    assert_eq!(flip.r(), src.r(), "{mode:?} at ({x}, {y})");
                    assert_eq!((flip.x(), flip.y()), (x, y));
                }
            }
        }
    }

    #[test]
    fn stepping_agrees_with_move_to() {
        let img = ramp(5, 4);
        for mode in MODES {
            let mut stepped = Flip::from_image(img.as_ref(), mode);
            let mut direct = stepped.clone();
            stepped.move_next_x();
            stepped.move_next_x();
            stepped.move_next_y();
            stepped.move_previous_x();
            stepped.offset_x(2);
            stepped.offset_y(2);
            stepped.move_previous_y();
            direct.move_to(3, 2);
            assert_eq!((stepped.x(), stepped.y()), (3, 2), "{mode:?}");
            assert_eq!(stepped.r(), direct.r(), "{mode:?}");
        }
    }

    #[test]
    fn horizontal_row_is_reversed() {
        let img = ramp(4, 1);
        let mut flip = Flip::from_image(img.as_ref(), FlipMode::Horizontal);
        let mut row = vec![];
        for _ in 0..4 {
            row.push(flip.r());
            flip.move_next_x();
        }
        assert_eq!(row, [3, 2, 1, 0]);
    }

    #[test]
    fn writes_land_mirrored() {
        let mut img = ImgVec::new(vec![Gray::new(0u8); 6], 3, 2);
        {
            let mut flip = Flip::new(img.as_mut().adapter(0, 0), FlipMode::Both);
            flip.override_with(Rgba {
                r: 7,
                g: 7,
                b: 7,
                a: 255,
            })
            .unwrap();
        }
        assert_eq!(img.buf()[5], Gray::new(7));
    }

    #[test]
    fn mode_composition() {
        assert_eq!(FlipMode::Horizontal.then(FlipMode::Vertical), FlipMode::Both);
        assert_eq!(FlipMode::Both.then(FlipMode::Horizontal), FlipMode::Vertical);
        assert_eq!(FlipMode::Vertical.then(FlipMode::Vertical), FlipMode::None);
        assert_eq!(FlipMode::default(), FlipMode::None);
    }
}
