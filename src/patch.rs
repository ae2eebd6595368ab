//! Sliding rectangular neighborhood around an adapter's cursor.

use alloc::vec;
use alloc::vec::Vec;

use rgb::Rgba;

use crate::adapter::PixelAdapter;
use crate::format::{EMPTY, PixelFormat};

/// A `width × height` block of pixels centered on a cursor position.
///
/// For a cursor at `(x, y)` the patch covers columns
/// `x - width/2 .. x - width/2 + width` and the matching rows. Samples
/// outside the image repeat the nearest edge pixel. Columns are kept in a
/// ring, so moving the center by one column re-reads only the column that
/// entered the patch.
#[derive(Clone, Debug)]
pub struct Patch {
    width: usize,
    height: usize,
    // Column-major ring; `first` is the storage slot of logical column 0.
    samples: Vec<Rgba<u8>>,
    first: usize,
}

impl Patch {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width as usize, height as usize);
        Self {
            width,
            height,
            samples: vec![EMPTY; width * height],
            first: 0,
        }
    }

    /// Patch width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width as u32
    }

    /// Patch height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height as u32
    }

    /// Pixel at `(dx, dy)` relative to the patch's top-left corner.
    ///
    /// # Panics
    ///
    /// Panics if `dx >= width` or `dy >= height`.
    #[inline]
    pub fn get(&self, dx: u32, dy: u32) -> Rgba<u8> {
        let (dx, dy) = (dx as usize, dy as usize);
        assert!(dx < self.width && dy < self.height, "({dx}, {dy}) outside patch");
        self.column(dx)[dy]
    }

    /// Column `dx` of the patch, top to bottom.
    ///
    /// # Panics
    ///
    /// Panics if `dx >= width`.
    #[inline]
    pub fn column(&self, dx: usize) -> &[Rgba<u8>] {
        assert!(dx < self.width, "column {dx} outside patch");
        let slot = (self.first + dx) % self.width;
        &self.samples[slot * self.height..(slot + 1) * self.height]
    }

    /// Pixel under the patch's center.
    #[inline]
    pub fn center(&self) -> Rgba<u8> {
        self.get(self.width as u32 / 2, self.height as u32 / 2)
    }

    /// Re-read every column for a patch centered on `(x, y)`.
    pub(crate) fn fill<P: PixelFormat, A: PixelAdapter<P>>(
        &mut self,
        source: &mut A,
        x: i32,
        y: i32,
    ) {
        self.first = 0;
        let left = x - (self.width / 2) as i32;
        for slot in 0..self.width {
            self.read_column::<P, A>(source, slot, left + slot as i32, y);
        }
    }

    /// Re-center one column right of `x - 1`, reading only the new column.
    pub(crate) fn slide_right<P: PixelFormat, A: PixelAdapter<P>>(
        &mut self,
        source: &mut A,
        x: i32,
        y: i32,
    ) {
        let slot = self.first;
        self.first = (self.first + 1) % self.width;
        let right = x - (self.width / 2) as i32 + self.width as i32 - 1;
        self.read_column::<P, A>(source, slot, right, y);
    }

    /// Re-center one column left of `x + 1`, reading only the new column.
    pub(crate) fn slide_left<P: PixelFormat, A: PixelAdapter<P>>(
        &mut self,
        source: &mut A,
        x: i32,
        y: i32,
    ) {
        self.first = (self.first + self.width - 1) % self.width;
        let left = x - (self.width / 2) as i32;
        self.read_column::<P, A>(source, self.first, left, y);
    }

    fn read_column<P: PixelFormat, A: PixelAdapter<P>>(
        &mut self,
        source: &mut A,
        slot: usize,
        col: i32,
        y: i32,
    ) {
        let max_x = source.x_len() as i32 - 1;
        let max_y = source.y_len() as i32 - 1;
        let top = y - (self.height / 2) as i32;
        let dst = &mut self.samples[slot * self.height..(slot + 1) * self.height];
        let mut row = top.clamp(0, max_y);
        source.move_to(col.clamp(0, max_x), row);
        for (dy, px) in dst.iter_mut().enumerate() {
            let want = (top + dy as i32).clamp(0, max_y);
            if want != row {
                source.move_next_y();
                row = want;
            }
            *px = source.channels();
        }
    }
}
