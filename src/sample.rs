//! Shared sampling helpers for the resampling adapters.

use rgb::Rgba;

use crate::adapter::PixelAdapter;
use crate::format::PixelFormat;

/// Exact fixed-ratio coordinate stepper.
///
/// Maps an output coordinate `o` to the source coordinate
/// `o * num / den`, split into the integer part `pos` (rounded toward
/// negative infinity) and a remainder in `[0, den)`. Stepping accumulates
/// the remainder, so any sequence of steps lands exactly where a direct
/// seek would.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Stepper {
    num: i64,
    den: i64,
    pos: i64,
    rem: i64,
}

impl Stepper {
    /// Stepper for a `src_len → dst_len` mapping, positioned at zero.
    pub(crate) fn new(src_len: u32, dst_len: u32) -> Self {
        debug_assert!(dst_len > 0);
        Self {
            num: src_len as i64,
            den: dst_len as i64,
            pos: 0,
            rem: 0,
        }
    }

    /// Integer source coordinate.
    #[inline]
    pub(crate) fn pos(&self) -> i32 {
        self.pos as i32
    }

    /// Fractional part of the source coordinate.
    #[inline]
    pub(crate) fn fraction(&self) -> f32 {
        self.rem as f32 / self.den as f32
    }

    /// Jump to output coordinate `o`; returns the new source coordinate.
    #[inline]
    pub(crate) fn seek(&mut self, o: i32) -> i32 {
        let n = o as i64 * self.num;
        self.pos = n.div_euclid(self.den);
        self.rem = n.rem_euclid(self.den);
        self.pos as i32
    }

    /// Move by `d` output units; returns how far the source coordinate moved.
    #[inline]
    pub(crate) fn advance(&mut self, d: i32) -> i32 {
        let r = self.rem + d as i64 * self.num;
        let carry = r.div_euclid(self.den);
        self.rem = r.rem_euclid(self.den);
        self.pos += carry;
        carry as i32
    }
}

/// Move `source` horizontally by `d` using the cheapest primitive.
#[inline]
pub(crate) fn shift_x<P: PixelFormat, A: PixelAdapter<P>>(source: &mut A, d: i32) {
    match d {
        0 => {}
        1 => source.move_next_x(),
        -1 => source.move_previous_x(),
        _ => source.offset_x(d),
    }
}

/// Move `source` vertically by `d` using the cheapest primitive.
#[inline]
pub(crate) fn shift_y<P: PixelFormat, A: PixelAdapter<P>>(source: &mut A, d: i32) {
    match d {
        0 => {}
        1 => source.move_next_y(),
        -1 => source.move_previous_y(),
        _ => source.offset_y(d),
    }
}

/// Bilinear blend of the 2×2 block whose top-left is under `source`'s cursor.
///
/// `right` / `below` say whether the neighbor column / row exists; a
/// missing neighbor reuses the nearer sample instead of stepping off the
/// edge. The cursor is back at the top-left sample on return. When `alpha`
/// is false the format has no alpha and the result is opaque.
pub(crate) fn bilinear<P: PixelFormat, A: PixelAdapter<P>>(
    source: &mut A,
    right: bool,
    below: bool,
    fx: f32,
    fy: f32,
    alpha: bool,
) -> Rgba<u8> {
    let right = right && fx > 0.0;
    let below = below && fy > 0.0;

    let p00 = source.channels();
    let (p10, p01, p11) = match (right, below) {
        (false, false) => return opaque_unless(p00, alpha),
        (true, false) => {
            source.move_next_x();
            let p10 = source.channels();
            source.move_previous_x();
            (p10, p00, p10)
        }
        (false, true) => {
            source.move_next_y();
            let p01 = source.channels();
            source.move_previous_y();
            (p00, p01, p01)
        }
        (true, true) => {
            source.move_next_x();
            let p10 = source.channels();
            source.move_next_y();
            let p11 = source.channels();
            source.move_previous_x();
            let p01 = source.channels();
            source.move_previous_y();
            (p10, p01, p11)
        }
    };

    let w00 = (1.0 - fx) * (1.0 - fy);
    let w01 = (1.0 - fx) * fy;
    let w10 = fx * (1.0 - fy);
    let w11 = fx * fy;
    let mix = |c00: u8, c01: u8, c10: u8, c11: u8| -> u8 {
        let v = c00 as f32 * w00 + c01 as f32 * w01 + c10 as f32 * w10 + c11 as f32 * w11;
        (v + 0.5) as u8
    };

    Rgba {
        r: mix(p00.r, p01.r, p10.r, p11.r),
        g: mix(p00.g, p01.g, p10.g, p11.g),
        b: mix(p00.b, p01.b, p10.b, p11.b),
        a: if alpha {
            mix(p00.a, p01.a, p10.a, p11.a)
        } else {
            255
        },
    }
}

#[inline]
fn opaque_unless(c: Rgba<u8>, alpha: bool) -> Rgba<u8> {
    if alpha { c } else { Rgba { a: 255, ..c } }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Raster;
    use alloc::vec;
    use imgref::ImgVec;
    use rgb::Gray;

    #[test]
    fn stepping_matches_seeking() {
        for (src, dst) in [(10u32, 3u32), (3, 10), (7, 7), (1, 5), (640, 480)] {
            let mut stepped = Stepper::new(src, dst);
            let mut direct = Stepper::new(src, dst);
            for o in 1..(dst as i32 * 2) {
                stepped.advance(1);
                direct.seek(o);
                assert_eq!(stepped, direct, "{src}->{dst} at {o}");
            }
            for o in (-5..(dst as i32 * 2 - 1)).rev() {
                stepped.advance(-1);
                direct.seek(o);
                assert_eq!(stepped, direct, "{src}->{dst} back at {o}");
            }
        }
    }

    #[test]
    fn advance_reports_source_delta() {
        let mut s = Stepper::new(5, 2);
        assert_eq!(s.seek(0), 0);
        assert_eq!(s.advance(1), 2);
        assert_eq!(s.fraction(), 0.5);
        assert_eq!(s.advance(1), 3);
        assert_eq!(s.pos(), 5);
        assert_eq!(s.advance(-2), -5);
    }

    #[test]
    fn bilinear_center_of_block() {
        let buf = [0u8, 100, 200, 40].map(Gray::new);
        let img = ImgVec::new(vec![buf[0], buf[1], buf[2], buf[3]], 2, 2);
        let mut src = img.as_ref().adapter(0, 0);
        let c = bilinear(&mut src, true, true, 0.5, 0.5, false);
        // (0 + 100 + 200 + 40) / 4 = 85
        assert_eq!(c.r, 85);
        assert_eq!(c.a, 255);
        assert_eq!((src.x(), src.y()), (0, 0));
    }

    #[test]
    fn bilinear_missing_neighbors_reuse_sample() {
        let img = ImgVec::new(vec![Gray::new(10u8), Gray::new(250)], 2, 1);
        let mut src = img.as_ref().adapter(1, 0);
        let c = bilinear(&mut src, false, false, 0.75, 0.25, false);
        assert_eq!(c.r, 250);
    }

    #[test]
    fn bilinear_stays_in_range() {
        let vals = [0u8, 255, 255, 0, 128, 1, 254, 77];
        for &a in &vals {
            for &b in &vals {
                let buf = [a, b, b, a].map(Gray::new).to_vec();
                let img = ImgVec::new(buf, 2, 2);
                for fx in [0.0f32, 0.1, 0.5, 0.9, 0.999] {
                    for fy in [0.0f32, 0.3, 0.7, 0.999] {
                        let mut src = img.as_ref().adapter(0, 0);
                        let c = bilinear(&mut src, true, true, fx, fy, false);
                        assert!(c.r >= a.min(b) && c.r <= a.max(b));
                    }
                }
            }
        }
    }
}
