//! Row-major scan loops that drain an adapter chain into caller storage.

use alloc::vec::Vec;

use enough::{Stop, Unstoppable};
use imgref::{ImgRefMut, ImgVec};

use crate::adapter::PixelAdapter;
use crate::error::AdapterError;
use crate::format::PixelFormat;
use crate::limits::Limits;
use crate::planes::ChannelPlanes;

/// One render operation over an adapter chain.
///
/// Borrows an optional stop token, checked once per row, and carries the
/// limits applied before any pixel work.
///
/// ```
/// use zenadapt::{Crop, ImgVec, Gray, RenderJob};
///
/// let img = ImgVec::new((0..16u8).map(Gray::new).collect(), 4, 4);
/// let mut crop = Crop::from_image(img.as_ref(), 1, 1, 2, 2);
/// let out: ImgVec<Gray<u8>> = RenderJob::new().render_to_vec(&mut crop).unwrap();
/// assert_eq!(out.buf(), &[5, 6, 9, 10].map(Gray::new));
/// ```
#[derive(Clone, Copy)]
pub struct RenderJob<'a> {
    stop: &'a dyn Stop,
    limits: Limits,
}

impl Default for RenderJob<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> RenderJob<'a> {
    /// Job with no stop token and no limits.
    pub fn new() -> Self {
        Self {
            stop: &Unstoppable,
            limits: Limits::none(),
        }
    }

    /// Set cooperative cancellation token.
    pub fn with_stop(mut self, stop: &'a dyn Stop) -> Self {
        self.stop = stop;
        self
    }

    /// Apply render limits.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// The limits in effect.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Replace the pixels of `dst` with the adapter's output.
    ///
    /// Renders the overlap of the adapter's extent and `dst`.
    ///
    /// # Errors
    ///
    /// [`AdapterError::Limit`] before any pixel is touched, or
    /// [`AdapterError::Cancelled`] between rows.
    pub fn render_into<P, Q, A>(
        &self,
        adapter: &mut A,
        dst: ImgRefMut<'_, Q>,
    ) -> Result<(), AdapterError>
    where
        P: PixelFormat,
        Q: PixelFormat,
        A: PixelAdapter<P>,
    {
        self.scan_into(adapter, dst, false)
    }

    /// Source-over blend the adapter's output onto `dst`.
    ///
    /// # Errors
    ///
    /// Same as [`render_into`](RenderJob::render_into).
    pub fn overlay_into<P, Q, A>(
        &self,
        adapter: &mut A,
        dst: ImgRefMut<'_, Q>,
    ) -> Result<(), AdapterError>
    where
        P: PixelFormat,
        Q: PixelFormat,
        A: PixelAdapter<P>,
    {
        self.scan_into(adapter, dst, true)
    }

    /// Write the adapter's output into separate channel planes.
    ///
    /// Planes without alpha receive the color channels only.
    ///
    /// # Errors
    ///
    /// Same as [`render_into`](RenderJob::render_into).
    pub fn render_planes<P, A>(
        &self,
        adapter: &mut A,
        planes: &mut ChannelPlanes<'_>,
    ) -> Result<(), AdapterError>
    where
        P: PixelFormat,
        A: PixelAdapter<P>,
    {
        self.scan_planes(adapter, planes, false)
    }

    /// Source-over blend the adapter's output onto separate channel planes.
    ///
    /// Planes without alpha are treated as opaque.
    ///
    /// # Errors
    ///
    /// Same as [`render_into`](RenderJob::render_into).
    pub fn overlay_planes<P, A>(
        &self,
        adapter: &mut A,
        planes: &mut ChannelPlanes<'_>,
    ) -> Result<(), AdapterError>
    where
        P: PixelFormat,
        A: PixelAdapter<P>,
    {
        self.scan_planes(adapter, planes, true)
    }

    /// Materialize the adapter's full extent as a new image.
    ///
    /// # Errors
    ///
    /// Same as [`render_into`](RenderJob::render_into).
    pub fn render_to_vec<P, Q, A>(&self, adapter: &mut A) -> Result<ImgVec<Q>, AdapterError>
    where
        P: PixelFormat,
        Q: PixelFormat,
        A: PixelAdapter<P>,
    {
        let (width, height) = (adapter.x_len(), adapter.y_len());
        self.limits.check_dimensions(width, height)?;
        log::debug!("render {width}x{height} to new image");
        let mut buf = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height as i32 {
            self.stop.check().map_err(|_| AdapterError::Cancelled)?;
            adapter.move_to(0, y);
            for _ in 0..width {
                buf.push(Q::from_channels(adapter.channels()));
                adapter.move_next_x();
            }
        }
        Ok(ImgVec::new(buf, width as usize, height as usize))
    }

    fn scan_into<P, Q, A>(
        &self,
        adapter: &mut A,
        mut dst: ImgRefMut<'_, Q>,
        overlay: bool,
    ) -> Result<(), AdapterError>
    where
        P: PixelFormat,
        Q: PixelFormat,
        A: PixelAdapter<P>,
    {
        let width = adapter.x_len().min(dst.width() as u32);
        let height = adapter.y_len().min(dst.height() as u32);
        self.limits.check_dimensions(width, height)?;
        log::debug!("render {width}x{height}, overlay: {overlay}");
        for (y, row) in dst.rows_mut().take(height as usize).enumerate() {
            self.stop.check().map_err(|_| AdapterError::Cancelled)?;
            adapter.move_to(0, y as i32);
            for px in &mut row[..width as usize] {
                if overlay {
                    adapter.overlay_to(px);
                } else {
                    adapter.override_to(px);
                }
                adapter.move_next_x();
            }
        }
        Ok(())
    }

    fn scan_planes<P, A>(
        &self,
        adapter: &mut A,
        planes: &mut ChannelPlanes<'_>,
        overlay: bool,
    ) -> Result<(), AdapterError>
    where
        P: PixelFormat,
        A: PixelAdapter<P>,
    {
        let width = adapter.x_len().min(planes.width());
        let height = adapter.y_len().min(planes.height());
        self.limits.check_dimensions(width, height)?;
        log::debug!(
            "render {width}x{height} into planes, alpha: {}, overlay: {overlay}",
            planes.has_alpha()
        );
        for y in 0..height as usize {
            self.stop.check().map_err(|_| AdapterError::Cancelled)?;
            adapter.move_to(0, y as i32);
            for x in 0..width as usize {
                planes.write_from::<P, A>(adapter, x, y, overlay);
                adapter.move_next_x();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::Crop;
    use crate::flip::{Flip, FlipMode};
    use crate::source::Raster;
    use crate::threshold::RangesThreshold;
    use alloc::vec;
    use core::sync::atomic::{AtomicU32, Ordering};
    use enough::StopReason;
    use imgref::ImgVec;
    use rgb::{Gray, Rgb, Rgba};

    /// Fires after a fixed number of checks.
    struct StopAfter(AtomicU32);

    impl Stop for StopAfter {
        fn check(&self) -> Result<(), StopReason> {
            match self.0.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1)) {
                Ok(_) => Ok(()),
                Err(_) => Err(StopReason::Cancelled),
            }
        }
    }

    fn numbered(w: usize, h: usize) -> ImgVec<Gray<u8>> {
        ImgVec::new((0..w * h).map(|i| Gray::new(i as u8)).collect(), w, h)
    }

    #[test]
    fn renders_chain_into_image() {
        let img = numbered(3, 2);
        let mut flip = Flip::from_image(img.as_ref(), FlipMode::Horizontal);
        let mut dst = ImgVec::new(vec![Rgb { r: 0u8, g: 0, b: 0 }; 6], 3, 2);
        RenderJob::new().render_into(&mut flip, dst.as_mut()).unwrap();
        let out: Vec<u8> = dst.buf().iter().map(|p| p.r).collect();
        assert_eq!(out, [2, 1, 0, 5, 4, 3]);
    }

    #[test]
    fn renders_overlap_only() {
        let img = numbered(4, 4);
        let mut src = img.as_ref().adapter(0, 0);
        let mut dst = ImgVec::new(vec![Gray::new(99u8); 6], 2, 3);
        RenderJob::new().render_into(&mut src, dst.as_mut()).unwrap();
        assert_eq!(dst.buf(), &[0, 1, 4, 5, 8, 9].map(Gray::new));
    }

    #[test]
    fn overlay_blends() {
        let img = ImgVec::new(vec![Rgba { r: 255u8, g: 255, b: 255, a: 51 }; 2], 2, 1);
        let mut src = img.as_ref().adapter(0, 0);
        let mut dst = ImgVec::new(vec![Rgb { r: 0u8, g: 0, b: 0 }; 2], 2, 1);
        RenderJob::new().overlay_into(&mut src, dst.as_mut()).unwrap();
        assert_eq!(dst.buf(), &[Rgb { r: 51, g: 51, b: 51 }; 2]);
    }

    #[test]
    fn to_vec_converts_format() {
        let img = ImgVec::new(vec![Gray::new(120u8), Gray::new(90)], 2, 1);
        let mut t = RangesThreshold::from_image(img.as_ref(), &[100, 150]).unwrap();
        let out: ImgVec<Rgba<u8>> = RenderJob::new().render_to_vec(&mut t).unwrap();
        assert_eq!(
            out.buf(),
            &[
                Rgba { r: 255, g: 255, b: 255, a: 255 },
                Rgba { r: 0, g: 0, b: 0, a: 255 }
            ]
        );
    }

    #[test]
    fn planes_receive_channels() {
        let img = ImgVec::new(vec![Rgb { r: 1u8, g: 2, b: 3 }, Rgb { r: 4, g: 5, b: 6 }], 2, 1);
        let mut crop = Crop::from_image(img.as_ref(), 0, 0, 2, 1);
        let (mut r, mut g, mut b, mut a) = ([0u8; 2], [0u8; 2], [0u8; 2], [0u8; 2]);
        {
            let mut planes = ChannelPlanes::new(&mut r, &mut g, &mut b, 2, 1, 2)
                .unwrap()
                .with_alpha(&mut a)
                .unwrap();
            RenderJob::new().render_planes(&mut crop, &mut planes).unwrap();
        }
        assert_eq!((r, g, b, a), ([1, 4], [2, 5], [3, 6], [255, 255]));
    }

    #[test]
    fn overlay_planes_blends_with_and_without_alpha() {
        let img = ImgVec::new(vec![Rgba { r: 200u8, g: 200, b: 200, a: 128 }; 2], 2, 1);
        let mut src = img.as_ref().adapter(0, 0);

        // Opaque black on the left, fully transparent on the right.
        let (mut r, mut g, mut b, mut a) = ([0u8; 2], [0u8; 2], [0u8; 2], [255u8, 0]);
        {
            let mut planes = ChannelPlanes::new(&mut r, &mut g, &mut b, 2, 1, 2)
                .unwrap()
                .with_alpha(&mut a)
                .unwrap();
            RenderJob::new().overlay_planes(&mut src, &mut planes).unwrap();
        }
        assert_eq!((r, g, b, a), ([100, 200], [100, 200], [100, 200], [255, 128]));

        let (mut r, mut g, mut b) = ([0u8; 2], [0u8; 2], [0u8; 2]);
        {
            let mut planes = ChannelPlanes::new(&mut r, &mut g, &mut b, 2, 1, 2).unwrap();
            RenderJob::new().overlay_planes(&mut src, &mut planes).unwrap();
        }
        assert_eq!((r, g, b), ([100, 100], [100, 100], [100, 100]));
    }

    #[test]
    fn limits_reject_before_writing() {
        let img = numbered(4, 4);
        let mut src = img.as_ref().adapter(0, 0);
        let job = RenderJob::new().with_limits(Limits::none().with_max_pixels(8));
        let mut dst = ImgVec::new(vec![Gray::new(7u8); 16], 4, 4);
        let err = job.render_into(&mut src, dst.as_mut()).unwrap_err();
        assert!(matches!(err, AdapterError::Limit(_)));
        assert!(dst.buf().iter().all(|p| *p == Gray::new(7)));
        assert_eq!(job.limits().max_pixels, Some(8));
    }

    #[test]
    fn stop_token_cancels_between_rows() {
        let img = numbered(2, 4);
        let mut src = img.as_ref().adapter(0, 0);
        let stop = StopAfter(AtomicU32::new(2));
        let mut dst = ImgVec::new(vec![Gray::new(99u8); 8], 2, 4);
        let err = RenderJob::new()
            .with_stop(&stop)
            .render_into(&mut src, dst.as_mut())
            .unwrap_err();
        assert_eq!(err, AdapterError::Cancelled);
        // Two rows were written before the token fired.
        assert_eq!(dst.buf()[..4], [0, 1, 2, 3].map(Gray::new));
        assert_eq!(dst.buf()[4], Gray::new(99));
    }
}
