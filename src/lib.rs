//! Lazily-evaluated, cursor-driven pixel adapters.
//!
//! An adapter chain is built from the outside in: each transform wraps
//! another adapter (or an image directly) and remaps its cursor into it. No
//! intermediate image is ever materialized; a pixel is computed when it is
//! read and cached until the cursor moves.
//!
//! - [`PixelAdapter`]: the cursor/read/write contract every adapter implements
//! - [`PixelFormat`]: channel-level view of the `rgb` pixel types
//! - [`Source`] / [`Raster`]: leaf adapters over `imgref` images
//! - [`Crop`], [`Flip`], [`NearestResize`], [`BilinearResize`],
//!   [`NearestRotate`], [`BilinearRotate`]: geometric views
//! - [`AdjustContrast`], [`Cast`]: photometric views
//! - [`RangesThreshold`], [`BernsenThreshold`], [`MeanThreshold`],
//!   [`MedianThreshold`]: binarization
//! - [`Filter`] with [`ImageFilter`] strategies such as [`BoxFilter`] and
//!   [`KernelFilter`]
//! - [`RenderJob`]: scan loops draining a chain into caller storage
//!
//! ```
//! use zenadapt::{BilinearResize, Crop, Gray, ImgVec, PixelAdapter};
//!
//! let img = ImgVec::new((0..64u8).map(Gray::new).collect(), 8, 8);
//! let crop = Crop::from_image(img.as_ref(), 2, 2, 4, 4);
//! let mut half = BilinearResize::new(crop, 2, 2)?;
//! half.move_to(1, 1);
//! assert_eq!(half.r(), 36);
//! # Ok::<(), zenadapt::AdapterError>(())
//! ```
//!
//! Adapters are single-owner: every move and read takes `&mut self`.
//! Read-only chains over [`ImgRef`] are `Clone`, so parallel scans clone one
//! chain per worker.

#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;

mod adapter;
mod cast;
mod contrast;
mod crop;
mod error;
mod filter;
mod flip;
mod format;
mod limits;
mod patch;
mod planes;
mod render;
mod resize;
mod rotate;
mod sample;
mod source;
mod threshold;

pub use adapter::PixelAdapter;
pub use cast::Cast;
pub use contrast::{AdjustContrast, ContrastTable};
pub use crop::Crop;
pub use error::AdapterError;
pub use filter::{BoxFilter, Filter, ImageFilter, ImageFilterArgs, KernelFilter, PatchMotion};
pub use flip::{Flip, FlipMode};
pub use format::{PixelFormat, blend_over, to_gray};
pub use limits::{LimitExceeded, Limits};
pub use patch::Patch;
pub use planes::{BufferError, ChannelPlanes};
pub use render::RenderJob;
pub use resize::{BilinearResize, NearestResize};
pub use rotate::{BilinearRotate, NearestRotate};
pub use source::{Raster, Source};
pub use threshold::{
    Bernsen, BernsenThreshold, GrayWindow, Mean, MeanThreshold, Median, MedianThreshold,
    RangesThreshold, ThresholdMethod, WindowThreshold,
};

// Re-exports for callers building chains.
pub use enough::{Stop, Unstoppable};
pub use imgref::{Img, ImgRef, ImgRefMut, ImgVec};
pub use rgb;
pub use rgb::alt::BGRA as Bgra;
pub use rgb::alt::GrayAlpha;
pub use rgb::{Gray, Rgb, Rgba};
