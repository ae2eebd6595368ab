//! Errors raised by adapters and render jobs.

use core::fmt;

use crate::limits::LimitExceeded;
use crate::planes::BufferError;

/// Errors from adapter construction, writes and rendering.
///
/// All errors are immediate and final: adapters do no I/O and hold no
/// locks, so nothing here is worth retrying.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum AdapterError {
    /// A write was attempted on a read-only adapter.
    Unsupported {
        /// Adapter kind that rejected the call.
        adapter: &'static str,
        /// Operation that was rejected.
        operation: &'static str,
    },
    /// A write reached a source bound to an immutable image.
    ReadOnlyImage,
    /// Constructor parameters are structurally invalid.
    InvalidArgument(&'static str),
    /// Caller-supplied channel planes are malformed.
    Buffer(BufferError),
    /// A render limit was exceeded.
    Limit(LimitExceeded),
    /// The render job's stop token fired.
    Cancelled,
}

impl AdapterError {
    #[inline]
    pub(crate) const fn unsupported(adapter: &'static str, operation: &'static str) -> Self {
        Self::Unsupported { adapter, operation }
    }
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported { adapter, operation } => {
                write!(f, "{adapter} does not support {operation}")
            }
            Self::ReadOnlyImage => write!(f, "source image is read-only"),
            Self::InvalidArgument(what) => write!(f, "invalid argument: {what}"),
            Self::Buffer(err) => write!(f, "channel planes: {err}"),
            Self::Limit(err) => write!(f, "{err}"),
            Self::Cancelled => write!(f, "render cancelled"),
        }
    }
}

impl core::error::Error for AdapterError {}

impl From<BufferError> for AdapterError {
    fn from(err: BufferError) -> Self {
        Self::Buffer(err)
    }
}

impl From<LimitExceeded> for AdapterError {
    fn from(err: LimitExceeded) -> Self {
        Self::Limit(err)
    }
}
