//! Module containing the crate-wide error type
use thiserror::Error;

/// Universal error type for isosurface extraction
#[derive(Error, Debug)]
pub enum Error {
    /// Every axis needs at least two samples to form a voxel
    #[error("volume dimensions {0:?} must be at least 2 along every axis")]
    BadDimensions([usize; 3]),

    /// The scalar buffer is empty
    #[error("volume has no scalar data")]
    MissingScalars,

    /// Scalar buffer length does not match the volume size
    #[error("scalar buffer length ({0}) does not match expected count ({1})")]
    BadScalarCount(usize, usize),

    /// Scalars must have at least one component per sample
    #[error("scalar component count must be at least 1")]
    ZeroComponents,

    /// The selected component is out of range
    #[error("array component ({0}) exceeds component count ({1})")]
    BadComponent(usize, usize),

    /// Grid spacing must be finite and non-zero on every axis
    #[error("bad grid spacing {0:?}")]
    BadSpacing([f64; 3]),

    /// A point attribute has the wrong number of values
    #[error("attribute `{0}` has {1} values; expected {2}")]
    BadAttributeLength(String, usize, usize),

    /// Raw data is not a whole number of scalars
    #[error("byte count ({0}) is not a multiple of the scalar size ({1})")]
    BadByteCount(usize, usize),

    /// Output arrays could not be allocated
    #[error("could not allocate output arrays: {0}")]
    AllocationFailed(#[from] std::collections::TryReserveError),

    /// The operation was cancelled through its [`CancelToken`]
    ///
    /// [`CancelToken`]: crate::CancelToken
    #[error("operation was cancelled")]
    Cancelled,

    /// IO error; see inner code for details
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}
