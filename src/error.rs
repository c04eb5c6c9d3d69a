use thiserror::Error;

/// Errors reported by the segmentation pipeline.
///
/// All of them are fatal. Configuration errors are detected before any per-pixel field is
/// allocated, so nothing has to be cleaned up by the caller.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum Error {
    #[error("image has zero size ({width}x{height})")]
    EmptyImage { width: usize, height: usize },
    #[error("image is {image:?} but overlay is {overlay:?} (width, height)")]
    DimensionMismatch {
        image: (usize, usize),
        overlay: (usize, usize),
    },
    #[error("buffer has {actual} bytes, expected {expected}")]
    BufferLength { expected: usize, actual: usize },
    #[error("image {width}x{height} is too large to address")]
    TooLarge { width: usize, height: usize },
    #[error("seed ({x}, {y}) lies outside of the image")]
    SeedOutOfBounds { x: usize, y: usize },
    #[error("allocation of {bytes} bytes failed")]
    AllocationFailed { bytes: usize },
}
