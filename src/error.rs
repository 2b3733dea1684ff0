use thiserror::Error;

/// Errors raised by the extraction pipeline.
///
/// None of these are transient: each one signals either bad configuration or
/// an image that the pipeline cannot interpret. Callers decide whether to
/// surface the error (single-image mode) or log and skip (batch mode).
#[derive(Debug, Error)]
pub enum Error {
    /// The supplied corner points do not form a usable quadrilateral.
    #[error("invalid quadrilateral geometry: {0}")]
    InvalidGeometry(String),

    /// A kernel size, block size, or threshold is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No contour survived filtering; there is no digit region to decode.
    #[error("no digit region survived contour filtering")]
    EmptyRegion,

    /// The sampled on/off pattern is not in the classification table.
    #[error("unrecognized segment pattern {pattern:?}")]
    UnrecognizedSegmentPattern { pattern: [bool; 7] },

    /// The configuration document is malformed.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
