use thiserror::Error;
use crate::image::ElementType;

/// Errors produced by descriptor extraction and subspace estimation. Every
/// computation here is deterministic, so none of those are worth retrying
/// without changing the input.
#[derive(Debug, Error)]
pub enum Error {

    /// Inconsistent or malformed input (label/sample counts, grid sizes, operator parameters).
    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Operator '{operator}' does not support {element} images")]
    UnsupportedElementType {
        operator : &'static str,
        element : ElementType
    },

    /// The within-class scatter matrix could not be inverted. No regularization is attempted.
    #[error("Within-class scatter matrix is singular")]
    SingularMatrix,

    #[error("Eigen-decomposition failed: {0}")]
    Decomposition(String),

    /// Basis or spectrum were requested before a successful compute.
    #[error("Subspace not computed yet")]
    NotComputed,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error)

}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn argument<T>(msg : impl Into<String>) -> Result<T> {
    Err(Error::Argument(msg.into()))
}
