/// Error type shared by every operation of the crate.
pub mod error;

/// Small numeric utilities: label sets, stable argsort, matrix reordering and
/// stacking of sample lists into data matrices.
pub mod calc;

/// Structures to represent single-channel 2D data (images), with a closed set of
/// element types selectable at runtime.
pub mod image;

/// Texture descriptors, their spatial histograms, and supervised subspaces learned
/// from the resulting feature vectors.
pub mod feature;

/// Serializable settings for the descriptor, histogram and discriminant stages.
pub mod config;

pub use error::{Error, Result};

pub use image::{Image, GrayImage, ElementType, Pixel};

pub use config::Config;
