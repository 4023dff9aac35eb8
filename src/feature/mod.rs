/// Local binary pattern operators (original, extended and variance-based) over
/// single-channel images of any supported element type.
pub mod lbp;

/// Bounded histograms and grid-partitioned spatial histograms of descriptor maps.
pub mod histogram;

/// Linear projection and reconstruction over a learned basis.
pub mod basis;

/// Real dense eigen-decomposition, injected into the subspace estimators.
pub mod eigen;

/// Fisher linear discriminant analysis.
pub mod lda;

/// Image to feature vector pipeline (operator followed by spatial histogram).
pub mod extraction;

pub use lbp::{Operator, DescriptorMap};

pub use histogram::HistogramConfig;

pub use basis::Subspace;

pub use eigen::{EigenSolver, EigenPairs, SchurEigen};

pub use lda::{LDA, LdaConfig};

pub use extraction::Extractor;
