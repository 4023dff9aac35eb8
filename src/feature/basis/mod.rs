use nalgebra::*;
use crate::error::{self, Result};

/// Projects the rows of src into the column space of w, as y = (x - mean) w.
/// The mean is only subtracted when its length matches the sample dimension;
/// any other mean (e.g. an empty one) leaves the samples uncentered.
pub fn project(w : &DMatrix<f64>, mean : &DVector<f64>, src : &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let (n, d) = src.shape();
    if d != w.nrows() {
        return error::argument(format!("Samples have dimension {} but basis expects {}", d, w.nrows()));
    }
    let mut x = src.clone();
    if mean.nrows() == d {
        for i in 0..n {
            for j in 0..d {
                x[(i, j)] -= mean[j];
            }
        }
    }
    Ok(x * w)
}

/// Reconstructs samples from their coordinates at the column space of w, as x = y w^T + mean.
/// The mean is only added when its length matches the reconstructed dimension.
pub fn reconstruct(w : &DMatrix<f64>, mean : &DVector<f64>, src : &DMatrix<f64>) -> Result<DMatrix<f64>> {
    if src.ncols() != w.ncols() {
        return error::argument(format!("Coordinates have dimension {} but basis has {} components", src.ncols(), w.ncols()));
    }
    let mut x = src * w.transpose();
    let (n, d) = x.shape();
    if mean.nrows() == d {
        for i in 0..n {
            for j in 0..d {
                x[(i, j)] += mean[j];
            }
        }
    }
    Ok(x)
}

/// Basis reductions that re-express samples over a learned set of axes (columns of basis()),
/// ranked by the values at spectrum(). Projection and reconstruction are the same for every
/// implementor and carry no knowledge of how the basis was learned.
pub trait Subspace {

    fn basis(&self) -> Result<&DMatrix<f64>>;

    fn spectrum(&self) -> Result<&DVector<f64>>;

    /// Shift subtracted before projecting. None means samples are projected as they are.
    fn mean(&self) -> Option<&DVector<f64>> {
        None
    }

    /// Projects row-oriented samples.
    fn project_rows(&self, src : &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let empty = DVector::zeros(0);
        project(self.basis()?, self.mean().unwrap_or(&empty), src)
    }

    /// Reconstructs row-oriented coordinates.
    fn reconstruct_rows(&self, src : &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let empty = DVector::zeros(0);
        reconstruct(self.basis()?, self.mean().unwrap_or(&empty), src)
    }

}
