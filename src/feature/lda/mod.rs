use nalgebra::*;
use num_traits::AsPrimitive;
use serde::{Serialize, Deserialize};
use crate::calc;
use crate::image::GrayImage;
use crate::feature::basis::Subspace;
use crate::feature::eigen::{EigenSolver, SchurEigen};
use crate::error::{self, Error, Result};

/// Configuration of a discriminant analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LdaConfig {

    /// Number of discriminant axes to keep. Zero (or anything above the number of
    /// classes minus one) keeps all C-1 axes.
    pub num_components : usize,

    /// Whether samples are the rows (true) or the columns (false) of the data matrix.
    pub data_as_row : bool

}

impl Default for LdaConfig {

    fn default() -> Self {
        Self { num_components : 0, data_as_row : true }
    }

}

/// Per-class statistics, indexed by the dense class index.
#[derive(Debug, Clone)]
struct ClassMean {
    mean : DVector<f64>,
    count : usize
}

/// Result of a successful compute.
#[derive(Debug, Clone)]
struct Discriminants {
    eigenvectors : DMatrix<f64>,
    eigenvalues : DVector<f64>
}

/// LDA projects a data set into the axes of maximum between-class
/// variation relative to within-class variation (Fisher's criterion),
/// so that a decision over C classes can be made with at most C-1 variables
/// using information from an arbitrarily large number of dimensions.
/// The axes are the eigenvectors of sigma_w^-1 sigma_b, ranked by their eigenvalues.
///
/// Basis and spectrum only exist after a successful compute; until then every accessor
/// (and project/reconstruct) returns Error::NotComputed. A failed compute keeps the
/// previous state.
#[derive(Debug, Clone)]
pub struct LDA<S = SchurEigen>
where
    S : EigenSolver
{
    config : LdaConfig,
    solver : S,
    discr : Option<Discriminants>
}

impl LDA<SchurEigen> {

    pub fn new(num_components : usize, data_as_row : bool) -> Self {
        Self::from_config(LdaConfig { num_components, data_as_row })
    }

    pub fn from_config(config : LdaConfig) -> Self {
        Self::with_solver(config, SchurEigen::default())
    }

    /// Initializes and performs the analysis over src with the given labels.
    pub fn fit<N>(src : &DMatrix<N>, labels : &[i32], num_components : usize, data_as_row : bool) -> Result<Self>
    where
        N : Scalar + AsPrimitive<f64>
    {
        let mut lda = Self::new(num_components, data_as_row);
        lda.compute(src, labels)?;
        Ok(lda)
    }

}

impl<S> LDA<S>
where
    S : EigenSolver
{

    /// Uses the informed eigen-solver to decompose sigma_w^-1 sigma_b.
    pub fn with_solver(config : LdaConfig, solver : S) -> Self {
        Self { config, solver, discr : None }
    }

    pub fn config(&self) -> &LdaConfig {
        &self.config
    }

    pub fn is_computed(&self) -> bool {
        self.discr.is_some()
    }

    /// Computes the discriminants for the samples at src (rows or columns, depending
    /// on the configuration) and the corresponding labels. Labels can be any integers;
    /// they are only used to group samples.
    pub fn compute<N>(&mut self, src : &DMatrix<N>, labels : &[i32]) -> Result<()>
    where
        N : Scalar + AsPrimitive<f64>
    {
        let data : DMatrix<f64> = if self.config.data_as_row {
            src.map(|x| x.as_() )
        } else {
            src.transpose().map(|x| x.as_() )
        };
        let discr = discriminants(data, labels, self.config.num_components, &self.solver)?;
        self.discr = Some(discr);
        Ok(())
    }

    /// Computes the discriminants for a list of samples (e.g. spatial histograms). Each
    /// vector is one sample, irrespective of the configured orientation.
    pub fn compute_samples(&mut self, src : &[DVector<f64>], labels : &[i32]) -> Result<()> {
        let data = calc::as_row_matrix(src)?;
        let discr = discriminants(data, labels, self.config.num_components, &self.solver)?;
        self.discr = Some(discr);
        Ok(())
    }

    /// Computes the discriminants for a list of images, each flattened in row-major order.
    /// All images must have the same shape.
    pub fn compute_images(&mut self, src : &[GrayImage], labels : &[i32]) -> Result<()> {
        if let Some(first) = src.first() {
            if let Some(other) = src.iter().find(|img| img.shape() != first.shape() ) {
                return error::argument(format!("Image of shape {:?} differs from {:?}", other.shape(), first.shape()));
            }
        }
        let samples : Vec<DVector<f64>> = src.iter()
            .map(|img| DVector::from_vec(img.to_row_major_f64()) )
            .collect();
        self.compute_samples(&samples, labels)
    }

    /// Projects samples into the discriminant subspace. Samples are not centered.
    pub fn project<N>(&self, src : &DMatrix<N>) -> Result<DMatrix<f64>>
    where
        N : Scalar + AsPrimitive<f64>
    {
        let data = self.oriented(src);
        self.project_rows(&data)
    }

    /// Reconstructs samples from their discriminant coordinates.
    pub fn reconstruct<N>(&self, src : &DMatrix<N>) -> Result<DMatrix<f64>>
    where
        N : Scalar + AsPrimitive<f64>
    {
        let data = self.oriented(src);
        self.reconstruct_rows(&data)
    }

    /// Discriminant axes as columns, ordered by descending eigenvalue.
    pub fn eigenvectors(&self) -> Result<&DMatrix<f64>> {
        self.discr.as_ref().map(|d| &d.eigenvectors ).ok_or(Error::NotComputed)
    }

    /// Eigenvalues of the retained axes, in descending order.
    pub fn eigenvalues(&self) -> Result<&DVector<f64>> {
        self.discr.as_ref().map(|d| &d.eigenvalues ).ok_or(Error::NotComputed)
    }

    /// Number of axes actually retained by the last compute.
    pub fn num_components(&self) -> Result<usize> {
        self.eigenvectors().map(|w| w.ncols() )
    }

    fn oriented<N>(&self, src : &DMatrix<N>) -> DMatrix<f64>
    where
        N : Scalar + AsPrimitive<f64>
    {
        if self.config.data_as_row {
            src.map(|x| x.as_() )
        } else {
            src.transpose().map(|x| x.as_() )
        }
    }

}

impl<S> Subspace for LDA<S>
where
    S : EigenSolver
{

    fn basis(&self) -> Result<&DMatrix<f64>> {
        self.eigenvectors()
    }

    fn spectrum(&self) -> Result<&DVector<f64>> {
        self.eigenvalues()
    }

}

/// Remaps labels into dense class indices 0..C following their sorted order.
fn dense_labels(labels : &[i32]) -> (Vec<usize>, usize) {
    let classes = calc::unique_sorted(labels);
    let mapped = labels.iter()
        .map(|l| classes.binary_search(l).unwrap_or_default() )
        .collect();
    (mapped, classes.len())
}

fn class_means(data : &DMatrix<f64>, mapped : &[usize], num_classes : usize) -> (DVector<f64>, Vec<ClassMean>) {
    let (n, d) = data.shape();
    let mut total = DVector::zeros(d);
    let mut classes = vec![ClassMean { mean : DVector::zeros(d), count : 0 }; num_classes];
    for (i, c) in mapped.iter().enumerate() {
        let x = data.row(i).transpose();
        total += &x;
        classes[*c].mean += &x;
        classes[*c].count += 1;
    }
    total.unscale_mut(n as f64);
    for class in classes.iter_mut() {
        class.mean.unscale_mut(class.count as f64);
    }
    (total, classes)
}

/// LU inversion only fails on exactly zero pivots, so rank deficiency (e.g. less samples
/// than dimensions) is detected from the singular values instead.
fn well_conditioned(m : &DMatrix<f64>) -> bool {
    let sv = SVD::new(m.clone(), false, false).singular_values;
    let (min, max) = (sv.min(), sv.max());
    max > 0.0 && min > max * m.nrows() as f64 * f64::EPSILON
}

/// Fisher discriminants over row-oriented samples.
fn discriminants<S>(mut data : DMatrix<f64>, labels : &[i32], num_components : usize, solver : &S) -> Result<Discriminants>
where
    S : EigenSolver
{
    let (n, d) = data.shape();
    if labels.len() != n {
        return error::argument(format!("The number of samples ({}) must equal the number of labels ({})", n, labels.len()));
    }
    if n == 0 || d == 0 {
        return error::argument(format!("No samples informed (data is {}x{})", n, d));
    }
    let (mapped, c) = dense_labels(labels);
    if c < 2 {
        return error::argument(format!("At least two classes are required (got {})", c));
    }
    if n < d {
        log::warn!("Less observations ({}) than feature dimension ({}); within-class scatter is probably singular", n, d);
    }
    let k = if num_components == 0 || num_components > c - 1 {
        c - 1
    } else {
        num_components
    };
    log::debug!("LDA over {} samples of dimension {} in {} classes; keeping {} components", n, d, c, k);

    let (total, classes) = class_means(&data, &mapped, c);

    // Center each sample at its own class mean.
    for (i, cl) in mapped.iter().enumerate() {
        for j in 0..d {
            data[(i, j)] -= classes[*cl].mean[j];
        }
    }

    let sw = data.tr_mul(&data);
    let mut sb = DMatrix::zeros(d, d);
    for class in classes.iter() {
        let diff = &class.mean - &total;
        sb += &diff * diff.transpose();
    }
    debug_assert!(calc::is_symmetric(&sb, 1E-9 * sb.amax().max(1.0)));

    if !well_conditioned(&sw) {
        return Err(Error::SingularMatrix);
    }
    let swi = sw.try_inverse().ok_or(Error::SingularMatrix)?;
    let m = swi * sb;
    let pairs = solver.solve(&m)?;
    if pairs.values.len() != d || pairs.vectors.shape() != (d, d) {
        return Err(Error::Decomposition(format!(
            "Solver returned {} values and {:?} vectors for a {}x{} matrix",
            pairs.values.len(),
            pairs.vectors.shape(),
            d,
            d
        )));
    }

    let order = calc::argsort(pairs.values.as_slice(), false);
    let kept = &order[0..k];
    let eigenvectors = calc::sort_columns(&pairs.vectors, kept);
    let eigenvalues = DVector::from_iterator(k, kept.iter().map(|ix| pairs.values[*ix] ));
    Ok(Discriminants { eigenvectors, eigenvalues })
}
