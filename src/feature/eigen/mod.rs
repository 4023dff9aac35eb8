use nalgebra::*;
use crate::calc;
use crate::error::{self, Error, Result};

/// Eigenvalues and the corresponding eigenvectors (as columns), in no particular order.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenPairs {
    pub values : DVector<f64>,
    pub vectors : DMatrix<f64>
}

/// Real dense eigen-decomposition of a general (not necessarily symmetric) square matrix.
/// Implementors are not required to order the pairs; callers sort them as they need.
pub trait EigenSolver {

    fn solve(&self, m : &DMatrix<f64>) -> Result<EigenPairs>;

}

/// Eigenvalues from the real Schur form; eigenvectors as the right-singular vectors
/// of (M - λI) with the smallest singular values. Eigenvalues that agree up to the
/// relative tolerance are treated as one eigenspace and receive distinct vectors.
#[derive(Debug, Clone, Copy)]
pub struct SchurEigen {
    pub tol : f64,
    pub max_iter : usize
}

impl Default for SchurEigen {

    fn default() -> Self {
        Self { tol : 1E-9, max_iter : 10_000 }
    }

}

impl SchurEigen {

    fn eigenvalues(&self, m : &DMatrix<f64>) -> Result<DVector<f64>> {
        let schur = Schur::try_new(m.clone(), f64::EPSILON, self.max_iter)
            .ok_or_else(|| Error::Decomposition(format!("Schur form did not converge after {} iterations", self.max_iter)) )?;
        match schur.eigenvalues() {
            Some(vals) => Ok(vals),
            None => {
                log::warn!("Matrix has complex eigenvalues; keeping their real parts");
                Ok(schur.complex_eigenvalues().map(|c| c.re ))
            }
        }
    }

}

impl EigenSolver for SchurEigen {

    fn solve(&self, m : &DMatrix<f64>) -> Result<EigenPairs> {
        if !m.is_square() {
            return error::argument(format!("Eigen-decomposition requires a square matrix (got {:?})", m.shape()));
        }
        let n = m.nrows();
        let values = self.eigenvalues(m)?;
        let scale = values.iter().fold(1.0f64, |s, v| s.max(v.abs()) );
        let mut vectors = DMatrix::zeros(n, n);
        let mut assigned = vec![false; n];
        for i in 0..n {
            if assigned[i] {
                continue;
            }
            let group : Vec<usize> = (i..n)
                .filter(|j| !assigned[*j] && (values[*j] - values[i]).abs() <= self.tol * scale )
                .collect();
            let mut shifted = m.clone();
            for k in 0..n {
                shifted[(k, k)] -= values[i];
            }
            let svd = SVD::new(shifted, false, true);
            let v_t = svd.v_t.ok_or_else(|| Error::Decomposition(String::from("SVD did not produce right-singular vectors")) )?;
            let order = calc::argsort(svd.singular_values.as_slice(), true);
            for (j, sv) in group.iter().zip(order.iter()) {
                let v = v_t.row(*sv).transpose();
                vectors.set_column(*j, &v.normalize());
                assigned[*j] = true;
            }
        }
        Ok(EigenPairs { values, vectors })
    }

}
