use nalgebra::*;
use std::cmp::Ordering;
use crate::error::{self, Result};

/// Distinct values of src in ascending order.
pub fn unique_sorted<T : Ord + Copy>(src : &[T]) -> Vec<T> {
    let mut elems : Vec<T> = src.to_vec();
    elems.sort_unstable();
    elems.dedup();
    elems
}

/// Indices that sort values. The sort is stable: entries that compare equal (or are
/// not comparable) keep their relative order.
pub fn argsort(values : &[f64], ascending : bool) -> Vec<usize> {
    let mut ixs : Vec<usize> = (0..values.len()).collect();
    ixs.sort_by(|a, b| {
        let ord = values[*a].partial_cmp(&values[*b]).unwrap_or(Ordering::Equal);
        if ascending { ord } else { ord.reverse() }
    });
    ixs
}

/// Copies the columns of src in the order given by indices.
pub fn sort_columns(src : &DMatrix<f64>, indices : &[usize]) -> DMatrix<f64> {
    src.select_columns(indices.iter())
}

/// Copies the rows of src in the order given by indices.
pub fn sort_rows(src : &DMatrix<f64>, indices : &[usize]) -> DMatrix<f64> {
    src.select_rows(indices.iter())
}

/// Whether m is square and m[(i,j)] is within eps of m[(j,i)] everywhere.
pub fn is_symmetric(m : &DMatrix<f64>, eps : f64) -> bool {
    if !m.is_square() {
        return false;
    }
    for i in 0..m.nrows() {
        for j in (i+1)..m.ncols() {
            if (m[(i, j)] - m[(j, i)]).abs() > eps {
                return false;
            }
        }
    }
    true
}

/// Stacks the samples as the rows of a matrix. All samples must share the same length.
pub fn as_row_matrix(src : &[DVector<f64>]) -> Result<DMatrix<f64>> {
    let d = sample_dim(src)?;
    Ok(DMatrix::from_fn(src.len(), d, |i, j| src[i][j] ))
}

/// Stacks the samples as the columns of a matrix. All samples must share the same length.
pub fn as_column_matrix(src : &[DVector<f64>]) -> Result<DMatrix<f64>> {
    let d = sample_dim(src)?;
    Ok(DMatrix::from_fn(d, src.len(), |i, j| src[j][i] ))
}

fn sample_dim(src : &[DVector<f64>]) -> Result<usize> {
    let d = src.first().map(|s| s.nrows() ).unwrap_or(0);
    if let Some((ix, s)) = src.iter().enumerate().find(|(_, s)| s.nrows() != d ) {
        return error::argument(format!("Sample {} has dimension {} (expected {})", ix, s.nrows(), d));
    }
    Ok(d)
}
