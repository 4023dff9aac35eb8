use nalgebra::*;
use serde::{Serialize, Deserialize};
use crate::image::{Image, Window, Pixel};
use crate::feature::lbp::DescriptorMap;
use crate::error::{self, Result};

/// Grid layout and binning of the spatial histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramConfig {

    /// Number of distinct pattern values. When absent, it is taken from the operator
    /// that produced the descriptor map.
    pub num_patterns : Option<usize>,

    pub grid_x : usize,

    pub grid_y : usize,

    /// Divide each cell histogram by the cell pixel count.
    pub normed : bool

}

impl Default for HistogramConfig {

    fn default() -> Self {
        Self { num_patterns : None, grid_x : 8, grid_y : 8, normed : true }
    }

}

/// Counts the window values over the unit bins [min, min+1), ..., [max, max+1).
/// Values outside [min, max+1) are not counted.
pub fn histc<N : Pixel>(src : &Window<'_, N>, min : i64, max : i64, normed : bool) -> DVector<f64> {
    let nbins = (max - min + 1).max(0) as usize;
    let mut hist = DVector::zeros(nbins);
    let (lo, hi) = (min as f64, (max + 1) as f64);
    for px in src.pixels() {
        let v : f64 = px.as_();
        if v >= lo && v < hi {
            let bin = ((v - lo).floor() as usize).min(nbins - 1);
            hist[bin] += 1.0;
        }
    }
    if normed && !src.is_empty() {
        hist.unscale_mut(src.len() as f64);
    }
    hist
}

/// Calculates the spatial histogram of a descriptor map: the map is split into
/// grid_x by grid_y cells of floor(cols / grid_x) by floor(rows / grid_y) pixels
/// starting at the top-left corner (remainder rows and columns are not used), and the
/// histograms over [0, num_patterns-1] of each cell are concatenated in row-major
/// cell order. An empty map yields a zero vector of the same length.
pub fn spatial_histogram<N : Pixel>(
    src : &Image<N>,
    num_patterns : usize,
    grid_x : usize,
    grid_y : usize,
    normed : bool
) -> Result<DVector<f64>> {
    if grid_x == 0 || grid_y == 0 {
        return error::argument(format!("Grid must have at least one cell (got {}x{})", grid_x, grid_y));
    }
    if num_patterns == 0 {
        return error::argument("Spatial histogram needs at least one pattern");
    }
    let mut result = DVector::zeros(grid_x * grid_y * num_patterns);
    if src.is_empty() {
        return Ok(result);
    }
    let width = src.width() / grid_x;
    let height = src.height() / grid_y;
    let full = src.full_window();
    for i in 0..grid_y {
        for j in 0..grid_x {
            let cell = full.sub_window((i*height, j*width), (height, width));
            let hist = histc(&cell, 0, num_patterns as i64 - 1, normed);
            let start = (i * grid_x + j) * num_patterns;
            result.rows_mut(start, num_patterns).copy_from(&hist);
        }
    }
    Ok(result)
}

impl DescriptorMap {

    pub fn spatial_histogram(&self, num_patterns : usize, grid_x : usize, grid_y : usize, normed : bool) -> Result<DVector<f64>> {
        match self {
            DescriptorMap::Codes8(m) => spatial_histogram(m, num_patterns, grid_x, grid_y, normed),
            DescriptorMap::Codes32(m) => spatial_histogram(m, num_patterns, grid_x, grid_y, normed),
            DescriptorMap::Energy(m) => spatial_histogram(m, num_patterns, grid_x, grid_y, normed)
        }
    }

}
