use nalgebra::*;
use crate::image::GrayImage;
use crate::feature::lbp::Operator;
use crate::feature::histogram::HistogramConfig;
use crate::config::Config;
use crate::error::{self, Result};

/// Turns images into fixed-length feature vectors: the image goes through an LBP
/// operator and the resulting descriptor map is summarized by a spatial histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extractor {
    pub operator : Operator,
    pub histogram : HistogramConfig
}

impl Default for Extractor {

    fn default() -> Self {
        Self { operator : Operator::default(), histogram : HistogramConfig::default() }
    }

}

impl Extractor {

    pub fn new(operator : Operator, histogram : HistogramConfig) -> Self {
        Self { operator, histogram }
    }

    pub fn from_config(config : &Config) -> Self {
        Self::new(config.operator, config.histogram)
    }

    /// Number of histogram bins per cell. An explicit value at the histogram configuration
    /// takes precedence over the operator code count.
    pub fn num_patterns(&self) -> Result<usize> {
        match self.histogram.num_patterns.or_else(|| self.operator.num_patterns() ) {
            Some(n) => Ok(n),
            None => error::argument(format!("Operator '{}' requires an explicit number of patterns", self.operator.name()))
        }
    }

    /// Length of every feature vector produced by this extractor.
    pub fn feature_len(&self) -> Result<usize> {
        Ok(self.histogram.grid_x * self.histogram.grid_y * self.num_patterns()?)
    }

    pub fn extract(&self, src : &GrayImage) -> Result<DVector<f64>> {
        let num_patterns = self.num_patterns()?;
        let map = self.operator.apply(src)?;
        map.spatial_histogram(num_patterns, self.histogram.grid_x, self.histogram.grid_y, self.histogram.normed)
    }

    /// Feature vectors of all images, one per row.
    pub fn extract_all(&self, src : &[GrayImage]) -> Result<DMatrix<f64>> {
        let feats = src.iter()
            .map(|img| self.extract(img) )
            .collect::<Result<Vec<_>>>()?;
        if feats.is_empty() {
            return Ok(DMatrix::zeros(0, self.feature_len()?));
        }
        crate::calc::as_row_matrix(&feats)
    }

}
