use serde::{Serialize, Deserialize};
use std::f64::consts::PI;
use crate::image::{Image, GrayImage, Pixel, ElementType};
use crate::error::{self, Error, Result};

/// Local binary pattern operators. Each operator maps a single-channel image to a
/// descriptor map that is smaller than the source by the operator border at every side.
///
///  Ahonen T, Hadid A. and Pietikäinen M. "Face description with local binary
///  patterns: Application to face recognition." IEEE Transactions on Pattern
///  Analysis and Machine Intelligence, 28(12):2037-2041.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operator {

    /// Thresholds the 8 immediate neighbours against the centre pixel.
    Original,

    /// Thresholds interpolated samples over a circle of the given radius.
    Extended { radius : usize, neighbors : usize },

    /// Variance of the interpolated circular samples (texture energy, not a binary code).
    Variance { radius : usize, neighbors : usize }

}

impl Default for Operator {

    fn default() -> Self {
        Operator::Extended { radius : 1, neighbors : 8 }
    }

}

impl Operator {

    /// Number of pixels lost at each side of the source.
    pub fn border(&self) -> usize {
        match self {
            Operator::Original => 1,
            Operator::Extended { radius, .. } | Operator::Variance { radius, .. } => *radius
        }
    }

    /// Number of distinct codes, when the operator produces codes.
    pub fn num_patterns(&self) -> Option<usize> {
        match self {
            Operator::Original => Some(256),
            Operator::Extended { neighbors, .. } => 1usize.checked_shl(*neighbors as u32),
            Operator::Variance { .. } => None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operator::Original => "olbp",
            Operator::Extended { .. } => "elbp",
            Operator::Variance { .. } => "varlbp"
        }
    }

    pub fn apply(&self, src : &GrayImage) -> Result<DescriptorMap> {
        let map = match *self {
            Operator::Original => DescriptorMap::Codes8(olbp_any(src)?),
            Operator::Extended { radius, neighbors } => DescriptorMap::Codes32(elbp_any(src, radius, neighbors)?),
            Operator::Variance { radius, neighbors } => DescriptorMap::Energy(varlbp_any(src, radius, neighbors)?)
        };
        log::debug!("{} mapped {:?} image {:?} to {:?}", self.name(), src.element_type(), src.shape(), map.shape());
        Ok(map)
    }

}

/// Output of an LBP operator.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorMap {
    Codes8(Image<u8>),
    Codes32(Image<i32>),
    Energy(Image<f64>)
}

impl DescriptorMap {

    pub fn shape(&self) -> (usize, usize) {
        match self {
            DescriptorMap::Codes8(m) => m.shape(),
            DescriptorMap::Codes32(m) => m.shape(),
            DescriptorMap::Energy(m) => m.shape()
        }
    }

    pub fn is_empty(&self) -> bool {
        let (nrows, ncols) = self.shape();
        nrows == 0 || ncols == 0
    }

}

/// Runs $body with $src bound to the typed image for every supported element type,
/// and fails explicitly for the remaining ones.
macro_rules! dispatch {
    ($img:expr, $name:expr, |$src:ident| $body:expr) => {{
        let img : &GrayImage = $img;
        match img {
            GrayImage::U8($src) => $body,
            GrayImage::I8($src) => $body,
            GrayImage::U16($src) => $body,
            GrayImage::I16($src) => $body,
            GrayImage::U32($src) => $body,
            GrayImage::I32($src) => $body,
            GrayImage::F32($src) => $body,
            GrayImage::F64($src) => $body,
            GrayImage::U64(_) | GrayImage::I64(_) => Err(Error::UnsupportedElementType {
                operator : $name,
                element : img.element_type()
            })
        }
    }}
}

/// Whether the LBP operators handle images of this element type.
pub fn supports(element : ElementType) -> bool {
    !matches!(element, ElementType::U64 | ElementType::I64)
}

pub fn olbp_any(src : &GrayImage) -> Result<Image<u8>> {
    dispatch!(src, "olbp", |img| Ok(olbp(img)))
}

pub fn elbp_any(src : &GrayImage, radius : usize, neighbors : usize) -> Result<Image<i32>> {
    dispatch!(src, "elbp", |img| elbp(img, radius, neighbors))
}

pub fn varlbp_any(src : &GrayImage, radius : usize, neighbors : usize) -> Result<Image<f64>> {
    dispatch!(src, "varlbp", |img| varlbp(img, radius, neighbors))
}

// Neighbour offsets (row, col) of the original operator, from the most significant bit (NW)
// clockwise down to the least significant one (W).
const RING : [(isize, isize); 8] = [(-1, -1), (-1, 0), (-1, 1), (0, 1), (1, 1), (1, 0), (1, -1), (0, -1)];

/// Calculates the original local binary patterns: bit set when the neighbour is
/// greater than or equal to the centre.
pub fn olbp<N : Pixel>(src : &Image<N>) -> Image<u8> {
    let (nrows, ncols) = src.shape();
    Image::tabulate(nrows.saturating_sub(2), ncols.saturating_sub(2), |i, j| {
        let (ci, cj) = (i + 1, j + 1);
        let center = src.get(ci, cj);
        RING.iter().enumerate().fold(0u8, |code, (k, (di, dj))| {
            let px = src.get((ci as isize + di) as usize, (cj as isize + dj) as usize);
            code | (((px >= center) as u8) << (7 - k))
        })
    })
}

/// Interpolation setup of one sample point over the circle, relative to the centre pixel.
#[derive(Debug, Clone, Copy)]
struct CircularSample {
    fy : isize,
    fx : isize,
    cy : isize,
    cx : isize,
    w : [f64; 4]
}

impl CircularSample {

    fn new(radius : usize, n : usize, neighbors : usize) -> Self {
        let angle = 2.0 * PI * n as f64 / neighbors as f64;
        let x = -(radius as f64) * angle.sin();
        let y = (radius as f64) * angle.cos();
        let (fx, fy) = (x.floor(), y.floor());
        let (cx, cy) = (x.ceil(), y.ceil());
        let (tx, ty) = (x - fx, y - fy);
        Self {
            fy : fy as isize,
            fx : fx as isize,
            cy : cy as isize,
            cx : cx as isize,
            w : [(1. - tx) * (1. - ty), tx * (1. - ty), (1. - tx) * ty, tx * ty]
        }
    }

    /// Bilinear interpolation around source position (i, j). The caller guarantees all four
    /// corners are inside the image.
    fn interpolate<N : Pixel>(&self, src : &Image<N>, i : usize, j : usize) -> f64 {
        let at = |di : isize, dj : isize| -> f64 {
            src.get((i as isize + di) as usize, (j as isize + dj) as usize).as_()
        };
        self.w[0] * at(self.fy, self.fx) + self.w[1] * at(self.fy, self.cx) +
            self.w[2] * at(self.cy, self.fx) + self.w[3] * at(self.cy, self.cx)
    }

}

fn circle(radius : usize, neighbors : usize) -> Vec<CircularSample> {
    (0..neighbors).map(|n| CircularSample::new(radius, n, neighbors) ).collect()
}

fn validate_circle(radius : usize, neighbors : usize) -> Result<()> {
    if radius == 0 {
        return error::argument("LBP radius must be at least 1");
    }
    if neighbors == 0 {
        return error::argument("LBP neighbour count must be at least 1");
    }
    Ok(())
}

/// Calculates the extended (circular) local binary patterns. Bit n is set when the
/// interpolated sample n is above the centre, or equal to it up to f32 precision.
pub fn elbp<N : Pixel>(src : &Image<N>, radius : usize, neighbors : usize) -> Result<Image<i32>> {
    validate_circle(radius, neighbors)?;
    if neighbors > 31 {
        return error::argument(format!("At most 31 neighbours fit an i32 code (got {})", neighbors));
    }
    let samples = circle(radius, neighbors);
    let (nrows, ncols) = src.shape();
    Ok(Image::tabulate(nrows.saturating_sub(2*radius), ncols.saturating_sub(2*radius), |i, j| {
        let (ci, cj) = (i + radius, j + radius);
        let center : f64 = src.get(ci, cj).as_();
        samples.iter().enumerate().fold(0i32, |code, (n, s)| {
            let t = s.interpolate(src, ci, cj);
            let set = t > center || (t - center).abs() < f32::EPSILON as f64;
            code | ((set as i32) << n)
        })
    }))
}

/// Calculates the variance-based local binary patterns (without quantization): the
/// sample variance of the interpolated circular samples, accumulated in a single pass.
///
///  Pietikäinen, M., Hadid, A., Zhao, G. and Ahonen, T. (2011), "Computer
///  Vision Using Local Binary Patterns", Springer.
pub fn varlbp<N : Pixel>(src : &Image<N>, radius : usize, neighbors : usize) -> Result<Image<f64>> {
    validate_circle(radius, neighbors)?;
    let samples = circle(radius, neighbors);
    let denom = neighbors.saturating_sub(1).max(1) as f64;
    let (nrows, ncols) = src.shape();
    Ok(Image::tabulate(nrows.saturating_sub(2*radius), ncols.saturating_sub(2*radius), |i, j| {
        let (ci, cj) = (i + radius, j + radius);
        let (mut mean, mut m2) = (0.0, 0.0);
        for (n, s) in samples.iter().enumerate() {
            let t = s.interpolate(src, ci, cj);
            let delta = t - mean;
            mean += delta / (n + 1) as f64;
            m2 += delta * (t - mean);
        }
        m2 / denom
    }))
}
