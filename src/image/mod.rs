use nalgebra::*;
use num_traits::AsPrimitive;
use serde::{Serialize, Deserialize};
use std::fmt::{self, Display};

/// Closed set of sample types an image can carry. Operators that only handle a subset
/// of those report the remaining ones as unsupported instead of skipping them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64
}

impl Display for ElementType {

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::U8 => "u8",
            ElementType::I8 => "i8",
            ElementType::U16 => "u16",
            ElementType::I16 => "i16",
            ElementType::U32 => "u32",
            ElementType::I32 => "i32",
            ElementType::U64 => "u64",
            ElementType::I64 => "i64",
            ElementType::F32 => "f32",
            ElementType::F64 => "f64"
        };
        write!(f, "{}", name)
    }

}

/// Single-channel sample type usable as an image element.
pub trait Pixel
where
    Self : Scalar + Copy + PartialOrd + AsPrimitive<f64> + Send + Sync
{

    const ELEMENT : ElementType;

}

macro_rules! impl_pixel {
    ($($t:ty => $tag:ident),*) => {
        $(
            impl Pixel for $t {
                const ELEMENT : ElementType = ElementType::$tag;
            }
        )*
    }
}

impl_pixel!(u8 => U8, i8 => I8, u16 => U16, i16 => I16, u32 => U32, i32 => I32,
    u64 => U64, i64 => I64, f32 => F32, f64 => F64);

/// Digital image, indexed by (row, col).
#[derive(Debug, Clone, PartialEq)]
pub struct Image<N>
where
    N : Scalar
{
    /// We implement image in terms of a matrix; this wrapping happens because we do not want to use the
    /// linear operator interpretation of a matrix: we just want to make use of 2D column-oriented indexing.
    buf : DMatrix<N>
}

impl<N> Image<N>
where
    N : Scalar + Copy
{

    pub fn new_constant(nrows : usize, ncols : usize, value : N) -> Self {
        Self{ buf : DMatrix::from_element(nrows, ncols, value) }
    }

    /// Builds an image from samples laid out row after row.
    pub fn from_row_slice(nrows : usize, ncols : usize, data : &[N]) -> Self {
        Self{ buf : DMatrix::from_row_slice(nrows, ncols, data) }
    }

    pub fn from_fn<F>(nrows : usize, ncols : usize, f : F) -> Self
    where
        F : FnMut(usize, usize) -> N
    {
        Self{ buf : DMatrix::from_fn(nrows, ncols, f) }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.buf.shape()
    }

    pub fn width(&self) -> usize {
        self.buf.ncols()
    }

    pub fn height(&self) -> usize {
        self.buf.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn get(&self, row : usize, col : usize) -> N {
        self.buf[(row, col)]
    }

    pub fn full_window<'a>(&'a self) -> Window<'a, N> {
        self.window((0, 0), self.buf.shape())
    }

    pub fn window<'a>(&'a self, offset : (usize, usize), sz : (usize, usize)) -> Window<'a, N> {
        Window { win : self.buf.slice(offset, sz), offset }
    }

    /// Samples in row-major order, which is the layout used when an image becomes a feature vector.
    pub fn row_major(&self) -> Vec<N> {
        self.buf.transpose().as_slice().to_vec()
    }

}

impl<N> Image<N>
where
    N : Scalar + Copy + Send
{

    /// Evaluates f at every (row, col) position. Positions are independent, so with
    /// the parallel feature rows are distributed across the rayon pool.
    pub(crate) fn tabulate<F>(nrows : usize, ncols : usize, f : F) -> Self
    where
        F : Fn(usize, usize) -> N + Sync
    {
        let f = &f;

        #[cfg(feature="parallel")]
        let data : Vec<N> = {
            use rayon::prelude::*;
            (0..nrows).into_par_iter()
                .flat_map_iter(|i| (0..ncols).map(move |j| f(i, j)) )
                .collect()
        };

        #[cfg(not(feature="parallel"))]
        let data : Vec<N> = (0..nrows)
            .flat_map(|i| (0..ncols).map(move |j| f(i, j)) )
            .collect();

        Self::from_row_slice(nrows, ncols, &data[..])
    }

}

impl<N> AsRef<DMatrix<N>> for Image<N>
where
    N : Scalar
{
    fn as_ref(&self) -> &DMatrix<N> {
        &self.buf
    }
}

/// Data is assumed to live on the matrix in a column-order fashion, not row-ordered.
impl<N> From<DMatrix<N>> for Image<N>
where
    N : Scalar
{
    fn from(buf : DMatrix<N>) -> Self {
        Self{ buf }
    }
}

/// Borrowed subset of an image.
#[derive(Debug, Clone)]
pub struct Window<'a, N>
where
    N : Scalar
{
    offset : (usize, usize),
    win : DMatrixSlice<'a, N>
}

impl<'a, N> Window<'a, N>
where
    N : Scalar + Copy
{

    pub fn sub_window(&'a self, offset : (usize, usize), dims : (usize, usize)) -> Window<'a, N> {
        Window{ win : self.win.slice(offset, dims), offset : (self.offset.0 + offset.0, self.offset.1 + offset.1) }
    }

    /// Position of the top-left sample at the source image.
    pub fn offset(&self) -> (usize, usize) {
        self.offset
    }

    pub fn shape(&self) -> (usize, usize) {
        self.win.shape()
    }

    pub fn width(&self) -> usize {
        self.win.ncols()
    }

    pub fn height(&self) -> usize {
        self.win.nrows()
    }

    pub fn len(&self) -> usize {
        self.win.len()
    }

    pub fn is_empty(&self) -> bool {
        self.win.is_empty()
    }

    pub fn pixels(&self) -> impl Iterator<Item=N> + '_ {
        self.win.iter().copied()
    }

}

impl<'a, N> AsRef<DMatrixSlice<'a, N>> for Window<'a, N>
where
    N : Scalar
{
    fn as_ref(&self) -> &DMatrixSlice<'a, N> {
        &self.win
    }
}

/// Image whose element type is only known at runtime (e.g. decoded by an external loader).
/// Operators dispatch on the variant to a specialization of their generic kernel.
#[derive(Debug, Clone, PartialEq)]
pub enum GrayImage {
    U8(Image<u8>),
    I8(Image<i8>),
    U16(Image<u16>),
    I16(Image<i16>),
    U32(Image<u32>),
    I32(Image<i32>),
    U64(Image<u64>),
    I64(Image<i64>),
    F32(Image<f32>),
    F64(Image<f64>)
}

/// Expands $body once per variant with $src bound to the typed image.
macro_rules! for_each_variant {
    ($img:expr, |$src:ident| $body:expr) => {
        match $img {
            GrayImage::U8($src) => $body,
            GrayImage::I8($src) => $body,
            GrayImage::U16($src) => $body,
            GrayImage::I16($src) => $body,
            GrayImage::U32($src) => $body,
            GrayImage::I32($src) => $body,
            GrayImage::U64($src) => $body,
            GrayImage::I64($src) => $body,
            GrayImage::F32($src) => $body,
            GrayImage::F64($src) => $body
        }
    }
}

impl GrayImage {

    pub fn element_type(&self) -> ElementType {
        for_each_variant!(self, |src| element_of(src))
    }

    pub fn shape(&self) -> (usize, usize) {
        for_each_variant!(self, |src| src.shape())
    }

    /// Samples converted to f64, in row-major order.
    pub fn to_row_major_f64(&self) -> Vec<f64> {
        for_each_variant!(self, |src| src.row_major().iter().map(|px| AsPrimitive::<f64>::as_(*px) ).collect())
    }

    /// Rescales the samples linearly so that the minimum maps to 0 and the maximum to 255.
    /// A constant image maps to zero.
    pub fn to_grayscale(&self) -> Image<u8> {
        for_each_variant!(self, |src| to_grayscale(src))
    }

}

fn element_of<N : Pixel>(_ : &Image<N>) -> ElementType {
    N::ELEMENT
}

pub fn to_grayscale<N : Pixel>(src : &Image<N>) -> Image<u8> {
    let (nrows, ncols) = src.shape();
    let vals : Vec<f64> = src.as_ref().iter().map(|px| px.as_() ).collect();
    let min = vals.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = vals.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    Image::from_fn(nrows, ncols, |i, j| {
        if range > 0.0 {
            let v : f64 = src.get(i, j).as_();
            (255.0 * (v - min) / range).round() as u8
        } else {
            0
        }
    })
}

macro_rules! impl_from_image {
    ($($t:ty => $tag:ident),*) => {
        $(
            impl From<Image<$t>> for GrayImage {
                fn from(img : Image<$t>) -> Self {
                    GrayImage::$tag(img)
                }
            }
        )*
    }
}

impl_from_image!(u8 => U8, i8 => I8, u16 => U16, i16 => I16, u32 => U32, i32 => I32,
    u64 => U64, i64 => I64, f32 => F32, f64 => F64);
