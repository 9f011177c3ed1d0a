use std::collections::BTreeSet;

use ndarray::{s, Array2, Array3, ArrayView1};

use crate::consts::MASK_CLEAR;
use crate::error::{NspiError, Result};

/// A multi-band raster of DN samples, indexed by (row, col, band).
///
/// Samples are stored in one contiguous row-major buffer: the value at
/// `(row, col, band)` lives at flat offset `(row * cols + col) * bands + band`.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    /// Sample data, shape = (rows, cols, bands)
    pub data: Array3<f64>,
}

impl Image {
    pub fn new(data: Array3<f64>) -> Self {
        Self { data }
    }

    pub fn zeros(rows: usize, cols: usize, bands: usize) -> Self {
        Self::new(Array3::zeros((rows, cols, bands)))
    }

    pub fn from_elem(rows: usize, cols: usize, bands: usize, value: f64) -> Self {
        Self::new(Array3::from_elem((rows, cols, bands), value))
    }

    /// Build an image from a row-major `(row, col, band)` buffer.
    pub fn from_row_major(data: Vec<f64>, dims: (usize, usize, usize)) -> Result<Self> {
        let expected = dims.0 * dims.1 * dims.2;
        if data.len() != expected {
            return Err(NspiError::ShapeMismatch(format!(
                "buffer holds {} samples, dims {}x{}x{} need {}",
                data.len(),
                dims.0,
                dims.1,
                dims.2,
                expected
            )));
        }
        let array = Array3::from_shape_vec(dims, data)
            .map_err(|e| NspiError::ShapeMismatch(e.to_string()))?;
        Ok(Self::new(array))
    }

    /// Build an image from a column-major, band-sequential buffer.
    ///
    /// The value for `(row, col, band)` is read from flat offset
    /// `band * rows * cols + col * rows + row`.
    pub fn from_column_major(data: &[f64], dims: (usize, usize, usize)) -> Result<Self> {
        let (rows, cols, bands) = dims;
        let expected = rows * cols * bands;
        if data.len() != expected {
            return Err(NspiError::ShapeMismatch(format!(
                "buffer holds {} samples, dims {}x{}x{} need {}",
                data.len(),
                rows,
                cols,
                bands,
                expected
            )));
        }
        let array = Array3::from_shape_fn(dims, |(row, col, band)| {
            data[band * rows * cols + col * rows + row]
        });
        Ok(Self::new(array))
    }

    /// Flatten into the column-major, band-sequential layout read by
    /// [`Image::from_column_major`].
    pub fn to_column_major(&self) -> Vec<f64> {
        let (rows, cols, bands) = self.dims();
        let mut out = vec![0.0; rows * cols * bands];
        for ((row, col, band), &v) in self.data.indexed_iter() {
            out[band * rows * cols + col * rows + row] = v;
        }
        out
    }

    pub fn rows(&self) -> usize {
        self.data.dim().0
    }

    pub fn cols(&self) -> usize {
        self.data.dim().1
    }

    pub fn bands(&self) -> usize {
        self.data.dim().2
    }

    /// (rows, cols, bands)
    pub fn dims(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Bounds-checked sample read.
    pub fn get(&self, row: usize, col: usize, band: usize) -> Option<f64> {
        self.data.get((row, col, band)).copied()
    }

    /// Bounds-checked sample write.
    pub fn set(&mut self, row: usize, col: usize, band: usize, value: f64) -> Result<()> {
        let (rows, cols, bands) = self.dims();
        match self.data.get_mut((row, col, band)) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(NspiError::IndexOutOfRange {
                row,
                col,
                band,
                rows,
                cols,
                bands,
            }),
        }
    }

    /// All band values at one pixel. Panics if the pixel is outside the image.
    pub fn spectrum(&self, row: usize, col: usize) -> ArrayView1<'_, f64> {
        self.data.slice(s![row, col, ..])
    }

    /// Overwrite all band values at one pixel.
    pub fn set_spectrum(&mut self, row: usize, col: usize, values: &[f64]) -> Result<()> {
        let (rows, cols, bands) = self.dims();
        if row >= rows || col >= cols || values.len() != bands {
            return Err(NspiError::IndexOutOfRange {
                row,
                col,
                band: values.len().saturating_sub(1),
                rows,
                cols,
                bands,
            });
        }
        for (band, &v) in values.iter().enumerate() {
            self.data[[row, col, band]] = v;
        }
        Ok(())
    }

    /// Minimum and maximum sample, ignoring NaN. `None` for an empty image.
    pub fn sample_range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Classification of a single mask cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaskClass {
    /// Clear in both images; usable as a donor.
    Clear,
    /// Missing or invalid in the clear image; never a donor, never filled.
    Invalid,
    /// Member of the cloud region with this code.
    Cloud(i32),
}

impl MaskClass {
    pub fn of(code: i32) -> Self {
        match code {
            MASK_CLEAR => Self::Clear,
            c if c > 0 => Self::Cloud(c),
            _ => Self::Invalid,
        }
    }
}

/// Per-pixel cloud region codes, indexed by (row, col).
///
/// `0` is clear, negative values are invalid, and each distinct positive
/// value names one cloud region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloudMask {
    /// Region codes, shape = (rows, cols)
    pub data: Array2<i32>,
}

/// Cell counts for a cloud mask.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaskSummary {
    pub clear: usize,
    pub invalid: usize,
    pub cloud: usize,
    pub regions: usize,
}

impl CloudMask {
    pub fn new(data: Array2<i32>) -> Self {
        Self { data }
    }

    /// A mask with every cell clear.
    pub fn clear(rows: usize, cols: usize) -> Self {
        Self::new(Array2::from_elem((rows, cols), MASK_CLEAR))
    }

    /// Build a mask from a column-major buffer: `(row, col)` is read from
    /// flat offset `col * rows + row`.
    pub fn from_column_major(data: &[i32], dims: (usize, usize)) -> Result<Self> {
        let (rows, cols) = dims;
        if data.len() != rows * cols {
            return Err(NspiError::ShapeMismatch(format!(
                "mask buffer holds {} cells, dims {}x{} need {}",
                data.len(),
                rows,
                cols,
                rows * cols
            )));
        }
        Ok(Self::new(Array2::from_shape_fn(dims, |(row, col)| {
            data[col * rows + row]
        })))
    }

    pub fn to_column_major(&self) -> Vec<i32> {
        let (rows, cols) = self.dims();
        let mut out = vec![MASK_CLEAR; rows * cols];
        for ((row, col), &code) in self.data.indexed_iter() {
            out[col * rows + row] = code;
        }
        out
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// (rows, cols)
    pub fn dims(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<i32> {
        self.data.get((row, col)).copied()
    }

    pub fn class(&self, row: usize, col: usize) -> Option<MaskClass> {
        self.get(row, col).map(MaskClass::of)
    }

    /// Distinct cloud region codes (values >= 1), ascending.
    pub fn region_codes(&self) -> Vec<i32> {
        self.data
            .iter()
            .copied()
            .filter(|&c| c >= 1)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn summary(&self) -> MaskSummary {
        let mut summary = MaskSummary::default();
        for &code in self.data.iter() {
            match MaskClass::of(code) {
                MaskClass::Clear => summary.clear += 1,
                MaskClass::Invalid => summary.invalid += 1,
                MaskClass::Cloud(_) => summary.cloud += 1,
            }
        }
        summary.regions = self.region_codes().len();
        summary
    }
}
