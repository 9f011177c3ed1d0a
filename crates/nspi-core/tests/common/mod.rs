#![allow(dead_code)]

use ndarray::{Array2, Array3};

use nspi_core::raster::{CloudMask, Image};

/// Smoothly varying multi-band image: `50 + 10*row + col + 100*band`.
pub fn gradient_image(rows: usize, cols: usize, bands: usize) -> Image {
    Image::new(Array3::from_shape_fn((rows, cols, bands), |(r, c, b)| {
        50.0 + 10.0 * r as f64 + c as f64 + 100.0 * b as f64
    }))
}

/// Gradient image offset by a per-band temporal change.
pub fn shifted_image(base: &Image, shift: &[f64]) -> Image {
    let mut out = base.clone();
    for ((_, _, b), v) in out.data.indexed_iter_mut() {
        *v += shift[b];
    }
    out
}

/// All-clear mask with the given `(row, col, code)` cells set.
pub fn mask_with(rows: usize, cols: usize, cells: &[(usize, usize, i32)]) -> CloudMask {
    let mut data = Array2::<i32>::zeros((rows, cols));
    for &(r, c, code) in cells {
        data[[r, c]] = code;
    }
    CloudMask::new(data)
}

/// Every cell of the rectangle `rows x cols` starting at `(r0, c0)`, tagged
/// with `code`.
pub fn block(r0: usize, c0: usize, rows: usize, cols: usize, code: i32) -> Vec<(usize, usize, i32)> {
    let mut out = Vec::new();
    for r in r0..r0 + rows {
        for c in c0..c0 + cols {
            out.push((r, c, code));
        }
    }
    out
}

/// Overwrite every cell with a positive mask code in `image` with `value`.
pub fn obscure(image: &Image, mask: &CloudMask, value: f64) -> Image {
    let mut out = image.clone();
    for ((r, c), &code) in mask.data.indexed_iter() {
        if code > 0 {
            for b in 0..out.bands() {
                out.data[[r, c, b]] = value;
            }
        }
    }
    out
}

/// Temp file path with the given suffix, kept alive with the returned dir.
pub fn temp_path(suffix: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join(format!("raster{suffix}"));
    (dir, path)
}
