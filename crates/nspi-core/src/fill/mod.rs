//! Neighborhood similar pixel interpolation (NSPI) of cloud regions.
//!
//! Each cloud region is filled independently from the clear pixels of its
//! neighborhood window: donors that are spectrally similar to the target in
//! the clear image are combined into a spatial estimate and a temporal-change
//! estimate, which are then blended by distance.

pub mod params;
pub mod predict;
pub mod region;
pub mod search;
pub mod similarity;
pub mod writeback;

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::consts::PARALLEL_REGION_THRESHOLD;
use crate::error::{NspiError, Result};
use crate::raster::{CloudMask, Image};

pub use params::FillParams;
use predict::{predict_pixel, PixelEstimate};
use region::{locate_regions, Region, Window};
use search::{find_similar, CandidateSet};
use similarity::similarity_thresholds;
use writeback::write_back;

/// One reconstructed pixel, in global coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct FilledPixel {
    pub row: usize,
    pub col: usize,
    pub values: Vec<f64>,
}

/// Per-region fill statistics.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionSummary {
    pub code: i32,
    /// Number of cells in the region.
    pub cells: usize,
    pub window: Window,
    /// Clear donor candidates in the window.
    pub candidates: usize,
    /// Pixels predicted from two or more similar donors.
    pub weighted: usize,
    /// Pixels that took the mean-difference fallback.
    pub fallback: usize,
}

/// Reconstructed pixels of one region, not yet written to the output.
#[derive(Clone, Debug)]
pub struct RegionFill {
    pub summary: RegionSummary,
    pub pixels: Vec<FilledPixel>,
}

/// Filled image plus one summary per region, ordered by region code.
#[derive(Clone, Debug)]
pub struct FillOutput {
    pub image: Image,
    pub regions: Vec<RegionSummary>,
}

/// Fail unless cloudy, clear and mask share the same rows and cols and the
/// two images share a band count.
pub fn check_shapes(cloudy: &Image, clear: &Image, mask: &CloudMask) -> Result<()> {
    if cloudy.dims() != clear.dims() {
        let (r0, c0, b0) = cloudy.dims();
        let (r1, c1, b1) = clear.dims();
        return Err(NspiError::ShapeMismatch(format!(
            "cloudy image is {r0}x{c0}x{b0} but clear image is {r1}x{c1}x{b1}"
        )));
    }
    if mask.dims() != (cloudy.rows(), cloudy.cols()) {
        let (mr, mc) = mask.dims();
        return Err(NspiError::ShapeMismatch(format!(
            "mask is {mr}x{mc} but images are {}x{}",
            cloudy.rows(),
            cloudy.cols()
        )));
    }
    Ok(())
}

/// Reconstruct every pixel of one region.
///
/// Reads only the input images and mask; nothing is written.
pub fn fill_region(
    cloudy: &Image,
    clear: &Image,
    mask: &CloudMask,
    region: &Region,
    params: &FillParams,
) -> RegionFill {
    let window = region.window;
    let thresholds = similarity_thresholds(clear, &window, params.num_class);
    let candidates = CandidateSet::collect(cloudy, clear, mask, &window);
    let mean_diff = candidates.mean_difference();
    let (center_row, center_col) = window.center();

    let mut weighted = 0usize;
    let mut fallback = 0usize;
    let mut pixels = Vec::with_capacity(region.cells.len());

    for &(row, col) in &region.cells {
        let target = window.to_local(row, col);
        let target_clear = clear.spectrum(row, col).to_vec();

        let dr = target.0 as f64 - center_row;
        let dc = target.1 as f64 - center_col;
        let center_distance = (dr * dr + dc * dc).sqrt();

        let similar = find_similar(
            target,
            &target_clear,
            &candidates,
            &thresholds,
            params.min_pixel,
        );
        let estimate = predict_pixel(
            &target_clear,
            &similar,
            center_distance,
            &mean_diff,
            params.dn_min,
            params.dn_max,
        );
        match estimate {
            PixelEstimate::Weighted(_) => weighted += 1,
            PixelEstimate::Fallback(_) => fallback += 1,
        }

        pixels.push(FilledPixel {
            row,
            col,
            values: estimate.into_values(),
        });
    }

    let summary = RegionSummary {
        code: region.code,
        cells: region.cells.len(),
        window,
        candidates: candidates.len(),
        weighted,
        fallback,
    };
    debug!(
        code = summary.code,
        cells = summary.cells,
        candidates = summary.candidates,
        weighted = summary.weighted,
        fallback = summary.fallback,
        "Region filled"
    );

    RegionFill { summary, pixels }
}

/// Fill every cloud region of `cloudy` using `clear` as the reference.
pub fn fill_clouds(
    cloudy: &Image,
    clear: &Image,
    mask: &CloudMask,
    params: &FillParams,
) -> Result<FillOutput> {
    fill_clouds_with_progress(cloudy, clear, mask, params, |_| {})
}

/// Fill every cloud region with per-region progress reporting.
///
/// Calls `on_progress(regions_done)` as each region is reconstructed.
pub fn fill_clouds_with_progress(
    cloudy: &Image,
    clear: &Image,
    mask: &CloudMask,
    params: &FillParams,
    on_progress: impl Fn(usize) + Send + Sync,
) -> Result<FillOutput> {
    params.validate()?;
    check_shapes(cloudy, clear, mask)?;

    let regions = locate_regions(mask, params.cloud_nbh);
    info!(
        regions = regions.len(),
        rows = cloudy.rows(),
        cols = cloudy.cols(),
        bands = cloudy.bands(),
        "Filling cloud regions"
    );

    let done = AtomicUsize::new(0);
    let fill_one = |region: &Region| {
        let fill = fill_region(cloudy, clear, mask, region, params);
        on_progress(done.fetch_add(1, Ordering::Relaxed) + 1);
        fill
    };

    let fills: Vec<RegionFill> =
        if params.parallel && regions.len() >= PARALLEL_REGION_THRESHOLD {
            regions.par_iter().map(fill_one).collect()
        } else {
            regions.iter().map(fill_one).collect()
        };

    let mut image = cloudy.clone();
    for fill in &fills {
        write_back(&mut image, fill)?;
    }

    let summaries: Vec<RegionSummary> = fills.into_iter().map(|f| f.summary).collect();
    let fallback: usize = summaries.iter().map(|s| s.fallback).sum();
    let filled: usize = summaries.iter().map(|s| s.cells).sum();
    info!(pixels = filled, fallback, "Cloud fill complete");

    Ok(FillOutput {
        image,
        regions: summaries,
    })
}

/// Fill from flat column-major, band-sequential buffers with an external
/// shape `(rows, cols, bands)`.
///
/// `cloudy` and `clear` hold `rows * cols * bands` samples at offset
/// `band * rows * cols + col * rows + row`; `mask` holds `rows * cols` codes
/// at `col * rows + row`. The result uses the same layout as `cloudy`.
pub fn fill_flat(
    cloudy: &[f64],
    clear: &[f64],
    mask: &[i32],
    dims: (usize, usize, usize),
    params: &FillParams,
) -> Result<Vec<f64>> {
    params.validate()?;
    let cloudy = Image::from_column_major(cloudy, dims)?;
    let clear = Image::from_column_major(clear, dims)?;
    let mask = CloudMask::from_column_major(mask, (dims.0, dims.1))?;
    let output = fill_clouds(&cloudy, &clear, &mask, params)?;
    Ok(output.image.to_column_major())
}
