mod common;

use approx::assert_abs_diff_eq;
use ndarray::Array2;

use nspi_core::error::NspiError;
use nspi_core::fill::region::locate_regions;
use nspi_core::fill::{fill_clouds, fill_clouds_with_progress, fill_flat, FillParams};
use nspi_core::raster::{CloudMask, Image};

use common::{block, gradient_image, mask_with, obscure, shifted_image};

fn params(num_class: usize, min_pixel: usize, cloud_nbh: usize, dn: (f64, f64)) -> FillParams {
    FillParams {
        num_class,
        min_pixel,
        cloud_nbh,
        dn_min: dn.0,
        dn_max: dn.1,
        parallel: false,
    }
}

// ---------------------------------------------------------------------------
// End-to-end
// ---------------------------------------------------------------------------

#[test]
fn test_constant_scene_two_cell_region() {
    let clear = Image::from_elem(5, 5, 1, 100.0);
    let mask = mask_with(5, 5, &[(2, 2, 1), (2, 3, 1)]);
    let cloudy = obscure(&clear, &mask, 9999.0);

    let out = fill_clouds(&cloudy, &clear, &mask, &params(1, 2, 2, (0.0, 255.0))).unwrap();

    assert_abs_diff_eq!(out.image.data[[2, 2, 0]], 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(out.image.data[[2, 3, 0]], 100.0, epsilon = 1e-9);
    for ((r, c, b), &v) in out.image.data.indexed_iter() {
        if mask.data[[r, c]] == 0 {
            assert_eq!(v, cloudy.data[[r, c, b]]);
        }
    }

    assert_eq!(out.regions.len(), 1);
    let summary = &out.regions[0];
    assert_eq!(summary.code, 1);
    assert_eq!(summary.cells, 2);
    assert_eq!(summary.candidates, 23);
    assert_eq!(summary.weighted, 2);
    assert_eq!(summary.fallback, 0);
}

#[test]
fn test_multiband_temporal_change_is_recovered() {
    // Clear scene plus a uniform temporal change: every region cell should
    // come back near its true cloudy value.
    let clear = gradient_image(12, 12, 3);
    let truth = shifted_image(&clear, &[5.0, -3.0, 12.0]);
    let mask = mask_with(12, 12, &block(5, 5, 2, 2, 1));
    let cloudy = obscure(&truth, &mask, 0.0);

    let out = fill_clouds(&cloudy, &clear, &mask, &params(4, 8, 3, (0.0, 10_000.0))).unwrap();

    for (r, c, _) in block(5, 5, 2, 2, 1) {
        for b in 0..3 {
            let got = out.image.data[[r, c, b]];
            assert!(got.is_finite());
            assert!(
                (got - truth.data[[r, c, b]]).abs() < 15.0,
                "pixel ({r},{c},{b}) = {got}, expected near {}",
                truth.data[[r, c, b]]
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Non-interference
// ---------------------------------------------------------------------------

#[test]
fn test_clear_and_invalid_cells_unchanged() {
    let clear = gradient_image(10, 10, 2);
    let mut cells = block(2, 2, 2, 3, 1);
    cells.extend(block(6, 6, 2, 2, 4));
    cells.extend([(0, 9, -1), (3, 5, -1), (7, 5, -1)]);
    let mask = mask_with(10, 10, &cells);
    let cloudy = obscure(&shifted_image(&clear, &[2.0, 4.0]), &mask, 5000.0);

    let out = fill_clouds(&cloudy, &clear, &mask, &params(3, 5, 2, (0.0, 1000.0))).unwrap();

    for ((r, c, b), &v) in out.image.data.indexed_iter() {
        if mask.data[[r, c]] <= 0 {
            assert_eq!(v, cloudy.data[[r, c, b]], "cell ({r},{c},{b}) changed");
        } else {
            assert_ne!(v, 5000.0, "cell ({r},{c},{b}) not filled");
        }
    }
}

#[test]
fn test_empty_mask_is_identity() {
    let cloudy = gradient_image(6, 7, 3);
    let clear = shifted_image(&cloudy, &[1.0, 1.0, 1.0]);
    let mut data = Array2::<i32>::zeros((6, 7));
    data[[1, 1]] = -1;
    let mask = CloudMask::new(data);

    let out = fill_clouds(&cloudy, &clear, &mask, &FillParams::default()).unwrap();
    assert_eq!(out.image, cloudy);
    assert!(out.regions.is_empty());
}

// ---------------------------------------------------------------------------
// Fallback path
// ---------------------------------------------------------------------------

/// 1x5 strip, target at col 0, window covering the whole strip.
fn strip(clear_values: [f64; 5]) -> (Image, Image, CloudMask) {
    let clear = Image::from_row_major(clear_values.to_vec(), (1, 5, 1)).unwrap();
    let mut cloudy_values = clear_values.map(|v| v + 7.0);
    cloudy_values[0] = -1.0;
    let cloudy = Image::from_row_major(cloudy_values.to_vec(), (1, 5, 1)).unwrap();
    let mask = mask_with(1, 5, &[(0, 0, 1)]);
    (cloudy, clear, mask)
}

#[test]
fn test_single_similar_pixel_takes_fallback() {
    // Col 1 is skipped as nearest; only col 3 is darker than the target and
    // passes the tight threshold.
    let (cloudy, clear, mask) = strip([10.0, 1000.0, 1000.0, 5.0, 1000.0]);

    let out = fill_clouds(&cloudy, &clear, &mask, &params(1000, 5, 4, (0.0, 10_000.0))).unwrap();

    assert_eq!(out.image.data[[0, 0, 0]], 17.0);
    assert_eq!(out.regions[0].fallback, 1);
    assert_eq!(out.regions[0].weighted, 0);
}

#[test]
fn test_two_similar_pixels_take_weighted_path() {
    let (cloudy, clear, mask) = strip([10.0, 1000.0, 1000.0, 5.0, 8.0]);

    let out = fill_clouds(&cloudy, &clear, &mask, &params(1000, 5, 4, (0.0, 10_000.0))).unwrap();

    assert_eq!(out.regions[0].fallback, 0);
    assert_eq!(out.regions[0].weighted, 1);
    // Window 1x5, center (0.5, 2.5), target at local (0, 0).
    // Donors at cols 3 and 4 weigh equally: spatial 13.5, temporal 17,
    // mean donor distance 3.5.
    let r2 = 6.5f64.sqrt();
    let expected = (r2 * 13.5 + 3.5 * 17.0) / (r2 + 3.5);
    assert_abs_diff_eq!(out.image.data[[0, 0, 0]], expected, epsilon = 1e-5);
    assert_abs_diff_eq!(out.image.data[[0, 0, 0]], 15.525, epsilon = 1e-3);
}

#[test]
fn test_region_without_candidates_copies_clear() {
    let clear = gradient_image(3, 3, 2);
    let mut data = Array2::from_elem((3, 3), -1);
    data[[1, 1]] = 1;
    let mask = CloudMask::new(data);
    let cloudy = obscure(&clear, &mask, 0.0);

    let out = fill_clouds(&cloudy, &clear, &mask, &params(2, 4, 1, (0.0, 1000.0))).unwrap();

    assert_eq!(out.image.data[[1, 1, 0]], clear.data[[1, 1, 0]]);
    assert_eq!(out.image.data[[1, 1, 1]], clear.data[[1, 1, 1]]);
    assert_eq!(out.regions[0].candidates, 0);
    assert_eq!(out.regions[0].fallback, 1);
}

// ---------------------------------------------------------------------------
// Windows and independence
// ---------------------------------------------------------------------------

#[test]
fn test_border_region_window_is_clamped() {
    let clear = gradient_image(4, 4, 1);
    let mask = mask_with(4, 4, &[(0, 0, 1), (3, 3, 2)]);
    let cloudy = obscure(&clear, &mask, 0.0);

    let regions = locate_regions(&mask, 10);
    for region in &regions {
        assert!(region.window.down_row <= 3);
        assert!(region.window.right_col <= 3);
        assert_eq!(region.window.rows(), 4);
        assert_eq!(region.window.cols(), 4);
    }

    let out = fill_clouds(&cloudy, &clear, &mask, &params(1, 3, 10, (0.0, 1000.0))).unwrap();
    assert_eq!(out.regions.len(), 2);
}

#[test]
fn test_regions_with_disjoint_windows_are_independent() {
    let clear = gradient_image(20, 20, 2);
    let truth = shifted_image(&clear, &[3.0, 6.0]);
    let region_a = block(2, 2, 2, 2, 1);
    let region_b = block(15, 15, 2, 3, 2);

    let mut both = region_a.clone();
    both.extend(region_b.iter().copied());
    let mask_both = mask_with(20, 20, &both);
    let mask_a = mask_with(20, 20, &region_a);

    let p = params(3, 6, 2, (0.0, 1000.0));
    let with_b = fill_clouds(&obscure(&truth, &mask_both, 0.0), &clear, &mask_both, &p).unwrap();
    let without_b = fill_clouds(&obscure(&truth, &mask_a, 0.0), &clear, &mask_a, &p).unwrap();

    for (r, c, _) in region_a {
        for b in 0..2 {
            assert_eq!(with_b.image.data[[r, c, b]], without_b.image.data[[r, c, b]]);
        }
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let clear = gradient_image(16, 16, 3);
    let truth = shifted_image(&clear, &[1.5, -2.0, 4.0]);
    let mut cells = block(3, 3, 2, 2, 1);
    cells.extend(block(4, 6, 2, 2, 2));
    cells.extend(block(10, 10, 3, 2, 3));
    cells.extend(block(12, 3, 1, 4, 9));
    let mask = mask_with(16, 16, &cells);
    let cloudy = obscure(&truth, &mask, 0.0);

    let mut p = params(4, 6, 3, (0.0, 2000.0));
    let sequential = fill_clouds(&cloudy, &clear, &mask, &p).unwrap();
    p.parallel = true;
    let parallel = fill_clouds(&cloudy, &clear, &mask, &p).unwrap();

    assert_eq!(sequential.image, parallel.image);
    assert_eq!(sequential.regions, parallel.regions);
}

#[test]
fn test_progress_counts_every_region() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let clear = gradient_image(10, 10, 1);
    let mut cells = block(1, 1, 1, 1, 1);
    cells.extend(block(5, 5, 1, 1, 2));
    cells.extend(block(8, 8, 1, 1, 3));
    let mask = mask_with(10, 10, &cells);
    let cloudy = obscure(&clear, &mask, 0.0);

    let max_seen = AtomicUsize::new(0);
    let mut p = params(2, 4, 2, (0.0, 1000.0));
    p.parallel = true;
    fill_clouds_with_progress(&cloudy, &clear, &mask, &p, |done| {
        max_seen.fetch_max(done, Ordering::Relaxed);
    })
    .unwrap();
    assert_eq!(max_seen.load(Ordering::Relaxed), 3);
}

// ---------------------------------------------------------------------------
// Flat buffers
// ---------------------------------------------------------------------------

#[test]
fn test_fill_flat_matches_typed_fill() {
    let clear = gradient_image(8, 9, 2);
    let mask = mask_with(8, 9, &block(3, 4, 2, 2, 5));
    let cloudy = obscure(&shifted_image(&clear, &[2.0, 2.0]), &mask, 0.0);
    let p = params(2, 5, 2, (0.0, 1000.0));

    let typed = fill_clouds(&cloudy, &clear, &mask, &p).unwrap();
    let flat = fill_flat(
        &cloudy.to_column_major(),
        &clear.to_column_major(),
        &mask.to_column_major(),
        (8, 9, 2),
        &p,
    )
    .unwrap();

    assert_eq!(flat, typed.image.to_column_major());
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn test_band_mismatch_rejected() {
    let cloudy = gradient_image(4, 4, 2);
    let clear = gradient_image(4, 4, 3);
    let mask = CloudMask::clear(4, 4);
    let err = fill_clouds(&cloudy, &clear, &mask, &FillParams::default()).unwrap_err();
    assert!(matches!(err, NspiError::ShapeMismatch(_)));
}

#[test]
fn test_mask_mismatch_rejected() {
    let cloudy = gradient_image(4, 4, 1);
    let mask = CloudMask::clear(4, 5);
    let err = fill_clouds(&cloudy, &cloudy, &mask, &FillParams::default()).unwrap_err();
    assert!(matches!(err, NspiError::ShapeMismatch(_)));
}

#[test]
fn test_flat_dims_mismatch_rejected() {
    let buf = vec![0.0; 16];
    let mask = vec![0; 16];
    let err = fill_flat(&buf, &buf, &mask, (4, 4, 2), &FillParams::default()).unwrap_err();
    assert!(matches!(err, NspiError::ShapeMismatch(_)));
}

#[test]
fn test_invalid_params_rejected_before_filling() {
    let cloudy = gradient_image(4, 4, 1);
    let mask = mask_with(4, 4, &[(1, 1, 1)]);
    let p = params(1, 0, 1, (0.0, 10.0));
    let err = fill_clouds(&cloudy, &cloudy, &mask, &p).unwrap_err();
    assert!(matches!(err, NspiError::InvalidParameter { name: "min_pixel", .. }));
}
