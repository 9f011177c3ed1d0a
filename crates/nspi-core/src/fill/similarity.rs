use ndarray::s;

use crate::fill::region::Window;
use crate::raster::Image;

/// Per-band similarity threshold for one region:
/// `stddev(clear_window[.., b]) * 2 / num_class`.
///
/// The standard deviation is the sample (n - 1) deviation over every cell
/// of the window, whatever its mask class. A zero-variance band yields a
/// threshold of 0.
pub fn similarity_thresholds(clear: &Image, window: &Window, num_class: usize) -> Vec<f64> {
    let view = clear.data.slice(s![
        window.up_row..=window.down_row,
        window.left_col..=window.right_col,
        ..
    ]);

    (0..clear.bands())
        .map(|band| {
            let values = view.slice(s![.., .., band]);
            sample_stddev(values.iter().copied()) * 2.0 / num_class as f64
        })
        .collect()
}

/// Two-pass sample standard deviation. Fewer than two values give 0.
fn sample_stddev(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let mut count = 0usize;
    let mut sum = 0.0f64;
    for v in values.clone() {
        sum += v;
        count += 1;
    }
    if count < 2 {
        return 0.0;
    }
    let mean = sum / count as f64;

    let var_sum: f64 = values.map(|v| (v - mean) * (v - mean)).sum();
    (var_sum / (count - 1) as f64).sqrt()
}
