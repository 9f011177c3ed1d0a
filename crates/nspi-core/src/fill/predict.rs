use crate::consts::{COST_EPSILON, NORMALIZE_EPSILON};
use crate::fill::search::SimilarPixel;

/// Weighted estimate for a pixel with at least two similar donors.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    /// Donor weights, summing to 1.
    pub weights: Vec<f64>,
    /// Purely spatial estimate: weighted mean of donor cloudy spectra.
    pub spatial: Vec<f64>,
    /// Target clear spectrum plus the weighted donor temporal change.
    pub temporal: Vec<f64>,
    /// Blend weight on `spatial`.
    pub weight_spatial: f64,
    /// Blend weight on `temporal`.
    pub weight_temporal: f64,
    /// Final per-band output.
    pub values: Vec<f64>,
}

/// Outcome of predicting one obscured pixel.
#[derive(Clone, Debug, PartialEq)]
pub enum PixelEstimate {
    Weighted(Prediction),
    /// Clear spectrum shifted by the region's mean temporal change.
    Fallback(Vec<f64>),
}

impl PixelEstimate {
    pub fn values(&self) -> &[f64] {
        match self {
            Self::Weighted(p) => &p.values,
            Self::Fallback(v) => v,
        }
    }

    pub fn into_values(self) -> Vec<f64> {
        match self {
            Self::Weighted(p) => p.values,
            Self::Fallback(v) => v,
        }
    }
}

/// Inverse-cost donor weights.
///
/// RMSE and distance are min-max scaled to [1, 2] independently, multiplied
/// into a cost, and each weight is the normalized reciprocal of its cost.
pub fn donor_weights(similar: &[SimilarPixel<'_>]) -> Vec<f64> {
    let rmse: Vec<f64> = similar.iter().map(|s| s.rmse).collect();
    let dist: Vec<f64> = similar.iter().map(|s| s.distance).collect();
    let rmse_norm = normalize_unit_offset(&rmse);
    let dist_norm = normalize_unit_offset(&dist);

    let inverse_cost: Vec<f64> = rmse_norm
        .iter()
        .zip(&dist_norm)
        .map(|(r, d)| 1.0 / (r * d + COST_EPSILON))
        .collect();
    let total: f64 = inverse_cost.iter().sum();
    inverse_cost.into_iter().map(|c| c / total).collect()
}

/// `(x - min) / (max - min + eps) + 1`
fn normalize_unit_offset(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min + NORMALIZE_EPSILON;
    values.iter().map(|v| (v - min) / range + 1.0).collect()
}

/// Blend spatial and temporal estimates from two or more donors.
///
/// `center_distance` is the target's distance to the window center. The
/// temporal estimate is used for a band only when it falls strictly inside
/// `(dn_min, dn_max)`; otherwise that band takes the spatial estimate.
pub fn predict_weighted(
    target_clear: &[f64],
    similar: &[SimilarPixel<'_>],
    center_distance: f64,
    dn_min: f64,
    dn_max: f64,
) -> Prediction {
    let bands = target_clear.len();
    let weights = donor_weights(similar);

    let mut spatial = vec![0.0; bands];
    let mut temporal = target_clear.to_vec();
    for (donor, &w) in similar.iter().zip(&weights) {
        for b in 0..bands {
            spatial[b] += w * donor.cloudy[b];
            temporal[b] += w * (donor.cloudy[b] - donor.clear[b]);
        }
    }

    let mean_distance = similar.iter().map(|s| s.distance).sum::<f64>() / similar.len() as f64;
    let weight_spatial = center_distance / (center_distance + mean_distance);
    let weight_temporal = mean_distance / (center_distance + mean_distance);

    let values = spatial
        .iter()
        .zip(&temporal)
        .map(|(&p1, &p2)| {
            if p2 > dn_min && p2 < dn_max {
                weight_spatial * p1 + weight_temporal * p2
            } else {
                p1
            }
        })
        .collect();

    Prediction {
        weights,
        spatial,
        temporal,
        weight_spatial,
        weight_temporal,
        values,
    }
}

/// `target_clear + mean_diff`, per band.
pub fn predict_fallback(target_clear: &[f64], mean_diff: &[f64]) -> Vec<f64> {
    target_clear
        .iter()
        .zip(mean_diff)
        .map(|(c, d)| c + d)
        .collect()
}

/// Predict one obscured pixel: weighted with more than one donor, fallback
/// otherwise.
pub fn predict_pixel(
    target_clear: &[f64],
    similar: &[SimilarPixel<'_>],
    center_distance: f64,
    mean_diff: &[f64],
    dn_min: f64,
    dn_max: f64,
) -> PixelEstimate {
    if similar.len() > 1 {
        PixelEstimate::Weighted(predict_weighted(
            target_clear,
            similar,
            center_distance,
            dn_min,
            dn_max,
        ))
    } else {
        PixelEstimate::Fallback(predict_fallback(target_clear, mean_diff))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_scores_normalize_to_one() {
        let norm = normalize_unit_offset(&[3.0, 3.0, 3.0]);
        assert!(norm.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn normalized_range_spans_one_to_two() {
        let norm = normalize_unit_offset(&[0.0, 5.0, 10.0]);
        assert_eq!(norm[0], 1.0);
        assert!((norm[2] - 2.0).abs() < 1e-6);
        assert!(norm[1] > 1.0 && norm[1] < 2.0);
    }
}
