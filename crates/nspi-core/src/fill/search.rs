use crate::consts::MASK_CLEAR;
use crate::fill::region::Window;
use crate::raster::{CloudMask, Image};

/// Clear pixels of one region's window, usable as donors.
///
/// Spectra are held in flat buffers of `len() * bands` values; candidate `i`
/// owns `[i * bands, (i + 1) * bands)`. Candidates are enumerated column by
/// column in window-local coordinates.
#[derive(Clone, Debug)]
pub struct CandidateSet {
    bands: usize,
    positions: Vec<(usize, usize)>,
    cloudy: Vec<f64>,
    clear: Vec<f64>,
}

impl CandidateSet {
    pub fn collect(cloudy: &Image, clear: &Image, mask: &CloudMask, window: &Window) -> Self {
        let bands = clear.bands();
        let mut set = Self {
            bands,
            positions: Vec::new(),
            cloudy: Vec::new(),
            clear: Vec::new(),
        };

        for (row, col) in window.cells() {
            if mask.data[[row, col]] != MASK_CLEAR {
                continue;
            }
            set.positions.push(window.to_local(row, col));
            set.cloudy.extend(cloudy.spectrum(row, col).iter());
            set.clear.extend(clear.spectrum(row, col).iter());
        }
        set
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    /// Window-local (row, col) of candidate `i`.
    pub fn position(&self, i: usize) -> (usize, usize) {
        self.positions[i]
    }

    pub fn cloudy(&self, i: usize) -> &[f64] {
        &self.cloudy[i * self.bands..(i + 1) * self.bands]
    }

    pub fn clear(&self, i: usize) -> &[f64] {
        &self.clear[i * self.bands..(i + 1) * self.bands]
    }

    /// Mean of `cloudy - clear` over all candidates, per band.
    ///
    /// An empty set yields zeros, so the fallback estimate copies the clear
    /// image.
    pub fn mean_difference(&self) -> Vec<f64> {
        let mut diff = vec![0.0; self.bands];
        if self.is_empty() {
            return diff;
        }
        for i in 0..self.len() {
            for (d, (a, b)) in diff.iter_mut().zip(self.cloudy(i).iter().zip(self.clear(i))) {
                *d += a - b;
            }
        }
        let n = self.len() as f64;
        for d in &mut diff {
            *d /= n;
        }
        diff
    }
}

/// A donor accepted for one target pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct SimilarPixel<'a> {
    /// Donor spectrum in the cloudy image.
    pub cloudy: &'a [f64],
    /// Donor spectrum in the clear image.
    pub clear: &'a [f64],
    /// RMS per-band difference between donor and target clear spectra.
    pub rmse: f64,
    /// Euclidean distance to the target in window-local coordinates.
    pub distance: f64,
}

/// One-sided per-band similarity test: every `candidate[b] - target[b]`
/// must be at most `thresholds[b]`.
///
/// The difference is signed, so candidates darker than the target always
/// pass.
pub fn is_similar(candidate: &[f64], target: &[f64], thresholds: &[f64]) -> bool {
    candidate
        .iter()
        .zip(target)
        .zip(thresholds)
        .all(|((c, t), th)| c - t <= *th)
}

/// Root-mean-square per-band difference between two spectra.
pub fn spectral_rmse(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    (sum_sq / a.len() as f64).sqrt()
}

/// Select up to `min_pixel` similar donors for the target at window-local
/// `target`, nearest first.
///
/// Candidates are ranked by spatial distance (ties keep enumeration order)
/// and the nearest one is always skipped before the similarity walk begins.
pub fn find_similar<'a>(
    target: (usize, usize),
    target_clear: &[f64],
    candidates: &'a CandidateSet,
    thresholds: &[f64],
    min_pixel: usize,
) -> Vec<SimilarPixel<'a>> {
    let (ri, ci) = (target.0 as f64, target.1 as f64);
    let distances: Vec<f64> = (0..candidates.len())
        .map(|i| {
            let (r, c) = candidates.position(i);
            let dr = r as f64 - ri;
            let dc = c as f64 - ci;
            (dr * dr + dc * dc).sqrt()
        })
        .collect();

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]));

    let mut similar = Vec::with_capacity(min_pixel.min(candidates.len()));
    for &i in order.iter().skip(1) {
        if similar.len() >= min_pixel {
            break;
        }
        let clear = candidates.clear(i);
        if !is_similar(clear, target_clear, thresholds) {
            continue;
        }
        similar.push(SimilarPixel {
            cloudy: candidates.cloudy(i),
            clear,
            rmse: spectral_rmse(clear, target_clear),
            distance: distances[i],
        });
    }
    similar
}
