use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_CLOUD_NBH, DEFAULT_DN_MAX, DEFAULT_DN_MIN, DEFAULT_MIN_PIXEL, DEFAULT_NUM_CLASS,
};
use crate::error::{NspiError, Result};

/// Tuning parameters for neighborhood similar pixel interpolation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FillParams {
    /// Estimated number of land-cover classes in a neighborhood window.
    /// Larger values tighten the similarity threshold.
    #[serde(default = "default_num_class")]
    pub num_class: usize,
    /// Number of similar pixels sought per obscured pixel.
    #[serde(default = "default_min_pixel")]
    pub min_pixel: usize,
    /// Margin (pixels) added around each region's bounding box.
    #[serde(default = "default_cloud_nbh")]
    pub cloud_nbh: usize,
    /// Lower bound of the valid DN range (exclusive).
    #[serde(default = "default_dn_min")]
    pub dn_min: f64,
    /// Upper bound of the valid DN range (exclusive).
    #[serde(default = "default_dn_max")]
    pub dn_max: f64,
    /// Fill independent regions on the Rayon thread pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_num_class() -> usize {
    DEFAULT_NUM_CLASS
}
fn default_min_pixel() -> usize {
    DEFAULT_MIN_PIXEL
}
fn default_cloud_nbh() -> usize {
    DEFAULT_CLOUD_NBH
}
fn default_dn_min() -> f64 {
    DEFAULT_DN_MIN
}
fn default_dn_max() -> f64 {
    DEFAULT_DN_MAX
}
fn default_parallel() -> bool {
    true
}

impl Default for FillParams {
    fn default() -> Self {
        Self {
            num_class: DEFAULT_NUM_CLASS,
            min_pixel: DEFAULT_MIN_PIXEL,
            cloud_nbh: DEFAULT_CLOUD_NBH,
            dn_min: DEFAULT_DN_MIN,
            dn_max: DEFAULT_DN_MAX,
            parallel: true,
        }
    }
}

impl FillParams {
    pub fn validate(&self) -> Result<()> {
        if self.num_class < 1 {
            return Err(NspiError::InvalidParameter {
                name: "num_class",
                reason: "must be at least 1".into(),
            });
        }
        if self.min_pixel < 1 {
            return Err(NspiError::InvalidParameter {
                name: "min_pixel",
                reason: "must be at least 1".into(),
            });
        }
        if !self.dn_min.is_finite() || !self.dn_max.is_finite() {
            return Err(NspiError::InvalidParameter {
                name: "dn_min/dn_max",
                reason: format!("bounds must be finite, got [{}, {}]", self.dn_min, self.dn_max),
            });
        }
        if self.dn_min >= self.dn_max {
            return Err(NspiError::InvalidParameter {
                name: "dn_min/dn_max",
                reason: format!(
                    "dn_min ({}) must be less than dn_max ({})",
                    self.dn_min, self.dn_max
                ),
            });
        }
        Ok(())
    }
}
