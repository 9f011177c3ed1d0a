use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_EXPORT_RANGE, DEFAULT_MASK_INVALID_VALUE};
use crate::error::{NspiError, Result};
use crate::fill::FillParams;

/// A complete cloud fill job: input rasters, output path and parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FillConfig {
    /// Cloud-contaminated image, filled in the output.
    pub cloudy: PathBuf,
    /// Temporally displaced clear reference image.
    pub clear: PathBuf,
    /// Cloud mask (region codes, or a binary raster when labeling).
    pub mask: PathBuf,
    pub output: PathBuf,
    /// DN range scaled onto the full integer range when the output is an
    /// image file. Cube outputs store samples unchanged.
    #[serde(default = "default_export_range")]
    pub export_range: (f64, f64),
    #[serde(default)]
    pub params: FillParams,
    #[serde(default)]
    pub mask_labeling: MaskLabelingConfig,
}

/// How the mask file is interpreted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskLabelingConfig {
    /// Treat the mask as a binary cloud raster and number its connected
    /// components, instead of reading region codes directly.
    #[serde(default)]
    pub label: bool,
    /// Pixel value marking invalid cells in mask images (16-bit scale).
    #[serde(default = "default_invalid_value")]
    pub invalid_value: u16,
}

fn default_export_range() -> (f64, f64) {
    DEFAULT_EXPORT_RANGE
}

fn default_invalid_value() -> u16 {
    DEFAULT_MASK_INVALID_VALUE
}

impl Default for MaskLabelingConfig {
    fn default() -> Self {
        Self {
            label: false,
            invalid_value: DEFAULT_MASK_INVALID_VALUE,
        }
    }
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            cloudy: PathBuf::from("cloudy.cube"),
            clear: PathBuf::from("clear.cube"),
            mask: PathBuf::from("mask.cube"),
            output: PathBuf::from("filled.cube"),
            export_range: DEFAULT_EXPORT_RANGE,
            params: FillParams::default(),
            mask_labeling: MaskLabelingConfig::default(),
        }
    }
}

impl FillConfig {
    /// Check the fill parameters and the export range.
    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        let (lo, hi) = self.export_range;
        if !lo.is_finite() || !hi.is_finite() || lo >= hi {
            return Err(NspiError::InvalidParameter {
                name: "export_range",
                reason: format!("expected finite bounds with min < max, got [{lo}, {hi}]"),
            });
        }
        Ok(())
    }
}
