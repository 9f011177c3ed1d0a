pub mod config;
pub mod types;

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::fill::{fill_clouds_with_progress, FillOutput};
use crate::io::{load_mask, load_raster, save_raster};

pub use config::{FillConfig, MaskLabelingConfig};
pub use types::{PipelineStage, ProgressReporter};
use types::NoOpReporter;

/// Load the rasters named by `config`, fill every cloud region and save the
/// result.
pub fn run_fill(config: &FillConfig) -> Result<FillOutput> {
    run_fill_reported(config, Arc::new(NoOpReporter))
}

/// [`run_fill`] with a thread-safe progress reporter.
pub fn run_fill_reported(
    config: &FillConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<FillOutput> {
    config.validate()?;
    let params = &config.params;

    reporter.begin_stage(PipelineStage::Reading, Some(2));
    let cloudy = load_raster(&config.cloudy)?;
    reporter.advance(1);
    let clear = load_raster(&config.clear)?;
    reporter.advance(2);
    reporter.finish_stage();

    let labeling = &config.mask_labeling;
    if labeling.label {
        reporter.begin_stage(PipelineStage::Labeling, None);
    }
    let mask = load_mask(&config.mask, labeling.label, labeling.invalid_value)?;
    if labeling.label {
        reporter.finish_stage();
    }
    info!(
        cloudy = %config.cloudy.display(),
        clear = %config.clear.display(),
        regions = mask.region_codes().len(),
        "Rasters loaded"
    );

    reporter.begin_stage(PipelineStage::Filling, Some(mask.region_codes().len()));
    let output = fill_clouds_with_progress(&cloudy, &clear, &mask, params, |done| {
        reporter.advance(done)
    })?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Writing, None);
    save_raster(&output.image, &config.output, config.export_range)?;
    reporter.finish_stage();
    info!(output = %config.output.display(), "Filled image saved");

    Ok(output)
}
