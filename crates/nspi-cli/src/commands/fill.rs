use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use nspi_core::pipeline::{run_fill_reported, FillConfig};
use tracing::debug;

use crate::progress::BarReporter;
use crate::summary::{print_fill_summary, print_region_report};

#[derive(Args)]
pub struct FillArgs {
    /// Fill config file (TOML); flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Cloudy image (.cube or image file)
    #[arg(long)]
    pub cloudy: Option<PathBuf>,

    /// Clear reference image (.cube or image file)
    #[arg(long)]
    pub clear: Option<PathBuf>,

    /// Cloud mask (.cube region codes or image)
    #[arg(long)]
    pub mask: Option<PathBuf>,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Estimated number of land-cover classes
    #[arg(long)]
    pub num_class: Option<usize>,

    /// Number of similar pixels sought per cloud pixel
    #[arg(long)]
    pub min_pixel: Option<usize>,

    /// Neighborhood margin around each cloud region (pixels)
    #[arg(long)]
    pub cloud_nbh: Option<usize>,

    /// Lower bound of the valid DN range
    #[arg(long, allow_negative_numbers = true)]
    pub dn_min: Option<f64>,

    /// Upper bound of the valid DN range
    #[arg(long, allow_negative_numbers = true)]
    pub dn_max: Option<f64>,

    /// DN mapped to 0 when the output is an image file
    #[arg(long, allow_negative_numbers = true)]
    pub export_min: Option<f64>,

    /// DN mapped to the integer maximum when the output is an image file
    #[arg(long, allow_negative_numbers = true)]
    pub export_max: Option<f64>,

    /// Fill regions one at a time instead of in parallel
    #[arg(long)]
    pub sequential: bool,

    /// Treat the mask as a binary cloud raster and label its regions
    #[arg(long)]
    pub label: bool,

    /// Mask pixel value (16-bit scale) marking invalid cells
    #[arg(long)]
    pub invalid_value: Option<u16>,
}

pub fn run(args: &FillArgs) -> Result<()> {
    let config = build_config(args)?;
    print_fill_summary(&config);

    let reporter = Arc::new(BarReporter::new()?);
    let output = run_fill_reported(&config, reporter.clone()).context("Cloud fill failed")?;
    reporter.finish();

    print_region_report(&output.regions);
    println!("Saved to {}", config.output.display());
    Ok(())
}

fn build_config(args: &FillArgs) -> Result<FillConfig> {
    let mut config: FillConfig = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        debug!(path = %config_path.display(), "Loading fill config");
        toml::from_str(&contents).context("Invalid fill config")?
    } else {
        if args.cloudy.is_none() || args.clear.is_none() || args.mask.is_none() {
            bail!("--cloudy, --clear and --mask are required without --config");
        }
        FillConfig::default()
    };

    if let Some(ref p) = args.cloudy {
        config.cloudy = p.clone();
    }
    if let Some(ref p) = args.clear {
        config.clear = p.clone();
    }
    if let Some(ref p) = args.mask {
        config.mask = p.clone();
    }
    if let Some(ref p) = args.output {
        config.output = p.clone();
    }

    if let Some(v) = args.export_min {
        config.export_range.0 = v;
    }
    if let Some(v) = args.export_max {
        config.export_range.1 = v;
    }

    let params = &mut config.params;
    if let Some(v) = args.num_class {
        params.num_class = v;
    }
    if let Some(v) = args.min_pixel {
        params.min_pixel = v;
    }
    if let Some(v) = args.cloud_nbh {
        params.cloud_nbh = v;
    }
    if let Some(v) = args.dn_min {
        params.dn_min = v;
    }
    if let Some(v) = args.dn_max {
        params.dn_max = v;
    }
    if args.sequential {
        params.parallel = false;
    }

    if args.label {
        config.mask_labeling.label = true;
    }
    if let Some(v) = args.invalid_value {
        config.mask_labeling.invalid_value = v;
    }

    config.validate()?;
    Ok(config)
}
