use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use nspi_core::consts::DEFAULT_MASK_INVALID_VALUE;
use nspi_core::io::{load_mask, save_mask};

#[derive(Args)]
pub struct LabelArgs {
    /// Binary cloud mask (image or .cube)
    pub file: PathBuf,

    /// Mask pixel value (16-bit scale) marking invalid cells
    #[arg(long, default_value_t = DEFAULT_MASK_INVALID_VALUE)]
    pub invalid_value: u16,

    /// Output mask cube
    #[arg(short, long, default_value = "mask.cube")]
    pub output: PathBuf,
}

pub fn run(args: &LabelArgs) -> Result<()> {
    let mask = load_mask(&args.file, true, args.invalid_value)
        .with_context(|| format!("Failed to load mask {}", args.file.display()))?;
    let summary = mask.summary();

    println!("Regions:     {}", summary.regions);
    println!("Cloud cells: {}", summary.cloud);
    println!("Invalid:     {}", summary.invalid);

    save_mask(&mask, &args.output)?;
    println!("Saved to {}", args.output.display());
    Ok(())
}
