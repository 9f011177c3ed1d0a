use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use nspi_core::io::cube::{CubeReader, SampleType};
use nspi_core::io::{is_cube, load_raster};
use nspi_core::raster::Image;

#[derive(Args)]
pub struct InfoArgs {
    /// Input raster (.cube or image file)
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    println!("File:        {}", args.file.display());

    if is_cube(&args.file) {
        let reader = CubeReader::open(&args.file)?;
        let h = &reader.header;
        println!("Format:      cube ({:?} samples)", h.sample_type);
        println!("Dimensions:  {}x{} ({} bands)", h.rows, h.cols, h.bands);

        if h.sample_type == SampleType::I32 {
            let summary = reader.read_mask()?.summary();
            println!("Regions:     {}", summary.regions);
            println!("Clear:       {}", summary.clear);
            println!("Cloud:       {}", summary.cloud);
            println!("Invalid:     {}", summary.invalid);
        } else {
            print_image_stats(&reader.read_image()?);
        }
    } else {
        let image = load_raster(&args.file)?;
        println!("Format:      image");
        println!(
            "Dimensions:  {}x{} ({} bands)",
            image.rows(),
            image.cols(),
            image.bands()
        );
        print_image_stats(&image);
    }

    Ok(())
}

fn print_image_stats(image: &Image) {
    match image.sample_range() {
        Some((lo, hi)) => println!("DN range:    {} .. {}", lo, hi),
        None => println!("DN range:    (empty)"),
    }
    let total_mb = (image.data.len() * std::mem::size_of::<f64>()) as f64 / (1024.0 * 1024.0);
    println!("Data size:   {:.1} MB", total_mb);
}
