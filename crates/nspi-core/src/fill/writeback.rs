use crate::error::Result;
use crate::fill::RegionFill;
use crate::raster::Image;

/// Commit a region's reconstructed pixels into `output` at their global
/// positions. Cells outside the region are left untouched.
pub fn write_back(output: &mut Image, fill: &RegionFill) -> Result<()> {
    for pixel in &fill.pixels {
        output.set_spectrum(pixel.row, pixel.col, &pixel.values)?;
    }
    Ok(())
}
