pub mod cube;
pub mod image_io;

use std::path::Path;

use tracing::debug;

use crate::error::{NspiError, Result};
use crate::mask::label_regions;
use crate::raster::{CloudMask, Image};

use cube::{write_image_cube, write_mask_cube, CubeReader};

/// Narrow a raster dimension to the `u32` used by file headers and encoders.
pub(crate) fn dim_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| NspiError::ShapeMismatch(format!("{what} {value} does not fit in u32")))
}

/// True when the path carries the `.cube` extension.
pub fn is_cube(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("cube"))
}

/// Load a multi-band raster: `.cube` files as f64 cubes, anything else
/// through the image decoder.
pub fn load_raster(path: &Path) -> Result<Image> {
    let image = if is_cube(path) {
        CubeReader::open(path)?.read_image()?
    } else {
        image_io::load_image(path)?
    };
    debug!(path = %path.display(), dims = ?image.dims(), "Raster loaded");
    Ok(image)
}

/// Save a multi-band raster. Image formats scale `dn_range` onto the full
/// integer range; cubes store samples unchanged.
pub fn save_raster(image: &Image, path: &Path, dn_range: (f64, f64)) -> Result<()> {
    if is_cube(path) {
        write_image_cube(image, path)
    } else {
        image_io::save_image(image, path, dn_range)
    }
}

/// Load a cloud mask.
///
/// With `label` set, the file is read as a binary raster (nonzero = cloud,
/// negative or `invalid_value` = invalid) and its connected components are
/// numbered. Otherwise its values are taken as region codes.
pub fn load_mask(path: &Path, label: bool, invalid_value: u16) -> Result<CloudMask> {
    let mask = match (is_cube(path), label) {
        (true, false) => CubeReader::open(path)?.read_mask()?,
        (true, true) => {
            let coded = CubeReader::open(path)?.read_mask()?;
            let cloud = coded.data.mapv(|c| c > 0);
            let invalid = coded.data.mapv(|c| c < 0);
            label_regions(&cloud, Some(&invalid))?
        }
        (false, false) => image_io::load_coded_mask(path, invalid_value)?,
        (false, true) => {
            let (cloud, invalid) = image_io::load_binary_mask(path, invalid_value)?;
            label_regions(&cloud, Some(&invalid))?
        }
    };
    debug!(
        path = %path.display(),
        regions = mask.region_codes().len(),
        "Mask loaded"
    );
    Ok(mask)
}

/// Save a mask as a single-band i32 cube.
pub fn save_mask(mask: &CloudMask, path: &Path) -> Result<()> {
    write_mask_cube(mask, path)
}
