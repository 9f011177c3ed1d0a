use std::path::Path;

use image::{DynamicImage, ImageBuffer, ImageFormat};
use ndarray::Array2;

use crate::consts::{MASK_CLEAR, MASK_INVALID};
use crate::error::{NspiError, Result};
use crate::raster::{CloudMask, Image};

use super::dim_u32;

/// Load an image file as a multi-band [`Image`].
///
/// Bands follow the decoded channel count (gray, gray+alpha, RGB, RGBA).
/// DN values are the 16-bit channel values; 8-bit sources are widened by
/// the decoder.
pub fn load_image(path: &Path) -> Result<Image> {
    let img = image::open(path)?;
    let (w, h) = (img.width() as usize, img.height() as usize);

    let (raw, bands): (Vec<u16>, usize) = match img.color().channel_count() {
        1 => (img.to_luma16().into_raw(), 1),
        2 => (img.to_luma_alpha16().into_raw(), 2),
        3 => (img.to_rgb16().into_raw(), 3),
        _ => (img.to_rgba16().into_raw(), 4),
    };

    let samples = raw.into_iter().map(<f64 as From<u16>>::from).collect();
    Image::from_row_major(samples, (h, w, bands))
}

/// Map `dn` linearly from `[dn_min, dn_max]` onto the full range of `T`.
fn quantize<T>(dn: f64, dn_min: f64, dn_max: f64) -> T
where
    T: num_traits::Bounded + num_traits::NumCast,
{
    let top = T::max_value().to_f64().unwrap_or(1.0);
    let unit = if dn.is_nan() {
        0.0
    } else {
        ((dn - dn_min) / (dn_max - dn_min)).clamp(0.0, 1.0)
    };
    <T as num_traits::NumCast>::from((unit * top).round()).unwrap_or_else(T::min_value)
}

/// `(width, height)` for the image encoder.
fn dimensions(image: &Image) -> Result<(u32, u32)> {
    Ok((dim_u32(image.cols(), "cols")?, dim_u32(image.rows(), "rows")?))
}

fn buffer_error() -> NspiError {
    NspiError::ShapeMismatch("pixel buffer does not match image dimensions".into())
}

fn to_dynamic_u16(image: &Image, dn_range: (f64, f64)) -> Result<DynamicImage> {
    let (w, h) = dimensions(image)?;
    let px: Vec<u16> = image
        .data
        .iter()
        .map(|&v| quantize::<u16>(v, dn_range.0, dn_range.1))
        .collect();
    let dynamic = match image.bands() {
        1 => ImageBuffer::from_raw(w, h, px).map(DynamicImage::ImageLuma16),
        2 => ImageBuffer::from_raw(w, h, px).map(DynamicImage::ImageLumaA16),
        3 => ImageBuffer::from_raw(w, h, px).map(DynamicImage::ImageRgb16),
        4 => ImageBuffer::from_raw(w, h, px).map(DynamicImage::ImageRgba16),
        n => return Err(NspiError::UnsupportedBandCount(n)),
    };
    dynamic.ok_or_else(buffer_error)
}

fn to_dynamic_u8(image: &Image, dn_range: (f64, f64)) -> Result<DynamicImage> {
    let (w, h) = dimensions(image)?;
    let px: Vec<u8> = image
        .data
        .iter()
        .map(|&v| quantize::<u8>(v, dn_range.0, dn_range.1))
        .collect();
    let dynamic = match image.bands() {
        1 => ImageBuffer::from_raw(w, h, px).map(DynamicImage::ImageLuma8),
        2 => ImageBuffer::from_raw(w, h, px).map(DynamicImage::ImageLumaA8),
        3 => ImageBuffer::from_raw(w, h, px).map(DynamicImage::ImageRgb8),
        4 => ImageBuffer::from_raw(w, h, px).map(DynamicImage::ImageRgba8),
        n => return Err(NspiError::UnsupportedBandCount(n)),
    };
    dynamic.ok_or_else(buffer_error)
}

/// Save as 16-bit TIFF, scaling `dn_range` onto 0..=65535.
pub fn save_tiff(image: &Image, path: &Path, dn_range: (f64, f64)) -> Result<()> {
    to_dynamic_u16(image, dn_range)?.save_with_format(path, ImageFormat::Tiff)?;
    Ok(())
}

/// Save as 8-bit PNG, scaling `dn_range` onto 0..=255.
pub fn save_png(image: &Image, path: &Path, dn_range: (f64, f64)) -> Result<()> {
    to_dynamic_u8(image, dn_range)?.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save an image, choosing format from file extension.
pub fn save_image(image: &Image, path: &Path, dn_range: (f64, f64)) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("png") => save_png(image, path, dn_range),
        _ => save_tiff(image, path, dn_range),
    }
}

/// Load a grayscale mask image as `(cloud, invalid)` flags.
///
/// Pixels equal to `invalid_value` (at 16-bit depth) are invalid, any
/// other nonzero pixel is cloud.
pub fn load_binary_mask(path: &Path, invalid_value: u16) -> Result<(Array2<bool>, Array2<bool>)> {
    let gray = image::open(path)?.to_luma16();
    let (w, h) = gray.dimensions();
    let mut cloud = Array2::from_elem((h as usize, w as usize), false);
    let mut invalid = Array2::from_elem((h as usize, w as usize), false);

    for (col, row, pixel) in gray.enumerate_pixels() {
        let v = pixel.0[0];
        let idx = [row as usize, col as usize];
        if v == invalid_value {
            invalid[idx] = true;
        } else if v != 0 {
            cloud[idx] = true;
        }
    }
    Ok((cloud, invalid))
}

/// Load a grayscale image whose pixel values are region codes.
///
/// `invalid_value` maps to `-1`; every other value is taken as-is.
pub fn load_coded_mask(path: &Path, invalid_value: u16) -> Result<CloudMask> {
    let gray = image::open(path)?.to_luma16();
    let (w, h) = gray.dimensions();
    let mut codes = Array2::from_elem((h as usize, w as usize), MASK_CLEAR);
    for (col, row, pixel) in gray.enumerate_pixels() {
        let v = pixel.0[0];
        codes[[row as usize, col as usize]] = if v == invalid_value {
            MASK_INVALID
        } else {
            <i32 as From<u16>>::from(v)
        };
    }
    Ok(CloudMask::new(codes))
}
