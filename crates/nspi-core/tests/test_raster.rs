mod common;

use ndarray::array;

use nspi_core::error::NspiError;
use nspi_core::raster::{CloudMask, Image, MaskClass, MaskSummary};

use common::gradient_image;

#[test]
fn test_column_major_offsets() {
    // 2 rows, 3 cols, 2 bands; value encodes its own column-major offset.
    let flat: Vec<f64> = (0..12).map(f64::from).collect();
    let img = Image::from_column_major(&flat, (2, 3, 2)).unwrap();

    assert_eq!(img.get(0, 0, 0), Some(0.0));
    assert_eq!(img.get(1, 0, 0), Some(1.0));
    assert_eq!(img.get(0, 1, 0), Some(2.0));
    assert_eq!(img.get(1, 2, 0), Some(5.0));
    assert_eq!(img.get(0, 0, 1), Some(6.0));
    assert_eq!(img.get(1, 2, 1), Some(11.0));
    assert_eq!(img.to_column_major(), flat);
}

#[test]
fn test_row_major_layout() {
    let img = Image::from_row_major((0..12).map(f64::from).collect(), (2, 3, 2)).unwrap();
    // (row * cols + col) * bands + band
    assert_eq!(img.get(1, 2, 1), Some(11.0));
    assert_eq!(img.get(0, 1, 0), Some(2.0));
    assert_eq!(img.spectrum(1, 0).to_vec(), vec![6.0, 7.0]);
}

#[test]
fn test_buffer_length_checked() {
    let err = Image::from_column_major(&[0.0; 5], (2, 3, 1)).unwrap_err();
    assert!(matches!(err, NspiError::ShapeMismatch(_)));
    let err = Image::from_row_major(vec![0.0; 7], (2, 3, 1)).unwrap_err();
    assert!(matches!(err, NspiError::ShapeMismatch(_)));
    let err = CloudMask::from_column_major(&[0; 5], (2, 3)).unwrap_err();
    assert!(matches!(err, NspiError::ShapeMismatch(_)));
}

#[test]
fn test_bounds_checked_access() {
    let mut img = gradient_image(3, 4, 2);
    assert_eq!(img.get(3, 0, 0), None);
    assert_eq!(img.get(0, 4, 0), None);
    assert_eq!(img.get(0, 0, 2), None);

    img.set(2, 3, 1, -7.0).unwrap();
    assert_eq!(img.get(2, 3, 1), Some(-7.0));
    assert!(matches!(
        img.set(3, 0, 0, 1.0),
        Err(NspiError::IndexOutOfRange { row: 3, .. })
    ));
    assert!(img.set_spectrum(0, 0, &[1.0]).is_err());
    img.set_spectrum(0, 0, &[1.0, 2.0]).unwrap();
    assert_eq!(img.spectrum(0, 0).to_vec(), vec![1.0, 2.0]);
}

#[test]
fn test_sample_range() {
    let img = gradient_image(3, 4, 2);
    assert_eq!(img.sample_range(), Some((50.0, 50.0 + 20.0 + 3.0 + 100.0)));
    assert_eq!(Image::zeros(0, 0, 1).sample_range(), None);
}

#[test]
fn test_mask_classes() {
    assert_eq!(MaskClass::of(0), MaskClass::Clear);
    assert_eq!(MaskClass::of(-1), MaskClass::Invalid);
    assert_eq!(MaskClass::of(-9), MaskClass::Invalid);
    assert_eq!(MaskClass::of(12), MaskClass::Cloud(12));
}

#[test]
fn test_mask_column_major_and_summary() {
    let mask = CloudMask::from_column_major(&[0, 3, -1, 0, 3, 8], (2, 3)).unwrap();
    assert_eq!(mask.data, array![[0, -1, 3], [3, 0, 8]]);
    assert_eq!(mask.to_column_major(), vec![0, 3, -1, 0, 3, 8]);
    assert_eq!(mask.class(0, 2), Some(MaskClass::Cloud(3)));
    assert_eq!(mask.class(2, 0), None);
    assert_eq!(
        mask.summary(),
        MaskSummary {
            clear: 2,
            invalid: 1,
            cloud: 3,
            regions: 2,
        }
    );
}
