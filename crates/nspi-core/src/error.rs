use thiserror::Error;

#[derive(Error, Debug)]
pub enum NspiError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid cube file: {0}")]
    InvalidCube(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Pixel ({row}, {col}, {band}) out of range for {rows}x{cols}x{bands} image")]
    IndexOutOfRange {
        row: usize,
        col: usize,
        band: usize,
        rows: usize,
        cols: usize,
        bands: usize,
    },

    #[error("Unsupported band count for image export: {0}")]
    UnsupportedBandCount(usize),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, NspiError>;
