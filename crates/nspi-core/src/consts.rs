/// Epsilon added to the min-max range when normalizing donor scores to [1, 2].
pub const NORMALIZE_EPSILON: f64 = 1e-6;

/// Epsilon added to the combined spectral/spatial cost before inversion.
pub const COST_EPSILON: f64 = 1e-7;

/// Mask code for a pixel that is clear in both images.
pub const MASK_CLEAR: i32 = 0;

/// Mask code for a pixel that is unusable in the clear image.
pub const MASK_INVALID: i32 = -1;

/// Default estimated number of land-cover classes in a neighborhood window.
pub const DEFAULT_NUM_CLASS: usize = 4;

/// Default number of similar pixels sought per obscured pixel.
pub const DEFAULT_MIN_PIXEL: usize = 20;

/// Default neighborhood margin (pixels) around each cloud region.
pub const DEFAULT_CLOUD_NBH: usize = 10;

/// Default lower bound of the valid DN range.
pub const DEFAULT_DN_MIN: f64 = 0.0;

/// Default upper bound of the valid DN range.
pub const DEFAULT_DN_MAX: f64 = 10_000.0;

/// Default DN range mapped onto the integer range of exported TIFF/PNG files.
/// Matches the 16-bit scale at which image files are loaded.
pub const DEFAULT_EXPORT_RANGE: (f64, f64) = (0.0, 65_535.0);

/// Default 16-bit pixel value marking invalid cells in a binary mask image.
pub const DEFAULT_MASK_INVALID_VALUE: u16 = u16::MAX;

/// Minimum region count to dispatch region filling across Rayon workers.
pub const PARALLEL_REGION_THRESHOLD: usize = 2;
