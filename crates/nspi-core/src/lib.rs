pub mod consts;
pub mod error;
pub mod fill;
pub mod io;
pub mod mask;
pub mod pipeline;
pub mod raster;
