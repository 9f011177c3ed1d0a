pub mod config;
pub mod fill;
pub mod info;
pub mod label;
