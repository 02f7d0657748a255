//! Output writers for the extracted dataset.

pub mod generator;

pub use generator::*;
