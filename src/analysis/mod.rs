//! Analysis modules.
//!
//! Aggregates scanned papers into the dataset and computes its summary.

pub mod aggregator;

pub use aggregator::*;
