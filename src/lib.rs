//! Fatality: collision fatality exploration and modelling
//!
//! Per-class feature histograms, an undersampled one-hot logistic regression
//! compared against a most-frequent baseline, a randomized search over the
//! regularization strength, and a reusable model artifact.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
