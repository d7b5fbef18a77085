//! Report module - tables, plots and exports written by the commands

pub mod cv_results;
pub mod distribution_plot;
pub mod search_export;
pub mod summary;

pub use cv_results::*;
pub use distribution_plot::*;
pub use search_export::*;
pub use summary::*;
