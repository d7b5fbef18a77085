//! CLI module - argument parsing and the command implementations

mod args;
pub mod eda;
pub mod predict;
pub mod subset;
pub mod train;

pub use args::{Cli, Commands, EdaArgs, PredictArgs, SubsetArgs, TrainArgs};
pub use eda::{run_eda, EdaOptions, EdaOutcome};
pub use predict::{run_predict, PredictOptions, PredictOutcome};
pub use subset::{run_subset, SubsetOptions};
pub use train::{run_train, TrainOptions, TrainOutcome};
