//! Fatality CLI
//!
//! Explore collision records and model the chance of a fatality.

use anyhow::Result;
use clap::Parser;

use fatality::cli::{run_eda, run_predict, run_subset, run_train, Cli, Commands};
use fatality::utils::print_banner;

fn main() -> Result<()> {
    let cli = Cli::parse();

    print_banner(env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Eda(args) => {
            run_eda(&args.into_options())?;
        }
        Commands::Train(args) => {
            run_train(&args.into_options()?)?;
        }
        Commands::Subset(args) => {
            run_subset(&args.into_options()?)?;
        }
        Commands::Predict(args) => {
            run_predict(&args.into_options())?;
        }
    }

    Ok(())
}
