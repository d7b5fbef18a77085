//! Command-line argument definitions using clap

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::eda::EdaOptions;
use super::predict::PredictOptions;
use super::subset::{SubsetOptions, DEFAULT_SUBSET_FEATURES, DEFAULT_SUBSET_TARGET};
use super::train::TrainOptions;
use crate::pipeline::{TargetMapping, DEFAULT_INFER_SCHEMA_LENGTH};

/// Fatality - explore collision records and model the chance of a fatality
#[derive(Parser, Debug)]
#[command(name = "fatality")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render per-feature histograms split by outcome class
    Eda(EdaArgs),

    /// Cross-validate baseline and logistic models, tune C and save the model
    Train(TrainArgs),

    /// Cross-validate a logistic model on a subset of features
    Subset(SubsetArgs),

    /// Score a table with a saved model
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
pub struct EdaArgs {
    /// Training table (CSV or Parquet)
    #[arg(long)]
    pub train: PathBuf,

    /// Directory the PNG files are written to (created if missing)
    #[arg(long = "out_dir", visible_alias = "out-dir")]
    pub out_dir: PathBuf,

    /// Binary outcome column the plots are split by
    #[arg(long, default_value = "FATALITY")]
    pub label: String,

    /// Row identifier column, excluded from the plots
    #[arg(long, default_value = "index")]
    pub index_column: String,

    /// Sex column recoded from M/F to 1/0 before plotting
    #[arg(long, default_value = "P_SEX")]
    pub sex_column: String,

    /// Maximum number of histogram bins per panel
    #[arg(long, default_value = "40", value_parser = validate_positive)]
    pub bins: usize,

    /// TrueType font for titles and axis labels.
    /// Defaults to the first common system font found.
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Number of rows to use for schema inference (CSV only).
    /// Defaults to 0, a full table scan.
    #[arg(long, default_value_t = DEFAULT_INFER_SCHEMA_LENGTH)]
    pub infer_schema_length: usize,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Training table (CSV or Parquet)
    #[arg(long)]
    pub input: PathBuf,

    /// Directory for CV_results.csv, lr_model.rds and random_search.json
    #[arg(long)]
    pub output: PathBuf,

    /// Binary outcome column
    #[arg(long, default_value = "FATALITY")]
    pub label: String,

    /// Row identifier column, excluded from the features
    #[arg(long, default_value = "index")]
    pub index_column: String,

    /// Number of stratified cross-validation folds
    #[arg(long, default_value = "5", value_parser = validate_folds)]
    pub folds: usize,

    /// Number of C values sampled by the randomized search
    #[arg(long, default_value = "50", value_parser = validate_positive)]
    pub n_iter: usize,

    /// Seed for the randomized search
    #[arg(long, default_value = "123")]
    pub search_seed: u64,

    /// Seed for the random undersampler
    #[arg(long, default_value = "21")]
    pub sampler_seed: u64,

    /// Maximum Newton iterations per logistic fit
    #[arg(long, default_value = "2000", value_parser = validate_positive)]
    pub max_iter: usize,

    /// Worker threads for the search. Defaults to all cores.
    #[arg(short, long, value_parser = validate_positive)]
    pub jobs: Option<usize>,

    /// Label value that represents EVENT (maps to 1).
    /// Required with --non-event-value when the label is not binary 0/1.
    #[arg(long)]
    pub event_value: Option<String>,

    /// Label value that represents NON-EVENT (maps to 0).
    /// Required with --event-value when the label is not binary 0/1.
    #[arg(long)]
    pub non_event_value: Option<String>,

    /// Number of rows to use for schema inference (CSV only).
    /// Defaults to 0, a full table scan.
    #[arg(long, default_value_t = DEFAULT_INFER_SCHEMA_LENGTH)]
    pub infer_schema_length: usize,
}

#[derive(Args, Debug)]
pub struct SubsetArgs {
    /// Input table (CSV or Parquet)
    #[arg(long, visible_alias = "data")]
    pub input: PathBuf,

    /// Outcome column
    #[arg(long, default_value = DEFAULT_SUBSET_TARGET)]
    pub target: String,

    /// Feature columns to model (comma-separated)
    #[arg(long, value_delimiter = ',', default_values = DEFAULT_SUBSET_FEATURES)]
    pub features: Vec<String>,

    /// Target value that represents EVENT (maps to 1)
    #[arg(long)]
    pub event_value: Option<String>,

    /// Target value that represents NON-EVENT (maps to 0)
    #[arg(long)]
    pub non_event_value: Option<String>,

    /// Number of stratified cross-validation folds
    #[arg(long, default_value = "5", value_parser = validate_folds)]
    pub folds: usize,

    /// Maximum Newton iterations per logistic fit
    #[arg(long, default_value = "2000", value_parser = validate_positive)]
    pub max_iter: usize,

    /// Number of rows to use for schema inference (CSV only).
    /// Defaults to 0, a full table scan.
    #[arg(long, default_value_t = DEFAULT_INFER_SCHEMA_LENGTH)]
    pub infer_schema_length: usize,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Model file written by `train`
    #[arg(long)]
    pub model: PathBuf,

    /// Table to score (CSV or Parquet)
    #[arg(long)]
    pub input: PathBuf,

    /// CSV file for the predictions
    #[arg(long)]
    pub output: PathBuf,

    /// Number of rows to use for schema inference (CSV only).
    /// Defaults to 0, a full table scan.
    #[arg(long, default_value_t = DEFAULT_INFER_SCHEMA_LENGTH)]
    pub infer_schema_length: usize,
}

impl EdaArgs {
    pub fn into_options(self) -> EdaOptions {
        EdaOptions {
            train: self.train,
            out_dir: self.out_dir,
            label: self.label,
            index_column: self.index_column,
            sex_column: self.sex_column,
            bins: self.bins,
            font: self.font,
            infer_schema_length: self.infer_schema_length,
        }
    }
}

impl TrainArgs {
    pub fn into_options(self) -> Result<TrainOptions> {
        let mapping =
            TargetMapping::from_pair(self.event_value.as_deref(), self.non_event_value.as_deref())?;
        Ok(TrainOptions {
            input: self.input,
            output: self.output,
            label: self.label,
            index_column: self.index_column,
            mapping,
            folds: self.folds,
            n_iter: self.n_iter,
            search_seed: self.search_seed,
            sampler_seed: self.sampler_seed,
            max_iter: self.max_iter,
            jobs: self.jobs,
            infer_schema_length: self.infer_schema_length,
        })
    }
}

impl SubsetArgs {
    pub fn into_options(self) -> Result<SubsetOptions> {
        let mapping =
            TargetMapping::from_pair(self.event_value.as_deref(), self.non_event_value.as_deref())?;
        Ok(SubsetOptions {
            input: self.input,
            target: self.target,
            features: self.features,
            mapping,
            folds: self.folds,
            max_iter: self.max_iter,
            infer_schema_length: self.infer_schema_length,
        })
    }
}

impl PredictArgs {
    pub fn into_options(self) -> PredictOptions {
        PredictOptions {
            model: self.model,
            input: self.input,
            output: self.output,
            infer_schema_length: self.infer_schema_length,
        }
    }
}

/// Validator for counts that must be at least 1
fn validate_positive(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid count", s))?;

    if value == 0 {
        Err("value must be at least 1".to_string())
    } else {
        Ok(value)
    }
}

/// Validator for the fold count
fn validate_folds(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value < 2 {
        Err(format!("folds must be at least 2, got {}", value))
    } else {
        Ok(value)
    }
}
