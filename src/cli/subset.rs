//! `subset` command: logistic regression on a handful of named features

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::pipeline::{
    cross_validate, load_observations, ClassifierPipeline, Estimator, LogisticRegression,
    ObservationSpec, StratifiedKFold, TargetMapping, DEFAULT_FOLDS,
    DEFAULT_INFER_SCHEMA_LENGTH, DEFAULT_MAX_ITER, SUBSET_SCORERS,
};
use crate::report::CvResultsTable;
use crate::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_completion, print_config,
    print_count, print_step_header, print_step_time, print_warning, ConfigLine, CHART, FOLDER,
    TARGET,
};

pub const DEFAULT_SUBSET_TARGET: &str = "P_ISEV";
pub const DEFAULT_SUBSET_FEATURES: [&str; 5] = ["C_WTHR", "C_RCFG", "C_MNTH", "V_TYPE", "P_AGE"];

const VARIANT: &str = "Logistic Regression";

/// Settings for the `subset` command
#[derive(Debug, Clone)]
pub struct SubsetOptions {
    pub input: PathBuf,
    pub target: String,
    pub features: Vec<String>,
    pub mapping: Option<TargetMapping>,
    pub folds: usize,
    pub max_iter: usize,
    pub infer_schema_length: usize,
}

impl SubsetOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            target: DEFAULT_SUBSET_TARGET.to_string(),
            features: DEFAULT_SUBSET_FEATURES.iter().map(|f| f.to_string()).collect(),
            mapping: None,
            folds: DEFAULT_FOLDS,
            max_iter: DEFAULT_MAX_ITER,
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }
}

/// Cross-validate one-hot encoding + logistic regression on the chosen
/// features and print the scores. Nothing is written to disk.
pub fn run_subset(options: &SubsetOptions) -> Result<CvResultsTable> {
    print_config(&[
        ConfigLine::path(&FOLDER, "Input", &options.input),
        ConfigLine::text(&TARGET, "Target", &options.target),
        ConfigLine::text(&CHART, "Features", options.features.join(",")),
    ]);

    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading table...");
    let observations = load_observations(
        &options.input,
        &ObservationSpec {
            index_column: None,
            label: &options.target,
            mapping: options.mapping.as_ref(),
            features: Some(&options.features),
        },
        options.infer_schema_length,
    )?;
    finish_with_success(&spinner, "Dataset loaded");

    let (negatives, positives) = observations.class_counts();
    print_count("rows", observations.labels.len(), None);
    print_count("events", positives, Some(&format!("({} non-events)", negatives)));
    if observations.ignored_rows > 0 {
        print_warning(&format!(
            "{} rows with a target outside the event mapping were dropped",
            observations.ignored_rows
        ));
    }
    print_step_time(step_start.elapsed());

    print_step_header(2, "Cross-Validate");
    let step_start = Instant::now();
    let folds = StratifiedKFold::new(&observations.labels, options.folds)?;
    let pipeline = ClassifierPipeline::plain(Estimator::Logistic(
        LogisticRegression::default().with_max_iter(options.max_iter),
    ));

    let spinner = create_spinner(&format!("{} folds...", folds.n_folds()));
    let scores = cross_validate(
        &pipeline,
        &observations.frame,
        &observations.labels,
        &folds,
        &SUBSET_SCORERS,
    )
    .context("Cross-validation failed")?;
    if scores.unconverged_folds > 0 {
        finish_with_warning(
            &spinner,
            &format!(
                "{} fold(s) stopped at max_iter={} before converging",
                scores.unconverged_folds, options.max_iter
            ),
        );
    } else {
        finish_with_success(&spinner, "Cross-validation complete");
    }

    let mut results = CvResultsTable::new(&SUBSET_SCORERS);
    results.add_variant(VARIANT, &scores)?;
    println!();
    results.display();
    print_step_time(step_start.elapsed());

    print_completion("Subset analysis complete");
    Ok(results)
}
