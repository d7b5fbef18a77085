//! `predict` command: score a table with a saved model

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use console::style;
use polars::prelude::*;

use super::eda::ensure_dir;
use crate::pipeline::{
    get_column_names, load_dataset, CategoricalFrame, ModelArtifact, DEFAULT_INFER_SCHEMA_LENGTH,
};
use crate::utils::{
    create_spinner, finish_with_success, print_completion, print_config, print_count, print_info,
    print_step_header, print_step_time, print_success, ConfigLine, FOLDER, SAVE, TARGET,
};

pub const PROBABILITY_COLUMN: &str = "probability";
pub const PREDICTION_COLUMN: &str = "prediction";

/// Settings for the `predict` command
#[derive(Debug, Clone)]
pub struct PredictOptions {
    pub model: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    pub infer_schema_length: usize,
}

impl PredictOptions {
    pub fn new(
        model: impl Into<PathBuf>,
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            output: output.into(),
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }
}

/// What the `predict` command produced
#[derive(Debug)]
pub struct PredictOutcome {
    pub rows: usize,
    pub predicted_positive: usize,
    pub output: PathBuf,
}

pub fn run_predict(options: &PredictOptions) -> Result<PredictOutcome> {
    print_config(&[
        ConfigLine::path(&TARGET, "Model", &options.model),
        ConfigLine::path(&FOLDER, "Input", &options.input),
        ConfigLine::path(&SAVE, "Output", &options.output),
    ]);

    print_step_header(1, "Load Model and Data");
    let step_start = Instant::now();
    let artifact = ModelArtifact::load(&options.model)?;
    print_success(&format!(
        "Model for '{}' ({} features, written by v{})",
        artifact.label,
        artifact.feature_names().len(),
        artifact.writer_version
    ));

    let spinner = create_spinner("Reading table...");
    let df = load_dataset(&options.input, options.infer_schema_length)?;
    finish_with_success(&spinner, &format!("{} rows loaded", df.height()));

    let columns = get_column_names(&df);
    let missing: Vec<&String> = artifact
        .feature_names()
        .iter()
        .filter(|f| !columns.contains(*f))
        .collect();
    if !missing.is_empty() {
        anyhow::bail!(
            "Input is missing feature columns the model was trained on: {:?}",
            missing
        );
    }
    let frame = CategoricalFrame::from_dataframe(&df, artifact.feature_names())?;
    print_step_time(step_start.elapsed());

    print_step_header(2, "Score Rows");
    let step_start = Instant::now();
    let rows: Vec<usize> = (0..frame.n_rows()).collect();
    let (predictions, probabilities) = artifact.pipeline.predict_with_proba(&frame, &rows)?;
    let predicted_positive = predictions.iter().filter(|&&p| p == 1).count();
    print_count("rows scored", rows.len(), None);
    print_info(&format!("{} predicted as {}", predicted_positive, artifact.label));

    let mut output_columns: Vec<Column> = Vec::with_capacity(3);
    if let Some(index) = artifact.index_column.as_deref() {
        if columns.iter().any(|c| c == index) {
            output_columns.push(df.column(index)?.clone());
        }
    }
    output_columns.push(Column::new(PROBABILITY_COLUMN.into(), probabilities));
    output_columns.push(Column::new(
        PREDICTION_COLUMN.into(),
        predictions.iter().map(|&p| p as i32).collect::<Vec<_>>(),
    ));
    let mut out = DataFrame::new(output_columns).context("Failed to assemble predictions")?;

    if let Some(parent) = options.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    let mut file = std::fs::File::create(&options.output)
        .with_context(|| format!("Failed to create output file: {}", options.output.display()))?;
    CsvWriter::new(&mut file)
        .finish(&mut out)
        .with_context(|| format!("Failed to write CSV file: {}", options.output.display()))?;
    print_success(&format!(
        "Predictions -> {}",
        style(options.output.display()).dim()
    ));
    print_step_time(step_start.elapsed());

    print_completion("Scoring complete");

    Ok(PredictOutcome {
        rows: rows.len(),
        predicted_positive,
        output: options.output.clone(),
    })
}
