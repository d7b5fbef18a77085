//! `train` command: baseline vs. logistic regression, C search, model export

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use console::style;

use super::eda::ensure_dir;
use crate::pipeline::{
    build_observations, cross_validate, load_dataset, CategoricalFrame, ClassifierPipeline,
    CvScores, Estimator, LogisticRegression, ModelArtifact, ObservationSpec, Observations,
    RandomUnderSampler, RandomizedSearch, Scorer, StratifiedKFold, TargetMapping, DEFAULT_FOLDS,
    DEFAULT_INFER_SCHEMA_LENGTH, DEFAULT_MAX_ITER, DEFAULT_N_ITER, DEFAULT_SAMPLER_SEED,
    DEFAULT_SEARCH_SEED, TRAINING_SCORERS,
};
use crate::report::{export_search_results, CvResultsTable, SearchExportParams, TrainingSummary};
use crate::utils::{
    create_progress_bar, create_spinner, finish_with_success, print_completion, print_config,
    print_count, print_info, print_step_header, print_step_time, print_success, print_warning,
    ConfigLine, DICE, FOLDER, SAVE, TARGET,
};

pub const RESULTS_FILE: &str = "CV_results.csv";
pub const MODEL_FILE: &str = "lr_model.rds";
pub const SEARCH_FILE: &str = "random_search.json";

pub const DUMMY_VARIANT: &str = "Dummy Classifier";
pub const LOGISTIC_VARIANT: &str = "Logistic Regression";
pub const OPTIMIZED_VARIANT: &str = "Logistic Regression Optimized";

/// Settings for the `train` command
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub label: String,
    pub index_column: String,
    pub mapping: Option<TargetMapping>,
    pub folds: usize,
    pub n_iter: usize,
    pub search_seed: u64,
    pub sampler_seed: u64,
    pub max_iter: usize,
    /// Search worker threads; `None` uses the global rayon pool
    pub jobs: Option<usize>,
    pub infer_schema_length: usize,
}

impl TrainOptions {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            label: "FATALITY".to_string(),
            index_column: "index".to_string(),
            mapping: None,
            folds: DEFAULT_FOLDS,
            n_iter: DEFAULT_N_ITER,
            search_seed: DEFAULT_SEARCH_SEED,
            sampler_seed: DEFAULT_SAMPLER_SEED,
            max_iter: DEFAULT_MAX_ITER,
            jobs: None,
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }
}

/// What the `train` command produced
#[derive(Debug)]
pub struct TrainOutcome {
    pub results: CvResultsTable,
    /// (negative, positive) counts of the loaded labels
    pub class_counts: (usize, usize),
    /// (negative, positive) counts the final model was fitted on
    pub balanced_counts: (usize, usize),
    pub best_c: f64,
    pub best_score: f64,
    pub results_path: PathBuf,
    pub model_path: PathBuf,
    pub search_path: PathBuf,
}

pub fn run_train(options: &TrainOptions) -> Result<TrainOutcome> {
    print_config(&[
        ConfigLine::path(&FOLDER, "Input", &options.input),
        ConfigLine::text(&TARGET, "Label", &options.label),
        ConfigLine::path(&SAVE, "Output", &options.output),
        ConfigLine::text(
            &DICE,
            "Search",
            format!("{} x {} folds", options.n_iter, options.folds),
        ),
    ]);

    ensure_dir(&options.output)?;
    let results_path = options.output.join(RESULTS_FILE);
    let model_path = options.output.join(MODEL_FILE);
    let search_path = options.output.join(SEARCH_FILE);

    // Step 1: Load
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading table...");
    let df = load_dataset(&options.input, options.infer_schema_length)?;
    let observations = build_observations(
        &df,
        &ObservationSpec {
            index_column: Some(&options.index_column),
            label: &options.label,
            mapping: options.mapping.as_ref(),
            features: None,
        },
    )?;
    drop(df);
    finish_with_success(&spinner, "Dataset loaded");

    let (negatives, positives) = observations.class_counts();
    let Observations {
        frame,
        labels,
        ignored_rows,
    } = observations;

    print_count("rows", labels.len(), Some(&format!("({} ignored)", ignored_rows)));
    print_count("feature columns", frame.n_features(), None);
    print_info(&format!(
        "Class balance: {} no fatality / {} fatality",
        negatives, positives
    ));

    let mut summary = TrainingSummary::new(labels.len(), frame.n_features(), negatives, positives);
    summary.ignored_rows = ignored_rows;
    summary.folds = options.folds;
    summary.set_load_time(step_start.elapsed());
    print_step_time(step_start.elapsed());

    let folds = StratifiedKFold::new(&labels, options.folds)?;
    let sampler = RandomUnderSampler::new(options.sampler_seed);
    let logistic = ClassifierPipeline::undersampled(
        sampler,
        Estimator::Logistic(LogisticRegression::default().with_max_iter(options.max_iter)),
    );
    let dummy = ClassifierPipeline::undersampled(sampler, Estimator::MostFrequent);

    let mut results = CvResultsTable::new(&TRAINING_SCORERS);
    let mut unconverged = 0;

    // Step 2: Baselines
    print_step_header(2, "Cross-Validate Baseline Models");
    let step_start = Instant::now();
    for (name, pipeline) in [(DUMMY_VARIANT, &dummy), (LOGISTIC_VARIANT, &logistic)] {
        let scores = evaluate(name, pipeline, &frame, &labels, &folds)?;
        unconverged += scores.unconverged_folds;
        results.add_variant(name, &scores)?;
    }
    summary.set_evaluation_time(step_start.elapsed());
    print_step_time(step_start.elapsed());

    // Step 3: Search
    print_step_header(3, "Randomized Search over C");
    let step_start = Instant::now();
    let search = RandomizedSearch {
        n_iter: options.n_iter,
        seed: options.search_seed,
        ..Default::default()
    };
    println!(
        "      Fitting {} folds for each of {} candidates, totalling {} fits",
        folds.n_folds(),
        search.n_iter,
        folds.n_folds() * search.n_iter
    );

    let progress = create_progress_bar(search.n_iter as u64, "Candidates");
    let search_result = match options.jobs {
        Some(jobs) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .context("Failed to build the search thread pool")?;
            pool.install(|| search.run(&logistic, &frame, &labels, &folds, Some(&progress)))?
        }
        None => search.run(&logistic, &frame, &labels, &folds, Some(&progress))?,
    };
    finish_with_success(&progress, "Search complete");

    let best_c = search_result.best_c();
    let best_score = search_result.best_score();
    print_success(&format!(
        "Best hyperparameters: {{'logisticregression__C': {}}}",
        best_c
    ));
    print_success(&format!("Best {} score: {:.3}", search.scorer, best_score));
    summary.best_c = best_c;
    summary.best_score = best_score;
    summary.set_search_time(step_start.elapsed());
    print_step_time(step_start.elapsed());

    // Step 4: Tuned model
    print_step_header(4, "Cross-Validate Optimized Model");
    let step_start = Instant::now();
    let optimized = logistic.with_c(best_c);
    let scores = evaluate(OPTIMIZED_VARIANT, &optimized, &frame, &labels, &folds)?;
    unconverged += scores.unconverged_folds;
    results.add_variant(OPTIMIZED_VARIANT, &scores)?;
    summary.evaluation_time += step_start.elapsed();
    print_step_time(step_start.elapsed());

    println!();
    results.display();

    // Step 5: Save
    print_step_header(5, "Save Results");
    let step_start = Instant::now();
    results.write_csv(&results_path)?;
    print_success(&format!("Results table -> {}", style(results_path.display()).dim()));

    let all_rows: Vec<usize> = (0..labels.len()).collect();
    let fitted = optimized.fit(&frame, &labels, &all_rows)?;
    if !fitted.estimator.converged() {
        unconverged += 1;
        print_warning("Final model did not converge within max_iter; coefficients kept");
    }
    let balanced_counts = fitted.training_counts;

    let artifact = ModelArtifact::new(
        fitted,
        &options.label,
        options.mapping.clone(),
        Some(&options.index_column),
    );
    let bytes = artifact.save(&model_path)?;
    print_success(&format!(
        "Model ({} bytes) -> {}",
        bytes,
        style(model_path.display()).dim()
    ));

    export_search_results(
        &search_result,
        &search_path,
        &SearchExportParams {
            input_file: &options.input.display().to_string(),
            label_column: &options.label,
            folds: folds.n_folds(),
            rows: labels.len(),
            search,
        },
    )?;
    print_success(&format!("Search report -> {}", style(search_path.display()).dim()));
    summary.set_save_time(step_start.elapsed());
    print_step_time(step_start.elapsed());

    if unconverged > 0 {
        print_warning(&format!(
            "{} logistic fit(s) stopped at max_iter={} before converging",
            unconverged, options.max_iter
        ));
    }

    summary.balanced_counts = balanced_counts;
    summary.unconverged_fits = unconverged;
    summary.add_artifact(results_path.clone());
    summary.add_artifact(model_path.clone());
    summary.add_artifact(search_path.clone());
    summary.display();

    print_completion("Training complete!");

    Ok(TrainOutcome {
        results,
        class_counts: (negatives, positives),
        balanced_counts,
        best_c,
        best_score,
        results_path,
        model_path,
        search_path,
    })
}

/// Cross-validate one variant behind a spinner
fn evaluate(
    name: &str,
    pipeline: &ClassifierPipeline,
    frame: &CategoricalFrame,
    labels: &[u8],
    folds: &StratifiedKFold,
) -> Result<CvScores> {
    let spinner = create_spinner(&format!("{}: {} folds...", name, folds.n_folds()));
    let scores = cross_validate(pipeline, frame, labels, folds, &TRAINING_SCORERS)
        .with_context(|| format!("Cross-validation failed for '{}'", name))?;

    let f1 = scores
        .summary(Scorer::F1)
        .map(|s| s.to_string())
        .unwrap_or_default();
    finish_with_success(
        &spinner,
        &format!(
            "{} (f1 {}, {:.3}s per fit)",
            name,
            f1,
            scores.mean_fit_seconds()
        ),
    );
    Ok(scores)
}
