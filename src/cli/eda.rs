//! `eda` command: per-class feature histograms

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use console::style;

use crate::pipeline::{
    class_histograms, get_column_names, load_dataset, recode_sex_column, resolve_labels,
    DEFAULT_INFER_SCHEMA_LENGTH, DEFAULT_MAX_BINS,
};
use crate::report::{render_distribution_grid, PlotConfig};
use crate::utils::{
    create_spinner, finish_with_success, print_completion, print_config, print_info,
    print_step_header, print_step_time, print_success, print_warning, ConfigLine, CHART, FOLDER,
    SAVE, TARGET,
};

/// Output file, panel title and class for each rendered grid
const CLASS_PLOTS: [(u8, &str, &str); 2] = [
    (0, "No fatality", "Distribution_of_no_fatality.png"),
    (1, "Fatality", "Distribution_of_fatality.png"),
];

/// Settings for the `eda` command
#[derive(Debug, Clone)]
pub struct EdaOptions {
    pub train: PathBuf,
    pub out_dir: PathBuf,
    pub label: String,
    pub index_column: String,
    pub sex_column: String,
    pub bins: usize,
    pub font: Option<PathBuf>,
    pub infer_schema_length: usize,
}

impl EdaOptions {
    pub fn new(train: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            train: train.into(),
            out_dir: out_dir.into(),
            label: "FATALITY".to_string(),
            index_column: "index".to_string(),
            sex_column: "P_SEX".to_string(),
            bins: DEFAULT_MAX_BINS,
            font: None,
            infer_schema_length: DEFAULT_INFER_SCHEMA_LENGTH,
        }
    }
}

/// What the `eda` command produced
#[derive(Debug)]
pub struct EdaOutcome {
    pub plots: Vec<PathBuf>,
    pub features: Vec<String>,
    /// Non-numeric cells left out of the histograms, summed over both classes
    pub skipped_cells: usize,
    pub labels_drawn: bool,
}

/// Create `dir` and its parents when missing.
pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }
    Ok(())
}

pub fn run_eda(options: &EdaOptions) -> Result<EdaOutcome> {
    print_config(&[
        ConfigLine::path(&FOLDER, "Input", &options.train),
        ConfigLine::text(&TARGET, "Label", &options.label),
        ConfigLine::path(&SAVE, "Output", &options.out_dir),
        ConfigLine::text(&CHART, "Max bins", options.bins),
    ]);

    ensure_dir(&options.out_dir)?;

    // Step 1: Load
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading table...");
    let mut df = load_dataset(&options.train, options.infer_schema_length)?;
    finish_with_success(&spinner, &format!("{} rows x {} columns", df.height(), df.width()));

    let columns = get_column_names(&df);
    if !columns.contains(&options.label) {
        anyhow::bail!(
            "Label column '{}' not found in dataset. Available columns: {:?}",
            options.label,
            columns
        );
    }
    print_step_time(step_start.elapsed());

    // Step 2: Recode
    print_step_header(2, "Recode Sex");
    if columns.contains(&options.sex_column) {
        recode_sex_column(&mut df, &options.sex_column)?;
        print_success(&format!("'{}' recoded (M -> 1, F -> 0)", options.sex_column));
    } else {
        print_warning(&format!(
            "Sex column '{}' not found, plotting without recoding",
            options.sex_column
        ));
    }

    let features: Vec<String> = columns
        .iter()
        .filter(|c| **c != options.label && **c != options.index_column)
        .cloned()
        .collect();
    if features.is_empty() {
        anyhow::bail!("No feature columns left after removing the label and index columns");
    }

    // Step 3: Render
    print_step_header(3, "Render Distributions");
    let step_start = Instant::now();
    let labels = resolve_labels(&df, &options.label, None)?.values;

    let config = PlotConfig::default()
        .with_max_bins(options.bins)
        .with_font(options.font.clone());

    let mut plots = Vec::with_capacity(CLASS_PLOTS.len());
    let mut skipped_cells = 0;
    let mut labels_drawn = true;

    for (class, title, file_name) in CLASS_PLOTS {
        let histograms = class_histograms(&df, &features, &labels, class, config.max_bins)?;
        skipped_cells += histograms.iter().map(|h| h.skipped).sum::<usize>();

        let path = options.out_dir.join(file_name);
        labels_drawn &= render_distribution_grid(&path, title, &histograms, &config)?;

        let rows = histograms.first().map(|h| h.total() + h.skipped).unwrap_or(0);
        print_success(&format!(
            "{} ({} rows) -> {}",
            title,
            rows,
            style(path.display()).dim()
        ));
        plots.push(path);
    }

    if !labels_drawn {
        print_warning("No TrueType font found; plots were drawn without text. Use --font <ttf>.");
    }
    if skipped_cells > 0 {
        print_info(&format!(
            "{} non-numeric cells were left out of the histograms",
            skipped_cells
        ));
    }
    print_step_time(step_start.elapsed());

    print_completion("Distribution plots written");

    Ok(EdaOutcome {
        plots,
        features,
        skipped_cells,
        labels_drawn,
    })
}
