//! Dataset loader for CSV and Parquet files

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

use super::frame::CategoricalFrame;
use super::target::{resolve_labels, TargetMapping};

/// Rows used for CSV type inference by default. 0 scans the whole file, so a
/// `missing` cell far down a numeric-looking column still yields a text column.
pub const DEFAULT_INFER_SCHEMA_LENGTH: usize = 0;

/// Load a dataset from a file (CSV or Parquet based on extension)
///
/// `infer_schema_length` of 0 scans the whole CSV for type inference.
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(schema_length)
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    lf.collect()
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Column names of a loaded DataFrame
pub fn get_column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|s| s.to_string()).collect()
}

/// Which columns play which role when turning a table into observations
#[derive(Debug, Clone)]
pub struct ObservationSpec<'a> {
    /// Row identifier column, dropped from the features
    pub index_column: Option<&'a str>,
    /// Outcome label column
    pub label: &'a str,
    /// Optional event/non-event mapping for a non-binary label
    pub mapping: Option<&'a TargetMapping>,
    /// Restrict features to these columns (all remaining columns when `None`)
    pub features: Option<&'a [String]>,
}

/// Feature frame and 0/1 labels ready for modelling
#[derive(Debug, Clone)]
pub struct Observations {
    pub frame: CategoricalFrame,
    pub labels: Vec<u8>,
    /// Rows dropped because their label was null or unmapped
    pub ignored_rows: usize,
}

impl Observations {
    /// (negative, positive) counts
    pub fn class_counts(&self) -> (usize, usize) {
        let positives = self.labels.iter().filter(|&&y| y == 1).count();
        (self.labels.len() - positives, positives)
    }
}

/// Split a DataFrame into a categorical feature frame and a label vector.
pub fn build_observations(df: &DataFrame, spec: &ObservationSpec) -> Result<Observations> {
    let columns = get_column_names(df);

    if !columns.iter().any(|c| c == spec.label) {
        anyhow::bail!(
            "Label column '{}' not found in dataset. Available columns: {:?}",
            spec.label,
            columns
        );
    }
    if let Some(index) = spec.index_column {
        if !columns.iter().any(|c| c == index) {
            anyhow::bail!(
                "Index column '{}' not found in dataset. Available columns: {:?}",
                index,
                columns
            );
        }
    }

    let feature_names: Vec<String> = match spec.features {
        Some(selected) => {
            for name in selected {
                if !columns.contains(name) {
                    anyhow::bail!(
                        "Feature column '{}' not found in dataset. Available columns: {:?}",
                        name,
                        columns
                    );
                }
            }
            selected.to_vec()
        }
        None => columns
            .iter()
            .filter(|c| c.as_str() != spec.label && Some(c.as_str()) != spec.index_column)
            .cloned()
            .collect(),
    };

    if feature_names.is_empty() {
        anyhow::bail!("No feature columns left after removing the label and index columns");
    }

    let resolved = resolve_labels(df, spec.label, spec.mapping)?;
    let frame = CategoricalFrame::from_dataframe(df, &feature_names)?;

    let ignored_rows = resolved.ignored();
    let frame = if ignored_rows > 0 {
        frame.take_rows(&resolved.kept_rows())
    } else {
        frame
    };

    Ok(Observations {
        frame,
        labels: resolved.kept_labels(),
        ignored_rows,
    })
}

/// Load a table from disk and build observations from it.
pub fn load_observations(
    path: &Path,
    spec: &ObservationSpec,
    infer_schema_length: usize,
) -> Result<Observations> {
    let df = load_dataset(path, infer_schema_length)?;
    build_observations(&df, spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df! {
            "index" => [0i64, 1, 2, 3],
            "C_WTHR" => [1i64, 2, 1, 7],
            "P_SEX" => ["M", "F", "missing", "M"],
            "FATALITY" => [0i64, 1, 0, 0],
        }
        .unwrap()
    }

    #[test]
    fn test_index_and_label_removed_from_features() {
        let spec = ObservationSpec {
            index_column: Some("index"),
            label: "FATALITY",
            mapping: None,
            features: None,
        };
        let obs = build_observations(&sample(), &spec).unwrap();

        assert_eq!(obs.frame.names(), &["C_WTHR", "P_SEX"]);
        assert_eq!(obs.labels, vec![0, 1, 0, 0]);
        assert_eq!(obs.class_counts(), (3, 1));
    }

    #[test]
    fn test_missing_index_column_is_an_error() {
        let spec = ObservationSpec {
            index_column: Some("row_id"),
            label: "FATALITY",
            mapping: None,
            features: None,
        };
        let err = build_observations(&sample(), &spec).unwrap_err();
        assert!(err.to_string().contains("row_id"));
    }

    #[test]
    fn test_feature_subset() {
        let features = vec!["P_SEX".to_string()];
        let spec = ObservationSpec {
            index_column: None,
            label: "FATALITY",
            mapping: None,
            features: Some(&features),
        };
        let obs = build_observations(&sample(), &spec).unwrap();
        assert_eq!(obs.frame.names(), &["P_SEX"]);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = load_dataset(Path::new("data.xlsx"), 100);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unsupported"));
    }
}
