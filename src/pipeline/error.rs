//! Error types for model fitting, evaluation and persistence.

use std::path::PathBuf;

/// Errors from the resampling, model, cross-validation and search steps.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Returned when a fit or evaluation receives zero rows.
    #[error("dataset has zero rows")]
    EmptyDataset,

    /// Returned when the encoded design matrix has no columns.
    #[error("dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when training labels contain a single class.
    #[error("training labels contain only class {class}; both classes are required")]
    SingleClass {
        /// The only class present.
        class: u8,
    },

    /// Returned when labels and feature rows disagree in length.
    #[error("got {labels} labels for {rows} rows")]
    LabelCountMismatch {
        /// Number of labels supplied.
        labels: usize,
        /// Number of feature rows supplied.
        rows: usize,
    },

    /// Returned when a prediction matrix has the wrong width.
    #[error("prediction input has {got} columns, expected {expected}")]
    DimensionMismatch {
        /// Width the model was fitted on.
        expected: usize,
        /// Width of the supplied matrix.
        got: usize,
    },

    /// Returned when the regularization strength is not finite and positive.
    #[error("regularization strength C must be finite and positive, got {c}")]
    InvalidRegularization {
        /// The rejected value.
        c: f64,
    },

    /// Returned when n_folds is less than 2.
    #[error("n_folds must be at least 2, got {n_folds}")]
    InvalidFoldCount {
        /// The rejected fold count.
        n_folds: usize,
    },

    /// Returned when a class has fewer rows than the number of folds.
    #[error("class {class} has only {count} rows, need at least {n_folds} for stratified CV")]
    TooFewSamplesForFolds {
        /// The class with insufficient rows.
        class: u8,
        /// Number of rows in that class.
        count: usize,
        /// The requested number of folds.
        n_folds: usize,
    },

    /// Returned when a search is asked for zero candidates.
    #[error("randomized search needs at least one candidate")]
    NoCandidates,

    /// Returned when the search range is empty or not positive.
    #[error("invalid log-uniform range [{low}, {high})")]
    InvalidSearchRange {
        /// Lower bound.
        low: f64,
        /// Upper bound.
        high: f64,
    },

    /// Returned when a prediction frame is missing a column the model needs.
    #[error("input is missing feature column '{column}' required by the model")]
    MissingFeature {
        /// Name of the absent column.
        column: String,
    },

    /// Returned when model serialization fails.
    #[error("failed to serialize model")]
    SerializeModel {
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when model deserialization fails.
    #[error("failed to deserialize model from {path}")]
    DeserializeModel {
        /// Path of the unreadable artifact.
        path: PathBuf,
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when writing the model file fails.
    #[error("failed to write model to {path}")]
    WriteModel {
        /// Destination path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when reading the model file fails.
    #[error("failed to read model from {path}")]
    ReadModel {
        /// Source path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when loading a model written by an incompatible build.
    #[error("incompatible model version in {path}: expected {expected}, found {found}")]
    IncompatibleModelVersion {
        /// Version this build reads.
        expected: u32,
        /// Version found in the file.
        found: u32,
        /// Path of the artifact.
        path: PathBuf,
    },
}
