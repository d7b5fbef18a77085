//! Stratified k-fold cross-validation of classifier pipelines.

use std::time::{Duration, Instant};

use super::classifier::ClassifierPipeline;
use super::error::ModelError;
use super::frame::CategoricalFrame;
use super::metrics::{MeanStd, Scorer};

/// Default number of folds
pub const DEFAULT_FOLDS: usize = 5;

/// Deterministic stratified fold assignment.
///
/// Within each class, rows are dealt round-robin to folds in row order, so
/// every fold gets the same class proportions (up to one row).
#[derive(Debug, Clone)]
pub struct StratifiedKFold {
    n_folds: usize,
    assignments: Vec<usize>,
}

impl StratifiedKFold {
    /// Assign every row of `labels` to a fold.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ModelError::InvalidFoldCount`] | `n_folds` < 2 |
    /// | [`ModelError::EmptyDataset`] | no labels |
    /// | [`ModelError::TooFewSamplesForFolds`] | a class has fewer rows than folds |
    pub fn new(labels: &[u8], n_folds: usize) -> Result<Self, ModelError> {
        if n_folds < 2 {
            return Err(ModelError::InvalidFoldCount { n_folds });
        }
        if labels.is_empty() {
            return Err(ModelError::EmptyDataset);
        }

        for class in [0u8, 1] {
            let count = labels.iter().filter(|&&y| y == class).count();
            if count < n_folds {
                return Err(ModelError::TooFewSamplesForFolds {
                    class,
                    count,
                    n_folds,
                });
            }
        }

        let mut seen = [0usize; 2];
        let assignments = labels
            .iter()
            .map(|&y| {
                let class = usize::from(y == 1);
                let fold = seen[class] % n_folds;
                seen[class] += 1;
                fold
            })
            .collect();

        Ok(Self {
            n_folds,
            assignments,
        })
    }

    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// (train rows, test rows) for one fold
    pub fn split(&self, fold: usize) -> (Vec<usize>, Vec<usize>) {
        let mut train = Vec::new();
        let mut test = Vec::new();
        for (row, &assigned) in self.assignments.iter().enumerate() {
            if assigned == fold {
                test.push(row);
            } else {
                train.push(row);
            }
        }
        (train, test)
    }
}

/// Per-fold scores for each requested scorer
#[derive(Debug, Clone)]
pub struct CvScores {
    pub scorers: Vec<Scorer>,
    /// `fold_scores[s][k]` is scorer `s` on fold `k`
    pub fold_scores: Vec<Vec<f64>>,
    pub fit_times: Vec<Duration>,
    /// Folds whose logistic solver hit `max_iter`
    pub unconverged_folds: usize,
}

impl CvScores {
    /// Fold scores of one scorer
    pub fn scores(&self, scorer: Scorer) -> Option<&[f64]> {
        self.scorers
            .iter()
            .position(|s| *s == scorer)
            .map(|i| self.fold_scores[i].as_slice())
    }

    /// Mean and std of one scorer across folds
    pub fn summary(&self, scorer: Scorer) -> Option<MeanStd> {
        self.scores(scorer).map(MeanStd::from_scores)
    }

    /// Mean fit time in seconds
    pub fn mean_fit_seconds(&self) -> f64 {
        if self.fit_times.is_empty() {
            return 0.0;
        }
        self.fit_times.iter().map(Duration::as_secs_f64).sum::<f64>() / self.fit_times.len() as f64
    }
}

/// Fit `pipeline` on each training split and score it on the held-out fold.
pub fn cross_validate(
    pipeline: &ClassifierPipeline,
    frame: &CategoricalFrame,
    labels: &[u8],
    folds: &StratifiedKFold,
    scorers: &[Scorer],
) -> Result<CvScores, ModelError> {
    let mut fold_scores = vec![Vec::with_capacity(folds.n_folds()); scorers.len()];
    let mut fit_times = Vec::with_capacity(folds.n_folds());
    let mut unconverged_folds = 0;

    for fold in 0..folds.n_folds() {
        let (train, test) = folds.split(fold);

        let start = Instant::now();
        let fitted = pipeline.fit(frame, labels, &train)?;
        fit_times.push(start.elapsed());

        if !fitted.estimator.converged() {
            unconverged_folds += 1;
        }

        let (y_pred, y_score) = fitted.predict_with_proba(frame, &test)?;
        let y_true: Vec<u8> = test.iter().map(|&r| labels[r]).collect();

        for (s, scorer) in scorers.iter().enumerate() {
            fold_scores[s].push(scorer.score(&y_true, &y_pred, &y_score));
        }
    }

    Ok(CvScores {
        scorers: scorers.to_vec(),
        fold_scores,
        fit_times,
        unconverged_folds,
    })
}
