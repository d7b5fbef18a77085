//! Randomized search over the logistic-regression regularization strength
//!
//! Candidates are drawn log-uniformly from `[low, high)` with a seeded
//! generator, scored with cross-validation on shared folds, and evaluated
//! in parallel.

use indicatif::ProgressBar;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use super::classifier::ClassifierPipeline;
use super::crossval::{cross_validate, StratifiedKFold};
use super::error::ModelError;
use super::frame::CategoricalFrame;
use super::metrics::{MeanStd, Scorer};

/// Default number of sampled candidates
pub const DEFAULT_N_ITER: usize = 50;

/// Default seed for candidate sampling
pub const DEFAULT_SEARCH_SEED: u64 = 123;

/// Default lower bound of the `C` range
pub const DEFAULT_C_LOW: f64 = 1e-3;

/// Default upper bound of the `C` range
pub const DEFAULT_C_HIGH: f64 = 1e3;

/// Search configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RandomizedSearch {
    pub n_iter: usize,
    pub low: f64,
    pub high: f64,
    pub seed: u64,
    pub scorer: Scorer,
}

impl Default for RandomizedSearch {
    fn default() -> Self {
        Self {
            n_iter: DEFAULT_N_ITER,
            low: DEFAULT_C_LOW,
            high: DEFAULT_C_HIGH,
            seed: DEFAULT_SEARCH_SEED,
            scorer: Scorer::F1,
        }
    }
}

/// Cross-validated score of one candidate
#[derive(Debug, Clone, Serialize)]
pub struct CandidateScore {
    pub c: f64,
    pub mean_score: f64,
    pub std_score: f64,
    pub fold_scores: Vec<f64>,
    /// 1 is best; equal means share a rank
    pub rank: usize,
}

/// Outcome of a randomized search
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub candidates: Vec<CandidateScore>,
    pub best_index: usize,
}

impl SearchResult {
    pub fn best(&self) -> &CandidateScore {
        &self.candidates[self.best_index]
    }

    pub fn best_c(&self) -> f64 {
        self.best().c
    }

    pub fn best_score(&self) -> f64 {
        self.best().mean_score
    }
}

impl RandomizedSearch {
    /// Draw the candidate values of `C`.
    pub fn sample_candidates(&self) -> Result<Vec<f64>, ModelError> {
        if self.n_iter == 0 {
            return Err(ModelError::NoCandidates);
        }
        if !(self.low > 0.0 && self.high > self.low && self.high.is_finite()) {
            return Err(ModelError::InvalidSearchRange {
                low: self.low,
                high: self.high,
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let (log_low, log_high) = (self.low.ln(), self.high.ln());

        Ok((0..self.n_iter)
            .map(|_| rng.gen_range(log_low..log_high).exp().clamp(self.low, self.high))
            .collect())
    }

    /// Score every candidate and pick the best mean (first wins on ties).
    ///
    /// `progress`, when given, is advanced once per finished candidate.
    pub fn run(
        &self,
        pipeline: &ClassifierPipeline,
        frame: &CategoricalFrame,
        labels: &[u8],
        folds: &StratifiedKFold,
        progress: Option<&ProgressBar>,
    ) -> Result<SearchResult, ModelError> {
        let values = self.sample_candidates()?;

        let scored: Vec<(f64, Vec<f64>)> = values
            .par_iter()
            .map(|&c| {
                let cv = cross_validate(&pipeline.with_c(c), frame, labels, folds, &[self.scorer])?;
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                Ok((c, cv.fold_scores.into_iter().next().unwrap_or_default()))
            })
            .collect::<Result<_, ModelError>>()?;

        let mut candidates: Vec<CandidateScore> = scored
            .into_iter()
            .map(|(c, fold_scores)| {
                let summary = MeanStd::from_scores(&fold_scores);
                CandidateScore {
                    c,
                    mean_score: summary.mean,
                    std_score: summary.std,
                    fold_scores,
                    rank: 0,
                }
            })
            .collect();

        let means: Vec<f64> = candidates.iter().map(|c| c.mean_score).collect();
        for candidate in &mut candidates {
            candidate.rank = 1 + means.iter().filter(|&&m| m > candidate.mean_score).count();
        }

        let best_index = candidates
            .iter()
            .enumerate()
            .fold(0, |best, (i, cand)| {
                if cand.mean_score > candidates[best].mean_score {
                    i
                } else {
                    best
                }
            });

        Ok(SearchResult {
            candidates,
            best_index,
        })
    }
}
