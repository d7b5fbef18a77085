//! Binary classification scorers and fold summaries

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Scoring metric applied to a held-out fold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scorer {
    Accuracy,
    F1,
    Recall,
    Precision,
    AveragePrecision,
    RocAuc,
}

/// Metrics reported for the baseline/untuned/tuned comparison
pub const TRAINING_SCORERS: [Scorer; 5] = [
    Scorer::Accuracy,
    Scorer::F1,
    Scorer::Recall,
    Scorer::Precision,
    Scorer::AveragePrecision,
];

/// Metrics reported by the feature-subset analysis
pub const SUBSET_SCORERS: [Scorer; 5] = [
    Scorer::F1,
    Scorer::Recall,
    Scorer::Precision,
    Scorer::RocAuc,
    Scorer::AveragePrecision,
];

impl Scorer {
    pub fn name(&self) -> &'static str {
        match self {
            Scorer::Accuracy => "accuracy",
            Scorer::F1 => "f1",
            Scorer::Recall => "recall",
            Scorer::Precision => "precision",
            Scorer::AveragePrecision => "average_precision",
            Scorer::RocAuc => "roc_auc",
        }
    }

    pub fn score(&self, y_true: &[u8], y_pred: &[u8], y_score: &[f64]) -> f64 {
        match self {
            Scorer::Accuracy => accuracy(y_true, y_pred),
            Scorer::F1 => f1(y_true, y_pred),
            Scorer::Recall => recall(y_true, y_pred),
            Scorer::Precision => precision(y_true, y_pred),
            Scorer::AveragePrecision => average_precision(y_true, y_score),
            Scorer::RocAuc => roc_auc(y_true, y_score),
        }
    }
}

impl fmt::Display for Scorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Scorer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accuracy" => Ok(Scorer::Accuracy),
            "f1" => Ok(Scorer::F1),
            "recall" => Ok(Scorer::Recall),
            "precision" => Ok(Scorer::Precision),
            "average_precision" => Ok(Scorer::AveragePrecision),
            "roc_auc" => Ok(Scorer::RocAuc),
            _ => Err(format!("Unknown scorer: '{}'", s)),
        }
    }
}

/// True/false positive/negative counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_: usize,
}

impl ConfusionCounts {
    pub fn from_predictions(y_true: &[u8], y_pred: &[u8]) -> Self {
        let mut counts = Self::default();
        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t, p) {
                (1, 1) => counts.tp += 1,
                (0, 1) => counts.fp += 1,
                (1, _) => counts.fn_ += 1,
                _ => counts.tn += 1,
            }
        }
        counts
    }
}

/// `num / den`, 0 when the denominator is 0
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

pub fn accuracy(y_true: &[u8], y_pred: &[u8]) -> f64 {
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    ratio(correct, y_true.len())
}

pub fn precision(y_true: &[u8], y_pred: &[u8]) -> f64 {
    let c = ConfusionCounts::from_predictions(y_true, y_pred);
    ratio(c.tp, c.tp + c.fp)
}

pub fn recall(y_true: &[u8], y_pred: &[u8]) -> f64 {
    let c = ConfusionCounts::from_predictions(y_true, y_pred);
    ratio(c.tp, c.tp + c.fn_)
}

pub fn f1(y_true: &[u8], y_pred: &[u8]) -> f64 {
    let c = ConfusionCounts::from_predictions(y_true, y_pred);
    ratio(2 * c.tp, 2 * c.tp + c.fp + c.fn_)
}

/// Indices sorted by descending score
fn descending_order(y_score: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..y_score.len()).collect();
    order.sort_by(|&a, &b| {
        y_score[b]
            .partial_cmp(&y_score[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

/// Step-wise area under the precision-recall curve:
/// `sum_n (R_n - R_{n-1}) * P_n` over distinct thresholds.
pub fn average_precision(y_true: &[u8], y_score: &[f64]) -> f64 {
    let positives = y_true.iter().filter(|&&y| y == 1).count();
    if positives == 0 {
        return 0.0;
    }

    let order = descending_order(y_score);
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut prev_recall = 0.0;
    let mut ap = 0.0;

    let mut k = 0;
    while k < order.len() {
        // Consume every row tied at this threshold
        let threshold = y_score[order[k]];
        while k < order.len() && y_score[order[k]] == threshold {
            if y_true[order[k]] == 1 {
                tp += 1;
            } else {
                fp += 1;
            }
            k += 1;
        }

        let recall = tp as f64 / positives as f64;
        let precision = tp as f64 / (tp + fp) as f64;
        ap += (recall - prev_recall) * precision;
        prev_recall = recall;
    }

    ap
}

/// Area under the ROC curve via the rank-sum statistic with tie correction.
/// NaN when only one class is present.
pub fn roc_auc(y_true: &[u8], y_score: &[f64]) -> f64 {
    let positives = y_true.iter().filter(|&&y| y == 1).count();
    let negatives = y_true.len() - positives;
    if positives == 0 || negatives == 0 {
        return f64::NAN;
    }

    // Ascending order with average ranks for ties
    let mut order = descending_order(y_score);
    order.reverse();

    let mut ranks = vec![0.0; y_score.len()];
    let mut k = 0;
    while k < order.len() {
        let mut end = k;
        while end + 1 < order.len() && y_score[order[end + 1]] == y_score[order[k]] {
            end += 1;
        }
        let avg_rank = (k + end) as f64 / 2.0 + 1.0;
        for &idx in &order[k..=end] {
            ranks[idx] = avg_rank;
        }
        k = end + 1;
    }

    let positive_rank_sum: f64 = y_true
        .iter()
        .zip(&ranks)
        .filter(|(&y, _)| y == 1)
        .map(|(_, &r)| r)
        .sum();

    let p = positives as f64;
    (positive_rank_sum - p * (p + 1.0) / 2.0) / (p * negatives as f64)
}

/// Mean and sample standard deviation of fold scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeanStd {
    pub mean: f64,
    pub std: f64,
}

impl MeanStd {
    /// Summarize fold scores; `std` uses n - 1 and is NaN for a single fold.
    pub fn from_scores(scores: &[f64]) -> Self {
        let n = scores.len() as f64;
        if scores.is_empty() {
            return Self {
                mean: f64::NAN,
                std: f64::NAN,
            };
        }
        let mean = scores.iter().sum::<f64>() / n;
        let std = if scores.len() < 2 {
            f64::NAN
        } else {
            (scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        };
        Self { mean, std }
    }
}

impl fmt::Display for MeanStd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} (+/- {:.3})", self.mean, self.std)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const Y_TRUE: [u8; 8] = [1, 1, 0, 0, 1, 0, 0, 0];
    const Y_PRED: [u8; 8] = [1, 0, 1, 0, 1, 0, 0, 0];

    #[test]
    fn test_hard_metrics() {
        // tp = 2, fp = 1, fn = 1, tn = 4
        assert!((accuracy(&Y_TRUE, &Y_PRED) - 0.75).abs() < 1e-12);
        assert!((precision(&Y_TRUE, &Y_PRED) - 2.0 / 3.0).abs() < 1e-12);
        assert!((recall(&Y_TRUE, &Y_PRED) - 2.0 / 3.0).abs() < 1e-12);
        assert!((f1(&Y_TRUE, &Y_PRED) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_division_gives_zero() {
        let y_true = [1u8, 0, 1];
        let y_pred = [0u8, 0, 0];
        assert_eq!(precision(&y_true, &y_pred), 0.0);
        assert_eq!(f1(&y_true, &y_pred), 0.0);
        assert_eq!(recall(&y_true, &y_pred), 0.0);
    }

    #[test]
    fn test_average_precision_known_value() {
        // Ranking: 0.9(1), 0.8(0), 0.7(1), 0.1(0)
        // AP = 0.5 * 1.0 + 0.5 * 2/3
        let ap = average_precision(&[1, 0, 1, 0], &[0.9, 0.8, 0.7, 0.1]);
        assert!((ap - (0.5 + 1.0 / 3.0)).abs() < 1e-12);
    }

    #[test]
    fn test_average_precision_constant_scores_is_prevalence() {
        let y_true = [1u8, 0, 0, 0];
        let ap = average_precision(&y_true, &[0.5; 4]);
        assert!((ap - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_roc_auc_perfect_and_ties() {
        assert!((roc_auc(&[0, 0, 1, 1], &[0.1, 0.2, 0.8, 0.9]) - 1.0).abs() < 1e-12);
        assert!((roc_auc(&[0, 1], &[0.5, 0.5]) - 0.5).abs() < 1e-12);
        assert!(roc_auc(&[1, 1], &[0.5, 0.6]).is_nan());
    }

    #[test]
    fn test_mean_std_formatting() {
        let summary = MeanStd::from_scores(&[0.5, 0.7, 0.6]);
        assert!((summary.mean - 0.6).abs() < 1e-12);
        assert!((summary.std - 0.1).abs() < 1e-12);
        assert_eq!(summary.to_string(), "0.600 (+/- 0.100)");
    }

    #[test]
    fn test_scorer_round_trips_name() {
        for scorer in TRAINING_SCORERS.iter().chain(SUBSET_SCORERS.iter()) {
            assert_eq!(scorer.name().parse::<Scorer>().unwrap(), *scorer);
        }
        assert!("auc".parse::<Scorer>().is_err());
    }
}
