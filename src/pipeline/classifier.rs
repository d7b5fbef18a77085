//! Resample -> encode -> estimate pipelines
//!
//! Resampling happens only while fitting. Scoring and prediction always see
//! the rows they are given.

use serde::{Deserialize, Serialize};

use super::encoding::OneHotEncoder;
use super::error::ModelError;
use super::frame::CategoricalFrame;
use super::model::{Estimator, FittedEstimator, LogisticRegression, Predictor};
use super::sampling::RandomUnderSampler;

/// Unfitted pipeline description
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierPipeline {
    pub sampler: Option<RandomUnderSampler>,
    pub estimator: Estimator,
}

/// Pipeline after fitting, ready to score rows of any compatible frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPipeline {
    pub encoder: OneHotEncoder,
    pub estimator: FittedEstimator,
    /// (negative, positive) counts the estimator was trained on
    pub training_counts: (usize, usize),
}

impl ClassifierPipeline {
    /// Undersample, then one-hot encode, then `estimator`.
    pub fn undersampled(sampler: RandomUnderSampler, estimator: Estimator) -> Self {
        Self {
            sampler: Some(sampler),
            estimator,
        }
    }

    /// One-hot encode, then `estimator`, on all rows.
    pub fn plain(estimator: Estimator) -> Self {
        Self {
            sampler: None,
            estimator,
        }
    }

    /// Same pipeline with the logistic estimator's `C` replaced.
    /// The baseline is returned unchanged.
    #[must_use]
    pub fn with_c(mut self, c: f64) -> Self {
        if let Estimator::Logistic(lr) = self.estimator {
            self.estimator = Estimator::Logistic(lr.with_c(c));
        }
        self
    }

    /// The logistic hyperparameters, if this is a logistic pipeline
    pub fn logistic(&self) -> Option<LogisticRegression> {
        match self.estimator {
            Estimator::Logistic(lr) => Some(lr),
            Estimator::MostFrequent => None,
        }
    }

    /// Fit on `rows` of `frame`. `labels` is indexed by row id.
    pub fn fit(
        &self,
        frame: &CategoricalFrame,
        labels: &[u8],
        rows: &[usize],
    ) -> Result<FittedPipeline, ModelError> {
        if labels.len() != frame.n_rows() {
            return Err(ModelError::LabelCountMismatch {
                labels: labels.len(),
                rows: frame.n_rows(),
            });
        }

        let train_rows = match &self.sampler {
            Some(sampler) => sampler.resample(rows, labels)?,
            None => rows.to_vec(),
        };

        let encoder = OneHotEncoder::fit(frame, &train_rows)?;
        let x = encoder.transform(frame, &train_rows)?;
        let y: Vec<u8> = train_rows.iter().map(|&r| labels[r]).collect();

        let estimator = self.estimator.fit(&x, &y)?;

        let positives = y.iter().filter(|&&v| v == 1).count();
        Ok(FittedPipeline {
            encoder,
            estimator,
            training_counts: (y.len() - positives, positives),
        })
    }
}

impl FittedPipeline {
    /// Positive-class probabilities for `rows` of `frame`
    pub fn predict_proba(&self, frame: &CategoricalFrame, rows: &[usize]) -> Result<Vec<f64>, ModelError> {
        let x = self.encoder.transform(frame, rows)?;
        self.estimator.predict_proba(&x)
    }

    /// Hard predictions and probabilities for `rows` of `frame`
    pub fn predict_with_proba(
        &self,
        frame: &CategoricalFrame,
        rows: &[usize],
    ) -> Result<(Vec<u8>, Vec<f64>), ModelError> {
        let x = self.encoder.transform(frame, rows)?;
        Ok((self.estimator.predict(&x)?, self.estimator.predict_proba(&x)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skewed_frame() -> (CategoricalFrame, Vec<u8>) {
        // 40 negatives on V_TYPE "01", 8 positives on "14" (two of them on "01")
        let mut v_type = Vec::new();
        let mut labels = Vec::new();
        for _ in 0..40 {
            v_type.push(Some("01".to_string()));
            labels.push(0);
        }
        for i in 0..8 {
            v_type.push(Some(if i < 6 { "14" } else { "01" }.to_string()));
            labels.push(1);
        }
        let frame = CategoricalFrame::from_columns(vec![("V_TYPE".to_string(), v_type)]).unwrap();
        (frame, labels)
    }

    #[test]
    fn test_undersampled_fit_is_balanced() {
        let (frame, labels) = skewed_frame();
        let rows: Vec<usize> = (0..frame.n_rows()).collect();

        let pipeline = ClassifierPipeline::undersampled(
            RandomUnderSampler::default(),
            Estimator::Logistic(LogisticRegression::default()),
        );
        let fitted = pipeline.fit(&frame, &labels, &rows).unwrap();

        assert_eq!(fitted.training_counts, (8, 8));
    }

    #[test]
    fn test_prediction_uses_all_requested_rows() {
        let (frame, labels) = skewed_frame();
        let rows: Vec<usize> = (0..frame.n_rows()).collect();

        let fitted = ClassifierPipeline::plain(Estimator::Logistic(LogisticRegression::default()))
            .fit(&frame, &labels, &rows)
            .unwrap();
        let (pred, proba) = fitted.predict_with_proba(&frame, &rows).unwrap();

        assert_eq!(pred.len(), rows.len());
        assert_eq!(proba.len(), rows.len());
        // "14" rows are all positive and should score higher than "01" rows
        assert!(proba[40] > proba[0]);
    }

    #[test]
    fn test_with_c_only_touches_logistic() {
        let lr = ClassifierPipeline::plain(Estimator::Logistic(LogisticRegression::default())).with_c(0.5);
        assert_eq!(lr.logistic().unwrap().c, 0.5);

        let dummy = ClassifierPipeline::plain(Estimator::MostFrequent).with_c(0.5);
        assert!(dummy.logistic().is_none());
    }
}
