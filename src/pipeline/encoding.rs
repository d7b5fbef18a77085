//! One-hot encoding of categorical features
//!
//! Categories are learned from the rows seen at fit time. At transform time
//! a category that was not seen produces an all-zero block for its feature.

use std::collections::HashMap;

use faer::Mat;
use serde::{Deserialize, Serialize};

use super::error::ModelError;
use super::frame::CategoricalFrame;

/// Fitted one-hot encoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    /// Feature names, in input order
    pub feature_names: Vec<String>,
    /// Sorted categories seen at fit time, one list per feature
    pub categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    /// Learn the categories present in `rows` of `frame`.
    pub fn fit(frame: &CategoricalFrame, rows: &[usize]) -> Result<Self, ModelError> {
        if rows.is_empty() {
            return Err(ModelError::EmptyDataset);
        }

        let categories = (0..frame.n_features())
            .map(|j| {
                let vocabulary = frame.vocabulary(j);
                let codes = frame.codes(j);
                let mut seen = vec![false; vocabulary.len()];
                for &row in rows {
                    seen[codes[row] as usize] = true;
                }
                // Vocabulary is sorted, so the filtered list stays sorted.
                vocabulary
                    .iter()
                    .zip(seen)
                    .filter_map(|(value, present)| present.then(|| value.clone()))
                    .collect()
            })
            .collect();

        Ok(Self {
            feature_names: frame.names().to_vec(),
            categories,
        })
    }

    /// Total number of indicator columns
    pub fn n_outputs(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// Indicator column names, `<feature>_<category>`
    pub fn output_names(&self) -> Vec<String> {
        self.feature_names
            .iter()
            .zip(&self.categories)
            .flat_map(|(name, cats)| cats.iter().map(move |c| format!("{}_{}", name, c)))
            .collect()
    }

    /// Encode `rows` of `frame` into a dense 0/1 matrix.
    ///
    /// Columns of `frame` are matched to the encoder's features by name, so a
    /// frame with extra or reordered columns is accepted.
    pub fn transform(&self, frame: &CategoricalFrame, rows: &[usize]) -> Result<Mat<f64>, ModelError> {
        let mut x = Mat::<f64>::zeros(rows.len(), self.n_outputs());

        let mut offset = 0;
        for (name, cats) in self.feature_names.iter().zip(&self.categories) {
            let j = frame
                .index_of(name)
                .ok_or_else(|| ModelError::MissingFeature {
                    column: name.clone(),
                })?;

            let positions: HashMap<&str, usize> = cats
                .iter()
                .enumerate()
                .map(|(k, c)| (c.as_str(), k))
                .collect();

            // Frame code -> output column (None for unseen categories)
            let lookup: Vec<Option<usize>> = frame
                .vocabulary(j)
                .iter()
                .map(|v| positions.get(v.as_str()).map(|k| offset + k))
                .collect();

            let codes = frame.codes(j);
            for (i, &row) in rows.iter().enumerate() {
                if let Some(col) = lookup[codes[row] as usize] {
                    x[(i, col)] = 1.0;
                }
            }

            offset += cats.len();
        }

        Ok(x)
    }
}
