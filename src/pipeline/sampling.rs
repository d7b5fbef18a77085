//! Random undersampling of the majority class.

use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::error::ModelError;

/// Seed used by the training pipeline unless overridden
pub const DEFAULT_SAMPLER_SEED: u64 = 21;

/// Balances a binary label by drawing, without replacement, as many rows of
/// each class as the minority class has.
///
/// The generator is re-seeded on every call, so resampling the same rows
/// always yields the same subsample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomUnderSampler {
    pub seed: u64,
}

impl Default for RandomUnderSampler {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SAMPLER_SEED,
        }
    }
}

impl RandomUnderSampler {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Select a balanced subset of `rows`.
    ///
    /// `labels` is indexed by row id. The result lists the kept row ids,
    /// class 0 first, each class in ascending row order.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ModelError::EmptyDataset`] | `rows` is empty |
    /// | [`ModelError::SingleClass`] | only one class occurs in `rows` |
    pub fn resample(&self, rows: &[usize], labels: &[u8]) -> Result<Vec<usize>, ModelError> {
        if rows.is_empty() {
            return Err(ModelError::EmptyDataset);
        }

        let mut by_class: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
        for &row in rows {
            by_class[usize::from(labels[row] == 1)].push(row);
        }

        for (class, members) in by_class.iter().enumerate() {
            if members.is_empty() {
                return Err(ModelError::SingleClass {
                    class: 1 - class as u8,
                });
            }
        }

        let target = by_class[0].len().min(by_class[1].len());
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut kept = Vec::with_capacity(target * 2);
        for members in &by_class {
            if members.len() == target {
                let mut sorted = members.clone();
                sorted.sort_unstable();
                kept.extend(sorted);
            } else {
                let mut chosen: Vec<usize> = index::sample(&mut rng, members.len(), target)
                    .into_iter()
                    .map(|i| members[i])
                    .collect();
                chosen.sort_unstable();
                kept.extend(chosen);
            }
        }

        Ok(kept)
    }
}
