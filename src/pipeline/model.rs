//! Binary classifiers: a most-frequent baseline and L2-regularized
//! logistic regression fitted with damped Newton iterations.

use faer::prelude::*;
use faer::Mat;
use serde::{Deserialize, Serialize};

use super::error::ModelError;

/// Default iteration cap for the logistic-regression solver
pub const DEFAULT_MAX_ITER: usize = 2000;

/// Default gradient tolerance for the logistic-regression solver
pub const DEFAULT_TOL: f64 = 1e-4;

/// Ridge added to the intercept's Hessian entry so the system stays solvable
const INTERCEPT_JITTER: f64 = 1e-10;

/// Armijo constant for the backtracking line search
const ARMIJO: f64 = 1e-4;

/// Maximum number of step halvings per Newton iteration
const MAX_HALVINGS: usize = 40;

/// Something that scores rows of an encoded design matrix.
pub trait Predictor {
    /// Probability of the positive class for each row.
    fn predict_proba(&self, x: &Mat<f64>) -> Result<Vec<f64>, ModelError>;

    /// Hard 0/1 predictions for each row.
    fn predict(&self, x: &Mat<f64>) -> Result<Vec<u8>, ModelError> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| u8::from(p > 0.5))
            .collect())
    }
}

/// Check label count and class presence before any fit.
fn validate_training_set(x: &Mat<f64>, y: &[u8]) -> Result<(), ModelError> {
    if x.nrows() == 0 {
        return Err(ModelError::EmptyDataset);
    }
    if y.len() != x.nrows() {
        return Err(ModelError::LabelCountMismatch {
            labels: y.len(),
            rows: x.nrows(),
        });
    }
    let positives = y.iter().filter(|&&v| v == 1).count();
    if positives == 0 {
        return Err(ModelError::SingleClass { class: 0 });
    }
    if positives == y.len() {
        return Err(ModelError::SingleClass { class: 1 });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Most-frequent baseline
// ---------------------------------------------------------------------------

/// Baseline that always predicts the most frequent training class
/// (class 0 on ties) and scores every row with the positive-class prior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MostFrequentClassifier {
    pub majority: u8,
    pub prior: f64,
}

impl MostFrequentClassifier {
    pub fn fit(x: &Mat<f64>, y: &[u8]) -> Result<Self, ModelError> {
        if y.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        if y.len() != x.nrows() {
            return Err(ModelError::LabelCountMismatch {
                labels: y.len(),
                rows: x.nrows(),
            });
        }

        let positives = y.iter().filter(|&&v| v == 1).count();
        let negatives = y.len() - positives;

        Ok(Self {
            majority: u8::from(positives > negatives),
            prior: positives as f64 / y.len() as f64,
        })
    }
}

impl Predictor for MostFrequentClassifier {
    fn predict_proba(&self, x: &Mat<f64>) -> Result<Vec<f64>, ModelError> {
        Ok(vec![self.prior; x.nrows()])
    }

    fn predict(&self, x: &Mat<f64>) -> Result<Vec<u8>, ModelError> {
        Ok(vec![self.majority; x.nrows()])
    }
}

// ---------------------------------------------------------------------------
// Logistic regression
// ---------------------------------------------------------------------------

/// Hyperparameters for L2-regularized logistic regression.
///
/// Minimizes `C * sum(logloss) + 0.5 * ||w||^2`; the intercept is not
/// penalized. Smaller `c` means stronger regularization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub c: f64,
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: DEFAULT_MAX_ITER,
            tol: DEFAULT_TOL,
        }
    }
}

/// Fitted logistic-regression coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedLogistic {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub c: f64,
    pub n_iter: usize,
    pub converged: bool,
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// log(1 + exp(z)) without overflow
fn softplus(z: f64) -> f64 {
    z.max(0.0) + (-z.abs()).exp().ln_1p()
}

impl LogisticRegression {
    #[must_use]
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Linear scores `Xw + b`
    fn decision(x: &Mat<f64>, w: &[f64], b: f64) -> Vec<f64> {
        (0..x.nrows())
            .map(|i| b + (0..x.ncols()).map(|j| x[(i, j)] * w[j]).sum::<f64>())
            .collect()
    }

    fn objective(&self, x: &Mat<f64>, y: &[u8], w: &[f64], b: f64) -> f64 {
        let z = Self::decision(x, w, b);
        let loss: f64 = z
            .iter()
            .zip(y)
            .map(|(&zi, &yi)| softplus(zi) - f64::from(yi) * zi)
            .sum();
        let penalty: f64 = w.iter().map(|v| v * v).sum::<f64>() * 0.5;
        self.c * loss + penalty
    }

    /// Fit on a dense design matrix.
    ///
    /// Reaching `max_iter` without meeting `tol` is not an error; the result
    /// carries `converged == false` and the last iterate.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ModelError::InvalidRegularization`] | `c` not finite and positive |
    /// | [`ModelError::EmptyDataset`] | zero rows |
    /// | [`ModelError::ZeroFeatures`] | zero columns |
    /// | [`ModelError::SingleClass`] | only one class in `y` |
    pub fn fit(&self, x: &Mat<f64>, y: &[u8]) -> Result<FittedLogistic, ModelError> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(ModelError::InvalidRegularization { c: self.c });
        }
        validate_training_set(x, y)?;
        if x.ncols() == 0 {
            return Err(ModelError::ZeroFeatures);
        }

        let n = x.nrows();
        let p = x.ncols();
        let mut w = vec![0.0; p];
        let mut b = 0.0;
        let mut objective = self.objective(x, y, &w, b);
        let mut converged = false;
        let mut n_iter = 0;

        while n_iter < self.max_iter {
            let z = Self::decision(x, &w, b);
            let probs: Vec<f64> = z.iter().map(|&zi| sigmoid(zi)).collect();

            // Gradient of the objective, intercept last
            let mut grad = Mat::<f64>::zeros(p + 1, 1);
            for i in 0..n {
                let r = self.c * (probs[i] - f64::from(y[i]));
                for j in 0..p {
                    grad[(j, 0)] += r * x[(i, j)];
                }
                grad[(p, 0)] += r;
            }
            for j in 0..p {
                grad[(j, 0)] += w[j];
            }

            let grad_norm = (0..=p).map(|j| grad[(j, 0)].abs()).fold(0.0, f64::max);
            if grad_norm < self.tol {
                converged = true;
                break;
            }

            // Hessian: C * X~^T D X~ + diag(1, .., 1, jitter), X~ = [X | 1]
            let augmented = Mat::<f64>::from_fn(n, p + 1, |i, j| if j < p { x[(i, j)] } else { 1.0 });
            let weighted = Mat::<f64>::from_fn(n, p + 1, |i, j| {
                self.c * probs[i] * (1.0 - probs[i]) * augmented[(i, j)]
            });
            let mut hessian = augmented.transpose() * &weighted;
            for j in 0..p {
                hessian[(j, j)] += 1.0;
            }
            hessian[(p, p)] += INTERCEPT_JITTER;

            let mut step = grad.clone();
            hessian.partial_piv_lu().solve_in_place(step.as_mut());

            let slope: f64 = (0..=p).map(|j| grad[(j, 0)] * step[(j, 0)]).sum();

            // Backtracking line search along -step
            let mut t = 1.0;
            let mut accepted = false;
            for _ in 0..MAX_HALVINGS {
                let w_new: Vec<f64> = (0..p).map(|j| w[j] - t * step[(j, 0)]).collect();
                let b_new = b - t * step[(p, 0)];
                let candidate = self.objective(x, y, &w_new, b_new);
                if candidate.is_finite() && candidate <= objective - ARMIJO * t * slope {
                    w = w_new;
                    b = b_new;
                    objective = candidate;
                    accepted = true;
                    break;
                }
                t *= 0.5;
            }

            n_iter += 1;
            if !accepted {
                break;
            }
        }

        Ok(FittedLogistic {
            coefficients: w,
            intercept: b,
            c: self.c,
            n_iter,
            converged,
        })
    }
}

impl Predictor for FittedLogistic {
    fn predict_proba(&self, x: &Mat<f64>) -> Result<Vec<f64>, ModelError> {
        if x.ncols() != self.coefficients.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.coefficients.len(),
                got: x.ncols(),
            });
        }
        Ok(LogisticRegression::decision(x, &self.coefficients, self.intercept)
            .into_iter()
            .map(sigmoid)
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Estimator selection
// ---------------------------------------------------------------------------

/// Unfitted estimator choice for a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Estimator {
    MostFrequent,
    Logistic(LogisticRegression),
}

/// Fitted counterpart of [`Estimator`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FittedEstimator {
    MostFrequent(MostFrequentClassifier),
    Logistic(FittedLogistic),
}

impl Estimator {
    pub fn fit(&self, x: &Mat<f64>, y: &[u8]) -> Result<FittedEstimator, ModelError> {
        match self {
            Estimator::MostFrequent => MostFrequentClassifier::fit(x, y).map(FittedEstimator::MostFrequent),
            Estimator::Logistic(lr) => lr.fit(x, y).map(FittedEstimator::Logistic),
        }
    }
}

impl FittedEstimator {
    /// Whether the solver met its tolerance (always true for the baseline)
    pub fn converged(&self) -> bool {
        match self {
            FittedEstimator::MostFrequent(_) => true,
            FittedEstimator::Logistic(fitted) => fitted.converged,
        }
    }
}

impl Predictor for FittedEstimator {
    fn predict_proba(&self, x: &Mat<f64>) -> Result<Vec<f64>, ModelError> {
        match self {
            FittedEstimator::MostFrequent(m) => m.predict_proba(x),
            FittedEstimator::Logistic(m) => m.predict_proba(x),
        }
    }

    fn predict(&self, x: &Mat<f64>) -> Result<Vec<u8>, ModelError> {
        match self {
            FittedEstimator::MostFrequent(m) => m.predict(x),
            FittedEstimator::Logistic(m) => m.predict(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One informative indicator plus an always-on column
    fn toy_data() -> (Mat<f64>, Vec<u8>) {
        let rows: Vec<(f64, u8)> = vec![
            (1.0, 1), (1.0, 1), (1.0, 1), (1.0, 0),
            (0.0, 0), (0.0, 0), (0.0, 0), (0.0, 1),
        ];
        let x = Mat::<f64>::from_fn(rows.len(), 2, |i, j| if j == 0 { rows[i].0 } else { 1.0 });
        let y = rows.iter().map(|r| r.1).collect();
        (x, y)
    }

    #[test]
    fn test_sigmoid_and_softplus_are_stable() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(softplus(800.0).is_finite());
        assert!((softplus(0.0) - 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_logistic_learns_informative_feature() {
        let (x, y) = toy_data();
        let fitted = LogisticRegression::default().fit(&x, &y).unwrap();

        assert!(fitted.converged);
        assert!(fitted.coefficients[0] > 0.0);

        let proba = fitted.predict_proba(&x).unwrap();
        assert!(proba[0] > 0.5);
        assert!(proba[4] < 0.5);
        assert_eq!(fitted.predict(&x).unwrap(), vec![1, 1, 1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_gradient_vanishes_at_solution() {
        let (x, y) = toy_data();
        let model = LogisticRegression::default();
        let fitted = model.fit(&x, &y).unwrap();

        // Perturbing the solution never lowers the objective
        let base = model.objective(&x, &y, &fitted.coefficients, fitted.intercept);
        for delta in [-1e-3, 1e-3] {
            let w: Vec<f64> = fitted.coefficients.iter().map(|v| v + delta).collect();
            assert!(model.objective(&x, &y, &w, fitted.intercept) >= base - 1e-9);
        }
    }

    #[test]
    fn test_stronger_regularization_shrinks_coefficients() {
        let (x, y) = toy_data();
        let loose = LogisticRegression::default().with_c(100.0).fit(&x, &y).unwrap();
        let tight = LogisticRegression::default().with_c(0.001).fit(&x, &y).unwrap();

        let norm = |w: &[f64]| w.iter().map(|v| v * v).sum::<f64>();
        assert!(norm(&tight.coefficients) < norm(&loose.coefficients));
    }

    #[test]
    fn test_invalid_c_rejected() {
        let (x, y) = toy_data();
        for c in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = LogisticRegression::default().with_c(c).fit(&x, &y).unwrap_err();
            assert!(matches!(err, ModelError::InvalidRegularization { .. }));
        }
    }

    #[test]
    fn test_single_class_rejected() {
        let x = Mat::<f64>::from_fn(3, 1, |_, _| 1.0);
        let err = LogisticRegression::default().fit(&x, &[1, 1, 1]).unwrap_err();
        assert!(matches!(err, ModelError::SingleClass { class: 1 }));
    }

    #[test]
    fn test_dimension_mismatch_on_predict() {
        let (x, y) = toy_data();
        let fitted = LogisticRegression::default().fit(&x, &y).unwrap();
        let wrong = Mat::<f64>::zeros(2, 5);
        assert!(matches!(
            fitted.predict_proba(&wrong),
            Err(ModelError::DimensionMismatch { expected: 2, got: 5 })
        ));
    }

    #[test]
    fn test_most_frequent_tie_goes_to_zero() {
        let x = Mat::<f64>::zeros(4, 1);
        let fitted = MostFrequentClassifier::fit(&x, &[0, 1, 1, 0]).unwrap();
        assert_eq!(fitted.majority, 0);
        assert_eq!(fitted.predict(&x).unwrap(), vec![0; 4]);
        assert_eq!(fitted.predict_proba(&x).unwrap(), vec![0.5; 4]);
    }

    #[test]
    fn test_estimator_dispatch() {
        let (x, y) = toy_data();
        let fitted = Estimator::Logistic(LogisticRegression::default()).fit(&x, &y).unwrap();
        assert!(fitted.converged());
        assert_eq!(fitted.predict(&x).unwrap().len(), 8);
    }
}
