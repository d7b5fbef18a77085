//! Pipeline module - loading, preparation and the modelling steps

pub mod classifier;
pub mod crossval;
pub mod encoding;
pub mod error;
pub mod frame;
pub mod histogram;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod persist;
pub mod recode;
pub mod sampling;
pub mod search;
pub mod target;

pub use classifier::{ClassifierPipeline, FittedPipeline};
pub use crossval::{cross_validate, CvScores, StratifiedKFold, DEFAULT_FOLDS};
pub use encoding::OneHotEncoder;
pub use error::ModelError;
pub use frame::{CategoricalFrame, MISSING_CATEGORY};
pub use histogram::*;
pub use loader::*;
pub use metrics::{MeanStd, Scorer, SUBSET_SCORERS, TRAINING_SCORERS};
pub use model::{Estimator, FittedEstimator, LogisticRegression, Predictor, DEFAULT_MAX_ITER};
pub use persist::ModelArtifact;
pub use recode::*;
pub use sampling::{RandomUnderSampler, DEFAULT_SAMPLER_SEED};
pub use search::{RandomizedSearch, SearchResult, DEFAULT_N_ITER, DEFAULT_SEARCH_SEED};
pub use target::*;
