//! Model artifact serialization via bincode.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::classifier::FittedPipeline;
use super::error::ModelError;
use super::target::TargetMapping;

/// Current binary format version
const FORMAT_VERSION: u32 = 1;

/// Everything needed to score new rows, in a versioned envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Format version for compatibility checking
    pub format_version: u32,
    /// Crate version that wrote the artifact
    pub writer_version: String,
    /// Label column the model predicts
    pub label: String,
    /// Label mapping used at training time, if the label was not 0/1
    pub mapping: Option<TargetMapping>,
    /// Index column carried through to predictions
    pub index_column: Option<String>,
    /// Fitted encoder and estimator
    pub pipeline: FittedPipeline,
}

impl ModelArtifact {
    pub fn new(
        pipeline: FittedPipeline,
        label: &str,
        mapping: Option<TargetMapping>,
        index_column: Option<&str>,
    ) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            writer_version: env!("CARGO_PKG_VERSION").to_string(),
            label: label.to_string(),
            mapping,
            index_column: index_column.map(str::to_string),
            pipeline,
        }
    }

    /// Feature columns the model reads
    pub fn feature_names(&self) -> &[String] {
        &self.pipeline.encoder.feature_names
    }

    /// Write the artifact; returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ModelError::SerializeModel`] | bincode encoding failed |
    /// | [`ModelError::WriteModel`] | file write failed |
    pub fn save(&self, path: impl AsRef<Path>) -> Result<usize, ModelError> {
        let path = path.as_ref();

        let bytes = bincode::serialize(self).map_err(|e| ModelError::SerializeModel { source: e })?;

        std::fs::write(path, &bytes).map_err(|e| ModelError::WriteModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(bytes.len())
    }

    /// Read an artifact, rejecting other format versions.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ModelError::ReadModel`] | file read failed |
    /// | [`ModelError::DeserializeModel`] | bincode decoding failed |
    /// | [`ModelError::IncompatibleModelVersion`] | format version mismatch |
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();

        let bytes = std::fs::read(path).map_err(|e| ModelError::ReadModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        // The version is the leading u32 of the envelope.
        let version: u32 =
            bincode::deserialize(&bytes).map_err(|e| ModelError::DeserializeModel {
                path: path.to_path_buf(),
                source: e,
            })?;
        if version != FORMAT_VERSION {
            return Err(ModelError::IncompatibleModelVersion {
                expected: FORMAT_VERSION,
                found: version,
                path: path.to_path_buf(),
            });
        }

        bincode::deserialize(&bytes).map_err(|e| ModelError::DeserializeModel {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::classifier::ClassifierPipeline;
    use crate::pipeline::frame::CategoricalFrame;
    use crate::pipeline::model::{Estimator, LogisticRegression};
    use tempfile::TempDir;

    fn fitted() -> FittedPipeline {
        let values = ["01", "14", "01", "14", "05", "01"];
        let labels = vec![0u8, 1, 0, 1, 1, 0];
        let frame = CategoricalFrame::from_columns(vec![(
            "V_TYPE".to_string(),
            values.iter().map(|v| Some(v.to_string())).collect(),
        )])
        .unwrap();
        let rows: Vec<usize> = (0..labels.len()).collect();
        ClassifierPipeline::plain(Estimator::Logistic(LogisticRegression::default()))
            .fit(&frame, &labels, &rows)
            .unwrap()
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lr_model.rds");

        let artifact = ModelArtifact::new(fitted(), "FATALITY", None, Some("index"));
        let written = artifact.save(&path).unwrap();

        assert!(written > 0);
        let loaded = ModelArtifact::load(&path).unwrap();
        assert_eq!(loaded, artifact);
        assert_eq!(loaded.feature_names(), &["V_TYPE"]);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lr_model.rds");

        let mut artifact = ModelArtifact::new(fitted(), "FATALITY", None, None);
        artifact.format_version = FORMAT_VERSION + 1;
        artifact.save(&path).unwrap();

        let err = ModelArtifact::load(&path).unwrap_err();
        assert!(matches!(err, ModelError::IncompatibleModelVersion { found, .. } if found == FORMAT_VERSION + 1));
    }

    #[test]
    fn test_missing_file() {
        let err = ModelArtifact::load("/nonexistent/lr_model.rds").unwrap_err();
        assert!(matches!(err, ModelError::ReadModel { .. }));
    }
}
