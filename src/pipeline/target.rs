//! Outcome label analysis and mapping
//!
//! The classifier needs a 0/1 label. A label that is already numeric 0/1 is
//! used as is; anything else (for example a severity code) must be mapped
//! through an explicit event/non-event pair.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Tolerance for floating point comparison when checking binary 0/1 values
const TOLERANCE: f64 = 1e-9;

/// Mapping from label values to event (1) / non-event (0)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMapping {
    /// Value that maps to 1 (event)
    pub event_value: String,
    /// Value that maps to 0 (non-event)
    pub non_event_value: String,
}

impl TargetMapping {
    pub fn new(event_value: impl Into<String>, non_event_value: impl Into<String>) -> Self {
        Self {
            event_value: event_value.into(),
            non_event_value: non_event_value.into(),
        }
    }

    /// Build a mapping from optional CLI values; both or neither must be given.
    pub fn from_pair(event: Option<&str>, non_event: Option<&str>) -> Result<Option<Self>> {
        match (event, non_event) {
            (Some(e), Some(n)) => {
                if e == n {
                    anyhow::bail!("Event and non-event values must differ (both are '{}')", e);
                }
                Ok(Some(Self::new(e, n)))
            }
            (None, None) => Ok(None),
            _ => anyhow::bail!("--event-value and --non-event-value must be given together"),
        }
    }
}

/// Result of analyzing a label column
#[derive(Debug, Clone)]
pub enum TargetAnalysis {
    /// Label is already binary 0/1
    AlreadyBinary,
    /// Label needs mapping - contains these unique values
    NeedsMapping { unique_values: Vec<String> },
}

/// Labels resolved to 0/1, with the rows that could not be mapped
#[derive(Debug, Clone)]
pub struct ResolvedLabels {
    /// One entry per input row; `None` for null or unmapped values
    pub values: Vec<Option<u8>>,
}

impl ResolvedLabels {
    /// Row indices with a usable label
    pub fn kept_rows(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|_| i))
            .collect()
    }

    /// Labels of the kept rows, in row order
    pub fn kept_labels(&self) -> Vec<u8> {
        self.values.iter().filter_map(|v| *v).collect()
    }

    pub fn ignored(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }
}

/// Analyze a label column to determine if it needs value mapping
pub fn analyze_target_column(df: &DataFrame, target: &str) -> Result<TargetAnalysis> {
    let target_col = df
        .column(target)
        .with_context(|| format!("Target column '{}' not found", target))?;

    if target_col.len() == 0 {
        anyhow::bail!("Target column '{}' is empty", target);
    }

    if target_col.null_count() == target_col.len() {
        anyhow::bail!("Target column '{}' contains only null values", target);
    }

    if target_col.dtype().is_primitive_numeric() {
        let float_col = target_col.cast(&DataType::Float64)?;
        let unique = float_col.unique()?;
        let unique_values: Vec<f64> = unique.f64()?.into_iter().flatten().collect();

        let is_binary = unique_values.len() <= 2
            && unique_values
                .iter()
                .all(|&v| v.abs() < TOLERANCE || (v - 1.0).abs() < TOLERANCE);

        if is_binary {
            return Ok(TargetAnalysis::AlreadyBinary);
        }
    }

    let mut unique_values: Vec<String> = column_to_string_vec(target_col)?
        .into_iter()
        .flatten()
        .collect();
    unique_values.sort();
    unique_values.dedup();

    if unique_values.is_empty() {
        anyhow::bail!("Target column '{}' has no valid (non-null) values", target);
    }

    Ok(TargetAnalysis::NeedsMapping { unique_values })
}

/// Resolve a label column to 0/1.
///
/// A binary numeric column is used directly. Otherwise `mapping` is required;
/// values matching neither side of it (and nulls) are left as `None`.
pub fn resolve_labels(
    df: &DataFrame,
    target: &str,
    mapping: Option<&TargetMapping>,
) -> Result<ResolvedLabels> {
    match (analyze_target_column(df, target)?, mapping) {
        (_, Some(mapping)) => {
            let values = create_target_mask(df, target, mapping)?;
            Ok(ResolvedLabels { values })
        }
        (TargetAnalysis::AlreadyBinary, None) => {
            let column = df.column(target)?.cast(&DataType::Float64)?;
            let values = column
                .f64()?
                .into_iter()
                .map(|v| v.map(|x| if (x - 1.0).abs() < TOLERANCE { 1 } else { 0 }))
                .collect();
            Ok(ResolvedLabels { values })
        }
        (TargetAnalysis::NeedsMapping { unique_values }, None) => {
            anyhow::bail!(
                "Target column '{}' is not binary 0/1 (values: {:?}). \
                 Use --event-value and --non-event-value to map it.",
                target,
                unique_values
            )
        }
    }
}

/// Create a binary label mask based on the mapping
///
/// Returns `Some(1)` for event values, `Some(0)` for non-event values and
/// `None` for anything else.
pub fn create_target_mask(
    df: &DataFrame,
    target: &str,
    mapping: &TargetMapping,
) -> Result<Vec<Option<u8>>> {
    let target_col = df
        .column(target)
        .with_context(|| format!("Target column '{}' not found", target))?;

    let string_values = column_to_string_vec(target_col)?;

    let mask = string_values
        .iter()
        .map(|v| match v {
            Some(s) if s == &mapping.event_value => Some(1),
            Some(s) if s == &mapping.non_event_value => Some(0),
            _ => None,
        })
        .collect();

    Ok(mask)
}

/// Convert a column to a Vec of Option<String> for comparison
fn column_to_string_vec(col: &Column) -> Result<Vec<Option<String>>> {
    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
            let cast = col.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            let cast = col.cast(&DataType::UInt64)?;
            cast.u64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::Float32 | DataType::Float64 => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.map(|n| format!("{}", n)))
                .collect()
        }
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_binary_int_target() {
        let df = df! {
            "FATALITY" => [0i32, 1, 0, 1, 0, 1],
            "C_WTHR" => ["1", "2", "1", "3", "1", "7"],
        }
        .unwrap();

        let result = analyze_target_column(&df, "FATALITY").unwrap();
        assert!(matches!(result, TargetAnalysis::AlreadyBinary));
    }

    #[test]
    fn test_analyze_severity_needs_mapping() {
        let df = df! {
            "P_ISEV" => [1i32, 2, 3, 1, 2, 3],
        }
        .unwrap();

        match analyze_target_column(&df, "P_ISEV").unwrap() {
            TargetAnalysis::NeedsMapping { unique_values } => {
                assert_eq!(unique_values, vec!["1", "2", "3"]);
            }
            _ => panic!("Expected NeedsMapping"),
        }
    }

    #[test]
    fn test_resolve_binary_labels_without_mapping() {
        let df = df! {
            "FATALITY" => [Some(0i64), Some(1), None, Some(0)],
        }
        .unwrap();

        let labels = resolve_labels(&df, "FATALITY", None).unwrap();
        assert_eq!(labels.values, vec![Some(0), Some(1), None, Some(0)]);
        assert_eq!(labels.kept_rows(), vec![0, 1, 3]);
        assert_eq!(labels.kept_labels(), vec![0, 1, 0]);
        assert_eq!(labels.ignored(), 1);
    }

    #[test]
    fn test_resolve_non_binary_requires_mapping() {
        let df = df! {
            "P_ISEV" => ["1", "2", "3"],
        }
        .unwrap();

        let err = resolve_labels(&df, "P_ISEV", None).unwrap_err();
        assert!(err.to_string().contains("--event-value"));

        let mapping = TargetMapping::new("3", "1");
        let labels = resolve_labels(&df, "P_ISEV", Some(&mapping)).unwrap();
        assert_eq!(labels.values, vec![Some(0), None, Some(1)]);
    }

    #[test]
    fn test_mapping_pair_validation() {
        assert!(TargetMapping::from_pair(None, None).unwrap().is_none());
        assert!(TargetMapping::from_pair(Some("3"), None).is_err());
        assert!(TargetMapping::from_pair(Some("3"), Some("3")).is_err());
        assert_eq!(
            TargetMapping::from_pair(Some("3"), Some("1")).unwrap(),
            Some(TargetMapping::new("3", "1"))
        );
    }

    #[test]
    fn test_analyze_all_null_target() {
        let df = df! {
            "FATALITY" => [None::<String>, None, None],
        }
        .unwrap();

        let result = analyze_target_column(&df, "FATALITY");
        assert!(result.unwrap_err().to_string().contains("null"));
    }
}
