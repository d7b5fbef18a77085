//! Categorical feature frame
//!
//! Every feature column is coerced to text and interned into a sorted
//! per-column vocabulary, so the encoder and the resampler work on compact
//! `u32` codes instead of strings.

use anyhow::{Context, Result};
use polars::prelude::*;

/// Category used for null cells after text coercion
pub const MISSING_CATEGORY: &str = "missing";

/// Column-major table of categorical codes
#[derive(Debug, Clone)]
pub struct CategoricalFrame {
    names: Vec<String>,
    vocabularies: Vec<Vec<String>>,
    codes: Vec<Vec<u32>>,
    n_rows: usize,
}

impl CategoricalFrame {
    /// Build a frame from raw text columns (`None` becomes [`MISSING_CATEGORY`]).
    pub fn from_columns(columns: Vec<(String, Vec<Option<String>>)>) -> Result<Self> {
        let n_rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);

        let mut names = Vec::with_capacity(columns.len());
        let mut vocabularies = Vec::with_capacity(columns.len());
        let mut codes = Vec::with_capacity(columns.len());

        for (name, values) in columns {
            if values.len() != n_rows {
                anyhow::bail!(
                    "Column '{}' has {} rows, expected {}",
                    name,
                    values.len(),
                    n_rows
                );
            }

            let texts: Vec<String> = values
                .into_iter()
                .map(|v| v.unwrap_or_else(|| MISSING_CATEGORY.to_string()))
                .collect();

            let mut vocabulary = texts.clone();
            vocabulary.sort();
            vocabulary.dedup();

            let column_codes: Vec<u32> = texts
                .iter()
                .map(|t| {
                    // Present by construction
                    vocabulary.binary_search(t).unwrap_or(0) as u32
                })
                .collect();

            names.push(name);
            vocabularies.push(vocabulary);
            codes.push(column_codes);
        }

        Ok(Self {
            names,
            vocabularies,
            codes,
            n_rows,
        })
    }

    /// Build a frame from the named columns of a DataFrame, casting each to String.
    pub fn from_dataframe(df: &DataFrame, columns: &[String]) -> Result<Self> {
        let mut raw = Vec::with_capacity(columns.len());
        for name in columns {
            let values = column_as_text(df, name)?;
            raw.push((name.clone(), values));
        }
        Self::from_columns(raw)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_features(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Sorted distinct values of a column
    pub fn vocabulary(&self, feature: usize) -> &[String] {
        &self.vocabularies[feature]
    }

    pub fn codes(&self, feature: usize) -> &[u32] {
        &self.codes[feature]
    }

    /// Text value of a single cell
    pub fn value(&self, row: usize, feature: usize) -> &str {
        let code = self.codes[feature][row] as usize;
        &self.vocabularies[feature][code]
    }

    /// Keep only the given rows, in the given order. Vocabularies are retained.
    pub fn take_rows(&self, rows: &[usize]) -> Self {
        let codes = self
            .codes
            .iter()
            .map(|col| rows.iter().map(|&r| col[r]).collect())
            .collect();

        Self {
            names: self.names.clone(),
            vocabularies: self.vocabularies.clone(),
            codes,
            n_rows: rows.len(),
        }
    }

    /// Position of a column by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

/// Read a column as optional strings, regardless of its inferred dtype.
pub fn column_as_text(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .with_context(|| format!("Column '{}' not found", name))?;
    let cast = column
        .cast(&DataType::String)
        .with_context(|| format!("Failed to convert column '{}' to text", name))?;

    let values = cast
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(|s| s.to_string())).collect()
    }

    #[test]
    fn test_vocabulary_is_sorted_and_unique() {
        let frame = CategoricalFrame::from_columns(vec![(
            "V_TYPE".to_string(),
            owned(&[Some("14"), Some("01"), Some("14"), None]),
        )])
        .unwrap();

        assert_eq!(frame.vocabulary(0), &["01", "14", "missing"]);
        assert_eq!(frame.codes(0), &[1, 0, 1, 2]);
        assert_eq!(frame.value(3, 0), MISSING_CATEGORY);
    }

    #[test]
    fn test_take_rows_preserves_values() {
        let frame = CategoricalFrame::from_columns(vec![
            ("a".to_string(), owned(&[Some("x"), Some("y"), Some("z")])),
            ("b".to_string(), owned(&[Some("1"), Some("2"), Some("3")])),
        ])
        .unwrap();

        let subset = frame.take_rows(&[2, 0]);
        assert_eq!(subset.n_rows(), 2);
        assert_eq!(subset.value(0, 0), "z");
        assert_eq!(subset.value(1, 1), "1");
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let result = CategoricalFrame::from_columns(vec![
            ("a".to_string(), owned(&[Some("x"), Some("y")])),
            ("b".to_string(), owned(&[Some("1")])),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_dataframe_casts_numbers_to_text() {
        let df = df! {
            "C_MNTH" => [1i64, 12, 1],
            "P_SEX" => ["M", "F", "missing"],
        }
        .unwrap();

        let frame =
            CategoricalFrame::from_dataframe(&df, &["C_MNTH".to_string(), "P_SEX".to_string()])
                .unwrap();

        assert_eq!(frame.value(1, 0), "12");
        assert_eq!(frame.vocabulary(1), &["F", "M", "missing"]);
    }
}
