//! Recoding of the person-sex field for plotting

use anyhow::{Context, Result};
use polars::prelude::*;

use super::frame::{column_as_text, MISSING_CATEGORY};

/// Map a sex code to its numeric form: `M` -> `1`, `F` -> `0`, `missing` unchanged.
pub fn recode_sex_value(value: &str) -> Option<&'static str> {
    match value {
        "M" => Some("1"),
        "F" => Some("0"),
        MISSING_CATEGORY => Some(MISSING_CATEGORY),
        _ => None,
    }
}

/// Recode a sex column into `{1, 0, missing}`. Null cells stay null.
///
/// Any other code is an error naming the first offending row.
pub fn recode_sex(values: &[Option<String>]) -> Result<Vec<Option<String>>> {
    values
        .iter()
        .enumerate()
        .map(|(row, value)| match value {
            None => Ok(None),
            Some(code) => recode_sex_value(code)
                .map(|v| Some(v.to_string()))
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Unexpected sex code '{}' at row {} (expected M, F or {})",
                        code,
                        row,
                        MISSING_CATEGORY
                    )
                }),
        })
        .collect()
}

/// Replace `column` in the DataFrame with its recoded values.
pub fn recode_sex_column(df: &mut DataFrame, column: &str) -> Result<()> {
    let values = column_as_text(df, column)?;
    let recoded = recode_sex(&values)?;

    df.with_column(Column::new(column.into(), recoded))
        .with_context(|| format!("Failed to replace column '{}'", column))?;

    Ok(())
}
