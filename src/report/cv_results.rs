//! Cross-validation results table (metric x model variant)

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use polars::prelude::*;

use crate::pipeline::{CvScores, MeanStd, Scorer};

/// Name of the index column in the written CSV
pub const METRIC_COLUMN: &str = "Scoring Metric";

/// Row label for a scorer, e.g. `test_f1`
pub fn metric_label(scorer: Scorer) -> String {
    format!("test_{}", scorer.name())
}

/// Formatted `mean (+/- std)` summaries, one column per model variant
#[derive(Debug, Clone)]
pub struct CvResultsTable {
    metrics: Vec<Scorer>,
    variants: Vec<(String, Vec<MeanStd>)>,
}

impl CvResultsTable {
    pub fn new(metrics: &[Scorer]) -> Self {
        Self {
            metrics: metrics.to_vec(),
            variants: Vec::new(),
        }
    }

    /// Add a column summarizing `scores` for every metric of the table.
    pub fn add_variant(&mut self, name: &str, scores: &CvScores) -> Result<()> {
        let summaries = self
            .metrics
            .iter()
            .map(|&m| {
                scores
                    .summary(m)
                    .with_context(|| format!("Variant '{}' was not scored with {}", name, m))
            })
            .collect::<Result<Vec<_>>>()?;

        self.variants.push((name.to_string(), summaries));
        Ok(())
    }

    pub fn metrics(&self) -> &[Scorer] {
        &self.metrics
    }

    pub fn variant_names(&self) -> Vec<&str> {
        self.variants.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Formatted cell for a metric/variant pair
    pub fn cell(&self, metric: Scorer, variant: &str) -> Option<String> {
        let row = self.metrics.iter().position(|&m| m == metric)?;
        self.variants
            .iter()
            .find(|(n, _)| n == variant)
            .map(|(_, summaries)| summaries[row].to_string())
    }

    /// Build the table as a DataFrame with string cells
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.variants.len() + 1);

        let labels: Vec<String> = self.metrics.iter().map(|&m| metric_label(m)).collect();
        columns.push(Column::new(METRIC_COLUMN.into(), labels));

        for (name, summaries) in &self.variants {
            let cells: Vec<String> = summaries.iter().map(|s| s.to_string()).collect();
            columns.push(Column::new(name.as_str().into(), cells));
        }

        DataFrame::new(columns).context("Failed to assemble CV results table")
    }

    /// Write the table as CSV
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut df = self.to_dataframe()?;
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        CsvWriter::new(&mut file)
            .finish(&mut df)
            .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        Ok(())
    }

    /// Print the table to the terminal
    pub fn display(&self) {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);

        let mut header = vec![Cell::new(METRIC_COLUMN).add_attribute(Attribute::Bold)];
        header.extend(
            self.variants
                .iter()
                .map(|(name, _)| Cell::new(name).add_attribute(Attribute::Bold)),
        );
        table.set_header(header);

        for (row, metric) in self.metrics.iter().enumerate() {
            // Highlight the best mean in each row
            let best = self
                .variants
                .iter()
                .map(|(_, s)| s[row].mean)
                .fold(f64::NEG_INFINITY, f64::max);

            let mut cells = vec![Cell::new(metric_label(*metric))];
            for (_, summaries) in &self.variants {
                let summary = summaries[row];
                let cell = Cell::new(summary.to_string());
                cells.push(if summary.mean == best {
                    cell.fg(Color::Green).add_attribute(Attribute::Bold)
                } else {
                    cell
                });
            }
            table.add_row(cells);
        }

        for line in table.to_string().lines() {
            println!("    {}", line);
        }
    }
}
