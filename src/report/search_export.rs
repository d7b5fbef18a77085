//! Randomized search export functionality

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::search::{CandidateScore, RandomizedSearch, SearchResult};

/// Metadata about the search run
#[derive(Serialize)]
pub struct SearchMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    /// Crate version
    pub version: String,
    /// Input file path
    pub input_file: String,
    /// Label column name
    pub label_column: String,
    /// Number of cross-validation folds
    pub folds: usize,
    /// Rows used for the search
    pub rows: usize,
    /// Search configuration
    pub search: RandomizedSearch,
}

/// The selected candidate
#[derive(Serialize)]
pub struct SearchBest {
    pub c: f64,
    pub mean_score: f64,
    pub std_score: f64,
}

/// Complete search export with metadata
#[derive(Serialize)]
pub struct SearchExport<'a> {
    pub metadata: SearchMetadata,
    pub best: SearchBest,
    /// Candidates in sampling order
    pub candidates: &'a [CandidateScore],
}

/// Parameters describing the run, for the metadata block
pub struct SearchExportParams<'a> {
    pub input_file: &'a str,
    pub label_column: &'a str,
    pub folds: usize,
    pub rows: usize,
    pub search: RandomizedSearch,
}

/// Export the search results to a JSON file
pub fn export_search_results(
    result: &SearchResult,
    output_path: &Path,
    params: &SearchExportParams,
) -> Result<()> {
    let best = result.best();

    let export = SearchExport {
        metadata: SearchMetadata {
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: params.input_file.to_string(),
            label_column: params.label_column.to_string(),
            folds: params.folds,
            rows: params.rows,
            search: params.search,
        },
        best: SearchBest {
            c: best.c,
            mean_score: best.mean_score,
            std_score: best.std_score,
        },
        candidates: &result.candidates,
    };

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize search results to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write search results to {}", output_path.display()))?;

    Ok(())
}
