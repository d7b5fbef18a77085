//! Training run summary report

use std::path::PathBuf;
use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

/// Summary of a training run
#[derive(Debug, Default)]
pub struct TrainingSummary {
    pub rows: usize,
    pub ignored_rows: usize,
    pub features: usize,
    pub negatives: usize,
    pub positives: usize,
    pub folds: usize,
    /// (negative, positive) counts the final model was fitted on
    pub balanced_counts: (usize, usize),
    pub best_c: f64,
    pub best_score: f64,
    pub unconverged_fits: usize,
    pub artifacts: Vec<PathBuf>,
    pub load_time: Duration,
    pub evaluation_time: Duration,
    pub search_time: Duration,
    pub save_time: Duration,
}

impl TrainingSummary {
    pub fn new(rows: usize, features: usize, negatives: usize, positives: usize) -> Self {
        Self {
            rows,
            features,
            negatives,
            positives,
            ..Default::default()
        }
    }

    pub fn set_load_time(&mut self, elapsed: Duration) {
        self.load_time = elapsed;
    }

    pub fn set_evaluation_time(&mut self, elapsed: Duration) {
        self.evaluation_time = elapsed;
    }

    pub fn set_search_time(&mut self, elapsed: Duration) {
        self.search_time = elapsed;
    }

    pub fn set_save_time(&mut self, elapsed: Duration) {
        self.save_time = elapsed;
    }

    pub fn add_artifact(&mut self, path: PathBuf) {
        self.artifacts.push(path);
    }

    /// Share of positive rows before resampling, in percent
    pub fn positive_pct(&self) -> f64 {
        if self.rows == 0 {
            0.0
        } else {
            self.positives as f64 / self.rows as f64 * 100.0
        }
    }

    pub fn total_time(&self) -> Duration {
        self.load_time + self.evaluation_time + self.search_time + self.save_time
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("TRAINING SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("📁 Rows"), Cell::new(self.rows)]);
        if self.ignored_rows > 0 {
            table.add_row(vec![
                Cell::new("🗑️  Ignored (unmapped label)"),
                Cell::new(self.ignored_rows).fg(Color::Yellow),
            ]);
        }
        table.add_row(vec![Cell::new("🧮 Features"), Cell::new(self.features)]);
        table.add_row(vec![
            Cell::new("⚖️  Class balance (0 / 1)"),
            Cell::new(format!(
                "{} / {} ({:.1}% positive)",
                self.negatives,
                self.positives,
                self.positive_pct()
            )),
        ]);
        table.add_row(vec![
            Cell::new("🔻 Undersampled (0 / 1)"),
            Cell::new(format!("{} / {}", self.balanced_counts.0, self.balanced_counts.1)),
        ]);
        table.add_row(vec![Cell::new("🔁 Folds"), Cell::new(self.folds)]);
        table.add_row(vec![
            Cell::new("🎯 Best C"),
            Cell::new(format!("{:.4}", self.best_c))
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("📈 Best CV F1"),
            Cell::new(format!("{:.3}", self.best_score)).fg(Color::Green),
        ]);
        table.add_row(vec![
            Cell::new("⚠️  Unconverged fits"),
            Cell::new(self.unconverged_fits).fg(if self.unconverged_fits == 0 {
                Color::White
            } else {
                Color::Red
            }),
        ]);
        table.add_row(vec![
            Cell::new("⏱️  Total time"),
            Cell::new(format_duration(self.total_time())),
        ]);

        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        if !self.artifacts.is_empty() {
            println!();
            println!(
                "    {} {}",
                style("📝").cyan(),
                style("ARTIFACTS").white().bold()
            );
            println!("    {}", style("─".repeat(50)).dim());
            for path in &self.artifacts {
                println!("        {} {}", style("•").dim(), path.display());
            }
        }
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_pct() {
        let summary = TrainingSummary::new(1000, 6, 950, 50);
        assert!((summary.positive_pct() - 5.0).abs() < 1e-12);
        assert_eq!(TrainingSummary::default().positive_pct(), 0.0);
    }

    #[test]
    fn test_total_time_sums_steps() {
        let mut summary = TrainingSummary::default();
        summary.set_load_time(Duration::from_millis(10));
        summary.set_evaluation_time(Duration::from_millis(20));
        summary.set_search_time(Duration::from_millis(30));
        summary.set_save_time(Duration::from_millis(40));
        assert_eq!(summary.total_time(), Duration::from_millis(100));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.50s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }
}
