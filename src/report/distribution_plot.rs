//! Per-feature histogram grids rendered to PNG with plotters

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};

use crate::pipeline::{FeatureHistogram, DEFAULT_MAX_BINS};
use crate::utils::print_warning;

/// Family name the loaded TrueType font is registered under
const FONT_FAMILY: &str = "sans-serif";

/// Y axis title shared by every panel
pub const Y_AXIS_TITLE: &str = "Number of collisions";

/// Fonts tried when no font is configured
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Font registered for this process, if any. plotters keeps one registry.
static REGISTERED_FONT: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Rendering settings for a histogram grid
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub max_bins: usize,
    pub panel_width: u32,
    pub panel_height: u32,
    /// TrueType font for titles and axis labels.
    ///
    /// Only the first font registered in a process takes effect; a later
    /// config naming a different file gets a warning and the earlier font.
    pub font: Option<PathBuf>,
    pub color: RGBColor,
    pub opacity: f64,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            max_bins: DEFAULT_MAX_BINS,
            panel_width: 900,
            panel_height: 220,
            font: None,
            color: RGBColor(31, 119, 180),
            opacity: 0.7,
        }
    }
}

impl PlotConfig {
    pub fn with_font(mut self, font: Option<PathBuf>) -> Self {
        self.font = font;
        self
    }

    pub fn with_max_bins(mut self, max_bins: usize) -> Self {
        self.max_bins = max_bins;
        self
    }
}

/// Load a font for text rendering. Returns the font path in use, or `None`
/// when no candidate could be read and registered.
pub fn prepare_font(config: &PlotConfig) -> Option<&'static Path> {
    let registered = REGISTERED_FONT
        .get_or_init(|| {
            let candidates: Vec<PathBuf> = match &config.font {
                Some(path) => vec![path.clone()],
                None => SYSTEM_FONTS.iter().map(PathBuf::from).collect(),
            };

            candidates.into_iter().find(|path| {
                let Ok(bytes) = std::fs::read(path) else {
                    return false;
                };
                // Registered fonts must live for the rest of the process.
                let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
                register_font(FONT_FAMILY, FontStyle::Normal, bytes).is_ok()
            })
        })
        .as_deref();

    if let Some(requested) = ignored_font(config.font.as_deref(), registered) {
        print_warning(&format!(
            "Font {} not used; active font for this run: {}",
            requested.display(),
            registered.map_or_else(|| "none".to_string(), |p| p.display().to_string())
        ));
    }

    registered
}

/// The requested font when it differs from the one already registered.
fn ignored_font<'a>(requested: Option<&'a Path>, registered: Option<&Path>) -> Option<&'a Path> {
    requested.filter(|path| Some(*path) != registered)
}

/// Render one panel per histogram, stacked vertically, into a PNG at `path`.
///
/// Returns whether text (title, captions, axes) was drawn.
pub fn render_distribution_grid(
    path: &Path,
    title: &str,
    histograms: &[FeatureHistogram],
    config: &PlotConfig,
) -> Result<bool> {
    if histograms.is_empty() {
        anyhow::bail!("No feature histograms to render for '{}'", title);
    }

    let with_text = prepare_font(config).is_some();
    let title_height = if with_text { 60 } else { 0 };
    let height = config.panel_height * histograms.len() as u32 + title_height;

    let root = BitMapBackend::new(path, (config.panel_width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| anyhow::anyhow!("{}", e))?;

    let body = if with_text {
        root.titled(title, (FONT_FAMILY, 32))
            .map_err(|e| anyhow::anyhow!("{}", e))?
    } else {
        root.clone()
    };

    let fill = config.color.mix(config.opacity).filled();
    let panels = body.split_evenly((histograms.len(), 1));

    for (panel, hist) in panels.iter().zip(histograms) {
        let (x0, x1) = hist.x_range();
        // Independent vertical scale per panel
        let y_max = (hist.max_count().max(1) as f64) * 1.05;

        let mut builder = ChartBuilder::on(panel);
        builder.margin(8);
        if with_text {
            builder
                .caption(&hist.feature, (FONT_FAMILY, 18))
                .x_label_area_size(28)
                .y_label_area_size(60);
        }

        let mut chart = builder
            .build_cartesian_2d(x0..x1, 0f64..y_max)
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        if with_text {
            chart
                .configure_mesh()
                .disable_x_mesh()
                .y_desc(Y_AXIS_TITLE)
                .y_labels(4)
                .x_labels(10)
                .label_style((FONT_FAMILY, 12))
                .draw()
                .map_err(|e| anyhow::anyhow!("{}", e))?;
        }

        chart
            .draw_series(hist.bins.iter().map(|bin| {
                Rectangle::new([(bin.lower, 0.0), (bin.upper, bin.count as f64)], fill)
            }))
            .map_err(|e| anyhow::anyhow!("{}", e))?;
    }

    root.present()
        .map_err(|e| anyhow::anyhow!("{}", e))
        .with_context(|| format!("Failed to write plot: {}", path.display()))?;

    Ok(with_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::compute_bins;
    use tempfile::TempDir;

    fn histogram(feature: &str, values: &[f64]) -> FeatureHistogram {
        FeatureHistogram {
            feature: feature.to_string(),
            bins: compute_bins(values, DEFAULT_MAX_BINS),
            skipped: 0,
        }
    }

    #[test]
    fn test_renders_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("grid.png");
        let hists = vec![
            histogram("C_MNTH", &[1.0, 2.0, 2.0, 3.0, 12.0]),
            histogram("P_AGE", &[18.0, 25.0, 40.0, 40.0, 77.0]),
        ];

        render_distribution_grid(&path, "Fatality", &hists, &PlotConfig::default()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_empty_panels_still_render() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.png");
        let hists = vec![histogram("C_WTHR", &[])];

        render_distribution_grid(&path, "No fatality", &hists, &PlotConfig::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_ignored_font_only_when_request_differs() {
        let dejavu = Path::new("/fonts/DejaVuSans.ttf");
        let arial = Path::new("/fonts/Arial.ttf");

        assert_eq!(ignored_font(None, Some(dejavu)), None);
        assert_eq!(ignored_font(Some(dejavu), Some(dejavu)), None);
        assert_eq!(ignored_font(Some(arial), Some(dejavu)), Some(arial));
        assert_eq!(ignored_font(Some(arial), None), Some(arial));
    }

    #[test]
    fn test_no_histograms_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("none.png");
        assert!(render_distribution_grid(&path, "x", &[], &PlotConfig::default()).is_err());
    }
}
