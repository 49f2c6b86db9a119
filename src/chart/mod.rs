//! Chart panels and the renderer seam.
//!
//! [`layout::build_panels`] turns a [`CatalogReport`](crate::pipeline::CatalogReport)
//! plus chart configuration into plain [`ChartPanel`]s with every key and
//! annotation already resolved to plot coordinates. Renderers only draw.

pub mod layout;
pub mod render;

pub use layout::{build_panels, key_position};
pub use render::SvgChartRenderer;

use crate::config::PanelLabels;
use crate::error::Result;

/// Annotation text plus the point its arrow targets, in plot coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedAnnotation {
    pub text: String,
    pub anchor: (f64, f64),
    pub text_pos: (f64, f64),
}

/// Shaded x-range, inclusive of the buckets at both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBand {
    pub start: f64,
    pub end: f64,
    pub color: (u8, u8, u8),
    pub label: Option<String>,
}

/// One plotted series with everything needed to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPanel {
    pub labels: PanelLabels,
    /// Canonical bucket keys, one per x position.
    pub keys: Vec<String>,
    pub tick_labels: Vec<String>,
    pub counts: Vec<usize>,
    pub annotations: Vec<PlacedAnnotation>,
    pub bands: Vec<PlacedBand>,
}

impl ChartPanel {
    /// Top of the y axis: room for the tallest point or annotation.
    pub fn y_max(&self) -> f64 {
        let tallest_count = self.counts.iter().copied().max().unwrap_or(0) as f64;
        let tallest = self
            .annotations
            .iter()
            .flat_map(|a| [a.anchor.1, a.text_pos.1])
            .fold(tallest_count, f64::max);

        (tallest * 1.1).max(1.0)
    }

    /// Plot points as (x index, count).
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &count)| (i as f64, count as f64))
            .collect()
    }
}

/// Terminal sink for chart panels.
pub trait ChartRenderer {
    fn render(&self, title: &str, panels: &[ChartPanel]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(counts: Vec<usize>, annotations: Vec<PlacedAnnotation>) -> ChartPanel {
        ChartPanel {
            labels: PanelLabels {
                x_label: "x".to_string(),
                y_label: "y".to_string(),
                legend: "legend".to_string(),
            },
            keys: counts.iter().map(|c| c.to_string()).collect(),
            tick_labels: counts.iter().map(|c| c.to_string()).collect(),
            counts,
            annotations,
            bands: Vec::new(),
        }
    }

    #[test]
    fn test_y_max_covers_counts() {
        let p = panel(vec![2, 10, 4], Vec::new());
        assert!((p.y_max() - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_y_max_covers_annotations() {
        let p = panel(
            vec![2, 10],
            vec![PlacedAnnotation {
                text: "note".to_string(),
                anchor: (1.0, 5.0),
                text_pos: (0.0, 400.0),
            }],
        );
        assert!((p.y_max() - 440.0).abs() < 1e-9);
    }

    #[test]
    fn test_y_max_of_empty_panel() {
        assert_eq!(panel(Vec::new(), Vec::new()).y_max(), 1.0);
    }

    #[test]
    fn test_points() {
        let p = panel(vec![3, 1], Vec::new());
        assert_eq!(p.points(), vec![(0.0, 3.0), (1.0, 1.0)]);
    }
}
