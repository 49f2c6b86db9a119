//! SVG line-chart rendering with plotters.

use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

use super::{ChartPanel, ChartRenderer};
use crate::config::ChartConfig;
use crate::error::{Error, Result};

/// Line colors, one per panel.
const PALETTE: [RGBColor; 4] = [
    RGBColor(31, 119, 180),  // Blue
    RGBColor(255, 127, 14),  // Orange
    RGBColor(44, 160, 44),   // Green
    RGBColor(214, 39, 40),   // Red
];

const FONT: &str = "sans-serif";
const MAX_X_LABELS: usize = 40;

/// Writes every panel, stacked vertically, into one SVG file.
#[derive(Debug, Clone)]
pub struct SvgChartRenderer {
    output: PathBuf,
    width: u32,
    height: u32,
}

impl SvgChartRenderer {
    pub fn new(output: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            output: output.into(),
            width,
            height,
        }
    }

    pub fn from_config(chart: &ChartConfig) -> Self {
        Self::new(&chart.output, chart.width, chart.height)
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, title: &str, panels: &[ChartPanel]) -> Result<()> {
        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let root = SVGBackend::new(&self.output, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(Error::render)?;
        let body = root.titled(title, (FONT, 24).into_font()).map_err(Error::render)?;

        if !panels.is_empty() {
            let areas = body.split_evenly((panels.len(), 1));
            for (i, (area, panel)) in areas.iter().zip(panels).enumerate() {
                draw_panel(area, panel, PALETTE[i % PALETTE.len()])?;
            }
        }

        root.present().map_err(Error::render)?;
        tracing::info!("Rendered {} chart panels to {}", panels.len(), self.output.display());
        Ok(())
    }
}

fn draw_panel(
    area: &DrawingArea<SVGBackend<'_>, Shift>,
    panel: &ChartPanel,
    color: RGBColor,
) -> Result<()> {
    if panel.counts.is_empty() {
        tracing::warn!("Series {:?} is empty; drawing bare axes", panel.labels.legend);
    }

    let n = panel.counts.len();
    let x_range = -0.5..(n.max(1) as f64 - 0.5);
    let y_max = panel.y_max();

    let mut chart = ChartBuilder::on(area)
        .margin(12)
        .x_label_area_size(70)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, 0.0..y_max)
        .map_err(Error::render)?;

    let ticks = &panel.tick_labels;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(panel.labels.x_label.as_str())
        .y_desc(panel.labels.y_label.as_str())
        .x_labels(n.clamp(1, MAX_X_LABELS))
        .x_label_formatter(&|x| tick_label(ticks, *x))
        .x_label_style((FONT, 12).into_font().transform(FontTransform::Rotate90))
        .draw()
        .map_err(Error::render)?;

    for band in &panel.bands {
        let (r, g, b) = band.color;
        let fill = RGBColor(r, g, b);
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(band.start, 0.0), (band.end, y_max)],
                fill.mix(0.2).filled(),
            )))
            .map_err(Error::render)?;

        if let Some(label) = &band.label {
            chart
                .draw_series(std::iter::once(Text::new(
                    label.clone(),
                    (band.start, y_max * 0.97),
                    (FONT, 12).into_font().color(&fill),
                )))
                .map_err(Error::render)?;
        }
    }

    let points = panel.points();
    chart
        .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
        .map_err(Error::render)?
        .label(panel.labels.legend.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));

    chart
        .draw_series(points.iter().map(|&p| Circle::new(p, 3, color.filled())))
        .map_err(Error::render)?;

    for annotation in &panel.annotations {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![annotation.text_pos, annotation.anchor],
                BLACK.stroke_width(1),
            )))
            .map_err(Error::render)?;
        chart
            .draw_series(std::iter::once(Circle::new(annotation.anchor, 4, BLACK.filled())))
            .map_err(Error::render)?;
        chart
            .draw_series(std::iter::once(Text::new(
                annotation.text.clone(),
                annotation.text_pos,
                (FONT, 14).into_font(),
            )))
            .map_err(Error::render)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(Error::render)?;

    Ok(())
}

/// Label for an x tick; blank unless the tick lands on a bucket.
fn tick_label(labels: &[String], x: f64) -> String {
    let nearest = x.round();
    if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
        return String::new();
    }
    labels.get(nearest as usize).cloned().unwrap_or_default()
}
