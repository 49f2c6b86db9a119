use std::fmt::Display;

use super::{ChartPanel, PlacedAnnotation, PlacedBand};
use crate::aggregate::{FocalLength, Series, YearMonth};
use crate::config::{
    AnnotationConfig, AnnotationTarget, ChartConfig, HighlightConfig, PanelLabels, TickFormat,
};
use crate::error::{Error, Result};
use crate::pipeline::CatalogReport;

/// One panel per series in the report, dates first.
pub fn build_panels(report: &CatalogReport, chart: &ChartConfig) -> Result<Vec<ChartPanel>> {
    let mut panels = vec![date_panel(&report.capture_months, chart)?];

    match &report.focal_lengths {
        Some(series) => panels.push(focal_panel(series, chart)?),
        None => {
            for annotation in targeting(&chart.annotations, AnnotationTarget::FocalLengths) {
                tracing::warn!(
                    "Annotation {:?} targets focal lengths, which this run does not plot",
                    annotation.text
                );
            }
        }
    }

    Ok(panels)
}

/// X position of `key` within the sorted domain `keys`.
///
/// A present key sits on its own index, a key between two neighbours sits
/// half-way between them, and keys beyond either end clamp to that end.
pub fn key_position<K: Ord>(keys: &[K], key: &K) -> f64 {
    match keys.binary_search(key) {
        Ok(i) => i as f64,
        Err(0) => 0.0,
        Err(i) if i >= keys.len() => keys.len() as f64 - 1.0,
        Err(i) => i as f64 - 0.5,
    }
}

fn date_panel(series: &Series<YearMonth>, chart: &ChartConfig) -> Result<ChartPanel> {
    let tick_labels = series
        .keys
        .iter()
        .map(|month| match chart.tick_format {
            TickFormat::YearMonth => month.to_string(),
            TickFormat::MonthYear => month.month_year_label(),
        })
        .collect();

    let annotations = place_annotations(
        &series.keys,
        targeting(&chart.annotations, AnnotationTarget::Dates),
        parse_month,
    )?;

    let mut bands = Vec::new();
    for highlight in &chart.highlights {
        if let Some(band) = place_band(&series.keys, highlight)? {
            bands.push(band);
        }
    }

    Ok(panel(series, chart.dates.clone(), tick_labels, annotations, bands))
}

fn focal_panel(series: &Series<FocalLength>, chart: &ChartConfig) -> Result<ChartPanel> {
    let tick_labels = series.keys.iter().map(|f| format!("{f}mm")).collect();

    let annotations = place_annotations(
        &series.keys,
        targeting(&chart.annotations, AnnotationTarget::FocalLengths),
        parse_focal_length,
    )?;

    Ok(panel(
        series,
        chart.focal_lengths.clone(),
        tick_labels,
        annotations,
        Vec::new(),
    ))
}

fn panel<K: Display>(
    series: &Series<K>,
    labels: PanelLabels,
    tick_labels: Vec<String>,
    annotations: Vec<PlacedAnnotation>,
    bands: Vec<PlacedBand>,
) -> ChartPanel {
    ChartPanel {
        labels,
        keys: series.keys.iter().map(ToString::to_string).collect(),
        tick_labels,
        counts: series.counts.clone(),
        annotations,
        bands,
    }
}

fn targeting(
    annotations: &[AnnotationConfig],
    target: AnnotationTarget,
) -> impl Iterator<Item = &AnnotationConfig> {
    annotations.iter().filter(move |a| a.series == target)
}

fn place_annotations<'a, K: Ord>(
    keys: &[K],
    annotations: impl Iterator<Item = &'a AnnotationConfig>,
    parse: fn(&str) -> std::result::Result<K, String>,
) -> Result<Vec<PlacedAnnotation>> {
    annotations
        .map(|a| -> Result<PlacedAnnotation> {
            let invalid = |e: String| Error::config(format!("annotation {:?}: {e}", a.text));
            let at = parse(&a.at).map_err(invalid)?;
            let text_at = parse(&a.text_at).map_err(invalid)?;
            Ok(PlacedAnnotation {
                text: a.text.clone(),
                anchor: (key_position(keys, &at), a.y),
                text_pos: (key_position(keys, &text_at), a.text_y),
            })
        })
        .collect()
}

fn place_band(keys: &[YearMonth], highlight: &HighlightConfig) -> Result<Option<PlacedBand>> {
    let invalid = |e: String| Error::config(format!("highlight {}..{}: {e}", highlight.start, highlight.end));
    let start = parse_month(&highlight.start).map_err(invalid)?;
    let end = parse_month(&highlight.end).map_err(invalid)?;
    if start > end {
        return Err(invalid("start is after end".to_string()));
    }
    let color = parse_hex_color(&highlight.color).map_err(invalid)?;

    let first = keys.partition_point(|k| *k < start);
    let past_last = keys.partition_point(|k| *k <= end);
    if first >= past_last {
        tracing::debug!("Highlight {}..{} covers no plotted month", start, end);
        return Ok(None);
    }

    Ok(Some(PlacedBand {
        start: first as f64 - 0.5,
        end: past_last as f64 - 0.5,
        color,
        label: highlight.label.clone(),
    }))
}

fn parse_month(s: &str) -> std::result::Result<YearMonth, String> {
    s.trim().parse()
}

fn parse_focal_length(s: &str) -> std::result::Result<FocalLength, String> {
    let s = s.trim();
    s.trim_end_matches("mm")
        .trim()
        .parse::<f64>()
        .map(FocalLength::new)
        .map_err(|_| format!("{s:?} is not a focal length"))
}

/// `#rrggbb` to an RGB triple.
pub(crate) fn parse_hex_color(s: &str) -> std::result::Result<(u8, u8, u8), String> {
    let hex = s
        .strip_prefix('#')
        .filter(|hex| hex.len() == 6 && hex.is_ascii())
        .ok_or_else(|| format!("{s:?} is not a #rrggbb color"))?;

    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| format!("{s:?} is not a #rrggbb color"))
    };
    Ok((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn months() -> Series<YearMonth> {
        Series {
            keys: vec![ym(2013, 11), ym(2014, 2), ym(2015, 8), ym(2015, 9)],
            counts: vec![12, 30, 154, 80],
        }
    }

    fn report(focal: Option<Series<FocalLength>>) -> CatalogReport {
        CatalogReport {
            capture_months: months(),
            focal_lengths: focal,
            skipped_capture_times: 0,
        }
    }

    #[test]
    fn test_key_position() {
        let keys = months().keys;
        assert_eq!(key_position(&keys, &ym(2015, 8)), 2.0);
        assert_eq!(key_position(&keys, &ym(2013, 12)), 0.5);
        assert_eq!(key_position(&keys, &ym(2010, 1)), 0.0);
        assert_eq!(key_position(&keys, &ym(2020, 1)), 3.0);
        assert_eq!(key_position::<YearMonth>(&[], &ym(2020, 1)), 0.0);
    }

    #[test]
    fn test_default_annotation_is_placed() {
        let panels = build_panels(&report(None), &ChartConfig::default()).unwrap();
        assert_eq!(panels.len(), 1);

        let annotation = &panels[0].annotations[0];
        assert_eq!(annotation.text, "Intro Photo Class & New Camera");
        assert_eq!(annotation.anchor, (2.0, 154.0));
        assert_eq!(annotation.text_pos, (0.5, 400.0));
    }

    #[test]
    fn test_tick_formats() {
        let mut chart = ChartConfig::default();
        let panels = build_panels(&report(None), &chart).unwrap();
        assert_eq!(panels[0].keys[0], "2013-11");
        assert_eq!(panels[0].tick_labels[0], "2013-11");

        chart.tick_format = TickFormat::MonthYear;
        let panels = build_panels(&report(None), &chart).unwrap();
        assert_eq!(panels[0].keys[0], "2013-11");
        assert_eq!(panels[0].tick_labels[0], "Nov-2013");
    }

    #[test]
    fn test_focal_panel() {
        let focal = Series {
            keys: vec![FocalLength::new(35.0), FocalLength::new(50.0)],
            counts: vec![2, 1],
        };
        let mut chart = ChartConfig::default();
        chart.annotations.push(AnnotationConfig {
            text: "Nifty fifty".to_string(),
            at: "50mm".to_string(),
            y: 1.0,
            text_at: "35".to_string(),
            text_y: 3.0,
            series: AnnotationTarget::FocalLengths,
        });

        let panels = build_panels(&report(Some(focal)), &chart).unwrap();
        assert_eq!(panels.len(), 2);
        assert_eq!(panels[1].keys, vec!["35", "50"]);
        assert_eq!(panels[1].tick_labels, vec!["35mm", "50mm"]);
        assert_eq!(panels[1].annotations.len(), 1);
        assert_eq!(panels[1].annotations[0].anchor, (1.0, 1.0));
        assert_eq!(panels[0].annotations.len(), 1);
    }

    #[test]
    fn test_highlight_band() {
        let mut chart = ChartConfig::default();
        chart.highlights.push(HighlightConfig {
            start: "2014-01".to_string(),
            end: "2015-08".to_string(),
            color: "#3498db".to_string(),
            label: None,
        });
        chart.highlights.push(HighlightConfig {
            start: "2020-01".to_string(),
            end: "2020-12".to_string(),
            color: "#3498db".to_string(),
            label: None,
        });

        let panels = build_panels(&report(None), &chart).unwrap();
        assert_eq!(panels[0].bands.len(), 1);
        let band = &panels[0].bands[0];
        assert_eq!((band.start, band.end), (0.5, 2.5));
        assert_eq!(band.color, (0x34, 0x98, 0xdb));
    }

    #[test]
    fn test_bad_annotation_key_is_config_error() {
        let mut chart = ChartConfig::default();
        chart.annotations[0].at = "Aug-2015".to_string();
        assert!(matches!(
            build_panels(&report(None), &chart),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_reversed_highlight_is_config_error() {
        let mut chart = ChartConfig::default();
        chart.highlights.push(HighlightConfig {
            start: "2016-01".to_string(),
            end: "2015-01".to_string(),
            color: "#3498db".to_string(),
            label: None,
        });
        assert!(matches!(
            build_panels(&report(None), &chart),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF0000"), Ok((255, 0, 0)));
        assert_eq!(parse_hex_color("#00ff7f"), Ok((0, 255, 127)));
        assert!(parse_hex_color("red").is_err());
        assert!(parse_hex_color("#ZZ0000").is_err());
        assert!(parse_hex_color("#fff").is_err());
    }
}
