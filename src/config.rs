//! Configuration loaded from `config.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::db::ColumnRef;
use crate::pipeline::{MalformedDatePolicy, PipelineOptions};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    #[serde(default)]
    pub series: SeriesSelection,

    #[serde(default)]
    pub malformed_dates: MalformedDatePolicy,

    #[serde(default = "default_capture_times")]
    pub capture_times: ColumnRef,

    #[serde(default = "default_focal_lengths")]
    pub focal_lengths: ColumnRef,

    #[serde(default)]
    pub chart: ChartConfig,
}

/// Which series a run aggregates and plots.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SeriesSelection {
    #[default]
    Dates,
    DatesAndFocalLengths,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TickFormat {
    /// `2015-07`
    #[default]
    YearMonth,
    /// `Jul-2015`
    MonthYear,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationTarget {
    #[default]
    Dates,
    FocalLengths,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_output")]
    pub output: PathBuf,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default)]
    pub tick_format: TickFormat,

    #[serde(default = "default_date_labels")]
    pub dates: PanelLabels,

    #[serde(default = "default_focal_labels")]
    pub focal_lengths: PanelLabels,

    #[serde(default = "default_annotations")]
    pub annotations: Vec<AnnotationConfig>,

    /// Shaded calendar ranges on the date panel.
    #[serde(default)]
    pub highlights: Vec<HighlightConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PanelLabels {
    pub x_label: String,
    pub y_label: String,
    pub legend: String,
}

/// Text with an arrow pointing at a data position.
///
/// Keys are bucket keys as printed (`2015-08` for months, `35` for focal
/// lengths).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotationConfig {
    pub text: String,
    pub at: String,
    pub y: f64,
    pub text_at: String,
    pub text_y: f64,
    #[serde(default)]
    pub series: AnnotationTarget,
}

/// Inclusive month range, e.g. `start = "2015-08"`, `end = "2016-03"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HighlightConfig {
    pub start: String,
    pub end: String,
    #[serde(default = "default_highlight_color")]
    pub color: String,
    #[serde(default)]
    pub label: Option<String>,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("LightroomCatalog-2.lrcat")
}

fn default_capture_times() -> ColumnRef {
    ColumnRef::new("Adobe_images", "captureTime")
}

fn default_focal_lengths() -> ColumnRef {
    ColumnRef::new("AgHarvestedExifMetadata", "focalLength")
}

fn default_output() -> PathBuf {
    PathBuf::from("photo_frequency.svg")
}

fn default_title() -> String {
    "My Photography Frequency".to_string()
}

fn default_width() -> u32 {
    1200
}

fn default_height() -> u32 {
    700
}

fn default_date_labels() -> PanelLabels {
    PanelLabels {
        x_label: "Capture year-month".to_string(),
        y_label: "Number of shots by month".to_string(),
        legend: "Frequency of shots".to_string(),
    }
}

fn default_focal_labels() -> PanelLabels {
    PanelLabels {
        x_label: "Focal length (mm)".to_string(),
        y_label: "Number of shots".to_string(),
        legend: "Shots by focal length".to_string(),
    }
}

fn default_annotations() -> Vec<AnnotationConfig> {
    vec![AnnotationConfig {
        text: "Intro Photo Class & New Camera".to_string(),
        at: "2015-08".to_string(),
        y: 154.0,
        text_at: "2013-12".to_string(),
        text_y: 400.0,
        series: AnnotationTarget::Dates,
    }]
}

fn default_highlight_color() -> String {
    "#f39c12".to_string()
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            title: default_title(),
            width: default_width(),
            height: default_height(),
            tick_format: TickFormat::default(),
            dates: default_date_labels(),
            focal_lengths: default_focal_labels(),
            annotations: default_annotations(),
            highlights: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            series: SeriesSelection::default(),
            malformed_dates: MalformedDatePolicy::default(),
            capture_times: default_capture_times(),
            focal_lengths: default_focal_lengths(),
            chart: ChartConfig::default(),
        }
    }
}

impl Config {
    /// Load from `PHOTOFREQ_CONFIG` or the default location. A missing file
    /// means defaults; nothing is written back.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var_os("PHOTOFREQ_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(Self::config_path);

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("No config at {:?}, using defaults", config_path);
            Ok(Config::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("photofreq")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            capture_times: self.capture_times.clone(),
            focal_lengths: match self.series {
                SeriesSelection::Dates => None,
                SeriesSelection::DatesAndFocalLengths => Some(self.focal_lengths.clone()),
            },
            malformed_dates: self.malformed_dates,
        }
    }
}
