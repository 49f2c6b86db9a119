use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

use photofreq::chart::{self, ChartRenderer, SvgChartRenderer};
use photofreq::config::Config;
use photofreq::pipeline::{self, CatalogReport};
use photofreq::{export, logging};

#[derive(Debug, Default)]
struct Args {
    config_path: Option<PathBuf>,
    catalog_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    export_path: Option<PathBuf>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        let slot = match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("photofreq {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => &mut parsed.config_path,
            "--catalog" => &mut parsed.catalog_path,
            "--output" | "-o" => &mut parsed.output_path,
            "--export" | "-e" => &mut parsed.export_path,
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        };

        match args.get(i + 1) {
            Some(value) => *slot = Some(PathBuf::from(value)),
            None => {
                eprintln!("Error: {} requires a path argument", args[i]);
                std::process::exit(1);
            }
        }
        i += 2;
    }

    parsed
}

fn print_help() {
    println!(
        r#"photofreq - photo shooting frequency charts from a catalog

USAGE:
    photofreq [OPTIONS]

OPTIONS:
    --config, -c PATH   Path to config file
    --catalog PATH      Catalog database to read (overrides config)
    --output, -o PATH   Chart output path, SVG (overrides config)
    --export, -e PATH   Also write the series as .csv or .json
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    PHOTOFREQ_CONFIG    Path to config file (overrides default location)
    PHOTOFREQ_LOG       Log level (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/photofreq/config.toml"#
    );
}

fn main() -> Result<()> {
    let args = parse_args();

    let _ = logging::init(None);

    let mut config = match &args.config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(path) = args.catalog_path {
        config.catalog_path = path;
    }
    if let Some(path) = args.output_path {
        config.chart.output = path;
    }

    let report = pipeline::aggregate_catalog(&config.catalog_path, &config.pipeline_options())
        .with_context(|| format!("Failed to aggregate {}", config.catalog_path.display()))?;
    if report.skipped_capture_times > 0 {
        eprintln!(
            "Warning: skipped {} malformed capture times",
            report.skipped_capture_times
        );
    }

    let panels = chart::build_panels(&report, &config.chart)?;
    let renderer = SvgChartRenderer::from_config(&config.chart);
    renderer.render(&config.chart.title, &panels)?;

    if let Some(path) = &args.export_path {
        export::export_report(&report, path)
            .with_context(|| format!("Failed to export to {}", path.display()))?;
    }

    print_report(&report)?;
    println!("Chart written to {}", renderer.output().display());
    Ok(())
}

fn print_report(report: &CatalogReport) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "# capture month\tshots")?;
    for (month, count) in report.capture_months.iter() {
        writeln!(out, "{month}\t{count}")?;
    }
    if let Some((month, count)) = report.capture_months.peak() {
        writeln!(out, "# busiest month: {month} ({count} shots)")?;
    }

    if let Some(focal) = &report.focal_lengths {
        writeln!(out, "# focal length (mm)\tshots")?;
        for (length, count) in focal.iter() {
            writeln!(out, "{length}\t{count}")?;
        }
    }

    Ok(())
}
