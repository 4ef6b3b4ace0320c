//! tintype: apply stackable photo filters from the command line.
//!
//! # Usage
//!
//! ```text
//! tintype list
//! tintype apply photo.jpg -f gray -f gaussian-blur --blur 2 -f "Canny Edge"
//! tintype apply photo.jpg --chain-json '[{"kind":"Sepia","params":{"sepia":0.6}}]'
//! tintype catalog photo.jpg -o all_filters.tar.gz
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

#![allow(clippy::print_stdout)]

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use tintype_pipeline::diagnostics::{ChainDiagnostics, Clock, execute_with_diagnostics};
use tintype_pipeline::{FilterChain, FilterKind, FilterParams, FilterSpec, RgbImage};

/// Stackable photo filters: grayscale, blur, edges, tone maps, sketch and
/// cartoon effects.
#[derive(Parser)]
#[command(name = "tintype", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the filter catalog with slugs and parameter defaults.
    List,
    /// Run a filter chain over an image and write the result.
    Apply(ApplyArgs),
    /// Apply every catalog filter to an image and bundle the results.
    Catalog(CatalogArgs),
}

#[derive(Args)]
struct ApplyArgs {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Filter to apply, by name or slug. Repeat to stack; order matters.
    #[arg(short, long = "filter", value_name = "FILTER", value_parser = parse_kind)]
    filters: Vec<FilterKind>,

    /// Gaussian Blur strength (kernel size 2n+1).
    #[arg(long, value_parser = clap::builder::RangedI64ValueParser::<i32>::new().range(0..=10))]
    blur: Option<i32>,

    /// Canny Edge lower threshold.
    #[arg(long, value_parser = parse_canny_min)]
    canny_min: Option<f32>,

    /// Canny Edge upper threshold.
    #[arg(long, value_parser = parse_canny_max)]
    canny_max: Option<f32>,

    /// Sepia intensity.
    #[arg(long, value_parser = parse_sepia)]
    sepia: Option<f32>,

    /// Bright Light / Dark Mood brightness offset.
    #[arg(long, allow_negative_numbers = true, value_parser = clap::builder::RangedI64ValueParser::<i32>::new().range(-100..=100))]
    brightness: Option<i32>,

    /// Bright Light / Dark Mood contrast gain.
    #[arg(long, value_parser = parse_contrast)]
    contrast: Option<f32>,

    /// Full filter chain as a JSON string.
    ///
    /// When provided, `--filter` and the parameter flags are ignored.
    /// The JSON must be a valid `FilterChain` serialization.
    #[arg(long, conflicts_with = "filters")]
    chain_json: Option<String>,

    /// Where to write the filtered PNG.
    #[arg(short, long, default_value = "stacked_filtered_image.png")]
    output: PathBuf,

    /// Also write a side-by-side original/filtered PNG here.
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CatalogArgs {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Where to write the archive.
    #[arg(short, long, default_value = "all_filters.tar.gz")]
    output: PathBuf,
}

fn parse_kind(s: &str) -> Result<FilterKind, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_f32_in(s: &str, range: RangeInclusive<f32>) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(format!(
            "{value} is not in {}..={}",
            range.start(),
            range.end()
        ))
    }
}

fn parse_canny_min(s: &str) -> Result<f32, String> {
    parse_f32_in(s, 50.0..=200.0)
}

fn parse_canny_max(s: &str) -> Result<f32, String> {
    parse_f32_in(s, 100.0..=300.0)
}

fn parse_sepia(s: &str) -> Result<f32, String> {
    parse_f32_in(s, 0.0..=1.0)
}

fn parse_contrast(s: &str) -> Result<f32, String> {
    parse_f32_in(s, 0.5..=2.0)
}

/// Build a [`FilterChain`] from CLI arguments.
///
/// If `--chain-json` is provided, the JSON is parsed directly. Otherwise
/// every `--filter` gets the same parameter bundle (each filter only
/// reads its own fields). With no filters at all the chain is
/// `[Original]`.
fn chain_from_args(args: &ApplyArgs) -> Result<FilterChain, String> {
    if let Some(ref json) = args.chain_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --chain-json: {e}"));
    }

    let params = FilterParams {
        blur: args.blur,
        canny_min: args.canny_min,
        canny_max: args.canny_max,
        sepia: args.sepia,
        brightness: args.brightness,
        contrast: args.contrast,
    };
    if args.filters.is_empty() {
        return Ok(std::iter::once(FilterSpec::new(FilterKind::Original)).collect());
    }
    Ok(args
        .filters
        .iter()
        .map(|&kind| FilterSpec::with_params(kind, params))
        .collect())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::List => {
            list();
            Ok(())
        }
        Command::Apply(args) => apply(&args),
        Command::Catalog(args) => catalog(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            log::error!("{msg}");
            ExitCode::FAILURE
        }
    }
}

fn list() {
    println!("{:<24} {:<16} Parameters", "Filter", "Slug");
    println!("{}", "-".repeat(60));
    for kind in FilterKind::ALL {
        let params = kind
            .parameters()
            .iter()
            .map(|&name| format!("{name}={}", default_of(name)))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{:<24} {:<16} {params}", kind.name(), kind.slug());
    }
}

fn default_of(param: &str) -> String {
    match param {
        "blur" => FilterParams::DEFAULT_BLUR.to_string(),
        "canny_min" => FilterParams::DEFAULT_CANNY_MIN.to_string(),
        "canny_max" => FilterParams::DEFAULT_CANNY_MAX.to_string(),
        "sepia" => FilterParams::DEFAULT_SEPIA.to_string(),
        "brightness" => FilterParams::DEFAULT_BRIGHTNESS.to_string(),
        "contrast" => FilterParams::DEFAULT_CONTRAST.to_string(),
        _ => String::from("?"),
    }
}

fn load(path: &Path) -> Result<RgbImage, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    log::info!("Image: {} ({} bytes)", path.display(), bytes.len());
    tintype_pipeline::decode(&bytes).map_err(|e| format!("{}: {e}", path.display()))
}

fn write(path: &Path, bytes: &[u8], what: &str) -> Result<(), String> {
    std::fs::write(path, bytes)
        .map_err(|e| format!("Error writing {what} to {}: {e}", path.display()))?;
    log::info!("{what} written to {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

fn apply(args: &ApplyArgs) -> Result<(), String> {
    let chain = chain_from_args(args)?;
    let base = load(&args.image_path)?;
    log::info!(
        "Chain: {}",
        chain
            .iter()
            .map(|spec| spec.kind.name())
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    let mut filtered = None;
    let mut all_diagnostics = Vec::with_capacity(args.runs);
    for run in 0..args.runs {
        if args.runs > 1 {
            log::info!("--- Run {}/{} ---", run + 1, args.runs);
        }
        let (image, diagnostics) = execute_with_diagnostics(&base, &chain, &StdClock);
        if args.json {
            let json = serde_json::to_string_pretty(&diagnostics)
                .map_err(|e| format!("Error serializing diagnostics: {e}"))?;
            println!("{json}");
        } else {
            println!("{}", diagnostics.report());
        }
        filtered.get_or_insert(image);
        all_diagnostics.push(diagnostics);
    }

    if args.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    let filtered = filtered.ok_or_else(|| String::from("no runs executed"))?;
    let png = tintype_export::encode_png(&filtered).map_err(|e| format!("{e}"))?;
    write(&args.output, &png, "Filtered image")?;

    if let Some(ref preview_path) = args.preview {
        let preview = tintype_export::side_by_side(&base, &filtered);
        let png = tintype_export::encode_png(&preview).map_err(|e| format!("{e}"))?;
        write(preview_path, &png, "Preview")?;
    }
    Ok(())
}

fn catalog(args: &CatalogArgs) -> Result<(), String> {
    let original = load(&args.image_path)?;
    let result = tintype_pipeline::apply_catalog(&original);
    let archive = tintype_export::bundle_catalog(&result).map_err(|e| format!("{e}"))?;
    write(&args.output, &archive, "Catalog archive")
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[ChainDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    // Per-step means; every run executes the same chain.
    println!();
    println!("{:<4} {:<24} {:>12}", "#", "Filter", "Mean (ms)");
    println!("{}", "-".repeat(44));

    let step_count = all_diagnostics[0].steps.len();
    for index in 0..step_count {
        let step_durations: Vec<f64> = all_diagnostics
            .iter()
            .filter_map(|d| d.steps.get(index))
            .map(|s| s.duration.as_secs_f64() * 1000.0)
            .collect();
        let step_mean = step_durations.iter().sum::<f64>() / step_durations.len() as f64;
        let name = all_diagnostics[0].steps[index].kind.name();
        println!("{:<4} {name:<24} {step_mean:>10.3}ms", index + 1);
    }
}
