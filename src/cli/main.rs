//! Image harvest CLI
//!
//! Command-line interface for the keyword-driven acquisition pipeline: read a
//! keyword list, crawl and download images per keyword, then deduplicate,
//! sort, trim and rename each keyword's directory.

use super::config::CliConfigBuilder;
use super::input::{read_keywords, InputType, KeywordSource};
use crate::{
    discovery::ManifestDiscovery,
    downloader::HttpBatchDownloader,
    keywords::{plan_keywords, slice_keywords, KeywordOptions},
    pipeline::HarvestPipeline,
    services::{FailureLog, KeywordStage, StatusReporter},
    tracing_config::{TracingConfig, TracingFormat},
};
use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Keyword-driven image harvest CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "imgharvest")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Search engine name
    #[arg(long, default_value = "google")]
    pub engine: String,

    /// Engine names separated by comma (,). Overrides --engine.
    #[arg(long)]
    pub engines: Option<String>,

    /// Keywords separated by comma (,)
    #[arg(short, long)]
    pub keywords: Option<String>,

    /// Path to the keyword input file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Input type (default: inferred from the file extension)
    #[arg(long, value_enum)]
    pub input_type: Option<InputType>,

    /// The 1-based index of the keyword column for table inputs
    #[arg(long)]
    pub column_index: Option<usize>,

    /// The name of the keyword column for table inputs
    #[arg(long)]
    pub column_name: Option<String>,

    /// The input file carries no header row
    #[arg(long)]
    pub exclude_header: bool,

    /// The beginning row number (default: the starting number)
    #[arg(long)]
    pub begin: Option<usize>,

    /// The last row number, inclusive (default: the last row)
    #[arg(long)]
    pub end: Option<usize>,

    /// Your preference of the starting number
    #[arg(long, default_value_t = 1)]
    pub starting_number: usize,

    /// Include the zero-padded index in the folder name
    #[arg(long)]
    pub include_index: bool,

    /// Output root directory; one folder per keyword is created below it
    #[arg(short, long, default_value = "download_images")]
    pub output: PathBuf,

    /// Directory of per-keyword URL manifests used for discovery
    #[arg(long, value_name = "DIR")]
    pub urls_from: Option<PathBuf>,

    /// Maximum number of URLs requested per engine
    #[arg(long, default_value_t = 100)]
    pub max_number: usize,

    /// Maximum number of attempts to reach the required number of images
    #[arg(long, default_value_t = 5)]
    pub max_attempts: usize,

    /// Required number of images per keyword (default: any)
    #[arg(long)]
    pub required_number: Option<usize>,

    /// File prefix for renamed files (default: the current keyword)
    #[arg(long)]
    pub file_prefix: Option<String>,

    /// Case insensitive formats separated by comma (,)
    #[arg(long, default_value = "jpg,jpeg,png,webp")]
    pub format_filter: String,

    /// Minimum image dimensions as height,width (default: none)
    #[arg(long, default_value = "0,0")]
    pub min_dim: String,

    /// Sorting criteria as key,direction. Example: resolution,desc
    #[arg(long, default_value = "rank,asc")]
    pub sort: String,

    /// The format of output images (default: not converted)
    #[arg(long)]
    pub images_format: Option<String>,

    /// Encoding quality when --images-format is specified
    #[arg(long, default_value_t = 95)]
    pub images_quality: u8,

    /// Remove duplicate images
    #[arg(long)]
    pub remove_duplicate: bool,

    /// Only keep the required number of images
    #[arg(long)]
    pub remove_extra: bool,

    /// Only output the selected keywords in comma-separated format
    #[arg(long)]
    pub echo_only: bool,

    /// Number of concurrent downloads
    #[arg(long, default_value_t = 8)]
    pub num_threads: usize,

    /// Per-request download timeout in seconds
    #[arg(long, default_value_t = 20)]
    pub timeout: u64,

    /// Proxy address as host:port
    #[arg(long)]
    pub proxy: Option<String>,

    /// Proxy type (http, socks5)
    #[arg(long, default_value = "http")]
    pub proxy_type: String,

    /// Restrict results to images containing faces
    #[arg(long)]
    pub face_only: bool,

    /// Enable the engine's safe-search mode
    #[arg(long)]
    pub safe_mode: bool,

    /// Engine-specific image type filter (e.g. photo, clipart)
    #[arg(long = "type")]
    pub image_type: Option<String>,

    /// Engine-specific dominant color filter
    #[arg(long)]
    pub color: Option<String>,

    /// Browser driver name for automation-based discovery backends
    #[arg(long)]
    pub driver: Option<String>,

    /// Path of the persistent error log
    #[arg(long, default_value = "error.log")]
    pub error_log: PathBuf,

    /// Enable verbose logging (-v: INFO, -vv: DEBUG, -vvv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Propagate the first keyword failure instead of continuing
    #[arg(long)]
    pub debug_mode: bool,
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose).context("Failed to initialize tracing")?;

    let keywords = read_keywords(&KeywordSource {
        keywords: cli.keywords.as_deref(),
        file: cli.file.as_deref(),
        input_type: cli.input_type,
        column_index: cli.column_index,
        column_name: cli.column_name.as_deref(),
        exclude_header: cli.exclude_header,
    })
    .context("Failed to read keywords")?;

    if keywords.is_empty() {
        bail!("no keywords provided");
    }

    if cli.echo_only {
        let sliced = slice_keywords(&keywords, cli.begin, cli.end, cli.starting_number)?;
        println!("{}", sliced.join(","));
        return Ok(());
    }

    CliConfigBuilder::validate_cli(&cli).context("Invalid CLI arguments")?;
    let config = CliConfigBuilder::from_cli(&cli).context("Failed to build configuration")?;

    let tasks = plan_keywords(
        &keywords,
        &KeywordOptions {
            output_root: cli.output.clone(),
            begin: cli.begin,
            end: cli.end,
            starting_number: cli.starting_number,
            include_index: cli.include_index,
        },
    )?;
    if tasks.is_empty() {
        bail!("the selected range contains no keywords");
    }

    std::fs::create_dir_all(&cli.output)
        .with_context(|| format!("Failed to create output directory {}", cli.output.display()))?;

    let Some(manifest_root) = &cli.urls_from else {
        bail!(
            "no URL discovery backend configured: pass --urls-from DIR with per-keyword \
             URL manifests, or embed the library with your own UrlDiscovery implementation"
        );
    };

    let discovery = Arc::new(ManifestDiscovery::new(manifest_root.clone()));
    let downloader =
        Arc::new(HttpBatchDownloader::new().context("Failed to create downloader")?);
    let failure_log = FailureLog::open(&cli.error_log)
        .with_context(|| format!("Failed to open {}", cli.error_log.display()))?;

    info!("Starting image harvest");
    info!(
        "{} keyword(s), engines: {}, output: {}",
        tasks.len(),
        config
            .acquire
            .engines
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(","),
        cli.output.display()
    );

    let reporter = Arc::new(ProgressBarReporter::new(tasks.len() as u64));
    let pipeline = HarvestPipeline::new(config, discovery, downloader)?
        .with_failure_log(failure_log)
        .with_reporter(reporter.clone());

    let start_time = Instant::now();
    let summary = pipeline.run(&tasks).await?;
    reporter.finish(&summary_message(summary.completed, summary.failed));

    info!(
        "Processed {} keyword(s) in {:.2}s",
        summary.completed,
        start_time.elapsed().as_secs_f64()
    );
    println!("Done.");
    Ok(())
}

fn summary_message(completed: usize, failed: usize) -> String {
    if failed > 0 {
        format!("Completed! Processed: {completed}, Failed: {failed}")
    } else {
        format!("Completed! Processed: {completed}")
    }
}

/// Initialize tracing based on verbosity level
fn init_tracing(verbose_count: u8) -> Result<()> {
    TracingConfig::new()
        .with_verbosity(verbose_count)
        .with_format(TracingFormat::Console)
        .init()
        .context("Failed to initialize tracing subscriber")?;

    if verbose_count > 0 {
        match verbose_count {
            1 => tracing::info!("Info level: showing per-keyword progress"),
            2 => tracing::debug!("Debug level: showing internal state and per-file decisions"),
            _ => tracing::trace!("Trace level: showing extremely detailed traces"),
        }
    }

    Ok(())
}

/// Indicatif-backed reporter: one bar over the keyword list, the current stage
/// tag as its message
struct ProgressBarReporter {
    bar: ProgressBar,
}

impl ProgressBarReporter {
    fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap()
                .progress_chars("#>-"),
        );
        Self { bar }
    }

    fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl StatusReporter for ProgressBarReporter {
    fn stage(&self, keyword: &str, stage: KeywordStage, detail: Option<&str>) {
        let message = match detail {
            Some(detail) => format!("{} {keyword} {detail}", stage.label()),
            None => format!("{} {keyword}", stage.label()),
        };
        self.bar.set_message(message);
    }

    fn warning(&self, message: &str) {
        self.bar.println(format!("warning: {message}"));
    }

    fn keyword_finished(&self, _keyword: &str) {
        self.bar.inc(1);
    }
}
