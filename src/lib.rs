#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # imgharvest
//!
//! Keyword-driven image acquisition pipeline: for each keyword in a list,
//! discover candidate image URLs, download them, then post-process the
//! resulting directory — deduplicate by content hash, score and sort by rank
//! or resolution, trim to a required count, and rename/convert the files into
//! a canonical `<prefix><seq>` sequence.
//!
//! The crate owns the orchestration around two pluggable collaborators:
//!
//! - [`UrlDiscovery`] turns a keyword plus engine parameters into an ordered
//!   URL sequence (order encodes relevance rank). Engine scraping lives behind
//!   this trait; [`ManifestDiscovery`] reads URL lists from local files.
//! - [`BatchDownloader`] fetches a URL sequence into a directory and reports
//!   the saved-file count. [`HttpBatchDownloader`] is the bundled HTTP
//!   implementation with extension and minimum-dimension filters.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imgharvest::{
//!     HarvestConfig, HarvestPipeline, HttpBatchDownloader, ManifestDiscovery,
//!     keywords::{plan_keywords, KeywordOptions},
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = HarvestConfig::builder()
//!     .required_number(Some(10))
//!     .dedup(true)
//!     .trim_to_required(true)
//!     .build()?;
//!
//! let keywords = vec!["cat".to_string(), "dog".to_string()];
//! let tasks = plan_keywords(&keywords, &KeywordOptions {
//!     output_root: "download_images".into(),
//!     ..KeywordOptions::default()
//! })?;
//!
//! let pipeline = HarvestPipeline::new(
//!     config,
//!     Arc::new(ManifestDiscovery::new("url_manifests")),
//!     Arc::new(HttpBatchDownloader::new()?),
//! )?;
//! let summary = pipeline.run(&tasks).await?;
//! println!("{} keyword(s) processed", summary.completed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Library vs CLI usage
//!
//! All orchestration is available by default as a library; enable the `cli`
//! feature (on by default) for the command-line interface with progress bars.

pub mod acquire;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod discovery;
pub mod downloader;
pub mod error;
pub mod keywords;
pub mod pipeline;
pub mod postprocess;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;

// Public API exports
pub use acquire::AcquisitionController;
pub use config::{
    AcquireConfig, HarvestConfig, HarvestConfigBuilder, OutputFormat, PostProcessConfig,
    SortCriterion, SortDirection, SortKey,
};
pub use discovery::{
    DiscoveryOptions, Engine, ManifestDiscovery, ProxyKind, ProxySettings, UrlDiscovery,
};
pub use downloader::{BatchDownloader, DownloadOptions, HttpBatchDownloader};
pub use error::{HarvestError, Result};
pub use keywords::{KeywordOptions, KeywordTask};
pub use pipeline::{HarvestPipeline, KeywordReport, PipelineSummary};
pub use postprocess::{CandidateFile, PostProcessReport, PostProcessor};
pub use services::{
    FailureLog, KeywordStage, LogStatusReporter, NoOpStatusReporter, StatusReporter,
};

#[cfg(feature = "cli")]
pub use tracing_config::{TracingConfig, TracingFormat};
