//! Keyword pipeline
//!
//! Runs each keyword's full acquisition-and-postprocess cycle strictly
//! sequentially. A keyword that fails is recorded in the failure log and does
//! not stop the run; with `fail_fast` set the error propagates immediately
//! instead.

use crate::acquire::AcquisitionController;
use crate::config::HarvestConfig;
use crate::discovery::UrlDiscovery;
use crate::downloader::BatchDownloader;
use crate::error::Result;
use crate::keywords::KeywordTask;
use crate::postprocess::{PostProcessReport, PostProcessor};
use crate::services::{FailureLog, NoOpStatusReporter, StatusReporter};
use std::sync::Arc;

/// Result of one keyword's full cycle
#[derive(Debug, Clone, Default)]
pub struct KeywordReport {
    /// Saved-file count reported by the last completed download
    pub saved: usize,
    /// Post-processing counters
    pub post: PostProcessReport,
}

/// Summary over a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Keywords that completed all stages
    pub completed: usize,
    /// Keywords that failed and were skipped
    pub failed: usize,
}

/// Sequential driver over the keyword tasks
pub struct HarvestPipeline {
    config: HarvestConfig,
    discovery: Arc<dyn UrlDiscovery>,
    downloader: Arc<dyn BatchDownloader>,
    failure_log: FailureLog,
    reporter: Arc<dyn StatusReporter>,
}

impl HarvestPipeline {
    /// Create a pipeline around the two collaborators.
    ///
    /// The failure log defaults to disabled and the reporter to no-op; use the
    /// `with_` methods to inject real sinks.
    ///
    /// # Errors
    /// - Invalid configuration
    pub fn new(
        config: HarvestConfig,
        discovery: Arc<dyn UrlDiscovery>,
        downloader: Arc<dyn BatchDownloader>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            discovery,
            downloader,
            failure_log: FailureLog::disabled(),
            reporter: Arc::new(NoOpStatusReporter),
        })
    }

    /// Attach a failure log
    #[must_use]
    pub fn with_failure_log(mut self, failure_log: FailureLog) -> Self {
        self.failure_log = failure_log;
        self
    }

    /// Attach a status reporter
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn StatusReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Pipeline configuration
    #[must_use]
    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Process all tasks in order.
    ///
    /// # Errors
    /// Only with `fail_fast` set: the first keyword failure propagates.
    pub async fn run(&self, tasks: &[KeywordTask]) -> Result<PipelineSummary> {
        let mut summary = PipelineSummary::default();

        for task in tasks {
            match self.run_keyword(task).await {
                Ok(report) => {
                    log::info!(
                        "keyword '{}' done: {} saved, {} renamed, {} converted",
                        task.keyword,
                        report.saved,
                        report.post.renamed,
                        report.post.converted
                    );
                    summary.completed += 1;
                },
                Err(e) => {
                    let message =
                        format!("Failed to complete keyword {}. Cause: {e}", task.keyword);
                    log::error!("{message}");
                    self.failure_log.record(&message);
                    summary.failed += 1;
                    if self.config.fail_fast {
                        return Err(e);
                    }
                },
            }
            self.reporter.keyword_finished(&task.keyword);
        }

        Ok(summary)
    }

    /// One keyword's full cycle: acquisition, then post-processing over
    /// whatever acquisition left in the directory.
    async fn run_keyword(&self, task: &KeywordTask) -> Result<KeywordReport> {
        let controller = AcquisitionController::new(
            self.discovery.as_ref(),
            self.downloader.as_ref(),
            &self.failure_log,
            self.reporter.as_ref(),
        );
        let saved = controller.acquire(task, &self.config.acquire).await?;

        let processor = PostProcessor::new(&self.failure_log, self.reporter.as_ref());
        let post = processor.process(&task.keyword, &task.dest_dir, &self.config.post)?;

        Ok(KeywordReport { saved, post })
    }
}
