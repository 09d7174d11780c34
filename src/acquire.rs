//! Acquisition controller
//!
//! Drives repeated discovery+download attempts for one keyword against a
//! required-count target. Every attempt starts from a fully reset destination
//! directory; the loop exits as soon as the target is met, the attempt budget
//! is exhausted, or no target was set (one attempt always suffices then).
//! Falling short after the final attempt is a warning, never an error:
//! downstream processing proceeds with whatever was saved.

use crate::config::AcquireConfig;
use crate::discovery::UrlDiscovery;
use crate::downloader::BatchDownloader;
use crate::error::{HarvestError, Result};
use crate::keywords::{reset_dest_dir, KeywordTask};
use crate::services::{FailureLog, KeywordStage, StatusReporter};

/// Orchestrates the bounded retry loop around the two collaborators
pub struct AcquisitionController<'a> {
    discovery: &'a dyn UrlDiscovery,
    downloader: &'a dyn BatchDownloader,
    failure_log: &'a FailureLog,
    reporter: &'a dyn StatusReporter,
}

impl<'a> AcquisitionController<'a> {
    /// Create a controller around the given collaborators and sinks
    #[must_use]
    pub fn new(
        discovery: &'a dyn UrlDiscovery,
        downloader: &'a dyn BatchDownloader,
        failure_log: &'a FailureLog,
        reporter: &'a dyn StatusReporter,
    ) -> Self {
        Self {
            discovery,
            downloader,
            failure_log,
            reporter,
        }
    }

    /// Acquire images for `task`, returning the last recorded saved count.
    ///
    /// Transport failures from either collaborator consume the attempt and are
    /// recorded in the failure log; any other error propagates to the caller.
    ///
    /// # Errors
    /// - Filesystem errors resetting the destination directory
    /// - Non-transport collaborator errors
    pub async fn acquire(&self, task: &KeywordTask, config: &AcquireConfig) -> Result<usize> {
        let mut saved = 0;

        for attempt in 1..=config.max_attempts {
            // Any pre-existing content, including from a prior program run,
            // is discarded on every attempt.
            self.reporter.stage(&task.keyword, KeywordStage::Cleaning, None);
            reset_dest_dir(&task.dest_dir)?;

            let urls = match self.discover_all(task, config).await? {
                Some(urls) => urls,
                // Transport failure already recorded; consume this attempt.
                None => continue,
            };

            self.reporter
                .stage(&task.keyword, KeywordStage::Downloading, None);
            saved = match self
                .downloader
                .fetch(&urls, &task.dest_dir, &config.download)
                .await
            {
                Ok(saved) => saved,
                Err(HarvestError::Transport(msg)) => {
                    log::error!("download failed for '{}': {msg}", task.keyword);
                    self.failure_log.record(&msg);
                    continue;
                },
                Err(e) => return Err(e),
            };

            match config.required_number {
                // No target: one completed attempt is always sufficient.
                None => break,
                Some(required) if saved >= required => break,
                Some(required) => {
                    log::debug!(
                        "attempt {attempt}/{}: saved {saved} of {required} for '{}'",
                        config.max_attempts,
                        task.keyword
                    );
                    if attempt == config.max_attempts {
                        let message = format!(
                            "Only downloaded {saved} images. But {required} images are required for keyword: {} ({}).",
                            task.keyword, task.index
                        );
                        log::warn!("{message}");
                        self.reporter.warning(&message);
                        self.failure_log.record(&message);
                    }
                },
            }
        }

        Ok(saved)
    }

    /// Query every engine in order, concatenating the returned sequences.
    ///
    /// Returns `None` when a transport failure aborted this attempt.
    async fn discover_all(
        &self,
        task: &KeywordTask,
        config: &AcquireConfig,
    ) -> Result<Option<Vec<String>>> {
        let mut urls = Vec::new();
        for engine in &config.engines {
            self.reporter.stage(
                &task.keyword,
                KeywordStage::Crawling,
                Some(&format!("from {engine}")),
            );
            match self
                .discovery
                .discover(&task.keyword, engine, &config.discovery)
                .await
            {
                Ok(mut engine_urls) => urls.append(&mut engine_urls),
                Err(HarvestError::Transport(msg)) => {
                    log::error!("discovery failed for '{}' on {engine}: {msg}", task.keyword);
                    self.failure_log.record(&msg);
                    return Ok(None);
                },
                Err(e) => return Err(e),
            }
        }
        Ok(Some(urls))
    }
}
