//! Batch download collaborator interface and default HTTP implementation
//!
//! The downloader is a black box to the orchestration layer: it receives an
//! ordered URL sequence and a destination directory and reports only the count
//! of files it actually saved. Saved files embed their 1-based position in the
//! URL sequence (the discovery rank) as the first digit run of the filename,
//! which the rank-based sorting stage later parses back out.

use crate::discovery::ProxySettings;
use crate::error::{HarvestError, Result};
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

/// Parameters passed through to the batch downloader
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Number of concurrent downloads
    pub concurrency: usize,

    /// Per-request timeout
    pub timeout: Duration,

    /// Proxy used for fetching image bytes
    pub proxy: Option<ProxySettings>,

    /// Optional filename prefix for saved files
    pub file_prefix: Option<String>,

    /// Allowed file extensions, lowercase without dots; empty allows all.
    ///
    /// `jpg` and `jpeg` are treated as aliases of each other.
    pub format_filter: Vec<String>,

    /// Minimum image dimensions as `(height, width)`; `(0, 0)` disables the check
    pub min_dim: (u32, u32),
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            timeout: Duration::from_secs(20),
            proxy: None,
            file_prefix: None,
            format_filter: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
            ],
            min_dim: (0, 0),
        }
    }
}

/// Collaborator fetching image bytes for an ordered URL sequence.
///
/// Returns the number of files actually saved into `dest_dir`. Individual URL
/// failures are the implementation's business; only a failure that prevents
/// the batch as a whole is surfaced, as [`HarvestError::Transport`].
#[async_trait]
pub trait BatchDownloader: Send + Sync {
    /// Fetch `urls` into `dest_dir`, returning the saved-file count
    async fn fetch(&self, urls: &[String], dest_dir: &Path, options: &DownloadOptions)
        -> Result<usize>;
}

/// Check an extension against the format filter, honoring the jpg/jpeg alias
#[must_use]
pub fn extension_allowed(extension: &str, filter: &[String]) -> bool {
    if filter.is_empty() {
        return true;
    }
    let ext = extension.to_ascii_lowercase();
    filter.iter().any(|allowed| {
        allowed == &ext
            || (allowed == "jpg" && ext == "jpeg")
            || (allowed == "jpeg" && ext == "jpg")
    })
}

/// Extract a plausible image extension from a URL path, ignoring query and fragment
#[must_use]
pub fn extension_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file_name = path.rsplit('/').next()?;
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    if ext.is_empty() || ext.len() > 5 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext)
}

/// Map an HTTP content type to a file extension
#[must_use]
pub fn extension_from_content_type(content_type: &str) -> Option<&'static str> {
    match content_type.split(';').next().map(str::trim) {
        Some("image/jpeg") => Some("jpg"),
        Some("image/png") => Some("png"),
        Some("image/webp") => Some("webp"),
        Some("image/gif") => Some("gif"),
        Some("image/bmp") => Some("bmp"),
        _ => None,
    }
}

/// Default downloader fetching URLs over HTTP with bounded concurrency.
///
/// Filters by extension before fetching and by decoded dimensions after, and
/// names saved files `<prefix><rank:06>.<ext>` so the discovery rank is
/// recoverable from the first digit run.
#[derive(Debug, Clone)]
pub struct HttpBatchDownloader {
    client: Client,
}

impl HttpBatchDownloader {
    /// Create a downloader with a default HTTP client
    ///
    /// # Errors
    /// - Failed to create the HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| HarvestError::transport(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Create a downloader around an existing client
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn client_for(&self, options: &DownloadOptions) -> Result<Client> {
        match &options.proxy {
            None => Ok(self.client.clone()),
            Some(proxy) => {
                let proxy = reqwest::Proxy::all(proxy.url()).map_err(|e| {
                    HarvestError::transport(format!("Invalid proxy configuration: {e}"))
                })?;
                Client::builder().proxy(proxy).build().map_err(|e| {
                    HarvestError::transport(format!("Failed to create proxied HTTP client: {e}"))
                })
            },
        }
    }

    async fn fetch_one(
        client: &Client,
        url: &str,
        rank: usize,
        dest_dir: &Path,
        options: &DownloadOptions,
    ) -> bool {
        let url_extension = extension_from_url(url);
        if let Some(ext) = &url_extension {
            if !extension_allowed(ext, &options.format_filter) {
                log::debug!("skipping {url}: extension '{ext}' filtered out");
                return false;
            }
        }

        let response = match client.get(url).timeout(options.timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                log::debug!("failed to fetch {url}: {e}");
                return false;
            },
        };
        if !response.status().is_success() {
            log::debug!("failed to fetch {url}: HTTP {}", response.status());
            return false;
        }

        // The URL may not carry an extension; fall back to the content type.
        let extension = match url_extension.or_else(|| {
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .and_then(extension_from_content_type)
                .map(ToOwned::to_owned)
        }) {
            Some(ext) => ext,
            None => {
                log::debug!("skipping {url}: undeterminable image format");
                return false;
            },
        };
        if !extension_allowed(&extension, &options.format_filter) {
            log::debug!("skipping {url}: extension '{extension}' filtered out");
            return false;
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::debug!("failed to read body of {url}: {e}");
                return false;
            },
        };

        let (min_height, min_width) = options.min_dim;
        if min_height > 0 || min_width > 0 {
            match image::load_from_memory(&bytes) {
                Ok(decoded) => {
                    if decoded.height() < min_height || decoded.width() < min_width {
                        log::debug!(
                            "skipping {url}: {}x{} below minimum {min_width}x{min_height}",
                            decoded.width(),
                            decoded.height()
                        );
                        return false;
                    }
                },
                Err(e) => {
                    log::debug!("skipping {url}: undecodable while checking dimensions: {e}");
                    return false;
                },
            }
        }

        let prefix = options.file_prefix.as_deref().unwrap_or("");
        let file_path = dest_dir.join(format!("{prefix}{rank:06}.{extension}"));
        match tokio::fs::write(&file_path, &bytes).await {
            Ok(()) => {
                log::debug!("saved {url} -> {}", file_path.display());
                true
            },
            Err(e) => {
                log::warn!("failed to write {}: {e}", file_path.display());
                false
            },
        }
    }
}

#[async_trait]
impl BatchDownloader for HttpBatchDownloader {
    async fn fetch(
        &self,
        urls: &[String],
        dest_dir: &Path,
        options: &DownloadOptions,
    ) -> Result<usize> {
        if urls.is_empty() {
            return Ok(0);
        }
        let client = self.client_for(options)?;
        let concurrency = options.concurrency.max(1);

        let saved = stream::iter(urls.iter().cloned().enumerate())
            .map(|(index, url)| {
                let client = &client;
                async move { Self::fetch_one(client, &url, index + 1, dest_dir, options).await }
            })
            .buffer_unordered(concurrency)
            .fold(0_usize, |count, saved| async move {
                if saved {
                    count + 1
                } else {
                    count
                }
            })
            .await;

        log::info!("saved {saved}/{} file(s) into {}", urls.len(), dest_dir.display());
        Ok(saved)
    }
}
