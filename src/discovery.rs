//! URL discovery collaborator interface
//!
//! Discovery turns a keyword plus engine-specific parameters into an ordered
//! sequence of candidate image URLs; the order encodes relevance rank. Engine
//! scraping and browser automation live behind the [`UrlDiscovery`] trait and
//! are not part of this crate. [`ManifestDiscovery`] is the one built-in
//! implementation: it serves URL lists from local manifest files, which keeps
//! the binary usable end-to-end without a scraping backend.

use crate::error::{HarvestError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A named search engine backend.
///
/// Engine names are an open set since discovery is pluggable; the well-known
/// names are `google`, `bing` and `baidu`. Names are normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Engine(String);

impl Engine {
    /// Create an engine from its name (case-insensitive)
    #[must_use]
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        Self(name.as_ref().trim().to_ascii_lowercase())
    }

    /// Engine name in its normalized lowercase form
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new("google")
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Engine {
    type Err = HarvestError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Err(HarvestError::invalid_config("engine name must not be empty"));
        }
        Ok(Self::new(s))
    }
}

/// Proxy protocol understood by the collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProxyKind {
    /// HTTP(S) proxy
    Http,
    /// SOCKS5 proxy
    Socks5,
}

impl std::fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Socks5 => write!(f, "socks5"),
        }
    }
}

/// Opaque proxy settings passed through to discovery and download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySettings {
    /// Proxy protocol
    pub kind: ProxyKind,
    /// `host:port` address
    pub address: String,
}

impl ProxySettings {
    /// Full proxy URL, e.g. `socks5://127.0.0.1:1080`
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}://{}", self.kind, self.address)
    }
}

/// Parameters passed through to the URL discovery collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryOptions {
    /// Maximum number of URLs requested per engine
    pub max_number: usize,

    /// Restrict results to images containing faces
    pub face_only: bool,

    /// Enable the engine's safe-search mode
    pub safe_mode: bool,

    /// Proxy used by the discovery backend
    pub proxy: Option<ProxySettings>,

    /// Browser driver name for automation-based backends (opaque)
    pub browser: Option<String>,

    /// Engine-specific image type filter (e.g. `photo`, `clipart`)
    pub image_type: Option<String>,

    /// Engine-specific dominant color filter
    pub color: Option<String>,

    /// Suppress backend console output
    pub quiet: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            max_number: 100,
            face_only: false,
            safe_mode: false,
            proxy: None,
            browser: None,
            image_type: None,
            color: None,
            quiet: true,
        }
    }
}

/// Collaborator producing ordered candidate image URLs for a keyword.
///
/// Implementations signal transport-level failures (network, driver) with
/// [`HarvestError::Transport`]; the acquisition loop retries those by
/// consuming an attempt. Any other error aborts the keyword.
#[async_trait]
pub trait UrlDiscovery: Send + Sync {
    /// Discover candidate URLs for `keyword` on `engine`.
    ///
    /// The returned order encodes relevance rank and must be preserved.
    async fn discover(
        &self,
        keyword: &str,
        engine: &Engine,
        options: &DiscoveryOptions,
    ) -> Result<Vec<String>>;
}

/// Discovery backend reading per-keyword URL manifests from a local directory.
///
/// Looks up `<root>/<engine>/<keyword>.txt` first and falls back to
/// `<root>/<keyword>.txt`. Manifests contain one URL per line; blank lines and
/// `#` comments are skipped. A missing manifest is reported as a transport
/// failure so the acquisition loop treats it like any unreachable backend.
#[derive(Debug, Clone)]
pub struct ManifestDiscovery {
    root: PathBuf,
}

impl ManifestDiscovery {
    /// Create a manifest discovery rooted at `root`
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Manifest root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn manifest_path(&self, keyword: &str, engine: &Engine) -> PathBuf {
        let engine_specific = self.root.join(engine.name()).join(format!("{keyword}.txt"));
        if engine_specific.is_file() {
            engine_specific
        } else {
            self.root.join(format!("{keyword}.txt"))
        }
    }
}

#[async_trait]
impl UrlDiscovery for ManifestDiscovery {
    async fn discover(
        &self,
        keyword: &str,
        engine: &Engine,
        options: &DiscoveryOptions,
    ) -> Result<Vec<String>> {
        let path = self.manifest_path(keyword, engine);
        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            HarvestError::transport(format!(
                "no URL manifest for keyword '{}' on engine '{}' at {}: {}",
                keyword,
                engine,
                path.display(),
                e
            ))
        })?;

        let urls: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .take(options.max_number)
            .map(ToOwned::to_owned)
            .collect();

        log::debug!(
            "manifest discovery: {} URL(s) for '{}' from {}",
            urls.len(),
            keyword,
            path.display()
        );
        Ok(urls)
    }
}
