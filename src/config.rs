//! Configuration types for acquisition and post-processing

use crate::discovery::{DiscoveryOptions, Engine};
use crate::downloader::DownloadOptions;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Sort key used to score retained files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    /// Discovery rank embedded in the filename (lower = more relevant)
    Rank,
    /// Decoded pixel area (`height * width`)
    Resolution,
}

impl Default for SortKey {
    fn default() -> Self {
        Self::Rank
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rank => write!(f, "rank"),
            Self::Resolution => write!(f, "resolution"),
        }
    }
}

/// Direction applied after the ascending sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// Keep the ascending-sorted sequence
    Ascending,
    /// Reverse the fully-sorted sequence as a whole
    Descending,
}

impl Default for SortDirection {
    fn default() -> Self {
        Self::Ascending
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// Sort criterion: key plus direction, parsed from `key,direction` syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortCriterion {
    /// Scoring key
    pub key: SortKey,
    /// Ordering direction
    pub direction: SortDirection,
}

impl SortCriterion {
    /// Create a new sort criterion
    #[must_use]
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }
}

impl std::fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.key, self.direction)
    }
}

impl FromStr for SortCriterion {
    type Err = crate::error::HarvestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',');
        let key = match parts.next().map(str::trim) {
            Some("rank") => SortKey::Rank,
            Some("resolution") => SortKey::Resolution,
            Some(other) => {
                return Err(crate::error::HarvestError::invalid_config(format!(
                    "unknown sorting method '{other}' (expected 'rank' or 'resolution')"
                )))
            },
            None => SortKey::Rank,
        };
        let direction = match parts.next().map(str::trim) {
            Some("asc") | None => SortDirection::Ascending,
            Some("desc") => SortDirection::Descending,
            Some(other) => {
                return Err(crate::error::HarvestError::invalid_config(format!(
                    "unknown sorting direction '{other}' (expected 'asc' or 'desc')"
                )))
            },
        };
        if parts.next().is_some() {
            return Err(crate::error::HarvestError::invalid_config(format!(
                "incorrect input for sorting: '{s}'"
            )));
        }
        Ok(Self { key, direction })
    }
}

/// Output image format for the conversion stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// JPEG at the configured quality
    Jpeg,
    /// PNG (lossless, quality ignored)
    Png,
    /// WebP (lossless via the image crate, quality ignored)
    WebP,
}

impl OutputFormat {
    /// File extension for this format (without the dot).
    ///
    /// The `jpg` spelling is canonical; `.jpeg` sources are normalized to it.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = crate::error::HarvestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::WebP),
            other => Err(crate::error::HarvestError::invalid_config(format!(
                "unsupported output format '{other}' (expected jpg, png or webp)"
            ))),
        }
    }
}

/// Configuration for the post-processing stages applied to a keyword directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostProcessConfig {
    /// Remove files with duplicate content hashes
    pub dedup: bool,

    /// Sort criterion for the scoring/sorting stages
    pub sort: SortCriterion,

    /// Target count of final images; drives trimming and acquisition retries
    pub required_number: Option<usize>,

    /// Delete files beyond `required_number` after sorting
    pub trim_to_required: bool,

    /// Filename prefix for renamed files (default: the keyword)
    pub file_prefix: Option<String>,

    /// Convert files to this format when their extension differs
    pub output_format: Option<OutputFormat>,

    /// Encoding quality (0-100, only used for JPEG output)
    pub quality: u8,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            dedup: false,
            sort: SortCriterion::default(),
            required_number: None,
            trim_to_required: false,
            file_prefix: None,
            output_format: None,
            quality: 95,
        }
    }
}

impl PostProcessConfig {
    /// Validate the post-processing parameters
    ///
    /// # Errors
    /// - Quality above 100
    /// - Trimming requested without a required number
    pub fn validate(&self) -> crate::Result<()> {
        if self.quality > 100 {
            return Err(crate::error::HarvestError::invalid_config(format!(
                "Invalid quality: {} (valid range: 0-100)",
                self.quality
            )));
        }
        if self.trim_to_required && self.required_number.is_none() {
            return Err(crate::error::HarvestError::invalid_config(
                "trimming requires a required number of images",
            ));
        }
        Ok(())
    }
}

/// Configuration for the acquisition retry loop
#[derive(Debug, Clone)]
pub struct AcquireConfig {
    /// Engines queried in order on every attempt
    pub engines: Vec<Engine>,

    /// Maximum number of discovery+download attempts per keyword
    pub max_attempts: usize,

    /// Saved-count target; `None` means a single attempt always suffices
    pub required_number: Option<usize>,

    /// Parameters passed through to the URL discovery collaborator
    pub discovery: DiscoveryOptions,

    /// Parameters passed through to the batch downloader
    pub download: DownloadOptions,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            engines: vec![Engine::default()],
            max_attempts: 5,
            required_number: None,
            discovery: DiscoveryOptions::default(),
            download: DownloadOptions::default(),
        }
    }
}

impl AcquireConfig {
    /// Validate the acquisition parameters
    ///
    /// # Errors
    /// - Empty engine list
    /// - Zero attempts
    pub fn validate(&self) -> crate::Result<()> {
        if self.engines.is_empty() {
            return Err(crate::error::HarvestError::invalid_config(
                "at least one engine is required",
            ));
        }
        if self.max_attempts == 0 {
            return Err(crate::error::HarvestError::invalid_config(
                "max attempts must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Top-level pipeline configuration
#[derive(Debug, Clone, Default)]
pub struct HarvestConfig {
    /// Acquisition loop parameters
    pub acquire: AcquireConfig,

    /// Post-processing parameters
    pub post: PostProcessConfig,

    /// Propagate per-keyword failures instead of continuing with the next keyword
    pub fail_fast: bool,
}

impl HarvestConfig {
    /// Create a new configuration builder for fluent construction
    #[must_use]
    pub fn builder() -> HarvestConfigBuilder {
        HarvestConfigBuilder::default()
    }

    /// Validate all configuration parameters
    ///
    /// The required number is shared between the acquisition loop and the
    /// trimming stage; the builder keeps the two in sync.
    ///
    /// # Errors
    /// Returns an [`InvalidConfig`](crate::HarvestError::InvalidConfig) error
    /// describing the first violated rule.
    pub fn validate(&self) -> crate::Result<()> {
        self.acquire.validate()?;
        self.post.validate()?;
        if self.acquire.required_number != self.post.required_number {
            return Err(crate::error::HarvestError::invalid_config(
                "acquisition and post-processing disagree on the required number",
            ));
        }
        Ok(())
    }
}

/// Builder for [`HarvestConfig`]
#[derive(Debug, Default)]
pub struct HarvestConfigBuilder {
    config: HarvestConfig,
}

impl HarvestConfigBuilder {
    /// Set the ordered engine list
    #[must_use]
    pub fn engines(mut self, engines: Vec<Engine>) -> Self {
        self.config.acquire.engines = engines;
        self
    }

    /// Set the maximum attempt count
    #[must_use]
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.config.acquire.max_attempts = attempts;
        self
    }

    /// Set the required number of images (drives retries and trimming)
    #[must_use]
    pub fn required_number(mut self, required: Option<usize>) -> Self {
        self.config.acquire.required_number = required;
        self.config.post.required_number = required;
        self
    }

    /// Set discovery collaborator options
    #[must_use]
    pub fn discovery_options(mut self, options: DiscoveryOptions) -> Self {
        self.config.acquire.discovery = options;
        self
    }

    /// Set downloader collaborator options
    #[must_use]
    pub fn download_options(mut self, options: DownloadOptions) -> Self {
        self.config.acquire.download = options;
        self
    }

    /// Enable or disable duplicate removal
    #[must_use]
    pub fn dedup(mut self, dedup: bool) -> Self {
        self.config.post.dedup = dedup;
        self
    }

    /// Set the sort criterion
    #[must_use]
    pub fn sort(mut self, sort: SortCriterion) -> Self {
        self.config.post.sort = sort;
        self
    }

    /// Enable or disable trimming to the required number
    #[must_use]
    pub fn trim_to_required(mut self, trim: bool) -> Self {
        self.config.post.trim_to_required = trim;
        self
    }

    /// Set an explicit filename prefix (default: the keyword)
    #[must_use]
    pub fn file_prefix<S: Into<String>>(mut self, prefix: Option<S>) -> Self {
        self.config.post.file_prefix = prefix.map(Into::into);
        self
    }

    /// Set the conversion target format
    #[must_use]
    pub fn output_format(mut self, format: Option<OutputFormat>) -> Self {
        self.config.post.output_format = format;
        self
    }

    /// Set the encoding quality
    #[must_use]
    pub fn quality(mut self, quality: u8) -> Self {
        self.config.post.quality = quality.min(100);
        self
    }

    /// Propagate per-keyword failures instead of continuing
    #[must_use]
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.config.fail_fast = fail_fast;
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// Returns the first validation failure, see [`HarvestConfig::validate`].
    pub fn build(self) -> crate::Result<HarvestConfig> {
        let config = self.config;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_criterion_parsing() {
        let c: SortCriterion = "rank,asc".parse().unwrap();
        assert_eq!(c, SortCriterion::new(SortKey::Rank, SortDirection::Ascending));

        let c: SortCriterion = "resolution,desc".parse().unwrap();
        assert_eq!(
            c,
            SortCriterion::new(SortKey::Resolution, SortDirection::Descending)
        );

        // Direction defaults to ascending
        let c: SortCriterion = "rank".parse().unwrap();
        assert_eq!(c.direction, SortDirection::Ascending);

        assert!("size,asc".parse::<SortCriterion>().is_err());
        assert!("rank,up".parse::<SortCriterion>().is_err());
        assert!("rank,asc,extra".parse::<SortCriterion>().is_err());
    }

    #[test]
    fn test_sort_criterion_roundtrip_display() {
        for input in ["rank,asc", "rank,desc", "resolution,asc", "resolution,desc"] {
            let c: SortCriterion = input.parse().unwrap();
            assert_eq!(c.to_string(), input);
        }
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("jpeg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!("webp".parse::<OutputFormat>().unwrap(), OutputFormat::WebP);
        assert!("bmp".parse::<OutputFormat>().is_err());

        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::WebP.extension(), "webp");
    }

    #[test]
    fn test_default_config() {
        let config = HarvestConfig::default();
        assert_eq!(config.acquire.max_attempts, 5);
        assert_eq!(config.acquire.required_number, None);
        assert!(!config.post.dedup);
        assert!(!config.post.trim_to_required);
        assert_eq!(config.post.quality, 95);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = HarvestConfig::builder()
            .engines(vec![Engine::new("google"), Engine::new("bing")])
            .max_attempts(3)
            .required_number(Some(10))
            .dedup(true)
            .trim_to_required(true)
            .sort("resolution,desc".parse().unwrap())
            .quality(80)
            .build()
            .unwrap();

        assert_eq!(config.acquire.engines.len(), 2);
        assert_eq!(config.acquire.max_attempts, 3);
        assert_eq!(config.acquire.required_number, Some(10));
        assert_eq!(config.post.required_number, Some(10));
        assert!(config.post.dedup);
        assert!(config.post.trim_to_required);
        assert_eq!(config.post.quality, 80);
    }

    #[test]
    fn test_config_validation() {
        // Trimming without a required number is rejected
        let result = HarvestConfig::builder().trim_to_required(true).build();
        assert!(result.is_err());

        // Zero attempts is rejected
        let result = HarvestConfig::builder().max_attempts(0).build();
        assert!(result.is_err());

        // Empty engine list is rejected
        let result = HarvestConfig::builder().engines(Vec::new()).build();
        assert!(result.is_err());

        // Quality above 100 is clamped by the builder
        let config = HarvestConfig::builder().quality(150).build().unwrap();
        assert_eq!(config.post.quality, 100);
    }

    #[test]
    fn test_post_config_serde_roundtrip() {
        let config = PostProcessConfig {
            dedup: true,
            sort: SortCriterion::new(SortKey::Resolution, SortDirection::Descending),
            required_number: Some(12),
            trim_to_required: true,
            file_prefix: Some("cat".to_string()),
            output_format: Some(OutputFormat::Jpeg),
            quality: 90,
        };

        let json = serde_json::to_string(&config).unwrap();
        let decoded: PostProcessConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, config);
    }
}
